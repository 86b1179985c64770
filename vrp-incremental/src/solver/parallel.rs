#[cfg(test)]
#[path = "../../tests/unit/solver/parallel_test.rs"]
mod parallel_test;

use crate::construction::heuristics::random_solution_construction;
use crate::models::problem::Model;
use crate::models::solution::Solution;
use crate::solver::*;
use crate::utils::*;
use std::cmp::Ordering as FloatOrdering;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// Describes a run started by [`ParallelSolver`].
pub struct ParallelSolveInformation {
    /// A cycle of the run: runs of the first `parallel_runs` belong to the first cycle and so on.
    pub cycle: usize,
    /// A run index, starts at zero.
    pub run: usize,
    /// A random generator of the run.
    pub random: DefaultRandom,
}

/// Creates a solver for a run of [`ParallelSolver`] given its start solution.
pub type SolverFactory = Arc<dyn Fn(&ParallelSolveInformation, &Solution) -> GenericResult<Solver> + Send + Sync>;

/// Creates options for a run of [`ParallelSolver`].
pub type SolveOptionsFactory = Arc<dyn Fn(&ParallelSolveInformation) -> GenericResult<SolveOptions> + Send + Sync>;

/// Runs many solvers concurrently, each from a start solution or a copy of the best known one.
pub struct ParallelSolver {
    model: Arc<Model>,
    environment: Arc<Environment>,
    solver_factory: SolverFactory,
    options_factory: SolveOptionsFactory,
    progression: Arc<Mutex<Progression>>,
}

impl ParallelSolver {
    /// Creates a new instance of `ParallelSolver` with default factories.
    pub fn new(model: Arc<Model>, environment: Arc<Environment>) -> Self {
        Self {
            model,
            solver_factory: create_default_solver_factory(environment.clone()),
            options_factory: create_default_solve_options_factory(),
            environment,
            progression: Arc::new(Mutex::new(Progression::default())),
        }
    }

    /// Sets a factory of run solvers.
    pub fn with_solver_factory(mut self, solver_factory: SolverFactory) -> Self {
        self.solver_factory = solver_factory;
        self
    }

    /// Sets a factory of run options.
    pub fn with_options_factory(mut self, options_factory: SolveOptionsFactory) -> Self {
        self.options_factory = options_factory;
        self
    }

    /// Returns the model.
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Returns improvements of the best solution of the last search.
    pub fn progression(&self) -> Progression {
        lock(&self.progression).clone()
    }

    /// Starts the search in background and returns a stream of improving solutions. The first
    /// solution of the stream is the best start solution. The stream ends when the search runs
    /// out of time or iterations unless the token is cancelled earlier.
    pub fn solve(
        &self,
        start_solutions: Vec<Solution>,
        options: &ParallelSolveOptions,
        token: &CancellationToken,
    ) -> GenericResult<SolutionStream> {
        if let Some(idx) = start_solutions.iter().position(|solution| !Arc::ptr_eq(solution.model(), &self.model)) {
            return Err(format!("start solution at index {idx} belongs to another model").into());
        }

        let cpus = self.environment.available_cpus.max(1);
        let parallel_runs =
            usize::try_from(options.parallel_runs).ok().filter(|&runs| runs > 0).map_or(cpus, |runs| runs.min(cpus));
        let constructions = usize::try_from(options.start_solutions).unwrap_or(parallel_runs);

        let token = token.child_with_timeout(options.duration);
        let telemetry = Telemetry::new(options.log_progress.then(|| self.environment.logger.clone()));
        telemetry.log(
            format!(
                "parallel solver: {parallel_runs} runs, {} start solutions, {constructions} constructed",
                start_solutions.len()
            )
            .as_str(),
        );

        let pool = ThreadPool::new(parallel_runs)?;
        let mut solutions = start_solutions;
        solutions.extend(self.construct_solutions(&pool, constructions, &token)?);
        if solutions.is_empty() {
            solutions.push(Solution::new(self.model.clone(), self.environment.new_random())?);
        }

        let best = solutions
            .iter()
            .min_by(|left, right| compare_floats(left.score(), right.score()))
            .cloned()
            .ok_or_else(|| GenericError::from("no start solution"))?;

        *lock(&self.progression) = Progression::default();

        let (sender, receiver) = channel();
        let shared = Arc::new(SharedState {
            best: Mutex::new(best.clone()),
            pending: Mutex::new(solutions),
            progression: self.progression.clone(),
            iterations_left: AtomicI64::new(if options.iterations < 0 { i64::MAX } else { options.iterations }),
            total_iterations: AtomicUsize::new(0),
            runs: AtomicUsize::new(0),
            parallel_runs,
            sender,
            token: token.clone(),
            telemetry,
            solver_factory: self.solver_factory.clone(),
            options_factory: self.options_factory.clone(),
        });

        shared.report(best, 0);

        let run_deterministically = options.run_deterministically;
        let handle = std::thread::spawn(move || {
            let result = pool.execute(|| {
                if run_deterministically { shared.run_cycles() } else { shared.run_continuously() }
            });

            if let Err(err) = result {
                shared.token.cancel();
                let _ = shared.sender.send(Err(err));
            }

            shared.telemetry.log(
                format!(
                    "parallel solver finished: score {:.3}, {} iterations, {} runs",
                    lock(&shared.best).score(),
                    shared.total_iterations.load(Ordering::Relaxed),
                    shared.runs.load(Ordering::Relaxed)
                )
                .as_str(),
            );
        });

        Ok(SolutionStream { receiver, token, handle: Some(handle) })
    }

    fn construct_solutions(
        &self,
        pool: &ThreadPool,
        amount: usize,
        token: &CancellationToken,
    ) -> GenericResult<Vec<Solution>> {
        if amount == 0 {
            return Ok(vec![]);
        }

        let solution = Solution::new(self.model.clone(), self.environment.new_random())?;
        let copies = (0..amount).map(|_| solution.clone()).collect::<Vec<_>>();

        pool.execute(|| {
            parallel_into_collect(copies, |mut solution| {
                random_solution_construction(&mut solution, token).map(|_| solution)
            })
        })
        .into_iter()
        .collect()
    }
}

/// A stream of improving solutions produced by [`ParallelSolver`]. Dropping the stream cancels
/// the search and waits for its termination.
pub struct SolutionStream {
    receiver: Receiver<GenericResult<Solution>>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SolutionStream {
    /// Cancels the search, already found solutions are still returned.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Iterator for SolutionStream {
    type Item = GenericResult<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

impl Drop for SolutionStream {
    fn drop(&mut self) {
        self.token.cancel();

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct SharedState {
    best: Mutex<Solution>,
    pending: Mutex<Vec<Solution>>,
    progression: Arc<Mutex<Progression>>,
    iterations_left: AtomicI64,
    total_iterations: AtomicUsize,
    runs: AtomicUsize,
    parallel_runs: usize,
    sender: Sender<GenericResult<Solution>>,
    token: CancellationToken,
    telemetry: Telemetry,
    solver_factory: SolverFactory,
    options_factory: SolveOptionsFactory,
}

struct RunSetup {
    solver: Solver,
    options: SolveOptions,
    solution: Solution,
}

impl SharedState {
    /// Each worker starts new runs as soon as its previous run is finished. Errors of all workers
    /// are reported together.
    fn run_continuously(&self) -> GenericResult<()> {
        let workers = (0..self.parallel_runs).collect::<Vec<_>>();

        let errors = parallel_into_collect(workers, |_| {
            while let Some(setup) = self.start_run().inspect_err(|_| self.token.cancel())? {
                self.execute_run(setup, |solution| self.promote(solution)).inspect_err(|_| self.token.cancel())?;
            }

            Ok::<_, GenericError>(())
        })
        .into_iter()
        .filter_map(Result::err)
        .collect::<Vec<_>>();

        if errors.is_empty() { Ok(()) } else { Err(GenericError::join_many(&errors, "; ").into()) }
    }

    /// Runs of a cycle are prepared in run order and their improvements are promoted in run
    /// order after all runs of the cycle are finished.
    fn run_cycles(&self) -> GenericResult<()> {
        loop {
            let mut setups = Vec::with_capacity(self.parallel_runs);
            for _ in 0..self.parallel_runs {
                match self.start_run()? {
                    Some(setup) => setups.push(setup),
                    None => break,
                }
            }

            if setups.is_empty() {
                return Ok(());
            }

            let results = parallel_into_collect(setups, |setup| {
                let mut found = vec![];
                self.execute_run(setup, |solution| found.push(solution.clone()))?;

                Ok::<_, GenericError>(found)
            });

            for found in results {
                found?.iter().for_each(|solution| self.promote(solution));
            }
        }
    }

    fn start_run(&self) -> GenericResult<Option<RunSetup>> {
        if self.token.is_cancelled() {
            return Ok(None);
        }

        let solution = lock(&self.pending).pop().unwrap_or_else(|| lock(&self.best).clone());
        let run = self.runs.fetch_add(1, Ordering::Relaxed);
        let information =
            ParallelSolveInformation { cycle: run / self.parallel_runs + 1, run, random: solution.random().fork() };

        let solver = (self.solver_factory)(&information, &solution)?;
        let mut options = (self.options_factory)(&information)?;

        let requested = if options.iterations < 0 { i64::MAX } else { options.iterations };
        match self.iterations_left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
            (left > 0).then(|| left.saturating_sub(requested))
        }) {
            Ok(left) => options.iterations = requested.min(left),
            Err(_) => return Ok(None),
        }

        if let Some(remaining) = self.token.remaining() {
            options.duration = options.duration.min(remaining);
        }

        Ok(Some(RunSetup { solver, options, solution }))
    }

    fn execute_run<F>(&self, setup: RunSetup, on_best: F) -> GenericResult<()>
    where
        F: FnMut(&Solution),
    {
        let RunSetup { mut solver, options, solution } = setup;
        let outcome = solver.solve(solution, &options, &self.token, on_best)?;

        self.total_iterations.fetch_add(outcome.iterations, Ordering::Relaxed);

        Ok(())
    }

    fn promote(&self, solution: &Solution) {
        let mut best = lock(&self.best);

        if compare_floats(solution.score(), best.score()) == FloatOrdering::Less {
            *best = solution.clone();
            self.report(solution.clone(), self.total_iterations.load(Ordering::Relaxed));
        }
    }

    fn report(&self, solution: Solution, iterations: usize) {
        let elapsed_seconds = self.telemetry.elapsed_secs();

        lock(&self.progression).add(ProgressionEntry { elapsed_seconds, value: solution.score(), iterations });
        self.telemetry.log(format!("new best: score {:.3}, iterations {iterations}", solution.score()).as_str());

        let _ = self.sender.send(Ok(solution));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
