#[cfg(test)]
#[path = "../../tests/unit/solver/search_test.rs"]
mod search_test;

use super::options::iterations_limit;
use crate::models::problem::Model;
use crate::models::solution::Solution;
use crate::solver::*;
use crate::utils::*;
use std::sync::Arc;

/// A result of a solver run.
pub struct SolveOutcome {
    /// The best found solution.
    pub best: Solution,
    /// An amount of finished iterations.
    pub iterations: usize,
}

/// Runs the adaptive large neighborhood search on a single solution.
pub struct Solver {
    model: Arc<Model>,
    operators: Vec<Box<dyn SolveOperator>>,
    events: SolveEvents,
    environment: Arc<Environment>,
    progression: Progression,
}

impl Solver {
    /// Creates a new instance of `Solver`. Fails if there are no operators or none of them can
    /// result in improvement.
    pub fn new(
        model: Arc<Model>,
        operators: Vec<Box<dyn SolveOperator>>,
        environment: Arc<Environment>,
    ) -> GenericResult<Self> {
        if operators.is_empty() {
            return Err("solver is empty, no solve operators provided".into());
        }

        if !operators.iter().any(|operator| operator.can_result_in_improvement()) {
            return Err("no solve operator can result in improvement".into());
        }

        Ok(Self { model, operators, events: SolveEvents::default(), environment, progression: Progression::default() })
    }

    /// Returns the model.
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Returns events to register handlers.
    pub fn events_mut(&mut self) -> &mut SolveEvents {
        &mut self.events
    }

    /// Returns improvements of the best solution of the last run.
    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Runs the search from the start solution until the iteration limit is reached or the
    /// run is cancelled. The callback is called with the start solution and then with each new
    /// best solution.
    pub fn solve<F>(
        &mut self,
        start: Solution,
        options: &SolveOptions,
        token: &CancellationToken,
        mut on_best: F,
    ) -> GenericResult<SolveOutcome>
    where
        F: FnMut(&Solution),
    {
        if !Arc::ptr_eq(start.model(), &self.model) {
            return Err("start solution belongs to another model".into());
        }

        let token = token.child_with_timeout(options.duration);
        let telemetry = Telemetry::new(options.log_progress.then(|| self.environment.logger.clone()));
        let random = DefaultRandom::new_repeatable(start.random().next_seed());
        let max_iterations = iterations_limit(options.iterations);

        let mut work = start.clone();
        let mut best = start;
        let mut information = SolveInformation::new();

        self.progression = Progression::default();
        self.progression.add(ProgressionEntry { elapsed_seconds: 0., value: best.score(), iterations: 0 });

        self.events.start.trigger(&information);
        self.operators.iter_mut().for_each(|operator| operator.on_start_solve(&information));
        telemetry.log(format!("solver started: score {:.3}, {} operators", best.score(), self.operators.len()).as_str());
        on_best(&best);

        let mut iterations = 0;
        'search: while iterations < max_iterations {
            information.iteration = iterations;
            information.delta_score = 0.;
            information.operators.clear();
            self.events.iterating.trigger(&information);

            for idx in 0..self.operators.len() {
                if token.is_cancelled() {
                    self.events.context_done.trigger(&information);
                    break 'search;
                }

                if !random.is_hit(self.operators[idx].probability()) {
                    continue;
                }

                information.operators.push(self.operators[idx].name().to_string());
                self.events.operator_executing.trigger(&information);

                let is_reset = {
                    let operator = &mut self.operators[idx];
                    let mut context = SolveContext::new(&mut work, &best, &random, &information, &token);
                    operator.execute(&mut context).map_err(|err| err.context(operator.name()))?;

                    context.is_reset()
                };

                if is_reset {
                    self.events.reset.trigger(&information);
                }
                self.events.operator_executed.trigger(&information);

                if !self.operators[idx].can_result_in_improvement() {
                    continue;
                }

                let delta = work.score() - best.score();
                if delta >= 0. {
                    continue;
                }

                information.delta_score += delta;
                best = work.clone();

                self.progression.add(ProgressionEntry {
                    elapsed_seconds: information.timer.elapsed_secs_as_float(),
                    value: best.score(),
                    iterations,
                });
                telemetry.log(format!("new best: score {:.3}, iteration {iterations}", best.score()).as_str());

                self.events.new_best_solution.trigger(&information);
                self.operators.iter_mut().for_each(|operator| operator.on_better_solution(&information));
                on_best(&best);
            }

            self.operators.iter_mut().for_each(|operator| operator.update_parameters(information.delta_score));
            self.events.iterated.trigger(&information);
            iterations += 1;
        }

        self.events.done.trigger(&information);
        telemetry.log(format!("solver finished: score {:.3}, {iterations} iterations", best.score()).as_str());

        Ok(SolveOutcome { best, iterations })
    }
}
