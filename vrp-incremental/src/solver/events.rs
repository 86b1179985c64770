use crate::utils::{Float, Timer};
use std::sync::Arc;

/// Describes the state of a running [`Solver`](crate::solver::Solver).
#[derive(Clone, Debug)]
pub struct SolveInformation {
    /// A current iteration, starts at zero.
    pub iteration: usize,
    /// A sum of best score improvements within the current iteration, zero or negative.
    pub delta_score: Float,
    /// Names of operators executed within the current iteration in execution order.
    pub operators: Vec<String>,
    /// A timer started with the run.
    pub timer: Timer,
}

impl SolveInformation {
    pub(crate) fn new() -> Self {
        Self { iteration: 0, delta_score: 0., operators: vec![], timer: Timer::start() }
    }
}

/// A handler of a solve event.
pub type SolveEventHandler = Arc<dyn Fn(&SolveInformation) + Send + Sync>;

/// A list of handlers which are called in registration order.
#[derive(Clone, Default)]
pub struct SolveEvent {
    handlers: Vec<SolveEventHandler>,
}

impl SolveEvent {
    /// Registers a new handler.
    pub fn register<F>(&mut self, handler: F)
    where
        F: Fn(&SolveInformation) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    /// Calls all handlers.
    pub fn trigger(&self, information: &SolveInformation) {
        self.handlers.iter().for_each(|handler| handler(information));
    }
}

/// Events raised by a [`Solver`](crate::solver::Solver) run.
#[derive(Clone, Default)]
pub struct SolveEvents {
    /// Raised once when the run starts.
    pub start: SolveEvent,
    /// Raised when the work solution is reset to the best solution.
    pub reset: SolveEvent,
    /// Raised before each iteration.
    pub iterating: SolveEvent,
    /// Raised after each iteration.
    pub iterated: SolveEvent,
    /// Raised before an operator is executed.
    pub operator_executing: SolveEvent,
    /// Raised after an operator is executed.
    pub operator_executed: SolveEvent,
    /// Raised when a new best solution is found.
    pub new_best_solution: SolveEvent,
    /// Raised when the run is cancelled.
    pub context_done: SolveEvent,
    /// Raised once when the run is finished.
    pub done: SolveEvent,
}
