//! The solver module contains search operators and solvers which run them.
//!
//! # Search
//!
//! [`Solver`] runs an adaptive large neighborhood search on a single solution: each iteration
//! it runs registered operators in their order, each with its probability. Operators which can
//! result in improvement are followed by a comparison of the work solution with the best known
//! one.
//!
//! [`ParallelSolver`] runs many solvers on copies of the best known solution and reports each
//! improvement of the best known solution through a [`SolutionStream`].
//!

mod events;
pub use self::events::*;

mod factories;
pub use self::factories::*;

mod operators;
pub use self::operators::*;

mod options;
pub use self::options::*;

mod parallel;
pub use self::parallel::*;

mod search;
pub use self::search::*;
