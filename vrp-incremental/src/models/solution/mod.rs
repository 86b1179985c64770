//! Contains a solution representation with incrementally maintained caches.

mod handles;
pub use self::handles::*;

#[allow(clippy::module_inception)]
mod solution;
pub use self::solution::*;
