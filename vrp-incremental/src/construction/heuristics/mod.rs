//! Moves, stop generator and best move search.

mod construction;
pub use self::construction::*;

mod generator;
pub use self::generator::*;

mod insertions;
pub use self::insertions::*;

mod moves;
pub use self::moves::*;

mod sequences;
pub use self::sequences::*;
