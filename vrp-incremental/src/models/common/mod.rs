//! Common models.

mod domain;
pub use self::domain::*;

mod location;
pub use self::location::*;
