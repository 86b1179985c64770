//! This module contains logic which decides when the search has to stop.

mod cancellation;
pub use self::cancellation::CancellationToken;
