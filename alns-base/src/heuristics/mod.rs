//! This module contains self tuning parameters used by search operators.

mod parameter;
pub use self::parameter::*;
