//! Problem domain models: stops, vehicles, plan units, expressions and the model itself.

mod dag;
pub use self::dag::*;

mod expressions;
pub use self::expressions::*;

mod model;
pub use self::model::*;

mod plan_units;
pub use self::plan_units::*;

mod stop;
pub use self::stop::*;

mod time_dependent;
pub use self::time_dependent::*;

mod vehicle;
pub use self::vehicle::*;
