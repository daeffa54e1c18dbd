mod actuator;
mod advisor;
mod control;
mod farm;
mod lenient;
mod rule;
mod sensor;

pub use actuator::*;
pub use advisor::*;
pub use control::*;
pub use farm::*;
pub use rule::*;
pub use sensor::*;
