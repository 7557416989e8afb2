//! Velocity Alerts math utilities.

pub mod math;

pub use math::ratio::*;
pub use math::regression::*;
