//! Angle mapping and limit checking
//!
//! Logical angles are signed degrees from the eye's zero reference,
//! positive right/up. Every conversion to and from physical units goes
//! through [`axis::map`] and [`axis::unmap`] so the sign logic exists in
//! exactly one place.

pub mod axis;
pub mod limits;

pub use axis::{
    command, map, pulse_to_duty, read_axis, unmap, unmap_rate, ActuatorCommand, AxisReading,
    MAX_DUTY,
};
pub use limits::{AxisLimits, Bound, LimitChecker, LimitViolation, OutOfRange};
