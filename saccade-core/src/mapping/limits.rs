//! Range checking for logical angles
//!
//! Two policies exist. Static limits clamp silently to a symmetric range.
//! Dynamic limits come from the actuator's own (min, max) positions and
//! reject anything outside them; nothing is clamped in that mode.

use heapless::Vec;

use super::axis::unmap;
use crate::config::{AxisConfig, AxisId, EyeId, LimitPolicy};
use crate::traits::{Actuator, ActuatorError};

/// Which end of the range was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bound {
    Min,
    Max,
}

/// Allowed logical range of one axis, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisLimits {
    pub min: f32,
    pub max: f32,
}

impl AxisLimits {
    /// ±range around zero
    pub fn symmetric(range_degrees: f32) -> Self {
        Self {
            min: -range_degrees,
            max: range_degrees,
        }
    }

    /// Convert an absolute (min, max) position pair to logical degrees
    ///
    /// A negative direction swaps the ends, so the result is reordered.
    pub fn from_physical(axis: &AxisConfig, physical: (f32, f32)) -> Self {
        let a = unmap(axis, physical.0);
        let b = unmap(axis, physical.1);
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, degrees: f32) -> bool {
        degrees >= self.min && degrees <= self.max
    }

    /// Never panics, even for bounds read back as NaN
    pub fn clamp(&self, degrees: f32) -> f32 {
        degrees.max(self.min).min(self.max)
    }
}

/// One axis target outside its range
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LimitViolation {
    pub eye: EyeId,
    pub axis: AxisId,
    /// Requested logical angle
    pub requested: f32,
    /// Range it was checked against
    pub limits: AxisLimits,
}

impl LimitViolation {
    /// Bound that was crossed; `None` for a non-finite request
    pub fn bound(&self) -> Option<Bound> {
        if self.requested < self.limits.min {
            Some(Bound::Min)
        } else if self.requested > self.limits.max {
            Some(Bound::Max)
        } else {
            None
        }
    }
}

impl core::fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let eye = match self.eye {
            EyeId::Left => "left",
            EyeId::Right => "right",
        };
        match self.bound() {
            Some(Bound::Min) => write!(
                f,
                "{} {} {:.2}° below min {:.2}°",
                eye,
                self.axis.label(),
                self.requested,
                self.limits.min
            ),
            Some(Bound::Max) => write!(
                f,
                "{} {} {:.2}° above max {:.2}°",
                eye,
                self.axis.label(),
                self.requested,
                self.limits.max
            ),
            None => write!(f, "{} {} target is not a number", eye, self.axis.label()),
        }
    }
}

/// Target rejected before any motion; lists every violated axis
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange {
    pub violations: Vec<LimitViolation, 4>,
}

impl OutOfRange {
    pub fn push(&mut self, violation: LimitViolation) {
        let _ = self.violations.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl core::fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("target out of range: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

/// Applies the configured limit policy
#[derive(Debug, Clone, Copy)]
pub struct LimitChecker {
    policy: LimitPolicy,
}

impl LimitChecker {
    pub fn new(policy: LimitPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> LimitPolicy {
        self.policy
    }

    /// Logical range of an axis under the current policy
    ///
    /// Dynamic limits cost one bus transaction per call.
    pub fn limits<A: Actuator + ?Sized>(
        &self,
        actuator: &mut A,
        axis: &AxisConfig,
    ) -> Result<AxisLimits, ActuatorError> {
        match self.policy {
            LimitPolicy::Static { range_degrees } => Ok(AxisLimits::symmetric(range_degrees)),
            LimitPolicy::Dynamic => {
                let physical = actuator.position_limits(axis.channel)?;
                Ok(AxisLimits::from_physical(axis, physical))
            }
        }
    }

    /// Check one axis target, returning the angle to send
    pub fn check(
        &self,
        eye: EyeId,
        axis: AxisId,
        limits: &AxisLimits,
        degrees: f32,
    ) -> Result<f32, LimitViolation> {
        let violation = LimitViolation {
            eye,
            axis,
            requested: degrees,
            limits: *limits,
        };
        if !degrees.is_finite() {
            return Err(violation);
        }
        match self.policy {
            LimitPolicy::Static { .. } => Ok(limits.clamp(degrees)),
            LimitPolicy::Dynamic if limits.contains(degrees) => Ok(degrees),
            LimitPolicy::Dynamic => Err(violation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Direction;
    use proptest::prelude::*;

    #[test]
    fn test_static_clamps() {
        let checker = LimitChecker::new(LimitPolicy::Static {
            range_degrees: 45.0,
        });
        let limits = AxisLimits::symmetric(45.0);
        assert_eq!(checker.check(EyeId::Left, AxisId::Pan, &limits, 60.0), Ok(45.0));
        assert_eq!(checker.check(EyeId::Left, AxisId::Pan, &limits, -90.0), Ok(-45.0));
        assert_eq!(checker.check(EyeId::Left, AxisId::Pan, &limits, 12.5), Ok(12.5));
    }

    #[test]
    fn test_non_finite_rejected() {
        let checker = LimitChecker::new(LimitPolicy::default());
        let limits = AxisLimits::symmetric(45.0);
        let err = checker
            .check(EyeId::Right, AxisId::Tilt, &limits, f32::NAN)
            .unwrap_err();
        assert_eq!(err.bound(), None);
    }

    #[test]
    fn test_clamp_with_nan_bounds_does_not_panic() {
        let limits = AxisLimits::symmetric(f32::NAN);
        assert_eq!(limits.clamp(10.0), 10.0);
    }

    #[test]
    fn test_dynamic_rejects() {
        let checker = LimitChecker::new(LimitPolicy::Dynamic);
        let limits = AxisLimits { min: -90.0, max: 90.0 };
        assert_eq!(checker.check(EyeId::Left, AxisId::Tilt, &limits, 90.0), Ok(90.0));
        let err = checker
            .check(EyeId::Left, AxisId::Tilt, &limits, 95.0)
            .unwrap_err();
        assert_eq!(err.bound(), Some(Bound::Max));
        assert_eq!(err.limits.max, 90.0);
    }

    #[test]
    fn test_from_physical_negative_direction_reorders() {
        let axis = AxisConfig::absolute("Pan", 0, 100.0, Direction::Negative);
        let limits = AxisLimits::from_physical(&axis, (0.0, 180.0));
        assert_eq!(limits.min, -80.0);
        assert_eq!(limits.max, 100.0);

        let axis = AxisConfig::absolute("Pan", 0, 100.0, Direction::Positive);
        let limits = AxisLimits::from_physical(&axis, (0.0, 180.0));
        assert_eq!(limits.min, -100.0);
        assert_eq!(limits.max, 80.0);
    }

    #[test]
    fn test_out_of_range_lists_every_axis() {
        let limits = AxisLimits { min: -10.0, max: 10.0 };
        let mut err = OutOfRange::default();
        err.push(LimitViolation {
            eye: EyeId::Left,
            axis: AxisId::Pan,
            requested: 20.0,
            limits,
        });
        err.push(LimitViolation {
            eye: EyeId::Left,
            axis: AxisId::Tilt,
            requested: -15.0,
            limits,
        });
        let text = format!("{}", err);
        assert!(text.contains("left pan 20.00° above max 10.00°"));
        assert!(text.contains("left tilt -15.00° below min -10.00°"));
    }

    proptest! {
        #[test]
        fn prop_static_outside_range_hits_boundary(d in 45.001f32..1e6, negative in prop::bool::ANY) {
            let checker = LimitChecker::new(LimitPolicy::Static { range_degrees: 45.0 });
            let limits = AxisLimits::symmetric(45.0);
            let d = if negative { -d } else { d };
            let sent = checker.check(EyeId::Left, AxisId::Pan, &limits, d).unwrap();
            prop_assert_eq!(sent, if negative { -45.0 } else { 45.0 });
            prop_assert_ne!(sent, d);
        }

        #[test]
        fn prop_static_inside_range_unchanged(d in -45.0f32..=45.0) {
            let checker = LimitChecker::new(LimitPolicy::Static { range_degrees: 45.0 });
            let limits = AxisLimits::symmetric(45.0);
            prop_assert_eq!(checker.check(EyeId::Left, AxisId::Pan, &limits, d), Ok(d));
        }
    }
}
