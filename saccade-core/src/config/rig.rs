//! Rig configuration and deployment presets

use heapless::Vec;

use super::axis::{AxisConfig, AxisId, Direction, EyeId};
use crate::eye::EyeSelection;
use crate::profile::SamplingPlan;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of nine-point distance options
pub const MAX_DISTANCES: usize = 8;

/// Default ramp acceleration (°/s²)
pub const DEFAULT_ACCELERATION: f32 = 2000.0;

/// Default ramp velocity limit (°/s)
pub const DEFAULT_MAX_VELOCITY: f32 = 400.0;

/// Default PWM frequency for hobby servos
pub const DEFAULT_PWM_FREQUENCY_HZ: f32 = 50.0;

/// How targets are checked against the actuator range
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LimitPolicy {
    /// Clamp silently to ±range
    Static { range_degrees: f32 },
    /// Query the actuator and reject targets outside its range
    Dynamic,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        LimitPolicy::Static {
            range_degrees: 45.0,
        }
    }
}

/// Pan and tilt channels of one eye; either may be absent
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EyeAxes {
    pub pan: Option<AxisConfig>,
    pub tilt: Option<AxisConfig>,
}

impl EyeAxes {
    pub fn axis(&self, axis: AxisId) -> Option<&AxisConfig> {
        match axis {
            AxisId::Pan => self.pan.as_ref(),
            AxisId::Tilt => self.tilt.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pan.is_none() && self.tilt.is_none()
    }
}

/// Nine-point shortcut settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NinePointSettings {
    /// Selectable distances in degrees, cycled in order
    pub distances: Vec<u8, MAX_DISTANCES>,
    /// Distance selected at start, must be one of `distances`
    pub default_distance: u8,
    /// Eyes targeted at start
    pub default_eyes: EyeSelection,
}

impl Default for NinePointSettings {
    fn default() -> Self {
        let mut distances = Vec::new();
        for d in [1u8, 5, 10, 20, 40] {
            let _ = distances.push(d);
        }
        Self {
            distances,
            default_distance: 10,
            default_eyes: EyeSelection::Both,
        }
    }
}

impl NinePointSettings {
    /// Index of the default distance, or 0 if it is not listed
    pub fn default_index(&self) -> usize {
        self.distances
            .iter()
            .position(|&d| d == self.default_distance)
            .unwrap_or(0)
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No axis configured on either eye
    NoAxes,
    /// Two axes share a channel
    DuplicateChannel(u8),
    /// A pulse axis has a non-positive µs/° scale
    InvalidScale(u8),
    /// An axis zero reference is not a finite number
    InvalidZero(u8),
    /// PWM frequency is not positive
    InvalidFrequency,
    /// Static range is not positive
    InvalidRange,
    /// Distance list empty or default not listed
    InvalidDistance,
    /// Sampling rate, tolerance or timeout out of range
    InvalidSampling,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoAxes => f.write_str("no axes configured"),
            ConfigError::DuplicateChannel(ch) => write!(f, "channel {} used twice", ch),
            ConfigError::InvalidScale(ch) => {
                write!(f, "channel {}: us_per_degree must be positive", ch)
            }
            ConfigError::InvalidZero(ch) => {
                write!(f, "channel {}: zero reference must be finite", ch)
            }
            ConfigError::InvalidFrequency => f.write_str("PWM frequency must be positive"),
            ConfigError::InvalidRange => f.write_str("static range must be positive"),
            ConfigError::InvalidDistance => {
                f.write_str("default distance must be one of the distance options")
            }
            ConfigError::InvalidSampling => f.write_str("invalid sampling plan"),
        }
    }
}

/// Complete rig configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RigConfig {
    pub left: EyeAxes,
    pub right: EyeAxes,
    /// PWM frequency for pulse axes
    pub pwm_frequency_hz: f32,
    pub limits: LimitPolicy,
    pub nine_point: NinePointSettings,
    /// Ramp acceleration (°/s²)
    pub acceleration: f32,
    /// Ramp velocity limit (°/s)
    pub max_velocity: f32,
    pub sampling: SamplingPlan,
}

impl RigConfig {
    /// Dual-eye PWM rig on a 16-channel servo board
    ///
    /// Channels 4-7, 11 µs/°, ±45° clamped.
    pub fn pwm_dual_eye() -> Self {
        Self {
            left: EyeAxes {
                pan: Some(AxisConfig::pulse("Left pan", 4, 1490.0, 11.0, Direction::Negative)),
                tilt: Some(AxisConfig::pulse("Left tilt", 5, 1460.0, 11.0, Direction::Positive)),
            },
            right: EyeAxes {
                pan: Some(AxisConfig::pulse("Right pan", 6, 1560.0, 11.0, Direction::Negative)),
                tilt: Some(AxisConfig::pulse("Right tilt", 7, 1460.0, 11.0, Direction::Negative)),
            },
            pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            limits: LimitPolicy::Static {
                range_degrees: 45.0,
            },
            nine_point: NinePointSettings::default(),
            acceleration: DEFAULT_ACCELERATION,
            max_velocity: DEFAULT_MAX_VELOCITY,
            sampling: SamplingPlan::default(),
        }
    }

    /// Single eye on an absolute-position servo controller
    ///
    /// Pan on channel 0, tilt on channel 1, limits queried from the device.
    pub fn absolute_single_eye(pan_zero: f32, tilt_zero: f32) -> Self {
        Self {
            left: EyeAxes {
                pan: Some(AxisConfig::absolute("Pan", 0, pan_zero, Direction::Positive)),
                tilt: Some(AxisConfig::absolute("Tilt", 1, tilt_zero, Direction::Positive)),
            },
            right: EyeAxes::default(),
            pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            limits: LimitPolicy::Dynamic,
            nine_point: NinePointSettings {
                default_eyes: EyeSelection::Left,
                ..NinePointSettings::default()
            },
            acceleration: DEFAULT_ACCELERATION,
            max_velocity: DEFAULT_MAX_VELOCITY,
            sampling: SamplingPlan::default(),
        }
    }

    pub fn eye(&self, eye: EyeId) -> &EyeAxes {
        match eye {
            EyeId::Left => &self.left,
            EyeId::Right => &self.right,
        }
    }

    pub fn eye_mut(&mut self, eye: EyeId) -> &mut EyeAxes {
        match eye {
            EyeId::Left => &mut self.left,
            EyeId::Right => &mut self.right,
        }
    }

    pub fn axis(&self, eye: EyeId, axis: AxisId) -> Option<&AxisConfig> {
        self.eye(eye).axis(axis)
    }

    /// Iterate over every configured axis
    pub fn axes(&self) -> impl Iterator<Item = (EyeId, AxisId, &AxisConfig)> {
        EyeId::ALL.into_iter().flat_map(move |eye| {
            AxisId::ALL
                .into_iter()
                .filter_map(move |axis| self.axis(eye, axis).map(|cfg| (eye, axis, cfg)))
        })
    }

    /// Eyes that have at least one configured axis
    pub fn configured_eyes(&self) -> Option<EyeSelection> {
        match (self.left.is_empty(), self.right.is_empty()) {
            (false, false) => Some(EyeSelection::Both),
            (false, true) => Some(EyeSelection::Left),
            (true, false) => Some(EyeSelection::Right),
            (true, true) => None,
        }
    }

    /// Shift the zero reference of one eye's axes
    ///
    /// Used for command-line zero overrides; `None` keeps the configured value.
    pub fn override_zero(&mut self, eye: EyeId, pan_zero: Option<f32>, tilt_zero: Option<f32>) {
        let axes = self.eye_mut(eye);
        for (axis, zero) in [(&mut axes.pan, pan_zero), (&mut axes.tilt, tilt_zero)] {
            if let (Some(axis), Some(zero)) = (axis.as_mut(), zero) {
                match &mut axis.kind {
                    super::AxisKind::Pulse { zero_pulse_us, .. } => *zero_pulse_us = zero,
                    super::AxisKind::Absolute { zero_position } => *zero_position = zero,
                }
            }
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if self.configured_eyes().is_none() {
            return Err(ConfigError::NoAxes);
        }

        let mut seen: Vec<u8, 4> = Vec::new();
        for (_, _, axis) in self.axes() {
            if seen.contains(&axis.channel) {
                return Err(ConfigError::DuplicateChannel(axis.channel));
            }
            let _ = seen.push(axis.channel);
            if !positive(axis.kind.scale()) {
                return Err(ConfigError::InvalidScale(axis.channel));
            }
            if !axis.kind.zero().is_finite() {
                return Err(ConfigError::InvalidZero(axis.channel));
            }
        }

        if !positive(self.pwm_frequency_hz) {
            return Err(ConfigError::InvalidFrequency);
        }
        if let LimitPolicy::Static { range_degrees } = self.limits {
            if !positive(range_degrees) {
                return Err(ConfigError::InvalidRange);
            }
        }
        if !self
            .nine_point
            .distances
            .contains(&self.nine_point.default_distance)
        {
            return Err(ConfigError::InvalidDistance);
        }
        if !self.sampling.is_valid() {
            return Err(ConfigError::InvalidSampling);
        }
        Ok(())
    }
}

impl Default for RigConfig {
    fn default() -> Self {
        Self::pwm_dual_eye()
    }
}
