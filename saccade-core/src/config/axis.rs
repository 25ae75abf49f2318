//! Per-axis configuration
//!
//! An axis is one servo channel driving either the pan or the tilt of one
//! eye. The physical unit depends on the actuator: pulse-width servos are
//! driven in microseconds, absolute-position servos in native degrees.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum axis name length
pub const MAX_NAME_LEN: usize = 16;

/// Which eye assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EyeId {
    Left,
    Right,
}

impl EyeId {
    pub const ALL: [EyeId; 2] = [EyeId::Left, EyeId::Right];

    /// Single letter label used on the status line
    pub fn label(self) -> &'static str {
        match self {
            EyeId::Left => "L",
            EyeId::Right => "R",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            EyeId::Left => 0,
            EyeId::Right => 1,
        }
    }
}

/// Which rotation axis of an eye
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AxisId {
    /// Horizontal, positive is right
    Pan,
    /// Vertical, positive is up
    Tilt,
}

impl AxisId {
    pub const ALL: [AxisId; 2] = [AxisId::Pan, AxisId::Tilt];

    pub fn label(self) -> &'static str {
        match self {
            AxisId::Pan => "pan",
            AxisId::Tilt => "tilt",
        }
    }
}

/// Sign applied between logical degrees and physical units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Increasing degrees increase the physical value
    #[default]
    Positive,
    /// Increasing degrees decrease the physical value
    Negative,
}

impl Direction {
    /// +1.0 or -1.0
    pub fn sign(self) -> f32 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }

    /// Build from a signed integer; zero and positive map to Positive
    pub fn from_sign(sign: i8) -> Self {
        if sign < 0 {
            Direction::Negative
        } else {
            Direction::Positive
        }
    }
}

/// Physical unit of an axis
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AxisKind {
    /// PWM hobby servo driven by pulse width
    Pulse {
        /// Pulse width at logical zero (µs)
        zero_pulse_us: f32,
        /// Pulse width change per degree (µs/°)
        us_per_degree: f32,
    },
    /// Servo controller that accepts absolute positions in degrees
    Absolute {
        /// Native position at logical zero (°)
        zero_position: f32,
    },
}

impl AxisKind {
    /// Physical value at logical zero
    pub fn zero(&self) -> f32 {
        match *self {
            AxisKind::Pulse { zero_pulse_us, .. } => zero_pulse_us,
            AxisKind::Absolute { zero_position } => zero_position,
        }
    }

    /// Physical units per logical degree
    pub fn scale(&self) -> f32 {
        match *self {
            AxisKind::Pulse { us_per_degree, .. } => us_per_degree,
            AxisKind::Absolute { .. } => 1.0,
        }
    }

    pub fn is_pulse(&self) -> bool {
        matches!(self, AxisKind::Pulse { .. })
    }
}

/// One servo channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisConfig {
    /// Display name, e.g. "Left pan"
    pub name: String<MAX_NAME_LEN>,
    /// Actuator channel number
    pub channel: u8,
    /// Physical unit and zero reference
    pub kind: AxisKind,
    /// Sign between logical degrees and physical units
    #[cfg_attr(feature = "serde", serde(default))]
    pub direction: Direction,
}

impl AxisConfig {
    /// Pulse-width servo axis
    pub fn pulse(
        name: &str,
        channel: u8,
        zero_pulse_us: f32,
        us_per_degree: f32,
        direction: Direction,
    ) -> Self {
        Self {
            name: label(name),
            channel,
            kind: AxisKind::Pulse {
                zero_pulse_us,
                us_per_degree,
            },
            direction,
        }
    }

    /// Absolute-position servo axis
    pub fn absolute(name: &str, channel: u8, zero_position: f32, direction: Direction) -> Self {
        Self {
            name: label(name),
            channel,
            kind: AxisKind::Absolute { zero_position },
            direction,
        }
    }
}

/// Build a bounded name, truncating on a char boundary
pub fn label(text: &str) -> String<MAX_NAME_LEN> {
    let mut end = text.len().min(MAX_NAME_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    let _ = out.push_str(&text[..end]);
    out
}
