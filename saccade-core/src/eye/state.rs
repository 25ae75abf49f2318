//! Per-eye state and motion targets

use crate::config::{AxisId, EyeId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Last accepted logical angles of one eye
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EyeState {
    pub eye: EyeId,
    pub pan_degrees: f32,
    pub tilt_degrees: f32,
}

impl EyeState {
    /// Centred state
    pub fn new(eye: EyeId) -> Self {
        Self {
            eye,
            pan_degrees: 0.0,
            tilt_degrees: 0.0,
        }
    }

    pub fn get(&self, axis: AxisId) -> f32 {
        match axis {
            AxisId::Pan => self.pan_degrees,
            AxisId::Tilt => self.tilt_degrees,
        }
    }

    pub(crate) fn set(&mut self, axis: AxisId, degrees: f32) {
        match axis {
            AxisId::Pan => self.pan_degrees = degrees,
            AxisId::Tilt => self.tilt_degrees = degrees,
        }
    }
}

/// Which eyes a nine-point move targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EyeSelection {
    Left,
    Right,
    #[default]
    Both,
}

impl EyeSelection {
    /// Settings label: L, R or B
    pub fn label(self) -> &'static str {
        match self {
            EyeSelection::Left => "L",
            EyeSelection::Right => "R",
            EyeSelection::Both => "B",
        }
    }

    /// Next option in the L -> R -> B cycle
    pub fn next(self) -> Self {
        match self {
            EyeSelection::Left => EyeSelection::Right,
            EyeSelection::Right => EyeSelection::Both,
            EyeSelection::Both => EyeSelection::Left,
        }
    }

    pub fn eyes(self) -> &'static [EyeId] {
        match self {
            EyeSelection::Left => &[EyeId::Left],
            EyeSelection::Right => &[EyeId::Right],
            EyeSelection::Both => &EyeId::ALL,
        }
    }

    pub fn contains(self, eye: EyeId) -> bool {
        self.eyes().contains(&eye)
    }
}

/// A host-issued move with ramp parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionTarget {
    pub eyes: EyeSelection,
    /// Logical pan (°)
    pub pan: f32,
    /// Logical tilt (°)
    pub tilt: f32,
    /// Ramp acceleration (°/s²)
    pub acceleration: f32,
    /// Ramp velocity limit (°/s)
    pub max_velocity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_cycle() {
        let mut sel = EyeSelection::Left;
        let mut labels = std::vec::Vec::new();
        for _ in 0..4 {
            labels.push(sel.label());
            sel = sel.next();
        }
        assert_eq!(labels, ["L", "R", "B", "L"]);
    }

    #[test]
    fn test_selection_eyes() {
        assert_eq!(EyeSelection::Both.eyes(), &[EyeId::Left, EyeId::Right]);
        assert!(EyeSelection::Right.contains(EyeId::Right));
        assert!(!EyeSelection::Right.contains(EyeId::Left));
    }

    #[test]
    fn test_state_set_get() {
        let mut state = EyeState::new(EyeId::Left);
        state.set(AxisId::Tilt, -12.0);
        assert_eq!(state.get(AxisId::Tilt), -12.0);
        assert_eq!(state.get(AxisId::Pan), 0.0);
    }
}
