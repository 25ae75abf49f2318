//! Tap-versus-hold tracking for the overloaded cycle button

/// Hold time at which a release counts as select
pub const HOLD_THRESHOLD_MS: u32 = 600;

/// What a completed press means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// Short tap
    Cycle,
    /// Held at least the threshold
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrackerState {
    #[default]
    Idle,
    Pressed { since_ms: u32 },
}

/// Per-button press tracker
///
/// ```text
/// Idle --press(t0)--> Pressed(t0) --release(t1)--> Idle
///                                   t1 - t0 >= threshold: Select
///                                   otherwise:            Cycle
/// ```
///
/// A release without a recorded press is treated as a tap.
#[derive(Debug, Clone, Copy)]
pub struct ButtonTracker {
    state: TrackerState,
    threshold_ms: u32,
}

impl Default for ButtonTracker {
    fn default() -> Self {
        Self::new(HOLD_THRESHOLD_MS)
    }
}

impl ButtonTracker {
    pub fn new(threshold_ms: u32) -> Self {
        Self {
            state: TrackerState::Idle,
            threshold_ms,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Record a press; a repeated press restarts the hold timer
    pub fn press(&mut self, timestamp_ms: u32) {
        self.state = TrackerState::Pressed {
            since_ms: timestamp_ms,
        };
    }

    /// Record a release and classify the gesture
    pub fn release(&mut self, timestamp_ms: u32) -> Gesture {
        let state = core::mem::take(&mut self.state);
        match state {
            TrackerState::Idle => Gesture::Cycle,
            TrackerState::Pressed { since_ms } => {
                if timestamp_ms.wrapping_sub(since_ms) >= self.threshold_ms {
                    Gesture::Select
                } else {
                    Gesture::Cycle
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_is_cycle() {
        let mut tracker = ButtonTracker::default();
        tracker.press(1000);
        assert_eq!(tracker.release(1200), Gesture::Cycle);
        assert_eq!(tracker.state(), TrackerState::Idle);
    }

    #[test]
    fn test_hold_is_select() {
        let mut tracker = ButtonTracker::default();
        tracker.press(1000);
        assert_eq!(tracker.release(1600), Gesture::Select);

        tracker.press(5000);
        assert_eq!(tracker.release(9000), Gesture::Select);
    }

    #[test]
    fn test_just_below_threshold() {
        let mut tracker = ButtonTracker::default();
        tracker.press(0);
        assert_eq!(tracker.release(599), Gesture::Cycle);
    }

    #[test]
    fn test_release_without_press_is_cycle() {
        let mut tracker = ButtonTracker::default();
        assert_eq!(tracker.release(42), Gesture::Cycle);
    }

    #[test]
    fn test_timestamp_wrap() {
        let mut tracker = ButtonTracker::default();
        tracker.press(u32::MAX - 100);
        assert_eq!(tracker.release(600), Gesture::Select);
    }
}
