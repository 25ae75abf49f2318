//! Button events from the front panel

/// Logical buttons on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonKey {
    /// Commit the current option (D0)
    Select,
    /// Advance the option cursor (D1)
    Step,
    /// Next section on tap, select on hold (D2)
    Cycle,
}

impl ButtonKey {
    pub const ALL: [ButtonKey; 3] = [ButtonKey::Select, ButtonKey::Step, ButtonKey::Cycle];

    /// Board pin label
    pub fn pin(self) -> &'static str {
        match self {
            ButtonKey::Select => "D0",
            ButtonKey::Step => "D1",
            ButtonKey::Cycle => "D2",
        }
    }

    /// Look up by logical name or pin label, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.iter().copied().find(|key| {
            key.pin().eq_ignore_ascii_case(name) || key.name().eq_ignore_ascii_case(name)
        })
    }

    /// Lowercase logical name
    pub fn name(self) -> &'static str {
        match self {
            ButtonKey::Select => "select",
            ButtonKey::Step => "step",
            ButtonKey::Cycle => "cycle",
        }
    }
}

/// Edge reported by the key scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    Pressed,
    Released,
}

/// A single press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub key: ButtonKey,
    pub edge: ButtonEdge,
    /// Monotonic timestamp of the edge
    pub timestamp_ms: u32,
}

impl ButtonEvent {
    pub fn pressed(key: ButtonKey, timestamp_ms: u32) -> Self {
        Self {
            key,
            edge: ButtonEdge::Pressed,
            timestamp_ms,
        }
    }

    pub fn released(key: ButtonKey, timestamp_ms: u32) -> Self {
        Self {
            key,
            edge: ButtonEdge::Released,
            timestamp_ms,
        }
    }

    /// Returns true if this is a press edge
    pub fn is_press(&self) -> bool {
        self.edge == ButtonEdge::Pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_lookup() {
        assert_eq!(ButtonKey::from_name("d2"), Some(ButtonKey::Cycle));
        assert_eq!(ButtonKey::from_name("Step"), Some(ButtonKey::Step));
        assert_eq!(ButtonKey::from_name("select"), Some(ButtonKey::Select));
        assert_eq!(ButtonKey::from_name("D3"), None);
    }

    #[test]
    fn test_event_constructors() {
        let press = ButtonEvent::pressed(ButtonKey::Cycle, 100);
        assert!(press.is_press());
        let release = ButtonEvent::released(ButtonKey::Cycle, 800);
        assert!(!release.is_press());
        assert_eq!(release.timestamp_ms, 800);
    }
}
