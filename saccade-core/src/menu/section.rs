//! Static menu definition

/// Behaviour of a section when selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SectionKind {
    /// Options are nine-point keys; select moves the eyes
    NinePoint,
    /// Select re-centres every eye
    Zero,
    /// Select toggles the chosen setting
    Settings,
}

/// Live value a message can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusSource {
    /// Actuator link status
    Controller,
}

/// Text shown under a section, resolved by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message {
    Static(&'static str),
    Dynamic(StatusSource),
}

/// Initially highlighted option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DefaultOption {
    /// Position, wrapped to the option count
    Index(usize),
    /// Option label; falls back to the first option if absent
    Label(&'static str),
}

/// One menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSection {
    pub name: &'static str,
    pub options: &'static [&'static str],
    /// Options per display row
    pub row_length: usize,
    pub default_option: Option<DefaultOption>,
    pub kind: SectionKind,
    pub message: Option<Message>,
}

impl MenuSection {
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Index of a label within this section
    pub fn option_index(&self, label: &str) -> Option<usize> {
        self.options.iter().position(|&o| o == label)
    }

    /// Cursor position at start; `None` for sections without options
    pub fn default_index(&self) -> Option<usize> {
        if self.options.is_empty() {
            return None;
        }
        match self.default_option {
            None => Some(0),
            Some(DefaultOption::Index(i)) => Some(i % self.options.len()),
            Some(DefaultOption::Label(label)) => Some(self.option_index(label).unwrap_or(0)),
        }
    }

    /// Options per row, never zero
    pub fn columns(&self) -> usize {
        if self.row_length == 0 {
            self.options.len().max(1)
        } else {
            self.row_length
        }
    }
}

/// Eye target setting label
pub const SETTING_EYE: &str = "Eye";

/// Nine-point distance setting label
pub const SETTING_RANGE: &str = "Range";

/// The panel menu: nine-point grid, zero, settings
pub static DEFAULT_MENU: [MenuSection; 3] = [
    MenuSection {
        name: "9-pt",
        options: &["UL", "UC", "UR", "L", "C", "R", "LL", "LC", "LR"],
        row_length: 3,
        default_option: Some(DefaultOption::Label("C")),
        kind: SectionKind::NinePoint,
        message: None,
    },
    MenuSection {
        name: "Zero",
        options: &[],
        row_length: 0,
        default_option: None,
        kind: SectionKind::Zero,
        message: Some(Message::Static("Reset eye(s)\nto center")),
    },
    MenuSection {
        name: "Settings",
        options: &[SETTING_EYE, SETTING_RANGE],
        row_length: 1,
        default_option: Some(DefaultOption::Index(0)),
        kind: SectionKind::Settings,
        message: Some(Message::Dynamic(StatusSource::Controller)),
    },
];
