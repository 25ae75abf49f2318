//! Render model handed to the display
//!
//! All text is ASCII so it fits any bitmap font.

use core::fmt::Write;

use heapless::{String, Vec};

use super::machine::{MenuStateMachine, MAX_SECTIONS};
use super::section::{Message, SectionKind, SETTING_EYE, SETTING_RANGE};
use crate::eye::{EyeState, LinkStatus};

/// Maximum options in one section
pub const MAX_OPTIONS: usize = 9;

/// Maximum option cell text
pub const CELL_LEN: usize = 16;

/// Maximum status line text
pub const STATUS_LEN: usize = 48;

/// Colour hint for status text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusColor {
    Normal,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SectionTitle {
    pub name: &'static str,
    pub active: bool,
}

/// One option of the active section
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OptionCell {
    pub text: String<CELL_LEN>,
    pub row: u8,
    pub col: u8,
    /// Under the cursor
    pub current: bool,
    /// Last committed option
    pub selected: bool,
    /// Section default
    pub default: bool,
}

/// Everything the display needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderModel {
    pub titles: Vec<SectionTitle, MAX_SECTIONS>,
    pub active_section: usize,
    pub kind: SectionKind,
    /// Options per row of the active section
    pub columns: usize,
    pub options: Vec<OptionCell, MAX_OPTIONS>,
    pub message: Option<Message>,
    /// Section without options has been triggered
    pub message_selected: bool,
    /// Eye angles, e.g. `L: +10, +0  R: -5, +0`
    pub status_line: String<STATUS_LEN>,
    pub link: LinkStatus,
}

impl RenderModel {
    pub(crate) fn build(
        machine: &MenuStateMachine,
        states: &[EyeState; 2],
        link: LinkStatus,
    ) -> Self {
        let cursor = machine.cursor();
        let index = cursor.active_section;
        let section = machine.active_section();

        let mut titles = Vec::new();
        for (i, s) in machine.sections().iter().enumerate() {
            let _ = titles.push(SectionTitle {
                name: s.name,
                active: i == index,
            });
        }

        let columns = section.columns();
        let current = cursor.current_option[index].unwrap_or(0);
        let selected = cursor.selected_option[index];
        let default = section.default_index();

        let mut options = Vec::new();
        for (i, &label) in section.options.iter().take(MAX_OPTIONS).enumerate() {
            let mut text: String<CELL_LEN> = String::new();
            let _ = match (section.kind, label) {
                (SectionKind::Settings, SETTING_EYE) => {
                    write!(text, "{}: {}", label, machine.eyes().label())
                }
                (SectionKind::Settings, SETTING_RANGE) => {
                    write!(text, "{}: {}", label, machine.distance() as u32)
                }
                _ => text.push_str(label).map_err(|_| core::fmt::Error),
            };
            let _ = options.push(OptionCell {
                text,
                row: (i / columns) as u8,
                col: (i % columns) as u8,
                current: i == current,
                selected: selected == Some(i),
                default: default == Some(i),
            });
        }

        Self {
            titles,
            active_section: index,
            kind: section.kind,
            columns,
            options,
            message: section.message,
            message_selected: !section.has_options() && selected.is_some(),
            status_line: eye_status_line(states),
            link,
        }
    }

    /// Colour for a dynamic controller status
    pub fn link_color(&self) -> StatusColor {
        if self.link.is_connected() {
            StatusColor::Connected
        } else {
            StatusColor::Disconnected
        }
    }

    /// Resolve the section message to display text
    pub fn message_text(&self) -> Option<(&'static str, StatusColor)> {
        match self.message? {
            Message::Static(text) => Some((text, StatusColor::Normal)),
            Message::Dynamic(_) => Some((self.link.label(), self.link_color())),
        }
    }
}

/// Format both eyes as whole signed degrees
pub fn eye_status_line(states: &[EyeState; 2]) -> String<STATUS_LEN> {
    let mut line = String::new();
    for (i, state) in states.iter().enumerate() {
        if i > 0 {
            let _ = line.push_str("  ");
        }
        let _ = write!(
            line,
            "{}: {:+}, {:+}",
            state.eye.label(),
            whole(state.pan_degrees),
            whole(state.tilt_degrees)
        );
    }
    line
}

// Rounded to an integer with negative zero folded into zero
fn whole(degrees: f32) -> i32 {
    libm::roundf(degrees) as i32
}
