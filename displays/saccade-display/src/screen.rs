//! Screen buffer types
//!
//! Provides a character-based screen buffer for text-mode displays.

use heapless::String;
use saccade_core::menu::StatusColor;

use crate::backend::{DisplayBackend, DisplayError};

/// Number of character rows
pub const SCREEN_ROWS: usize = 8;

/// Number of character columns
pub const SCREEN_COLS: usize = 24;

/// Maximum characters per line
pub const LINE_LEN: usize = SCREEN_COLS;

/// Screen buffer for text-mode displays
///
/// Holds one frame of text that can be rendered to any `DisplayBackend`
/// implementation. Only redrawn when something changed.
#[derive(Clone)]
pub struct Screen {
    /// Current display content
    lines: [String<LINE_LEN>; SCREEN_ROWS],
    /// Selection/highlight state per row (start_col, end_col)
    highlights: [Option<(u8, u8)>; SCREEN_ROWS],
    colors: [StatusColor; SCREEN_ROWS],
    /// Whether the screen needs to be redrawn
    dirty: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
            highlights: [None; SCREEN_ROWS],
            colors: [StatusColor::Normal; SCREEN_ROWS],
            dirty: true,
        }
    }

    /// Clear the entire screen
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.highlights = [None; SCREEN_ROWS];
        self.colors = [StatusColor::Normal; SCREEN_ROWS];
        self.dirty = true;
    }

    /// Set the content of a specific row
    ///
    /// Text longer than a row is cut at the last whole character.
    pub fn set_line(&mut self, row: usize, text: &str) {
        if row < SCREEN_ROWS {
            self.lines[row].clear();
            for c in text.chars() {
                if self.lines[row].push(c).is_err() {
                    break;
                }
            }
            self.dirty = true;
        }
    }

    /// Set a row with a status colour
    pub fn set_colored_line(&mut self, row: usize, text: &str, color: StatusColor) {
        self.set_line(row, text);
        if row < SCREEN_ROWS {
            self.colors[row] = color;
        }
    }

    /// Get the content of a specific row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Get the colour of a specific row
    pub fn get_color(&self, row: usize) -> Option<StatusColor> {
        self.colors.get(row).copied()
    }

    /// Set highlight (invert) region for a row
    pub fn set_highlight(&mut self, row: usize, start_col: u8, end_col: u8) {
        if row < SCREEN_ROWS {
            self.highlights[row] = Some((start_col, end_col));
            self.dirty = true;
        }
    }

    /// Get highlight region for a row
    pub fn get_highlight(&self, row: usize) -> Option<(u8, u8)> {
        self.highlights.get(row).copied().flatten()
    }

    /// Check if screen needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark screen as dirty (needs redraw)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Get all lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Draw the frame if it changed since the last draw
    ///
    /// Returns whether anything was sent to the backend.
    pub fn draw_to<B: DisplayBackend>(&mut self, backend: &mut B) -> Result<bool, DisplayError> {
        if !self.dirty {
            return Ok(false);
        }
        let (cols, rows) = backend.dimensions();
        if (cols as usize) < SCREEN_COLS || (rows as usize) < SCREEN_ROWS {
            return Err(DisplayError::InvalidCoordinates);
        }

        backend.clear()?;
        for (row, line) in self.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            backend.draw_colored_text(row as u8, 0, line.as_str(), self.colors[row])?;
        }
        for (row, highlight) in self.highlights.iter().enumerate() {
            if let Some((start, end)) = highlight {
                backend.invert_region(row as u8, *start, *end)?;
            }
        }
        backend.flush()?;
        self.dirty = false;
        Ok(true)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", line.as_str());
        }
        defmt::write!(f, "]");
    }
}
