//! Output seam for the menu panel
//!
//! The panel is a character grid: the menu layout only ever writes text
//! into cells, highlights the cursor span and colours the link status.

use saccade_core::menu::StatusColor;

/// Failure while drawing the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Writing to the panel device failed
    Communication,
    /// Text or highlight falls outside the grid
    InvalidCoordinates,
    /// Drawn before the panel was set up
    NotInitialized,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayError::Communication => f.write_str("panel write failed"),
            DisplayError::InvalidCoordinates => f.write_str("outside the panel grid"),
            DisplayError::NotInitialized => f.write_str("panel not set up"),
        }
    }
}

/// Character-grid panel the menu is drawn onto
///
/// Rows and columns are cell indices. Implementations may buffer writes
/// until [`flush`](DisplayBackend::flush).
pub trait DisplayBackend {
    /// Blank every cell
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write `text` starting at cell (`row`, `col`)
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Write the controller status line in its colour
    ///
    /// Panels without colour draw plain text.
    fn draw_colored_text(
        &mut self,
        row: u8,
        col: u8,
        text: &str,
        _color: StatusColor,
    ) -> Result<(), DisplayError> {
        self.draw_text(row, col, text)
    }

    /// Highlight cells `start_col..end_col` of `row` (active section or option)
    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError>;

    /// Push the drawn frame out
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Grid size as (columns, rows)
    fn dimensions(&self) -> (u8, u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Cells {
        writes: std::vec::Vec<(u8, u8, std::string::String)>,
    }

    impl DisplayBackend for Cells {
        fn clear(&mut self) -> Result<(), DisplayError> {
            self.writes.clear();
            Ok(())
        }

        fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
            self.writes.push((row, col, text.into()));
            Ok(())
        }

        fn invert_region(&mut self, _: u8, _: u8, _: u8) -> Result<(), DisplayError> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }

        fn dimensions(&self) -> (u8, u8) {
            (21, 8)
        }
    }

    #[test]
    fn test_colour_falls_back_to_plain_text() {
        let mut cells = Cells::default();
        cells
            .draw_colored_text(6, 0, "Controller connected", StatusColor::Connected)
            .unwrap();
        assert_eq!(
            cells.writes,
            [(6, 0, std::string::String::from("Controller connected"))]
        );
    }
}
