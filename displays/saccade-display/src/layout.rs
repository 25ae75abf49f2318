//! Render model to text grid
//!
//! ```text
//! 9-pt Zero Settings         <- active title inverted
//!  UL      UC      UR
//!  L      *C       R         <- '*' selected, '+' default,
//!  LL      LC      LR           current option inverted
//! Controller connected       <- section message, if any
//!
//! L: +0, +0  R: +0, +0       <- eye status, last row
//! ```

use heapless::String;
use saccade_core::menu::{RenderModel, StatusColor};

use crate::screen::{Screen, LINE_LEN, SCREEN_COLS, SCREEN_ROWS};

const STATUS_ROW: usize = SCREEN_ROWS - 1;

/// Lay the model out on the screen, replacing its content
pub fn layout(model: &RenderModel, screen: &mut Screen) {
    screen.clear();

    // Titles
    let mut line: String<LINE_LEN> = String::new();
    let mut active = None;
    for (i, title) in model.titles.iter().enumerate() {
        if i > 0 {
            let _ = line.push(' ');
        }
        let start = line.len();
        push_truncated(&mut line, title.name);
        if title.active {
            active = Some((start as u8, line.len() as u8));
        }
    }
    screen.set_line(0, &line);
    if let Some((start, end)) = active {
        screen.set_highlight(0, start, end);
    }

    // Option grid
    let columns = model.columns.max(1);
    let width = SCREEN_COLS / columns;
    let mut rows: [String<LINE_LEN>; SCREEN_ROWS] = core::array::from_fn(|_| String::new());
    let mut next_row = 1;
    for cell in &model.options {
        let row = 1 + cell.row as usize;
        if row >= STATUS_ROW {
            continue;
        }
        let text = &mut rows[row];
        let start = cell.col as usize * width;
        while text.len() < start {
            let _ = text.push(' ');
        }

        let marker = if cell.selected {
            '*'
        } else if cell.default {
            '+'
        } else {
            ' '
        };
        let _ = text.push(marker);
        push_truncated(text, &cell.text);
        if text.len() > start + width {
            text.truncate(start + width);
        }
        if cell.current {
            screen.set_highlight(row, start as u8, text.len() as u8);
        }
        next_row = next_row.max(row + 1);
    }
    for (row, text) in rows.iter().enumerate().take(next_row).skip(1) {
        screen.set_line(row, text);
    }

    // Section message
    if let Some((message, color)) = model.message_text() {
        for part in message.split('\n') {
            if next_row >= STATUS_ROW {
                break;
            }
            screen.set_colored_line(next_row, part, color);
            if model.message_selected {
                let end = part.len().min(SCREEN_COLS) as u8;
                screen.set_highlight(next_row, 0, end);
            }
            next_row += 1;
        }
    }

    screen.set_colored_line(STATUS_ROW, &model.status_line, StatusColor::Normal);
}

fn push_truncated(line: &mut String<LINE_LEN>, text: &str) {
    for c in text.chars() {
        if line.push(c).is_err() {
            break;
        }
    }
}
