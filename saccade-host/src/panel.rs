//! Button panel emulator
//!
//! Runs the menu state machine against stdin tokens and draws the
//! panel screen on the terminal. Lines that are not button tokens are
//! treated as serial protocol commands, so both inputs drive the same
//! controller the way they do on the panel hardware.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use saccade_core::menu::{MenuAction, MenuStateMachine, Setting, StatusColor, HOLD_THRESHOLD_MS};
use saccade_core::traits::Clock;
use saccade_display::{layout, DisplayBackend, DisplayError, Screen, SCREEN_COLS, SCREEN_ROWS};
use saccade_protocol::{ButtonEvent, ButtonKey, Response};

use crate::rig::{HostController, MonotonicClock};
use crate::serve::SerialSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    inverted: bool,
}

/// Text frame buffer flushed to a terminal
///
/// With `ansi` set the frame is redrawn in place with inverse video and
/// colours; otherwise inverted cells are bracketed so plain logs stay
/// readable.
pub struct TerminalBackend<W: Write> {
    out: W,
    ansi: bool,
    cells: [[Cell; SCREEN_COLS]; SCREEN_ROWS],
    colors: [StatusColor; SCREEN_ROWS],
}

impl<W: Write> TerminalBackend<W> {
    pub fn new(out: W, ansi: bool) -> Self {
        Self {
            out,
            ansi,
            cells: [[Cell { ch: ' ', inverted: false }; SCREEN_COLS]; SCREEN_ROWS],
            colors: [StatusColor::Normal; SCREEN_ROWS],
        }
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn color_code(color: StatusColor) -> Option<&'static str> {
        match color {
            StatusColor::Normal => None,
            StatusColor::Connected => Some("\x1b[32m"),
            StatusColor::Disconnected => Some("\x1b[31m"),
        }
    }

    fn write_frame(&mut self) -> io::Result<()> {
        if self.ansi {
            write!(self.out, "\x1b[2J\x1b[H")?;
        }
        writeln!(self.out, "+{}+", "-".repeat(SCREEN_COLS))?;
        for (row, cells) in self.cells.iter().enumerate() {
            let mut line = String::new();
            let color = if self.ansi {
                Self::color_code(self.colors[row])
            } else {
                None
            };
            if let Some(code) = color {
                line.push_str(code);
            }
            let mut inverted = false;
            for cell in cells {
                if cell.inverted != inverted {
                    inverted = cell.inverted;
                    match (self.ansi, inverted) {
                        (true, true) => line.push_str("\x1b[7m"),
                        (true, false) => line.push_str("\x1b[27m"),
                        (false, true) => line.push('['),
                        (false, false) => line.push(']'),
                    }
                }
                line.push(cell.ch);
            }
            if inverted && !self.ansi {
                line.push(']');
            }
            if self.ansi && (inverted || color.is_some()) {
                line.push_str("\x1b[0m");
            }
            writeln!(self.out, "|{}|", line.trim_end())?;
        }
        writeln!(self.out, "+{}+", "-".repeat(SCREEN_COLS))?;
        self.out.flush()
    }
}

impl<W: Write> DisplayBackend for TerminalBackend<W> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        for row in &mut self.cells {
            row.fill(Cell { ch: ' ', inverted: false });
        }
        self.colors = [StatusColor::Normal; SCREEN_ROWS];
        Ok(())
    }

    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        let row = self
            .cells
            .get_mut(row as usize)
            .ok_or(DisplayError::InvalidCoordinates)?;
        for (cell, ch) in row.iter_mut().skip(col as usize).zip(text.chars()) {
            cell.ch = ch;
        }
        Ok(())
    }

    fn draw_colored_text(
        &mut self,
        row: u8,
        col: u8,
        text: &str,
        color: StatusColor,
    ) -> Result<(), DisplayError> {
        self.draw_text(row, col, text)?;
        self.colors[row as usize] = color;
        Ok(())
    }

    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError> {
        let row = self
            .cells
            .get_mut(row as usize)
            .ok_or(DisplayError::InvalidCoordinates)?;
        let end = (end_col as usize).min(SCREEN_COLS);
        for cell in row.iter_mut().take(end).skip(start_col as usize) {
            cell.inverted = !cell.inverted;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.write_frame().map_err(|_| DisplayError::Communication)
    }

    fn dimensions(&self) -> (u8, u8) {
        (SCREEN_COLS as u8, SCREEN_ROWS as u8)
    }
}

/// One line of panel input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelInput {
    /// Press and release straight away
    Tap(ButtonKey),
    /// Press and hold the cycle button past the threshold
    Hold,
    Press(ButtonKey),
    Release(ButtonKey),
    /// Anything else goes to the serial protocol
    Serial(String),
}

impl PanelInput {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        let first = tokens.next()?;
        let second = tokens.next();
        let extra = tokens.next().is_some();

        let input = match (first.to_ascii_lowercase().as_str(), second, extra) {
            ("hold", None, false) => PanelInput::Hold,
            ("press", Some(key), false) => match ButtonKey::from_name(key) {
                Some(key) => PanelInput::Press(key),
                None => PanelInput::Serial(line.to_string()),
            },
            ("release", Some(key), false) => match ButtonKey::from_name(key) {
                Some(key) => PanelInput::Release(key),
                None => PanelInput::Serial(line.to_string()),
            },
            (name, None, false) => match ButtonKey::from_name(name) {
                Some(key) => PanelInput::Tap(key),
                None => PanelInput::Serial(line.to_string()),
            },
            _ => PanelInput::Serial(line.to_string()),
        };
        Some(input)
    }
}

/// Menu, serial session and screen of one emulated panel
pub struct Panel<W: Write> {
    menu: MenuStateMachine,
    session: SerialSession,
    screen: Screen,
    backend: TerminalBackend<W>,
    clock: MonotonicClock,
}

impl<W: Write> Panel<W> {
    pub fn new(controller: HostController, backend: TerminalBackend<W>) -> Self {
        let menu = MenuStateMachine::with_default_menu(&controller.config().nine_point);
        let mut session = SerialSession::new(controller);
        session.set_eyes(menu.eyes());
        session.set_distance(menu.distance());
        Self {
            menu,
            session,
            screen: Screen::new(),
            backend,
            clock: MonotonicClock::new(),
        }
    }

    pub fn controller(&self) -> &HostController {
        self.session.controller()
    }

    pub fn menu(&self) -> &MenuStateMachine {
        &self.menu
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn backend_mut(&mut self) -> &mut TerminalBackend<W> {
        &mut self.backend
    }

    /// Engage every servo and draw the first frame
    pub fn start(&mut self) -> Result<(), DisplayError> {
        match self.session.controller_mut().set_engaged(true) {
            Ok(()) => info!("Servo controller connected"),
            Err(e) => warn!("Servo controller unavailable: {e}"),
        }
        self.render()
    }

    /// Feed one button edge through the menu and perform its action
    pub fn handle_button(&mut self, event: ButtonEvent) {
        if let Some(action) = self.menu.handle(event) {
            self.apply(action);
        }
    }

    /// Handle one input line; returns a protocol response for serial lines
    pub fn handle_input(&mut self, input: PanelInput) -> Option<Response> {
        let now = self.clock.now_ms();
        match input {
            PanelInput::Tap(key) => {
                self.handle_button(ButtonEvent::pressed(key, now));
                self.handle_button(ButtonEvent::released(key, now));
            }
            PanelInput::Hold => {
                self.handle_button(ButtonEvent::pressed(ButtonKey::Cycle, now));
                self.handle_button(ButtonEvent::released(
                    ButtonKey::Cycle,
                    now.wrapping_add(HOLD_THRESHOLD_MS),
                ));
            }
            PanelInput::Press(key) => self.handle_button(ButtonEvent::pressed(key, now)),
            PanelInput::Release(key) => self.handle_button(ButtonEvent::released(key, now)),
            PanelInput::Serial(line) => return self.session.handle_line(&line),
        }
        None
    }

    fn apply(&mut self, action: MenuAction) {
        match action {
            MenuAction::Redraw => {}
            MenuAction::Move {
                point,
                distance,
                eyes,
            } => {
                let result = self
                    .session
                    .controller_mut()
                    .apply_nine_point(point, distance, eyes);
                if result.succeeded() {
                    info!("Moved {} to {point} ({distance}°)", eyes.label());
                } else {
                    warn!("Move to {point} failed");
                }
            }
            MenuAction::Zero => {
                let moves = self.session.controller_mut().zero();
                let success = !moves.is_empty() && moves.iter().all(|m| m.is_complete());
                if !success {
                    warn!("Zero incomplete");
                }
                self.menu.zero_completed(success);
            }
            MenuAction::SettingChanged(Setting::Eye(eyes)) => {
                info!("Settings -> Eye target: {}", eyes.label());
                self.session.set_eyes(eyes);
            }
            MenuAction::SettingChanged(Setting::Range(distance)) => {
                info!("Settings -> Range: {distance}°");
                self.session.set_distance(f32::from(distance));
            }
        }
    }

    /// Lay the current state out and draw it if anything changed
    pub fn render(&mut self) -> Result<(), DisplayError> {
        let controller = self.session.controller();
        let model = self
            .menu
            .render(&controller.states(), controller.link_status());
        layout(&model, &mut self.screen);
        self.screen.draw_to(&mut self.backend)?;
        Ok(())
    }
}

/// Read panel input until it closes
pub fn run<R: BufRead, W: Write>(panel: &mut Panel<W>, input: R) -> Result<()> {
    panel
        .start()
        .map_err(|e| anyhow!("failed to draw panel: {e}"))?;
    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let Some(input) = PanelInput::parse(&line) else {
            continue;
        };
        if let Some(response) = panel.handle_input(input) {
            let out = panel.backend_mut().get_mut();
            writeln!(out, "{response}")?;
        }
        panel
            .render()
            .map_err(|e| anyhow!("failed to draw panel: {e}"))?;
    }
    Ok(())
}
