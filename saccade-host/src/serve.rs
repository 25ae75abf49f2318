//! Serial line protocol over a byte stream
//!
//! Bytes are accumulated into lines, each line is parsed and executed,
//! and exactly one response line is written per non-blank command.

use std::io::{self, Read, Write};

use log::{debug, info, warn};
use saccade_core::eye::EyeSelection;
use saccade_protocol::{Command, LineBuffer, Response};

use crate::rig::HostController;

/// Protocol state for one serial channel
pub struct SerialSession {
    controller: HostController,
    buffer: LineBuffer,
    distance: f32,
    eyes: EyeSelection,
}

impl SerialSession {
    /// Nine-point moves start with the rig's default distance and eyes
    pub fn new(controller: HostController) -> Self {
        let settings = &controller.config().nine_point;
        let distance = f32::from(settings.default_distance);
        let eyes = settings.default_eyes;
        Self {
            controller,
            buffer: LineBuffer::new(),
            distance,
            eyes,
        }
    }

    pub fn controller(&self) -> &HostController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut HostController {
        &mut self.controller
    }

    pub fn into_controller(self) -> HostController {
        self.controller
    }

    pub fn eyes(&self) -> EyeSelection {
        self.eyes
    }

    pub fn set_eyes(&mut self, eyes: EyeSelection) {
        self.eyes = eyes;
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn set_distance(&mut self, degrees: f32) {
        self.distance = degrees;
    }

    /// Drop any partial line, e.g. when the channel closes
    pub fn disconnect(&mut self) {
        self.buffer.disconnect();
    }

    /// Feed one input byte; returns a response when a line completes
    pub fn feed_byte(&mut self, byte: u8) -> Option<Response> {
        match self.buffer.feed_byte(byte) {
            Ok(Some(line)) => self.handle_line(&line),
            Ok(None) => None,
            Err(e) => {
                warn!("Serial input discarded: {e}");
                Some(e.into())
            }
        }
    }

    /// Execute one complete line
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                debug!("Rejected '{line}': {e}");
                return Response::from_parse_error(&e);
            }
        };

        let response = match command {
            Command::NinePoint(point) => {
                let result = self
                    .controller
                    .apply_nine_point(point, self.distance, self.eyes);
                for eye_move in &result.moves {
                    if let Some(failure) = eye_move.failure() {
                        warn!("{} eye: {failure}", eye_move.eye.label());
                    }
                }
                if result.succeeded() {
                    Response::NinePointOk(point)
                } else {
                    Response::NinePointFailed(point)
                }
            }
            Command::Saccade(args) => {
                let result = self.controller.saccade(args);
                match result.applied() {
                    Some(applied) => Response::SaccadeOk(applied),
                    None => {
                        for eye_move in [result.left, result.right] {
                            if let Some(failure) = eye_move.failure() {
                                warn!("{} eye: {failure}", eye_move.eye.label());
                            }
                        }
                        Response::SaccadeFailed
                    }
                }
            }
        };
        Some(response)
    }
}

/// Serve commands from `input` until it closes
pub fn run<R: Read, W: Write>(
    session: &mut SerialSession,
    input: R,
    output: &mut W,
) -> io::Result<()> {
    info!("Serving line protocol");
    for byte in input.bytes() {
        if let Some(response) = session.feed_byte(byte?) {
            writeln!(output, "{response}")?;
            output.flush()?;
        }
    }
    session.disconnect();
    info!("Input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use crate::rig::build_controller;
    use saccade_core::config::{EyeId, RigConfig};

    fn session() -> SerialSession {
        SerialSession::new(build_controller(
            RigConfig::pwm_dual_eye(),
            Backend::Sim,
            false,
        ))
    }

    fn exchange(session: &mut SerialSession, input: &str) -> String {
        let mut out = Vec::new();
        run(session, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_nine_point_uses_session_distance() {
        let mut session = session();
        assert_eq!(exchange(&mut session, "ur\n"), "CMD OK 9PT UR\n");
        let left = session.controller().eye_state(EyeId::Left);
        assert_eq!((left.pan_degrees, left.tilt_degrees), (10.0, 10.0));

        session.set_distance(5.0);
        session.set_eyes(EyeSelection::Right);
        exchange(&mut session, "LL\r");
        let right = session.controller().eye_state(EyeId::Right);
        assert_eq!((right.pan_degrees, right.tilt_degrees), (-5.0, -5.0));
        let left = session.controller().eye_state(EyeId::Left);
        assert_eq!((left.pan_degrees, left.tilt_degrees), (10.0, 10.0));
    }

    #[test]
    fn test_saccade_reports_clamped_values() {
        let mut session = session();
        let out = exchange(&mut session, "SAC 10 X -50 NC\n");
        assert_eq!(out, "CMD OK SAC 10.0 0.0 -45.0 0.0\n");
    }

    #[test]
    fn test_errors_and_blank_lines() {
        let mut session = session();
        let out = exchange(&mut session, "\n  \nSAC 1 2\nSAC 1 2 3 q\nhello\n");
        assert_eq!(
            out,
            "CMD ERR SAC needs 4 angles\n\
             CMD ERR SAC invalid angle\n\
             CMD ERR Unknown command: hello\n"
        );
    }

    #[test]
    fn test_long_line_discarded() {
        let mut session = session();
        let long = "9".repeat(70);
        let out = exchange(&mut session, &format!("{long}\nC\n"));
        // The overflow reset leaves a 5-byte tail that is rejected on its own
        assert_eq!(
            out,
            "CMD ERR Line too long\nCMD ERR Unknown command: 99999\nCMD OK 9PT C\n"
        );
    }

    #[test]
    fn test_non_ascii_input() {
        let mut session = session();
        let out = exchange(&mut session, "h\u{e9}\n");
        assert_eq!(out, "CMD ERR Unknown command: h\u{e9}\n");

        let mut out = Vec::new();
        run(&mut session, &[b'C', 0xFF, b'\n', b'C', b'\n'][..], &mut out).unwrap();
        assert_eq!(out, b"CMD ERR Invalid text\nCMD OK 9PT C\n");
    }

    #[test]
    fn test_unconfigured_eye_fails() {
        let rig = RigConfig::absolute_single_eye(90.0, 90.0);
        let mut session = SerialSession::new(build_controller(rig, Backend::Sim, false));
        assert_eq!(exchange(&mut session, "C\n"), "CMD OK 9PT C\n");
        assert_eq!(exchange(&mut session, "SAC 0 0 0 0\n"), "CMD ERR SAC move failed\n");
    }

    #[test]
    fn test_detached_controller() {
        let mut session = SerialSession::new(build_controller(
            RigConfig::pwm_dual_eye(),
            Backend::Sim,
            true,
        ));
        assert_eq!(exchange(&mut session, "UC\n"), "CMD ERR 9PT UC\n");
    }
}
