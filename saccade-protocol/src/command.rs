//! Command grammar for the serial line protocol
//!
//! Parsing is stateless: one trimmed line in, one [`Command`] or
//! [`ParseError`] out. Keywords and sentinels are case-insensitive.

use heapless::String;

use crate::line::{Line, MAX_LINE_LEN};

/// Tokens meaning "keep this axis where it is"
pub const HOLD_TOKENS: [&str; 6] = ["X", "H", "HOLD", "SKIP", "KEEP", "NC"];

/// Named gaze directions of the nine-point map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NinePoint {
    UpperLeft,
    UpperCenter,
    UpperRight,
    Left,
    Center,
    Right,
    LowerLeft,
    LowerCenter,
    LowerRight,
}

impl NinePoint {
    /// All points in menu order (row major, top row first)
    pub const ALL: [NinePoint; 9] = [
        NinePoint::UpperLeft,
        NinePoint::UpperCenter,
        NinePoint::UpperRight,
        NinePoint::Left,
        NinePoint::Center,
        NinePoint::Right,
        NinePoint::LowerLeft,
        NinePoint::LowerCenter,
        NinePoint::LowerRight,
    ];

    /// Short protocol key, e.g. `UR`
    pub fn key(self) -> &'static str {
        match self {
            NinePoint::UpperLeft => "UL",
            NinePoint::UpperCenter => "UC",
            NinePoint::UpperRight => "UR",
            NinePoint::Left => "L",
            NinePoint::Center => "C",
            NinePoint::Right => "R",
            NinePoint::LowerLeft => "LL",
            NinePoint::LowerCenter => "LC",
            NinePoint::LowerRight => "LR",
        }
    }

    /// Look up a point by key, ignoring case
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|point| point.key().eq_ignore_ascii_case(key))
    }

    /// Unit direction as (pan, tilt), positive is right/up
    pub fn vector(self) -> (i8, i8) {
        match self {
            NinePoint::UpperLeft => (-1, 1),
            NinePoint::UpperCenter => (0, 1),
            NinePoint::UpperRight => (1, 1),
            NinePoint::Left => (-1, 0),
            NinePoint::Center => (0, 0),
            NinePoint::Right => (1, 0),
            NinePoint::LowerLeft => (-1, -1),
            NinePoint::LowerCenter => (0, -1),
            NinePoint::LowerRight => (1, -1),
        }
    }

    /// Target (pan, tilt) in degrees for a given distance
    pub fn scaled(self, distance_degrees: f32) -> (f32, f32) {
        let (pan, tilt) = self.vector();
        (pan as f32 * distance_degrees, tilt as f32 * distance_degrees)
    }
}

impl core::fmt::Display for NinePoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

/// One angle argument of a saccade command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AngleArg {
    /// Keep the axis at its current angle
    Hold,
    /// Move the axis to this logical angle
    Degrees(f32),
}

impl AngleArg {
    /// Parse a single token: a hold sentinel or a finite signed float
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let token = token.trim();
        if HOLD_TOKENS.iter().any(|s| s.eq_ignore_ascii_case(token)) {
            return Ok(AngleArg::Hold);
        }
        match token.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(AngleArg::Degrees(value)),
            _ => Err(ParseError::InvalidNumber),
        }
    }

    /// Resolve against the axis' current angle
    pub fn resolve(self, current: f32) -> f32 {
        match self {
            AngleArg::Hold => current,
            AngleArg::Degrees(value) => value,
        }
    }
}

/// A parsed protocol command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Move the selected eyes to a nine-point direction
    NinePoint(NinePoint),
    /// Explicit angles: left pan, left tilt, right pan, right tilt
    Saccade([AngleArg; 4]),
}

/// Reasons a line was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Nothing but whitespace
    Empty,
    /// `SAC` with other than four angle tokens
    WrongArity { found: usize },
    /// An angle token was neither a number nor a hold sentinel
    InvalidNumber,
    /// First token not recognised; carries the offending line
    UnknownCommand(Line),
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty line"),
            ParseError::WrongArity { found } => {
                write!(f, "SAC needs 4 angles (got {})", found)
            }
            ParseError::InvalidNumber => f.write_str("SAC invalid angle"),
            ParseError::UnknownCommand(line) => write!(f, "Unknown command: {}", line),
        }
    }
}

impl Command {
    /// Parse one line of input
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().ok_or(ParseError::Empty)?;

        let mut args: [&str; 4] = [""; 4];
        let mut count = 0usize;
        for token in tokens {
            if count < args.len() {
                args[count] = token;
            }
            count += 1;
        }

        if count == 0 {
            if let Some(point) = NinePoint::from_key(keyword) {
                return Ok(Command::NinePoint(point));
            }
        }

        if keyword.eq_ignore_ascii_case("SAC") || keyword.eq_ignore_ascii_case("SACCADE") {
            if count != 4 {
                return Err(ParseError::WrongArity { found: count });
            }
            let mut angles = [AngleArg::Hold; 4];
            for (angle, token) in angles.iter_mut().zip(args.iter()) {
                *angle = AngleArg::parse(token)?;
            }
            return Ok(Command::Saccade(angles));
        }

        Err(ParseError::UnknownCommand(echo(line)))
    }
}

/// Copy up to [`MAX_LINE_LEN`] bytes, cutting on a char boundary
fn echo(text: &str) -> Line {
    let mut end = text.len().min(MAX_LINE_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut out: String<MAX_LINE_LEN> = String::new();
    let _ = out.push_str(&text[..end]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_center() {
        let cmd = Command::parse("C").unwrap();
        assert_eq!(cmd, Command::NinePoint(NinePoint::Center));
        assert_eq!(NinePoint::Center.scaled(40.0), (0.0, 0.0));
    }

    #[test]
    fn test_parse_nine_point_case_insensitive() {
        assert_eq!(
            Command::parse("ur").unwrap(),
            Command::NinePoint(NinePoint::UpperRight)
        );
        assert_eq!(
            Command::parse("  Lc ").unwrap(),
            Command::NinePoint(NinePoint::LowerCenter)
        );
    }

    #[test]
    fn test_nine_point_keys_roundtrip() {
        for point in NinePoint::ALL {
            assert_eq!(NinePoint::from_key(point.key()), Some(point));
        }
        assert_eq!(NinePoint::from_key("UX"), None);
    }

    #[test]
    fn test_nine_point_vectors() {
        assert_eq!(NinePoint::UpperRight.scaled(10.0), (10.0, 10.0));
        assert_eq!(NinePoint::LowerLeft.scaled(5.0), (-5.0, -5.0));
        assert_eq!(NinePoint::Left.vector(), (-1, 0));
        assert_eq!(NinePoint::UpperCenter.vector(), (0, 1));
    }

    #[test]
    fn test_parse_saccade_with_holds() {
        let cmd = Command::parse("SAC 10 X 5 NC").unwrap();
        assert_eq!(
            cmd,
            Command::Saccade([
                AngleArg::Degrees(10.0),
                AngleArg::Hold,
                AngleArg::Degrees(5.0),
                AngleArg::Hold,
            ])
        );
    }

    #[test]
    fn test_parse_saccade_alias_and_sentinels() {
        let cmd = Command::parse("saccade -2.5 hold skip keep").unwrap();
        assert_eq!(
            cmd,
            Command::Saccade([
                AngleArg::Degrees(-2.5),
                AngleArg::Hold,
                AngleArg::Hold,
                AngleArg::Hold,
            ])
        );
        let cmd = Command::parse("SAC h 1 +2 x").unwrap();
        assert_eq!(
            cmd,
            Command::Saccade([
                AngleArg::Hold,
                AngleArg::Degrees(1.0),
                AngleArg::Degrees(2.0),
                AngleArg::Hold,
            ])
        );
    }

    #[test]
    fn test_parse_saccade_wrong_arity() {
        assert_eq!(
            Command::parse("SAC 1 2 3"),
            Err(ParseError::WrongArity { found: 3 })
        );
        assert_eq!(
            Command::parse("SAC 1 2 3 4 5"),
            Err(ParseError::WrongArity { found: 5 })
        );
        assert_eq!(Command::parse("SAC"), Err(ParseError::WrongArity { found: 0 }));
    }

    #[test]
    fn test_parse_saccade_invalid_number() {
        assert_eq!(
            Command::parse("SAC 1 two 3 4"),
            Err(ParseError::InvalidNumber)
        );
        assert_eq!(Command::parse("SAC nan 0 0 0"), Err(ParseError::InvalidNumber));
        assert_eq!(Command::parse("SAC inf 0 0 0"), Err(ParseError::InvalidNumber));
    }

    #[test]
    fn test_parse_unknown_echoes_line() {
        match Command::parse("JUMP 3") {
            Err(ParseError::UnknownCommand(echo)) => assert_eq!(echo.as_str(), "JUMP 3"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_nine_point_with_args_is_unknown() {
        assert!(matches!(
            Command::parse("C 10"),
            Err(ParseError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Command::parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_echo_truncates_on_char_boundary() {
        let mut long = [0u8; 70];
        long.fill(b'a');
        // Place a two-byte char straddling the cap
        long[63] = 0xC3;
        long[64] = 0xA9;
        let text = core::str::from_utf8(&long).unwrap();
        let out = echo(text);
        assert_eq!(out.len(), 63);
    }

    #[test]
    fn test_hold_resolves_to_current() {
        assert_eq!(AngleArg::Hold.resolve(7.5), 7.5);
        assert_eq!(AngleArg::Degrees(-3.0).resolve(7.5), -3.0);
    }

    proptest! {
        #[test]
        fn prop_finite_angles_parse(a in -1000.0f32..1000.0, b in -1000.0f32..1000.0) {
            let mut line: String<64> = String::new();
            use core::fmt::Write;
            write!(line, "SAC {} {} X X", a, b).unwrap();
            let cmd = Command::parse(&line).unwrap();
            prop_assert_eq!(
                cmd,
                Command::Saccade([
                    AngleArg::Degrees(a),
                    AngleArg::Degrees(b),
                    AngleArg::Hold,
                    AngleArg::Hold,
                ])
            );
        }
    }
}
