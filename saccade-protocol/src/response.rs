//! Response lines written back on the serial channel

use crate::command::{NinePoint, ParseError};
use crate::line::{Line, LineError};

/// One `CMD OK ...` / `CMD ERR ...` response
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// At least one eye reached the nine-point target
    NinePointOk(NinePoint),
    /// No eye reached the nine-point target
    NinePointFailed(NinePoint),
    /// Saccade applied; left pan, left tilt, right pan, right tilt
    SaccadeOk([f32; 4]),
    /// Saccade did not have exactly four angles
    SaccadeArity,
    /// A saccade angle failed to parse
    SaccadeInvalidAngle,
    /// One or more axes failed to move
    SaccadeFailed,
    /// Unrecognised command, echoing the line
    Unknown(Line),
    /// Line exceeded the buffer and was discarded
    LineTooLong,
    /// Line was not valid UTF-8 and was discarded
    InvalidText,
}

impl Response {
    /// Map a parse failure to its response; blank lines get none
    pub fn from_parse_error(error: &ParseError) -> Option<Self> {
        match error {
            ParseError::Empty => None,
            ParseError::WrongArity { .. } => Some(Response::SaccadeArity),
            ParseError::InvalidNumber => Some(Response::SaccadeInvalidAngle),
            ParseError::UnknownCommand(line) => Some(Response::Unknown(line.clone())),
        }
    }

    /// Returns true for `CMD OK` lines
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::NinePointOk(_) | Response::SaccadeOk(_))
    }
}

impl From<LineError> for Response {
    fn from(error: LineError) -> Self {
        match error {
            LineError::TooLong => Response::LineTooLong,
            LineError::InvalidText => Response::InvalidText,
        }
    }
}

impl core::fmt::Display for Response {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Response::NinePointOk(point) => write!(f, "CMD OK 9PT {}", point),
            Response::NinePointFailed(point) => write!(f, "CMD ERR 9PT {}", point),
            Response::SaccadeOk([lp, lt, rp, rt]) => {
                write!(f, "CMD OK SAC {:.1} {:.1} {:.1} {:.1}", lp, lt, rp, rt)
            }
            Response::SaccadeArity => f.write_str("CMD ERR SAC needs 4 angles"),
            Response::SaccadeInvalidAngle => f.write_str("CMD ERR SAC invalid angle"),
            Response::SaccadeFailed => f.write_str("CMD ERR SAC move failed"),
            Response::Unknown(line) => write!(f, "CMD ERR Unknown command: {}", line),
            Response::LineTooLong => f.write_str("CMD ERR Line too long"),
            Response::InvalidText => f.write_str("CMD ERR Invalid text"),
        }
    }
}
