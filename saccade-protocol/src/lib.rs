//! Saccade rig command protocol
//!
//! This crate defines the text protocol spoken over the rig's serial
//! console and the button events delivered by the front panel.
//!
//! # Protocol Overview
//!
//! One ASCII command per line, terminated by `\n` or `\r`, at most
//! [`MAX_LINE_LEN`] characters:
//!
//! ```text
//! UR                    nine-point move (UL UC UR L C R LL LC LR)
//! SAC 10 X -5 NC        left pan, left tilt, right pan, right tilt
//! ```
//!
//! Every accepted line is answered with `CMD OK <echo>` or
//! `CMD ERR <reason>`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod events;
pub mod line;
pub mod response;

pub use command::{AngleArg, Command, NinePoint, ParseError, HOLD_TOKENS};
pub use events::{ButtonEdge, ButtonEvent, ButtonKey};
pub use line::{Line, LineBuffer, LineError, MAX_LINE_LEN};
pub use response::Response;
