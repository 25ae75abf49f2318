//! Host-side bench tool for the saccade rig
//!
//! Drives the rig from a workstation through the same core logic the
//! panel firmware uses:
//! - `config`: TOML rig selection and command-line overrides
//! - `rig`: actuator backends shared between the command loop and the sampler
//! - `profiler`: threaded sampling of a move and its analysis
//! - `export`: profile CSV files
//! - `interactive`: line-oriented shell
//! - `serve`: the serial line protocol over stdin/stdout
//! - `panel`: button panel emulator rendering to the terminal

pub mod config;
pub mod export;
pub mod interactive;
pub mod panel;
pub mod profiler;
pub mod rig;
pub mod serve;
