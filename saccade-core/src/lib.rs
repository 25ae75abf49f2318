//! Board-agnostic core logic for the saccade rig
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (actuator, clock)
//! - Rig and axis configuration
//! - Angle to actuator mapping and limit checking
//! - Eye motion controller with per-axis results
//! - Button-driven menu state machine
//! - Motion profile sampling and analysis

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod eye;
pub mod mapping;
pub mod menu;
pub mod profile;
pub mod traits;
