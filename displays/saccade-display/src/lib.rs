//! Display abstraction and menu layout for the saccade rig
//!
//! This crate provides:
//! - `DisplayBackend` trait for different display types (OLED, terminal)
//! - `Screen`, a character buffer with per-row highlight and colour
//! - `layout`, which turns a menu `RenderModel` into screen rows
//!
//! # Architecture
//!
//! The menu state machine in saccade-core emits a render model and knows
//! nothing about pixels. This crate places the model on a fixed text grid;
//! a backend then draws the grid on whatever hardware is attached.

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod layout;
pub mod screen;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError};
pub use layout::layout;
pub use screen::{Screen, SCREEN_COLS, SCREEN_ROWS};
