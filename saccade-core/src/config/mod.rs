//! Configuration types
//!
//! Rig configuration is immutable once loaded. Two presets cover the
//! known deployments; hosts may deserialize a custom rig with the
//! `serde` feature.

pub mod axis;
pub mod rig;

pub use axis::*;
pub use rig::*;
