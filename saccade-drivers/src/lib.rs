//! Servo controller drivers
//!
//! This crate provides concrete implementations of the
//! [`saccade_core::traits::Actuator`] trait:
//!
//! - PCA9685 16-channel PWM board over I2C
//! - Simulated absolute-position controller with trapezoidal ramps

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod pca9685;
pub mod sim;

pub use pca9685::{Pca9685, Pca9685Config};
pub use sim::{SimChannelConfig, SimulatedServoController, SIM_CHANNELS};
