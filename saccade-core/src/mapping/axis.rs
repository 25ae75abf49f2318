//! Logical degrees to physical units

use crate::config::AxisConfig;
use crate::traits::{Actuator, ActuatorError};

/// Full-scale 16-bit duty cycle
pub const MAX_DUTY: u16 = 0xFFFF;

/// Value to send to an actuator channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorCommand {
    /// 16-bit PWM duty cycle
    Duty(u16),
    /// Absolute position in native units
    Position(f32),
}

/// Convert a clamped logical angle to physical units
///
/// `physical = zero + sign * degrees * scale`
#[inline]
pub fn map(axis: &AxisConfig, degrees: f32) -> f32 {
    axis.kind.zero() + axis.direction.sign() * degrees * axis.kind.scale()
}

/// Convert physical units back to logical degrees
#[inline]
pub fn unmap(axis: &AxisConfig, physical: f32) -> f32 {
    (physical - axis.kind.zero()) * axis.direction.sign() / axis.kind.scale()
}

/// Convert a physical rate (units/s) to logical degrees per second
#[inline]
pub fn unmap_rate(axis: &AxisConfig, rate: f32) -> f32 {
    rate * axis.direction.sign() / axis.kind.scale()
}

/// Convert a pulse width to a 16-bit duty cycle
///
/// The result is always clamped into `0..=0xFFFF`.
pub fn pulse_to_duty(pulse_us: f32, frequency_hz: f32) -> u16 {
    let period_us = 1_000_000.0 / frequency_hz;
    let duty = (pulse_us / period_us * MAX_DUTY as f32).clamp(0.0, MAX_DUTY as f32);
    libm::roundf(duty) as u16
}

/// Build the actuator command for a clamped logical angle
pub fn command(axis: &AxisConfig, degrees: f32, frequency_hz: f32) -> ActuatorCommand {
    let physical = map(axis, degrees);
    if axis.kind.is_pulse() {
        ActuatorCommand::Duty(pulse_to_duty(physical, frequency_hz))
    } else {
        ActuatorCommand::Position(physical)
    }
}

/// One axis read back from the actuator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisReading {
    /// Native position
    pub absolute: f32,
    /// Logical degrees
    pub relative: f32,
    /// Native velocity, if the device reports it
    pub velocity: Option<f32>,
}

/// Read position and velocity of one axis
pub fn read_axis<A: Actuator + ?Sized>(
    actuator: &mut A,
    axis: &AxisConfig,
) -> Result<AxisReading, ActuatorError> {
    let absolute = actuator.position(axis.channel)?;
    let velocity = actuator.velocity(axis.channel)?;
    Ok(AxisReading {
        absolute,
        relative: unmap(axis, absolute),
        velocity,
    })
}
