//! Servo actuator trait
//!
//! An actuator exposes numbered channels. Absolute-position controllers
//! implement the position methods; PWM boards implement
//! [`Actuator::set_duty_cycle`] and leave the rest unsupported.

/// Errors reported by actuator drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// Device not attached or connection lost
    NotConnected,
    /// Bus transaction failed
    Bus,
    /// Device refused the command
    Rejected,
    /// Operation not available on this device
    Unsupported,
    /// Channel number out of range
    InvalidChannel,
}

impl core::fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ActuatorError::NotConnected => f.write_str("actuator not connected"),
            ActuatorError::Bus => f.write_str("bus error"),
            ActuatorError::Rejected => f.write_str("command rejected by actuator"),
            ActuatorError::Unsupported => f.write_str("operation not supported"),
            ActuatorError::InvalidChannel => f.write_str("invalid channel"),
        }
    }
}

/// Multi-channel servo controller
///
/// All calls may block for one bus transaction.
pub trait Actuator {
    /// Open the device; succeeds immediately if already connected
    fn connect(&mut self) -> Result<(), ActuatorError>;

    /// Check if the device is attached
    fn is_connected(&self) -> bool;

    /// Command an absolute position in native units
    fn set_position(&mut self, channel: u8, value: f32) -> Result<(), ActuatorError>;

    /// Read the current position in native units
    fn position(&mut self, channel: u8) -> Result<f32, ActuatorError>;

    /// Read the current velocity in native units per second
    ///
    /// Devices without velocity feedback return `Ok(None)`.
    fn velocity(&mut self, _channel: u8) -> Result<Option<f32>, ActuatorError> {
        Ok(None)
    }

    /// Absolute (min, max) position in native units
    fn position_limits(&mut self, channel: u8) -> Result<(f32, f32), ActuatorError>;

    /// Power the channel on or off
    fn set_engaged(&mut self, channel: u8, engaged: bool) -> Result<(), ActuatorError>;

    /// Set the ramp parameters used by the device's own motion control
    fn configure(
        &mut self,
        channel: u8,
        acceleration: f32,
        max_velocity: f32,
    ) -> Result<(), ActuatorError>;

    /// Set a raw 16-bit PWM duty cycle
    fn set_duty_cycle(&mut self, _channel: u8, _duty: u16) -> Result<(), ActuatorError> {
        Err(ActuatorError::Unsupported)
    }
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn connect(&mut self) -> Result<(), ActuatorError> {
        (**self).connect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn set_position(&mut self, channel: u8, value: f32) -> Result<(), ActuatorError> {
        (**self).set_position(channel, value)
    }

    fn position(&mut self, channel: u8) -> Result<f32, ActuatorError> {
        (**self).position(channel)
    }

    fn velocity(&mut self, channel: u8) -> Result<Option<f32>, ActuatorError> {
        (**self).velocity(channel)
    }

    fn position_limits(&mut self, channel: u8) -> Result<(f32, f32), ActuatorError> {
        (**self).position_limits(channel)
    }

    fn set_engaged(&mut self, channel: u8, engaged: bool) -> Result<(), ActuatorError> {
        (**self).set_engaged(channel, engaged)
    }

    fn configure(
        &mut self,
        channel: u8,
        acceleration: f32,
        max_velocity: f32,
    ) -> Result<(), ActuatorError> {
        (**self).configure(channel, acceleration, max_velocity)
    }

    fn set_duty_cycle(&mut self, channel: u8, duty: u16) -> Result<(), ActuatorError> {
        (**self).set_duty_cycle(channel, duty)
    }
}
