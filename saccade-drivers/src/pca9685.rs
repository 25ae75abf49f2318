//! PCA9685 16-channel PWM driver (I2C)
//!
//! The PCA9685 generates 12-bit PWM on 16 outputs from an internal 25 MHz
//! oscillator. Hobby servos are driven with a 50 Hz frame and a pulse width
//! of roughly 500-2500 µs.
//!
//! # Register Protocol
//!
//! Each channel owns four registers starting at `LED0_ON_L + 4 * channel`:
//! - ON_L / ON_H: counter value at which the output goes high
//! - OFF_L / OFF_H: counter value at which the output goes low
//!
//! Bit 4 of ON_H forces the output fully on, bit 4 of OFF_H fully off.
//! With auto-increment enabled all four are written in one transaction.
//!
//! The board cannot report position, so the position methods of
//! [`Actuator`] return [`ActuatorError::Unsupported`].

use embedded_hal::i2c::I2c;
use saccade_core::traits::{Actuator, ActuatorError};

/// PCA9685 register addresses
pub mod reg {
    /// Mode register 1
    pub const MODE1: u8 = 0x00;
    /// Mode register 2
    pub const MODE2: u8 = 0x01;
    /// First channel ON_L register
    pub const LED0_ON_L: u8 = 0x06;
    /// PWM frequency prescaler
    pub const PRESCALE: u8 = 0xFE;
}

/// MODE1 bits
pub mod mode1 {
    pub const RESTART: u8 = 0x80;
    /// Register auto-increment
    pub const AI: u8 = 0x20;
    /// Low-power mode; the prescaler is only writable while asleep
    pub const SLEEP: u8 = 0x10;
    pub const ALLCALL: u8 = 0x01;
}

/// Number of PWM outputs
pub const CHANNELS: u8 = 16;

/// Factory default I2C address
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Full-on / full-off flag in ON_H / OFF_H
const FULL: u8 = 0x10;

/// 12-bit counter resolution
const STEPS: u32 = 4096;

const OSCILLATOR_HZ: f32 = 25_000_000.0;

/// PCA9685 configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pca9685Config {
    /// 7-bit I2C address (0x40-0x7F, set by A0-A5)
    pub address: u8,
    /// Output frame rate in Hz (24-1526)
    pub frequency_hz: f32,
}

impl Default for Pca9685Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            frequency_hz: 50.0,
        }
    }
}

/// Prescaler value for an output frequency
///
/// `prescale = round(25 MHz / (4096 * f)) - 1`, limited to the
/// hardware range 3..=255.
pub fn prescale(frequency_hz: f32) -> u8 {
    let value = libm::roundf(OSCILLATOR_HZ / (STEPS as f32 * frequency_hz)) - 1.0;
    value.clamp(3.0, 255.0) as u8
}

/// ON_L, ON_H, OFF_L, OFF_H for a 16-bit duty cycle
///
/// Zero and full scale use the full-off and full-on flags; everything
/// else is scaled to the 12-bit counter with the ON edge at 0.
pub fn duty_registers(duty: u16) -> [u8; 4] {
    match duty {
        0 => [0, 0, 0, FULL],
        u16::MAX => [0, FULL, 0, 0],
        d => {
            let off = ((d as u32 + 1) >> 4).min(STEPS - 1);
            [0, 0, (off & 0xFF) as u8, (off >> 8) as u8]
        }
    }
}

/// PCA9685 driver
///
/// Writing a duty cycle engages the channel. Disengaging forces the
/// output fully off; engaging again restores the last duty written.
pub struct Pca9685<I2C> {
    i2c: I2C,
    config: Pca9685Config,
    connected: bool,
    duty: [u16; CHANNELS as usize],
    /// One bit per channel
    engaged: u16,
}

impl<I2C: I2c> Pca9685<I2C> {
    /// Create a driver; no bus traffic until [`Actuator::connect`]
    pub fn new(i2c: I2C, config: Pca9685Config) -> Self {
        Self {
            i2c,
            config,
            connected: false,
            duty: [0; CHANNELS as usize],
            engaged: 0,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Pca9685Config {
        &self.config
    }

    /// Last duty cycle written to a channel
    pub fn duty(&self, channel: u8) -> Option<u16> {
        self.duty.get(channel as usize).copied()
    }

    /// Check if a channel output is active
    pub fn is_engaged(&self, channel: u8) -> bool {
        channel < CHANNELS && self.engaged & (1 << channel) != 0
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ActuatorError> {
        match self.i2c.write(self.config.address, bytes) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Treat any bus fault as a lost device; the next connect retries
                self.connected = false;
                #[cfg(feature = "defmt")]
                defmt::warn!("PCA9685 at {=u8:#x}: bus error", self.config.address);
                Err(ActuatorError::Bus)
            }
        }
    }

    fn write_channel(&mut self, channel: u8, regs: [u8; 4]) -> Result<(), ActuatorError> {
        let base = reg::LED0_ON_L + 4 * channel;
        self.write(&[base, regs[0], regs[1], regs[2], regs[3]])
    }

    fn check(&self, channel: u8) -> Result<(), ActuatorError> {
        if channel >= CHANNELS {
            return Err(ActuatorError::InvalidChannel);
        }
        if !self.connected {
            return Err(ActuatorError::NotConnected);
        }
        Ok(())
    }
}

impl<I2C: I2c> Actuator for Pca9685<I2C> {
    fn connect(&mut self) -> Result<(), ActuatorError> {
        if self.connected {
            return Ok(());
        }
        let prescale = prescale(self.config.frequency_hz);
        self.write(&[reg::MODE1, mode1::SLEEP | mode1::ALLCALL])?;
        self.write(&[reg::PRESCALE, prescale])?;
        self.write(&[reg::MODE1, mode1::AI | mode1::ALLCALL])?;
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn set_position(&mut self, _channel: u8, _value: f32) -> Result<(), ActuatorError> {
        Err(ActuatorError::Unsupported)
    }

    fn position(&mut self, _channel: u8) -> Result<f32, ActuatorError> {
        Err(ActuatorError::Unsupported)
    }

    fn position_limits(&mut self, _channel: u8) -> Result<(f32, f32), ActuatorError> {
        Err(ActuatorError::Unsupported)
    }

    fn set_engaged(&mut self, channel: u8, engaged: bool) -> Result<(), ActuatorError> {
        self.check(channel)?;
        let regs = if engaged {
            duty_registers(self.duty[channel as usize])
        } else {
            duty_registers(0)
        };
        self.write_channel(channel, regs)?;
        if engaged {
            self.engaged |= 1 << channel;
        } else {
            self.engaged &= !(1 << channel);
        }
        Ok(())
    }

    fn configure(
        &mut self,
        channel: u8,
        _acceleration: f32,
        _max_velocity: f32,
    ) -> Result<(), ActuatorError> {
        // Servos on a PWM board have no ramp control
        self.check(channel)
    }

    fn set_duty_cycle(&mut self, channel: u8, duty: u16) -> Result<(), ActuatorError> {
        self.check(channel)?;
        self.write_channel(channel, duty_registers(duty))?;
        self.duty[channel as usize] = duty;
        self.engaged |= 1 << channel;
        Ok(())
    }
}
