//! Simulated absolute-position servo controller
//!
//! Models a smart servo controller that moves each channel along a
//! trapezoidal velocity profile and reports position and velocity. Used
//! by the host tool when no hardware is attached and by tests.
//!
//! Positions are in native units (degrees of horn rotation by default).
//! Motion is evaluated lazily from the clock on every read, so there is
//! no update loop to drive.
//!
//! A new target restarts the ramp from the current position at rest.
//! PWM duty writes are recorded but do not move the simulated horn.

use saccade_core::config::{DEFAULT_ACCELERATION, DEFAULT_MAX_VELOCITY};
use saccade_core::traits::{Actuator, ActuatorError, Clock};

/// Number of simulated channels
pub const SIM_CHANNELS: usize = 8;

/// Per-channel limits and ramp parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimChannelConfig {
    /// Lowest reachable position
    pub min: f32,
    /// Highest reachable position
    pub max: f32,
    /// Units/s²
    pub acceleration: f32,
    /// Units/s
    pub max_velocity: f32,
}

impl Default for SimChannelConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 180.0,
            acceleration: DEFAULT_ACCELERATION,
            max_velocity: DEFAULT_MAX_VELOCITY,
        }
    }
}

impl SimChannelConfig {
    /// Resting position after power-up
    pub fn center(&self) -> f32 {
        0.5 * (self.min + self.max)
    }
}

/// Point-to-point move from rest to rest
#[derive(Debug, Clone, Copy, PartialEq)]
struct Ramp {
    start_ms: u32,
    from: f32,
    to: f32,
    acceleration: f32,
    /// Reached velocity (max velocity unless the profile is triangular)
    peak: f32,
    /// Duration of each of the accel and decel phases
    accel_s: f32,
    cruise_s: f32,
}

impl Ramp {
    fn new(start_ms: u32, from: f32, to: f32, acceleration: f32, max_velocity: f32) -> Self {
        let distance = libm::fabsf(to - from);
        let accel_s = max_velocity / acceleration;
        let accel_distance = 0.5 * acceleration * accel_s * accel_s;

        let (peak, accel_s, cruise_s) = if 2.0 * accel_distance >= distance {
            // Triangular: never reaches max velocity
            let t = libm::sqrtf(distance / acceleration);
            (acceleration * t, t, 0.0)
        } else {
            let cruise = (distance - 2.0 * accel_distance) / max_velocity;
            (max_velocity, accel_s, cruise)
        };

        Self {
            start_ms,
            from,
            to,
            acceleration,
            peak,
            accel_s,
            cruise_s,
        }
    }

    fn duration_s(&self) -> f32 {
        2.0 * self.accel_s + self.cruise_s
    }

    /// Position and velocity `t` seconds after the start
    fn sample(&self, t: f32) -> (f32, f32) {
        let distance = libm::fabsf(self.to - self.from);
        let dir = if self.to >= self.from { 1.0 } else { -1.0 };
        let a = self.acceleration;
        let total = self.duration_s();

        let (s, v) = if t <= 0.0 {
            (0.0, 0.0)
        } else if t < self.accel_s {
            (0.5 * a * t * t, a * t)
        } else if t < self.accel_s + self.cruise_s {
            let cruised = t - self.accel_s;
            (0.5 * self.peak * self.accel_s + self.peak * cruised, self.peak)
        } else if t < total {
            let left = total - t;
            (distance - 0.5 * a * left * left, a * left)
        } else {
            (distance, 0.0)
        };

        (self.from + dir * s.min(distance), dir * v)
    }
}

#[derive(Debug, Clone, Copy)]
struct Channel {
    config: SimChannelConfig,
    /// Position when no ramp is active
    rest: f32,
    ramp: Option<Ramp>,
    /// Target accepted while disengaged
    pending: Option<f32>,
    engaged: bool,
    duty: Option<u16>,
}

impl Channel {
    fn new(config: SimChannelConfig) -> Self {
        Self {
            config,
            rest: config.center(),
            ramp: None,
            pending: None,
            engaged: false,
            duty: None,
        }
    }

    fn state(&self, now_ms: u32) -> (f32, f32) {
        match &self.ramp {
            Some(ramp) => ramp.sample(elapsed_s(ramp.start_ms, now_ms)),
            None => (self.rest, 0.0),
        }
    }

    /// Fold a finished ramp into the rest position
    fn settle(&mut self, now_ms: u32) {
        if let Some(ramp) = self.ramp {
            if elapsed_s(ramp.start_ms, now_ms) >= ramp.duration_s() {
                self.rest = ramp.to;
                self.ramp = None;
            }
        }
    }

    fn start(&mut self, now_ms: u32, target: f32) {
        let (from, _) = self.state(now_ms);
        let c = &self.config;
        if c.acceleration > 0.0 && c.max_velocity > 0.0 && from != target {
            self.ramp = Some(Ramp::new(now_ms, from, target, c.acceleration, c.max_velocity));
        } else {
            self.rest = target;
            self.ramp = None;
        }
    }
}

fn elapsed_s(start_ms: u32, now_ms: u32) -> f32 {
    now_ms.wrapping_sub(start_ms) as f32 / 1000.0
}

/// Simulated eight-channel controller
pub struct SimulatedServoController<C> {
    clock: C,
    channels: [Channel; SIM_CHANNELS],
    /// Device plugged in
    attached: bool,
    connected: bool,
}

impl<C: Clock> SimulatedServoController<C> {
    /// Create an attached controller with default channel settings
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, SimChannelConfig::default())
    }

    /// Create an attached controller with the same settings on every channel
    pub fn with_config(clock: C, config: SimChannelConfig) -> Self {
        Self {
            clock,
            channels: [Channel::new(config); SIM_CHANNELS],
            attached: true,
            connected: false,
        }
    }

    /// Create a controller that is not plugged in; `connect` fails
    pub fn detached(clock: C) -> Self {
        let mut sim = Self::new(clock);
        sim.attached = false;
        sim
    }

    /// Unplug the device
    pub fn disconnect(&mut self) {
        self.attached = false;
        self.connected = false;
    }

    /// Plug the device back in; call `connect` to use it again
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Override the limits and ramp of one channel
    pub fn set_channel_config(
        &mut self,
        channel: u8,
        config: SimChannelConfig,
    ) -> Result<(), ActuatorError> {
        let ch = self
            .channels
            .get_mut(channel as usize)
            .ok_or(ActuatorError::InvalidChannel)?;
        ch.config = config;
        ch.rest = ch.rest.clamp(config.min, config.max);
        Ok(())
    }

    /// Check if a channel is powered
    pub fn is_engaged(&self, channel: u8) -> bool {
        self.channels
            .get(channel as usize)
            .is_some_and(|ch| ch.engaged)
    }

    /// Check if any channel is still ramping
    pub fn is_moving(&self) -> bool {
        let now = self.clock.now_ms();
        self.channels.iter().any(|ch| {
            ch.ramp
                .is_some_and(|r| elapsed_s(r.start_ms, now) < r.duration_s())
        })
    }

    /// Last duty cycle written to a channel
    pub fn duty(&self, channel: u8) -> Option<u16> {
        self.channels.get(channel as usize).and_then(|ch| ch.duty)
    }

    fn channel(&mut self, channel: u8) -> Result<&mut Channel, ActuatorError> {
        if !self.connected {
            return Err(ActuatorError::NotConnected);
        }
        self.channels
            .get_mut(channel as usize)
            .ok_or(ActuatorError::InvalidChannel)
    }
}

impl<C: Clock> Actuator for SimulatedServoController<C> {
    fn connect(&mut self) -> Result<(), ActuatorError> {
        if !self.attached {
            return Err(ActuatorError::NotConnected);
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn set_position(&mut self, channel: u8, value: f32) -> Result<(), ActuatorError> {
        let now = self.clock.now_ms();
        let ch = self.channel(channel)?;
        if !value.is_finite() || value < ch.config.min || value > ch.config.max {
            return Err(ActuatorError::Rejected);
        }
        if ch.engaged {
            ch.settle(now);
            ch.start(now, value);
        } else {
            ch.pending = Some(value);
        }
        Ok(())
    }

    fn position(&mut self, channel: u8) -> Result<f32, ActuatorError> {
        let now = self.clock.now_ms();
        let ch = self.channel(channel)?;
        ch.settle(now);
        Ok(ch.state(now).0)
    }

    fn velocity(&mut self, channel: u8) -> Result<Option<f32>, ActuatorError> {
        let now = self.clock.now_ms();
        let ch = self.channel(channel)?;
        ch.settle(now);
        Ok(Some(ch.state(now).1))
    }

    fn position_limits(&mut self, channel: u8) -> Result<(f32, f32), ActuatorError> {
        let ch = self.channel(channel)?;
        Ok((ch.config.min, ch.config.max))
    }

    fn set_engaged(&mut self, channel: u8, engaged: bool) -> Result<(), ActuatorError> {
        let now = self.clock.now_ms();
        let ch = self.channel(channel)?;
        if engaged == ch.engaged {
            return Ok(());
        }
        if engaged {
            ch.engaged = true;
            if let Some(target) = ch.pending.take() {
                ch.start(now, target);
            }
        } else {
            // Limp: the horn stays where it was
            let (position, _) = ch.state(now);
            ch.rest = position;
            ch.ramp = None;
            ch.engaged = false;
        }
        Ok(())
    }

    fn configure(
        &mut self,
        channel: u8,
        acceleration: f32,
        max_velocity: f32,
    ) -> Result<(), ActuatorError> {
        let ch = self.channel(channel)?;
        let valid = |x: f32| x.is_finite() && x > 0.0;
        if !valid(acceleration) || !valid(max_velocity) {
            return Err(ActuatorError::Rejected);
        }
        ch.config.acceleration = acceleration;
        ch.config.max_velocity = max_velocity;
        Ok(())
    }

    fn set_duty_cycle(&mut self, channel: u8, duty: u16) -> Result<(), ActuatorError> {
        let ch = self.channel(channel)?;
        ch.duty = Some(duty);
        ch.engaged = true;
        Ok(())
    }
}
