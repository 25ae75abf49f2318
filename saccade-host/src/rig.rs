//! Actuator backends for the host
//!
//! The command loop and the profiler's sampling thread talk to the same
//! device, so the actuator sits behind a mutex and every trait call is
//! one locked transaction.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use embedded_hal::i2c::{ErrorType, I2c, Operation};
use log::{debug, warn};
use saccade_core::config::RigConfig;
use saccade_core::eye::EyeMotionController;
use saccade_core::traits::{Actuator, ActuatorError, Clock};
use saccade_drivers::{Pca9685, Pca9685Config, SimulatedServoController};

use crate::config::Backend;

/// Motion controller used throughout the host
pub type HostController = EyeMotionController<SharedActuator>;

/// Milliseconds since construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u32 {
        // Wraps after ~49 days, which the clock contract allows
        self.start.elapsed().as_millis() as u32
    }
}

/// I2C bus that logs writes instead of driving hardware
///
/// Reads return zeros.
#[derive(Debug, Default)]
pub struct TraceBus;

impl ErrorType for TraceBus {
    type Error = Infallible;
}

impl I2c for TraceBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Write(bytes) => debug!("i2c {address:#04x} <- {bytes:02x?}"),
                Operation::Read(buf) => {
                    buf.fill(0);
                    debug!("i2c {address:#04x} -> {} bytes", buf.len());
                }
            }
        }
        Ok(())
    }
}

type DynActuator = Box<dyn Actuator + Send>;

/// Cloneable handle to one actuator
#[derive(Clone)]
pub struct SharedActuator {
    inner: Arc<Mutex<DynActuator>>,
}

impl SharedActuator {
    pub fn new<A: Actuator + Send + 'static>(actuator: A) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(actuator))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, DynActuator>, ActuatorError> {
        // A panic mid-transaction leaves the device state unknown
        self.inner.lock().map_err(|_| ActuatorError::NotConnected)
    }
}

impl Actuator for SharedActuator {
    fn connect(&mut self) -> Result<(), ActuatorError> {
        self.lock()?.connect()
    }

    fn is_connected(&self) -> bool {
        self.lock().map(|a| a.is_connected()).unwrap_or(false)
    }

    fn set_position(&mut self, channel: u8, value: f32) -> Result<(), ActuatorError> {
        self.lock()?.set_position(channel, value)
    }

    fn position(&mut self, channel: u8) -> Result<f32, ActuatorError> {
        self.lock()?.position(channel)
    }

    fn velocity(&mut self, channel: u8) -> Result<Option<f32>, ActuatorError> {
        self.lock()?.velocity(channel)
    }

    fn position_limits(&mut self, channel: u8) -> Result<(f32, f32), ActuatorError> {
        self.lock()?.position_limits(channel)
    }

    fn set_engaged(&mut self, channel: u8, engaged: bool) -> Result<(), ActuatorError> {
        self.lock()?.set_engaged(channel, engaged)
    }

    fn configure(
        &mut self,
        channel: u8,
        acceleration: f32,
        max_velocity: f32,
    ) -> Result<(), ActuatorError> {
        self.lock()?.configure(channel, acceleration, max_velocity)
    }

    fn set_duty_cycle(&mut self, channel: u8, duty: u16) -> Result<(), ActuatorError> {
        self.lock()?.set_duty_cycle(channel, duty)
    }
}

/// Open the selected backend
///
/// `detached` simulates a controller that is not plugged in.
pub fn open_backend(backend: Backend, rig: &RigConfig, detached: bool) -> SharedActuator {
    match backend {
        Backend::Sim if detached => {
            SharedActuator::new(SimulatedServoController::detached(MonotonicClock::new()))
        }
        Backend::Sim => SharedActuator::new(SimulatedServoController::new(MonotonicClock::new())),
        Backend::Pca9685Trace => {
            if detached {
                warn!("--detached has no effect on the trace backend");
            }
            let config = Pca9685Config {
                frequency_hz: rig.pwm_frequency_hz,
                ..Pca9685Config::default()
            };
            SharedActuator::new(Pca9685::new(TraceBus, config))
        }
    }
}

/// Build the motion controller for a rig
pub fn build_controller(rig: RigConfig, backend: Backend, detached: bool) -> HostController {
    let actuator = open_backend(backend, &rig, detached);
    EyeMotionController::new(actuator, rig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saccade_core::config::{AxisId, EyeId};
    use saccade_core::eye::{AxisFailure, LinkStatus};

    #[test]
    fn test_clones_share_device() {
        let mut a = SharedActuator::new(SimulatedServoController::new(MonotonicClock::new()));
        let mut b = a.clone();
        assert!(!b.is_connected());
        a.connect().unwrap();
        assert!(b.is_connected());
        assert_eq!(b.position_limits(0), Ok((0.0, 180.0)));
    }

    #[test]
    fn test_detached_sim_reports_not_found() {
        let rig = RigConfig::absolute_single_eye(90.0, 90.0);
        let mut controller = build_controller(rig, Backend::Sim, true);
        assert_eq!(
            controller.ensure_connected(),
            Err(ActuatorError::NotConnected)
        );
        assert_eq!(controller.link_status(), LinkStatus::NotFound);
    }

    #[test]
    fn test_trace_backend_drives_pwm_rig() {
        let mut controller = build_controller(RigConfig::pwm_dual_eye(), Backend::Pca9685Trace, false);
        let result = controller.move_eye(EyeId::Left, 10.0, -5.0);
        assert!(result.is_complete());
        assert_eq!(controller.eye_state(EyeId::Left).get(AxisId::Pan), 10.0);
        // Position readback is not available on a PWM board
        assert_eq!(
            controller.read_axis(EyeId::Left, AxisId::Pan).map(|_| ()),
            Err(AxisFailure::Device(ActuatorError::Unsupported))
        );
    }
}
