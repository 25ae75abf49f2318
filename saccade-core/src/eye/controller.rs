//! Eye motion controller
//!
//! Owns the actuator and the last accepted angles of both eyes. Every
//! request is resolved per axis: pan and tilt are independent channels, so
//! one failing never prevents the other from moving. The only exception is
//! a range violation, which stops the whole eye before anything is sent.

use heapless::Vec;
use saccade_protocol::{AngleArg, NinePoint};

use super::state::{EyeSelection, EyeState, MotionTarget};
use crate::config::{AxisId, EyeId, RigConfig};
use crate::mapping::{
    self, ActuatorCommand, AxisLimits, AxisReading, LimitChecker, LimitViolation, OutOfRange,
};
use crate::traits::{Actuator, ActuatorError};

/// Cached actuator link state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    Connected,
    #[default]
    NotFound,
}

impl LinkStatus {
    /// Status text shown on the panel
    pub fn label(self) -> &'static str {
        match self {
            LinkStatus::Connected => "Controller connected",
            LinkStatus::NotFound => "Controller not found",
        }
    }

    pub fn is_connected(self) -> bool {
        self == LinkStatus::Connected
    }
}

/// Why one axis did not move
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisFailure {
    /// No channel configured for this axis
    NotConfigured,
    /// Actuator unreachable
    Connection,
    /// Target outside the axis range
    OutOfRange(LimitViolation),
    /// Not attempted because the other axis of the eye was out of range
    Blocked,
    /// Actuator reported an error
    Device(ActuatorError),
}

impl From<ActuatorError> for AxisFailure {
    fn from(error: ActuatorError) -> Self {
        match error {
            ActuatorError::NotConnected => AxisFailure::Connection,
            other => AxisFailure::Device(other),
        }
    }
}

impl core::fmt::Display for AxisFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AxisFailure::NotConfigured => f.write_str("no servo configured"),
            AxisFailure::Connection => f.write_str("controller not connected"),
            AxisFailure::OutOfRange(violation) => write!(f, "{}", violation),
            AxisFailure::Blocked => f.write_str("skipped, other axis out of range"),
            AxisFailure::Device(error) => write!(f, "{}", error),
        }
    }
}

/// Applied logical angle, or why the axis did not move
pub type AxisResult = Result<f32, AxisFailure>;

/// Outcome of moving one eye
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EyeMove {
    pub eye: EyeId,
    pub pan: AxisResult,
    pub tilt: AxisResult,
}

impl EyeMove {
    /// Both axes moved
    pub fn is_complete(&self) -> bool {
        self.pan.is_ok() && self.tilt.is_ok()
    }

    /// At least one axis moved
    pub fn any_moved(&self) -> bool {
        self.pan.is_ok() || self.tilt.is_ok()
    }

    /// Range violations of this eye, if any
    pub fn out_of_range(&self) -> Option<OutOfRange> {
        let mut err = OutOfRange::default();
        for result in [self.pan, self.tilt] {
            if let Err(AxisFailure::OutOfRange(violation)) = result {
                err.push(violation);
            }
        }
        if err.is_empty() {
            None
        } else {
            Some(err)
        }
    }

    /// First failure, pan before tilt
    pub fn failure(&self) -> Option<AxisFailure> {
        self.pan.err().or(self.tilt.err())
    }
}

/// Outcome of a nine-point shortcut
#[derive(Debug, Clone, PartialEq)]
pub struct NinePointMove {
    pub point: NinePoint,
    /// Logical target applied to each eye
    pub pan: f32,
    pub tilt: f32,
    pub moves: Vec<EyeMove, 2>,
}

impl NinePointMove {
    /// At least one eye reached the target
    pub fn succeeded(&self) -> bool {
        self.moves.iter().any(EyeMove::is_complete)
    }
}

/// Outcome of a four-angle saccade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaccadeMove {
    /// Targets after resolving hold arguments
    pub requested: [f32; 4],
    pub left: EyeMove,
    pub right: EyeMove,
}

impl SaccadeMove {
    /// All four axes moved
    pub fn succeeded(&self) -> bool {
        self.left.is_complete() && self.right.is_complete()
    }

    /// Applied angles (left pan, left tilt, right pan, right tilt)
    pub fn applied(&self) -> Option<[f32; 4]> {
        match (self.left.pan, self.left.tilt, self.right.pan, self.right.tilt) {
            (Ok(lp), Ok(lt), Ok(rp), Ok(rt)) => Some([lp, lt, rp, rt]),
            _ => None,
        }
    }
}

/// Moves one or both eyes and tracks their state
pub struct EyeMotionController<A: Actuator> {
    actuator: A,
    config: RigConfig,
    checker: LimitChecker,
    states: [EyeState; 2],
    link: LinkStatus,
}

impl<A: Actuator> EyeMotionController<A> {
    pub fn new(actuator: A, config: RigConfig) -> Self {
        let checker = LimitChecker::new(config.limits);
        Self {
            actuator,
            config,
            checker,
            states: [EyeState::new(EyeId::Left), EyeState::new(EyeId::Right)],
            link: LinkStatus::NotFound,
        }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }

    /// Cached link status from the last connection attempt
    pub fn link_status(&self) -> LinkStatus {
        self.link
    }

    pub fn eye_state(&self, eye: EyeId) -> &EyeState {
        &self.states[eye.index()]
    }

    /// Both eye states, left first
    pub fn states(&self) -> [EyeState; 2] {
        self.states
    }

    /// Connect on first use; a failure is cached until the next attempt
    pub fn ensure_connected(&mut self) -> Result<(), ActuatorError> {
        if self.actuator.is_connected() {
            self.link = LinkStatus::Connected;
            return Ok(());
        }
        match self.actuator.connect() {
            Ok(()) => {
                self.link = LinkStatus::Connected;
                Ok(())
            }
            Err(e) => {
                self.link = LinkStatus::NotFound;
                Err(e)
            }
        }
    }

    /// Resolve limits for one eye without moving anything
    ///
    /// Returns the angles that [`move_eye`](Self::move_eye) would apply.
    pub fn check_target(&mut self, eye: EyeId, pan: f32, tilt: f32) -> EyeMove {
        let connected = self.ensure_connected().is_ok();
        let mut results =
            [(AxisId::Pan, pan), (AxisId::Tilt, tilt)].map(|(axis, degrees)| {
                self.plan_axis(eye, axis, degrees, connected)
            });

        let rejected = results
            .iter()
            .any(|r| matches!(r, Err(AxisFailure::OutOfRange(_))));
        if rejected {
            for result in results.iter_mut().filter(|r| r.is_ok()) {
                *result = Err(AxisFailure::Blocked);
            }
        }

        EyeMove {
            eye,
            pan: results[0],
            tilt: results[1],
        }
    }

    /// Move one eye, each axis independently
    ///
    /// Successful axes record the clamped angle actually sent.
    pub fn move_eye(&mut self, eye: EyeId, pan: f32, tilt: f32) -> EyeMove {
        let plan = self.check_target(eye, pan, tilt);
        EyeMove {
            eye,
            pan: plan.pan.and_then(|d| self.send_axis(eye, AxisId::Pan, d)),
            tilt: plan.tilt.and_then(|d| self.send_axis(eye, AxisId::Tilt, d)),
        }
    }

    /// Move the selected eyes to a nine-point direction
    pub fn apply_nine_point(
        &mut self,
        point: NinePoint,
        distance_degrees: f32,
        eyes: EyeSelection,
    ) -> NinePointMove {
        let (pan, tilt) = point.scaled(distance_degrees);
        let mut moves = Vec::new();
        for &eye in eyes.eyes() {
            let _ = moves.push(self.move_eye(eye, pan, tilt));
        }
        NinePointMove {
            point,
            pan,
            tilt,
            moves,
        }
    }

    /// Four-angle saccade; hold arguments keep the current angle
    pub fn saccade(&mut self, args: [AngleArg; 4]) -> SaccadeMove {
        let [left, right] = self.states;
        let requested = [
            args[0].resolve(left.pan_degrees),
            args[1].resolve(left.tilt_degrees),
            args[2].resolve(right.pan_degrees),
            args[3].resolve(right.tilt_degrees),
        ];
        let left = self.move_eye(EyeId::Left, requested[0], requested[1]);
        let right = self.move_eye(EyeId::Right, requested[2], requested[3]);
        SaccadeMove {
            requested,
            left,
            right,
        }
    }

    /// Configure ramps, engage, then move
    ///
    /// Setup errors abort before any motion; move results are per axis.
    pub fn execute(&mut self, target: &MotionTarget) -> Result<Vec<EyeMove, 2>, ActuatorError> {
        self.ensure_connected()?;
        for &eye in target.eyes.eyes() {
            for axis in AxisId::ALL {
                if let Some(config) = self.config.axis(eye, axis) {
                    self.actuator.configure(
                        config.channel,
                        target.acceleration,
                        target.max_velocity,
                    )?;
                    self.actuator.set_engaged(config.channel, true)?;
                }
            }
        }

        let mut moves = Vec::new();
        for &eye in target.eyes.eyes() {
            let _ = moves.push(self.move_eye(eye, target.pan, target.tilt));
        }
        Ok(moves)
    }

    /// Centre every configured eye
    pub fn zero(&mut self) -> Vec<EyeMove, 2> {
        let eyes = self.config.configured_eyes().unwrap_or_default();
        let mut moves = Vec::new();
        for &eye in eyes.eyes() {
            let _ = moves.push(self.move_eye(eye, 0.0, 0.0));
        }
        moves
    }

    /// Power every configured channel on or off
    pub fn set_engaged(&mut self, engaged: bool) -> Result<(), ActuatorError> {
        self.ensure_connected()?;
        for (_, _, axis) in self.config.axes() {
            self.actuator.set_engaged(axis.channel, engaged)?;
        }
        Ok(())
    }

    /// Logical range of one axis under the limit policy
    pub fn axis_limits(&mut self, eye: EyeId, axis: AxisId) -> Result<AxisLimits, AxisFailure> {
        self.ensure_connected()?;
        let config = self.config.axis(eye, axis).ok_or(AxisFailure::NotConfigured)?;
        Ok(self.checker.limits(&mut self.actuator, config)?)
    }

    /// Read one axis back from the actuator
    pub fn read_axis(&mut self, eye: EyeId, axis: AxisId) -> Result<AxisReading, AxisFailure> {
        self.ensure_connected()?;
        let config = self.config.axis(eye, axis).ok_or(AxisFailure::NotConfigured)?;
        Ok(mapping::read_axis(&mut self.actuator, config)?)
    }

    /// Current logical (pan, tilt) as reported by the actuator
    pub fn read_position(&mut self, eye: EyeId) -> Result<(f32, f32), AxisFailure> {
        let pan = self.read_axis(eye, AxisId::Pan)?;
        let tilt = self.read_axis(eye, AxisId::Tilt)?;
        Ok((pan.relative, tilt.relative))
    }

    fn plan_axis(&mut self, eye: EyeId, axis: AxisId, degrees: f32, connected: bool) -> AxisResult {
        let config = self.config.axis(eye, axis).ok_or(AxisFailure::NotConfigured)?;
        if !connected {
            return Err(AxisFailure::Connection);
        }
        let limits = self.checker.limits(&mut self.actuator, config)?;
        self.checker
            .check(eye, axis, &limits, degrees)
            .map_err(AxisFailure::OutOfRange)
    }

    fn send_axis(&mut self, eye: EyeId, axis: AxisId, degrees: f32) -> AxisResult {
        let config = self.config.axis(eye, axis).ok_or(AxisFailure::NotConfigured)?;
        let channel = config.channel;
        let result = match mapping::command(config, degrees, self.config.pwm_frequency_hz) {
            ActuatorCommand::Duty(duty) => self.actuator.set_duty_cycle(channel, duty),
            ActuatorCommand::Position(position) => self.actuator.set_position(channel, position),
        };

        match result {
            Ok(()) => {
                self.states[eye.index()].set(axis, degrees);
                Ok(degrees)
            }
            Err(e) => {
                if e == ActuatorError::NotConnected {
                    self.link = LinkStatus::NotFound;
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitPolicy;
    use crate::mapping::{pulse_to_duty, Bound};

    #[derive(Default)]
    struct MockActuator {
        connected: bool,
        refuse_connect: bool,
        connect_attempts: usize,
        failing_channel: Option<u8>,
        duties: [Option<u16>; 8],
        positions: [Option<f32>; 8],
        engaged: [bool; 8],
        ramps: [Option<(f32, f32)>; 8],
        limits: (f32, f32),
        writes: usize,
    }

    impl MockActuator {
        fn check(&self, channel: u8) -> Result<usize, ActuatorError> {
            if !self.connected {
                return Err(ActuatorError::NotConnected);
            }
            if self.failing_channel == Some(channel) {
                return Err(ActuatorError::Bus);
            }
            Ok(channel as usize)
        }
    }

    impl Actuator for MockActuator {
        fn connect(&mut self) -> Result<(), ActuatorError> {
            self.connect_attempts += 1;
            if self.refuse_connect {
                return Err(ActuatorError::NotConnected);
            }
            self.connected = true;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn set_position(&mut self, channel: u8, value: f32) -> Result<(), ActuatorError> {
            let ch = self.check(channel)?;
            self.positions[ch] = Some(value);
            self.writes += 1;
            Ok(())
        }

        fn position(&mut self, channel: u8) -> Result<f32, ActuatorError> {
            let ch = self.check(channel)?;
            self.positions[ch].ok_or(ActuatorError::Rejected)
        }

        fn position_limits(&mut self, channel: u8) -> Result<(f32, f32), ActuatorError> {
            self.check(channel)?;
            Ok(self.limits)
        }

        fn set_engaged(&mut self, channel: u8, engaged: bool) -> Result<(), ActuatorError> {
            let ch = self.check(channel)?;
            self.engaged[ch] = engaged;
            Ok(())
        }

        fn configure(
            &mut self,
            channel: u8,
            acceleration: f32,
            max_velocity: f32,
        ) -> Result<(), ActuatorError> {
            let ch = self.check(channel)?;
            self.ramps[ch] = Some((acceleration, max_velocity));
            Ok(())
        }

        fn set_duty_cycle(&mut self, channel: u8, duty: u16) -> Result<(), ActuatorError> {
            let ch = self.check(channel)?;
            self.duties[ch] = Some(duty);
            self.writes += 1;
            Ok(())
        }
    }

    fn make_pwm_controller() -> EyeMotionController<MockActuator> {
        EyeMotionController::new(MockActuator::default(), RigConfig::pwm_dual_eye())
    }

    fn make_absolute_controller() -> EyeMotionController<MockActuator> {
        let actuator = MockActuator {
            limits: (0.0, 180.0),
            ..Default::default()
        };
        EyeMotionController::new(actuator, RigConfig::absolute_single_eye(90.0, 90.0))
    }

    fn duty(pulse_us: f32) -> Option<u16> {
        Some(pulse_to_duty(pulse_us, 50.0))
    }

    #[test]
    fn test_upper_right_moves_both_eyes_same_logical_displacement() {
        let mut controller = make_pwm_controller();
        let result = controller.apply_nine_point(NinePoint::UpperRight, 10.0, EyeSelection::Both);

        assert!(result.succeeded());
        assert_eq!(result.moves.len(), 2);
        for eye in EyeId::ALL {
            let state = controller.eye_state(eye);
            assert_eq!((state.pan_degrees, state.tilt_degrees), (10.0, 10.0));
        }

        // Opposite physical signs per channel
        let duties = controller.actuator().duties;
        assert_eq!(duties[4], duty(1490.0 - 110.0));
        assert_eq!(duties[5], duty(1460.0 + 110.0));
        assert_eq!(duties[6], duty(1560.0 - 110.0));
        assert_eq!(duties[7], duty(1460.0 - 110.0));
    }

    #[test]
    fn test_center_ignores_distance() {
        let mut controller = make_pwm_controller();
        controller.apply_nine_point(NinePoint::UpperLeft, 20.0, EyeSelection::Both);
        let result = controller.apply_nine_point(NinePoint::Center, 40.0, EyeSelection::Both);
        assert_eq!((result.pan, result.tilt), (0.0, 0.0));
        assert_eq!(controller.eye_state(EyeId::Left).pan_degrees, 0.0);
        assert_eq!(controller.actuator().duties[4], duty(1490.0));
    }

    #[test]
    fn test_single_eye_selection() {
        let mut controller = make_pwm_controller();
        let result = controller.apply_nine_point(NinePoint::Left, 5.0, EyeSelection::Right);
        assert_eq!(result.moves.len(), 1);
        assert_eq!(controller.eye_state(EyeId::Right).pan_degrees, -5.0);
        assert_eq!(controller.eye_state(EyeId::Left).pan_degrees, 0.0);
        assert_eq!(controller.actuator().duties[4], None);
    }

    #[test]
    fn test_static_clamp_records_applied_value() {
        let mut controller = make_pwm_controller();
        let result = controller.move_eye(EyeId::Left, 60.0, -100.0);
        assert_eq!(result.pan, Ok(45.0));
        assert_eq!(result.tilt, Ok(-45.0));
        assert_eq!(controller.eye_state(EyeId::Left).pan_degrees, 45.0);
        assert_eq!(controller.actuator().duties[4], duty(1490.0 - 45.0 * 11.0));
    }

    #[test]
    fn test_partial_failure_updates_only_moved_axis() {
        let mut controller = make_pwm_controller();
        controller.actuator_mut().failing_channel = Some(5);
        let result = controller.move_eye(EyeId::Left, 10.0, 10.0);

        assert_eq!(result.pan, Ok(10.0));
        assert_eq!(result.tilt, Err(AxisFailure::Device(ActuatorError::Bus)));
        assert!(!result.is_complete());
        assert!(result.any_moved());
        let state = controller.eye_state(EyeId::Left);
        assert_eq!((state.pan_degrees, state.tilt_degrees), (10.0, 0.0));
    }

    #[test]
    fn test_nine_point_succeeds_if_one_eye_moved() {
        let mut controller = make_pwm_controller();
        controller.actuator_mut().failing_channel = Some(7);
        let result = controller.apply_nine_point(NinePoint::UpperCenter, 10.0, EyeSelection::Both);
        assert!(result.succeeded());
        assert!(!result.moves[1].is_complete());
    }

    #[test]
    fn test_saccade_resolves_holds() {
        let mut controller = make_pwm_controller();
        controller.move_eye(EyeId::Left, 3.0, 4.0);
        controller.move_eye(EyeId::Right, -3.0, -4.0);

        let result = controller.saccade([
            AngleArg::Degrees(10.0),
            AngleArg::Hold,
            AngleArg::Degrees(5.0),
            AngleArg::Hold,
        ]);
        assert!(result.succeeded());
        assert_eq!(result.requested, [10.0, 4.0, 5.0, -4.0]);
        assert_eq!(result.applied(), Some([10.0, 4.0, 5.0, -4.0]));
    }

    #[test]
    fn test_saccade_reports_clamped_values() {
        let mut controller = make_pwm_controller();
        let result = controller.saccade([AngleArg::Degrees(90.0); 4]);
        assert_eq!(result.applied(), Some([45.0; 4]));
    }

    #[test]
    fn test_saccade_fails_when_any_axis_fails() {
        let mut controller = make_pwm_controller();
        controller.actuator_mut().failing_channel = Some(6);
        let result = controller.saccade([AngleArg::Degrees(1.0); 4]);
        assert!(!result.succeeded());
        assert_eq!(result.applied(), None);
        assert_eq!(controller.eye_state(EyeId::Left).pan_degrees, 1.0);
    }

    #[test]
    fn test_connection_failure_is_cached() {
        let mut controller = make_pwm_controller();
        controller.actuator_mut().refuse_connect = true;

        let result = controller.move_eye(EyeId::Left, 5.0, 5.0);
        assert_eq!(result.pan, Err(AxisFailure::Connection));
        assert_eq!(result.tilt, Err(AxisFailure::Connection));
        assert_eq!(controller.link_status(), LinkStatus::NotFound);
        assert_eq!(controller.link_status().label(), "Controller not found");
        assert_eq!(controller.eye_state(EyeId::Left).pan_degrees, 0.0);

        controller.actuator_mut().refuse_connect = false;
        assert!(controller.move_eye(EyeId::Left, 5.0, 5.0).is_complete());
        assert_eq!(controller.link_status().label(), "Controller connected");
    }

    #[test]
    fn test_connect_is_lazy_and_once() {
        let mut controller = make_pwm_controller();
        assert_eq!(controller.actuator().connect_attempts, 0);
        controller.move_eye(EyeId::Left, 1.0, 1.0);
        controller.move_eye(EyeId::Right, 1.0, 1.0);
        assert_eq!(controller.actuator().connect_attempts, 1);
    }

    #[test]
    fn test_unconfigured_eye() {
        let mut controller = make_absolute_controller();
        let result = controller.move_eye(EyeId::Right, 1.0, 1.0);
        assert_eq!(result.pan, Err(AxisFailure::NotConfigured));
        assert_eq!(result.tilt, Err(AxisFailure::NotConfigured));
    }

    #[test]
    fn test_dynamic_limits_reject_without_moving() {
        let mut controller = make_absolute_controller();
        let result = controller.move_eye(EyeId::Left, 100.0, 10.0);

        match result.pan {
            Err(AxisFailure::OutOfRange(v)) => {
                assert_eq!(v.bound(), Some(Bound::Max));
                assert_eq!(v.limits.max, 90.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(result.tilt, Err(AxisFailure::Blocked));
        assert_eq!(controller.actuator().writes, 0);
        assert_eq!(controller.eye_state(EyeId::Left).tilt_degrees, 0.0);
    }

    #[test]
    fn test_dynamic_limits_list_both_axes() {
        let mut controller = make_absolute_controller();
        let result = controller.move_eye(EyeId::Left, -120.0, 95.0);
        let err = result.out_of_range().unwrap();
        assert_eq!(err.violations.len(), 2);
        assert_eq!(err.violations[0].axis, AxisId::Pan);
        assert_eq!(err.violations[0].bound(), Some(Bound::Min));
        assert_eq!(err.violations[1].axis, AxisId::Tilt);
        assert_eq!(err.violations[1].bound(), Some(Bound::Max));
    }

    #[test]
    fn test_dynamic_accepts_in_range() {
        let mut controller = make_absolute_controller();
        let result = controller.move_eye(EyeId::Left, 10.0, -5.0);
        assert!(result.is_complete());
        assert_eq!(controller.actuator().positions[0], Some(100.0));
        assert_eq!(controller.actuator().positions[1], Some(85.0));
    }

    #[test]
    fn test_execute_configures_and_engages() {
        let mut controller = make_absolute_controller();
        let target = MotionTarget {
            eyes: EyeSelection::Left,
            pan: 10.0,
            tilt: -5.0,
            acceleration: 3000.0,
            max_velocity: 500.0,
        };
        let moves = controller.execute(&target).unwrap();
        assert!(moves[0].is_complete());
        let actuator = controller.actuator();
        assert_eq!(actuator.ramps[0], Some((3000.0, 500.0)));
        assert!(actuator.engaged[0] && actuator.engaged[1]);
    }

    #[test]
    fn test_execute_fails_without_connection() {
        let mut controller = make_absolute_controller();
        controller.actuator_mut().refuse_connect = true;
        let target = MotionTarget {
            eyes: EyeSelection::Left,
            pan: 0.0,
            tilt: 0.0,
            acceleration: 2000.0,
            max_velocity: 400.0,
        };
        assert_eq!(
            controller.execute(&target),
            Err(ActuatorError::NotConnected)
        );
    }

    #[test]
    fn test_zero_only_configured_eyes() {
        let mut controller = make_absolute_controller();
        controller.move_eye(EyeId::Left, 10.0, 10.0);
        let moves = controller.zero();
        assert_eq!(moves.len(), 1);
        assert!(moves.iter().all(EyeMove::is_complete));
        assert_eq!(controller.actuator().positions[0], Some(90.0));
    }

    #[test]
    fn test_read_position_and_limits() {
        let mut controller = make_absolute_controller();
        controller.move_eye(EyeId::Left, 12.0, -7.0);
        assert_eq!(controller.read_position(EyeId::Left), Ok((12.0, -7.0)));

        let limits = controller.axis_limits(EyeId::Left, AxisId::Pan).unwrap();
        assert_eq!((limits.min, limits.max), (-90.0, 90.0));
    }

    #[test]
    fn test_static_limits_need_no_query() {
        let mut controller = make_pwm_controller();
        assert_eq!(controller.config().limits, LimitPolicy::Static { range_degrees: 45.0 });
        let limits = controller.axis_limits(EyeId::Right, AxisId::Tilt).unwrap();
        assert_eq!((limits.min, limits.max), (-45.0, 45.0));
    }

    #[test]
    fn test_set_engaged_all_axes() {
        let mut controller = make_pwm_controller();
        controller.set_engaged(true).unwrap();
        assert!(controller.actuator().engaged[4..8].iter().all(|&e| e));
        controller.set_engaged(false).unwrap();
        assert!(controller.actuator().engaged.iter().all(|&e| !e));
    }
}
