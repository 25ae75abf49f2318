//! Threaded motion profiler
//!
//! A sampling thread is started just before the move is issued and reads
//! the profiled eye at the plan's rate until it settles on target, times
//! out, fails a read or fills the sample store. The profile is handed
//! back over a channel; the running flag is the only state both threads
//! write.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use saccade_core::config::{AxisConfig, AxisId, EyeId};
use saccade_core::eye::{AxisFailure, EyeMove, MotionTarget};
use saccade_core::mapping::{self, OutOfRange};
use saccade_core::profile::{
    analyze, AxisStats, MotionProfile, ProfileSample, ProfileSummary, Sampler, SamplerStep,
    SamplingPlan, StopReason,
};
use saccade_core::traits::{Actuator, ActuatorError};
use thiserror::Error;

use crate::rig::HostController;

/// Extra wait on top of the sampling timeout before giving up on the thread
pub const JOIN_MARGIN: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("controller not connected: {0}")]
    Connection(ActuatorError),
    #[error("no eye configured")]
    NoEye,
    #[error("{0}")]
    OutOfRange(OutOfRange),
    #[error("{eye} eye cannot be profiled: {failure}")]
    Axis {
        eye: &'static str,
        failure: AxisFailure,
    },
    #[error("invalid sampling plan: {0:?}")]
    InvalidPlan(SamplingPlan),
    #[error("move setup failed: {0}")]
    Setup(ActuatorError),
    #[error("failed to start sampling thread: {0}")]
    Spawn(#[from] io::Error),
    #[error("sampling thread did not stop")]
    Stalled,
    #[error("sampling thread panicked")]
    Panicked,
}

/// A profiled move request in logical degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileRequest {
    pub pan: f32,
    pub tilt: f32,
    pub acceleration: f32,
    pub max_velocity: f32,
}

/// Result of one profiled move
#[derive(Debug, Clone)]
pub struct ProfileRun {
    /// Eye that was sampled
    pub eye: EyeId,
    /// Target after clamping
    pub target: (f32, f32),
    pub moves: Vec<EyeMove>,
    pub profile: MotionProfile,
    pub summary: ProfileSummary,
}

/// Move every configured eye and sample the first one
///
/// The target is resolved against the limits before anything moves, so
/// an out-of-range request neither starts the sampler nor the motors.
pub fn profile_move(
    controller: &mut HostController,
    request: &ProfileRequest,
) -> Result<ProfileRun, ProfilerError> {
    controller
        .ensure_connected()
        .map_err(ProfilerError::Connection)?;
    let eyes = controller
        .config()
        .configured_eyes()
        .ok_or(ProfilerError::NoEye)?;
    let eye = eyes.eyes()[0];

    let plan = controller.check_target(eye, request.pan, request.tilt);
    if let Some(out_of_range) = plan.out_of_range() {
        return Err(ProfilerError::OutOfRange(out_of_range));
    }
    let target = match (plan.pan, plan.tilt) {
        (Ok(pan), Ok(tilt)) => (pan, tilt),
        (Err(failure), _) | (_, Err(failure)) => {
            return Err(ProfilerError::Axis {
                eye: eye.label(),
                failure,
            })
        }
    };
    let not_configured = ProfilerError::Axis {
        eye: eye.label(),
        failure: AxisFailure::NotConfigured,
    };
    let pan_axis = controller.config().axis(eye, AxisId::Pan).cloned();
    let tilt_axis = controller.config().axis(eye, AxisId::Tilt).cloned();
    let (Some(pan_axis), Some(tilt_axis)) = (pan_axis, tilt_axis) else {
        return Err(not_configured);
    };
    let sampling = controller.config().sampling;
    if !sampling.is_valid() {
        return Err(ProfilerError::InvalidPlan(sampling));
    }

    info!(
        "Profiling {} eye to ({:.2}°, {:.2}°)",
        eye.label(),
        target.0,
        target.1
    );

    let running = Arc::new(AtomicBool::new(true));
    let (tx, rx) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("profile-sampler".into())
        .spawn({
            let running = Arc::clone(&running);
            let mut actuator = controller.actuator().clone();
            let (pan_axis, tilt_axis) = (pan_axis.clone(), tilt_axis.clone());
            move || {
                let profile = sample_until_done(
                    &mut actuator,
                    &pan_axis,
                    &tilt_axis,
                    sampling,
                    target,
                    &running,
                );
                running.store(false, Ordering::Release);
                let _ = tx.send(profile);
            }
        })?;

    let motion = MotionTarget {
        eyes,
        pan: request.pan,
        tilt: request.tilt,
        acceleration: request.acceleration,
        max_velocity: request.max_velocity,
    };
    let moves = match controller.execute(&motion) {
        Ok(moves) => moves.into_iter().collect::<Vec<_>>(),
        Err(e) => {
            running.store(false, Ordering::Release);
            let _ = handle.join();
            return Err(ProfilerError::Setup(e));
        }
    };

    let budget = Duration::from_secs_f32(sampling.timeout_s) + JOIN_MARGIN;
    let profile = match rx.recv_timeout(budget) {
        Ok(profile) => profile,
        Err(_) => {
            warn!("Sampler overran {:.1} s, stopping it", budget.as_secs_f32());
            running.store(false, Ordering::Release);
            rx.recv_timeout(JOIN_MARGIN)
                .map_err(|_| ProfilerError::Stalled)?
        }
    };
    handle.join().map_err(|_| ProfilerError::Panicked)?;

    let summary = analyze(&profile, &pan_axis, &tilt_axis);
    debug!("Profile stopped: {}", profile.stop.label());
    Ok(ProfileRun {
        eye,
        target,
        moves,
        profile,
        summary,
    })
}

fn read_sample<A: Actuator>(
    actuator: &mut A,
    pan: &AxisConfig,
    tilt: &AxisConfig,
    elapsed_s: f32,
) -> Result<ProfileSample, ActuatorError> {
    let pan = mapping::read_axis(actuator, pan)?;
    let tilt = mapping::read_axis(actuator, tilt)?;
    Ok(ProfileSample::from_readings(elapsed_s, pan, tilt))
}

/// Sampling loop run on the background thread
///
/// `plan` must be valid. Arrival only counts as reached when the sample
/// taken after the settle interval is still within tolerance.
fn sample_until_done<A: Actuator>(
    actuator: &mut A,
    pan: &AxisConfig,
    tilt: &AxisConfig,
    plan: SamplingPlan,
    target: (f32, f32),
    running: &AtomicBool,
) -> MotionProfile {
    let interval = Duration::from_secs_f32(plan.interval_s());
    let settle = Duration::from_secs_f32(plan.settle_s);
    let start = Instant::now();
    let mut sampler = Sampler::new(plan, target);

    loop {
        if !running.load(Ordering::Acquire) {
            return sampler.finish(StopReason::TimedOut);
        }
        let sample = match read_sample(actuator, pan, tilt, start.elapsed().as_secs_f32()) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Sample read failed: {e}");
                return sampler.finish(StopReason::ReadFailed);
            }
        };

        match sampler.record(sample) {
            SamplerStep::Continue => thread::sleep(interval),
            SamplerStep::Settle => {
                thread::sleep(settle);
                let elapsed = start.elapsed().as_secs_f32();
                let sample = match read_sample(actuator, pan, tilt, elapsed) {
                    Ok(sample) => sample,
                    Err(e) => {
                        warn!("Read after settling failed: {e}");
                        return sampler.finish(StopReason::ReadFailed);
                    }
                };
                match sampler.record(sample) {
                    SamplerStep::Settle => return sampler.finish(StopReason::Reached),
                    SamplerStep::Continue => {
                        debug!("Drifted off target while settling");
                        thread::sleep(interval);
                    }
                    SamplerStep::Stop(reason) => return sampler.finish(reason),
                }
            }
            SamplerStep::Stop(reason) => return sampler.finish(reason),
        }
    }
}

fn format_value(value: Option<f32>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.1} {unit}"),
        None => "n/a".to_string(),
    }
}

fn write_axis_stats<W: Write>(out: &mut W, name: &str, stats: &AxisStats) -> io::Result<()> {
    writeln!(
        out,
        "  {name:<5} peak velocity {}, peak accel {}, avg accel {}, final error {}",
        format_value(stats.peak_velocity, "°/s"),
        format_value(stats.peak_acceleration, "°/s²"),
        format_value(stats.average_acceleration, "°/s²"),
        match stats.final_error {
            Some(e) => format!("{e:+.2}°"),
            None => "n/a".to_string(),
        }
    )
}

/// Print a human-readable summary of a run
pub fn write_summary<W: Write>(out: &mut W, run: &ProfileRun) -> io::Result<()> {
    let s = &run.summary;
    writeln!(
        out,
        "Profile: {} samples over {:.2} s ({}), target ({:.2}°, {:.2}°)",
        s.samples,
        s.duration_s,
        s.stop.label(),
        run.target.0,
        run.target.1
    )?;
    writeln!(out, "  velocity source: {:?}", s.velocity_source)?;
    write_axis_stats(out, "pan", &s.pan)?;
    write_axis_stats(out, "tilt", &s.tilt)?;
    if s.stop == StopReason::TimedOut {
        writeln!(out, "  warning: target not reached within the timeout")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use saccade_core::config::Direction;
    use std::collections::VecDeque;

    /// Replays (pan, tilt) readings, one pair per sample, then fails
    struct Replay {
        readings: VecDeque<(f32, f32)>,
        current: Option<(f32, f32)>,
    }

    impl Replay {
        fn new(readings: &[(f32, f32)]) -> Self {
            Self {
                readings: readings.iter().copied().collect(),
                current: None,
            }
        }
    }

    impl Actuator for Replay {
        fn connect(&mut self) -> Result<(), ActuatorError> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn set_position(&mut self, _channel: u8, _value: f32) -> Result<(), ActuatorError> {
            Ok(())
        }

        fn position(&mut self, channel: u8) -> Result<f32, ActuatorError> {
            if channel == 0 {
                self.current = self.readings.pop_front();
            }
            let (pan, tilt) = self.current.ok_or(ActuatorError::NotConnected)?;
            Ok(if channel == 0 { pan } else { tilt })
        }

        fn position_limits(&mut self, _channel: u8) -> Result<(f32, f32), ActuatorError> {
            Ok((-90.0, 90.0))
        }

        fn set_engaged(&mut self, _channel: u8, _engaged: bool) -> Result<(), ActuatorError> {
            Ok(())
        }

        fn configure(&mut self, _: u8, _: f32, _: f32) -> Result<(), ActuatorError> {
            Ok(())
        }
    }

    fn sample(readings: &[(f32, f32)]) -> MotionProfile {
        let pan = AxisConfig::absolute("Pan", 0, 0.0, Direction::Positive);
        let tilt = AxisConfig::absolute("Tilt", 1, 0.0, Direction::Positive);
        let plan = SamplingPlan {
            rate_hz: 1000.0,
            settle_s: 0.001,
            ..SamplingPlan::default()
        };
        let running = AtomicBool::new(true);
        let mut actuator = Replay::new(readings);
        sample_until_done(&mut actuator, &pan, &tilt, plan, (10.0, -5.0), &running)
    }

    #[test]
    fn test_settled_sample_confirms_arrival() {
        let profile = sample(&[(4.0, -2.0), (10.0, -5.0), (10.1, -5.0)]);
        assert_eq!(profile.stop, StopReason::Reached);
        assert_eq!(profile.len(), 3);
    }

    #[test]
    fn test_read_failure_after_arrival() {
        // Device gone before the settle interval ends
        let profile = sample(&[(10.0, -5.0)]);
        assert_eq!(profile.stop, StopReason::ReadFailed);
        assert_eq!(profile.len(), 1);
    }

    #[test]
    fn test_drift_while_settling_keeps_sampling() {
        let profile = sample(&[(10.0, -5.0), (12.0, -5.0), (10.0, -5.2), (10.0, -5.0)]);
        assert_eq!(profile.stop, StopReason::Reached);
        assert_eq!(profile.len(), 4);
    }

    #[test]
    fn test_unbounded_timeout_is_rejected() {
        let mut rig = saccade_core::config::RigConfig::absolute_single_eye(90.0, 90.0);
        rig.sampling.timeout_s = 1e30;
        let mut controller =
            crate::rig::build_controller(rig, crate::config::Backend::Sim, false);
        let request = ProfileRequest {
            pan: 1.0,
            tilt: 1.0,
            acceleration: 2000.0,
            max_velocity: 400.0,
        };
        let err = profile_move(&mut controller, &request).unwrap_err();
        assert!(matches!(err, ProfilerError::InvalidPlan(_)));
    }
}
