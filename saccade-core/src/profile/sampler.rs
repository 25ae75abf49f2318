//! Sampling loop state
//!
//! The sampler itself does no I/O or sleeping. The caller reads the
//! actuator, feeds a sample to [`Sampler::record`], and acts on the
//! returned [`SamplerStep`].

use super::sample::{MotionProfile, ProfileSample, MAX_PROFILE_SAMPLES};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slowest accepted sampling rate
pub const MIN_RATE_HZ: f32 = 1.0;

/// Fastest accepted sampling rate
pub const MAX_RATE_HZ: f32 = 1000.0;

/// Longest accepted sampling timeout
pub const MAX_TIMEOUT_S: f32 = 3600.0;

/// Sampling cadence and stop conditions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplingPlan {
    pub rate_hz: f32,
    /// Both axes within this many degrees counts as arrived
    pub tolerance_degrees: f32,
    /// Wait after arriving before stopping
    pub settle_s: f32,
    /// Give up after this long
    pub timeout_s: f32,
}

impl Default for SamplingPlan {
    fn default() -> Self {
        Self {
            rate_hz: 100.0,
            tolerance_degrees: 0.5,
            settle_s: 0.1,
            timeout_s: 10.0,
        }
    }
}

impl SamplingPlan {
    /// Seconds between samples
    pub fn interval_s(&self) -> f32 {
        1.0 / self.rate_hz
    }

    /// Rate within `MIN_RATE_HZ..=MAX_RATE_HZ`, tolerance positive,
    /// timeout within `(0, MAX_TIMEOUT_S]` and settle within `[0, timeout]`
    ///
    /// NaN fails every comparison and is rejected.
    pub fn is_valid(&self) -> bool {
        (MIN_RATE_HZ..=MAX_RATE_HZ).contains(&self.rate_hz)
            && self.tolerance_degrees.is_finite()
            && self.tolerance_degrees > 0.0
            && self.timeout_s > 0.0
            && self.timeout_s <= MAX_TIMEOUT_S
            && self.settle_s >= 0.0
            && self.settle_s <= self.timeout_s
    }
}

/// Why sampling ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// Both axes within tolerance
    Reached,
    /// Timeout elapsed before arriving
    TimedOut,
    /// A position read failed
    ReadFailed,
    /// Sample store filled up
    Full,
}

impl StopReason {
    pub fn label(self) -> &'static str {
        match self {
            StopReason::Reached => "reached",
            StopReason::TimedOut => "timed out",
            StopReason::ReadFailed => "read failed",
            StopReason::Full => "sample store full",
        }
    }
}

/// What the sampling loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerStep {
    /// Sleep one interval and sample again
    Continue,
    /// Target reached: sleep the settle interval, then finish
    Settle,
    /// Finish now
    Stop(StopReason),
}

/// Accumulates samples for one run
#[derive(Debug, Clone)]
pub struct Sampler {
    plan: SamplingPlan,
    profile: MotionProfile,
}

impl Sampler {
    pub fn new(plan: SamplingPlan, target: (f32, f32)) -> Self {
        Self {
            plan,
            profile: MotionProfile::new(target),
        }
    }

    pub fn plan(&self) -> &SamplingPlan {
        &self.plan
    }

    pub fn len(&self) -> usize {
        self.profile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_empty()
    }

    /// Append a sample and evaluate the stop conditions
    pub fn record(&mut self, sample: ProfileSample) -> SamplerStep {
        if self.profile.samples.push(sample).is_err() {
            return SamplerStep::Stop(StopReason::Full);
        }

        let (pan_target, tilt_target) = self.profile.target;
        let tolerance = self.plan.tolerance_degrees;
        if libm::fabsf(sample.pan_rel - pan_target) <= tolerance
            && libm::fabsf(sample.tilt_rel - tilt_target) <= tolerance
        {
            return SamplerStep::Settle;
        }
        if sample.elapsed_s >= self.plan.timeout_s {
            return SamplerStep::Stop(StopReason::TimedOut);
        }
        if self.profile.len() >= MAX_PROFILE_SAMPLES {
            return SamplerStep::Stop(StopReason::Full);
        }
        SamplerStep::Continue
    }

    /// Check the timeout without a new sample
    pub fn timed_out(&self, elapsed_s: f32) -> bool {
        elapsed_s >= self.plan.timeout_s
    }

    /// Close the run
    pub fn finish(mut self, reason: StopReason) -> MotionProfile {
        self.profile.stop = reason;
        self.profile
    }
}
