//! Motion profiling
//!
//! A [`Sampler`] collects time-stamped readings while a move is in flight
//! and decides when to stop. [`analysis::analyze`] then derives velocity
//! and acceleration statistics from the finished [`MotionProfile`].

pub mod analysis;
pub mod sample;
pub mod sampler;

pub use analysis::{
    analyze, moving_average, percentile, trimmed_mean, AxisStats, ProfileSummary,
    VelocitySource, PEAK_PERCENTILE, SMOOTHING_WINDOW, TRIM_FRACTION,
};
pub use sample::{MotionProfile, ProfileSample, MAX_PROFILE_SAMPLES};
pub use sampler::{
    Sampler, SamplerStep, SamplingPlan, StopReason, MAX_RATE_HZ, MAX_TIMEOUT_S, MIN_RATE_HZ,
};
