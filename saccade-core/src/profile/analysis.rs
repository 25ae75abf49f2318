//! Post-hoc analysis of a motion profile
//!
//! Velocity comes from the device when it reports one, otherwise from
//! first differences of logical position. Acceleration is differentiated
//! from a smoothed velocity series; the reported peak is a high percentile
//! rather than the maximum because single-sample spikes dominate the
//! latter, and the average is taken over the middle of the run in time to
//! leave out onset and settling transients.

use heapless::Vec;

use super::sample::{MotionProfile, ProfileSample, MAX_PROFILE_SAMPLES};
use super::sampler::StopReason;
use crate::config::{AxisConfig, AxisId};
use crate::mapping::unmap_rate;

/// Centred moving-average window for velocity smoothing
pub const SMOOTHING_WINDOW: usize = 5;

/// Percentile reported as peak acceleration
pub const PEAK_PERCENTILE: f32 = 90.0;

/// Fraction trimmed from each end (in time) for average acceleration
pub const TRIM_FRACTION: f32 = 0.1;

/// Fewer velocity samples than this yields no acceleration statistics
pub const MIN_VELOCITY_SAMPLES: usize = 4;

type Series = Vec<f32, MAX_PROFILE_SAMPLES>;

/// Where the velocity series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VelocitySource {
    /// Reported by the actuator
    Device,
    /// First differences of position
    Estimated,
}

/// Statistics for one axis; `None` where data was insufficient
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisStats {
    /// Maximum |v| (°/s)
    pub peak_velocity: Option<f32>,
    /// 90th percentile |a| (°/s²)
    pub peak_acceleration: Option<f32>,
    /// Mean |a| over the middle of the run (°/s²)
    pub average_acceleration: Option<f32>,
    /// Last logical position minus target (°)
    pub final_error: Option<f32>,
    pub velocity_samples: usize,
}

/// Summary of one profiled move
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileSummary {
    pub samples: usize,
    pub duration_s: f32,
    pub stop: StopReason,
    pub velocity_source: VelocitySource,
    pub pan: AxisStats,
    pub tilt: AxisStats,
}

/// Analyse a finished profile
///
/// Device velocities are converted to logical degrees per second with the
/// axis configuration, so their sign matches the position columns.
pub fn analyze(profile: &MotionProfile, pan: &AxisConfig, tilt: &AxisConfig) -> ProfileSummary {
    let (pan_stats, pan_source) = axis_stats(profile, AxisId::Pan, pan);
    let (tilt_stats, tilt_source) = axis_stats(profile, AxisId::Tilt, tilt);
    let velocity_source = match (pan_source, tilt_source) {
        (VelocitySource::Device, VelocitySource::Device) => VelocitySource::Device,
        _ => VelocitySource::Estimated,
    };

    ProfileSummary {
        samples: profile.len(),
        duration_s: profile.duration_s(),
        stop: profile.stop,
        velocity_source,
        pan: pan_stats,
        tilt: tilt_stats,
    }
}

fn axis_stats(
    profile: &MotionProfile,
    axis: AxisId,
    config: &AxisConfig,
) -> (AxisStats, VelocitySource) {
    let (times, velocities, source) = velocity_series(&profile.samples, axis, config);

    let target = match axis {
        AxisId::Pan => profile.target.0,
        AxisId::Tilt => profile.target.1,
    };
    let final_error = profile.last().map(|s| relative(s, axis) - target);

    let peak_velocity = velocities
        .iter()
        .map(|&v| libm::fabsf(v))
        .fold(None, |peak: Option<f32>, v| Some(peak.map_or(v, |p| p.max(v))));

    let mut stats = AxisStats {
        peak_velocity,
        final_error,
        velocity_samples: velocities.len(),
        ..AxisStats::default()
    };

    if velocities.len() >= MIN_VELOCITY_SAMPLES {
        let smoothed = moving_average(&velocities, SMOOTHING_WINDOW);
        let accelerations = differentiate(&times, &smoothed);
        stats.peak_acceleration = percentile(&accelerations, PEAK_PERCENTILE);
        stats.average_acceleration = trimmed_mean(&accelerations, TRIM_FRACTION);
    }

    (stats, source)
}

fn relative(sample: &ProfileSample, axis: AxisId) -> f32 {
    match axis {
        AxisId::Pan => sample.pan_rel,
        AxisId::Tilt => sample.tilt_rel,
    }
}

/// Times and logical velocities for one axis
fn velocity_series(
    samples: &[ProfileSample],
    axis: AxisId,
    config: &AxisConfig,
) -> (Series, Series, VelocitySource) {
    let mut times = Series::new();
    let mut values = Series::new();

    for sample in samples {
        let device = match axis {
            AxisId::Pan => sample.pan_vel,
            AxisId::Tilt => sample.tilt_vel,
        };
        if let Some(v) = device {
            let _ = times.push(sample.elapsed_s);
            let _ = values.push(unmap_rate(config, v));
        }
    }
    if !values.is_empty() {
        return (times, values, VelocitySource::Device);
    }

    for pair in samples.windows(2) {
        let dt = pair[1].elapsed_s - pair[0].elapsed_s;
        if dt <= 0.0 {
            continue;
        }
        let dv = relative(&pair[1], axis) - relative(&pair[0], axis);
        let _ = times.push(0.5 * (pair[0].elapsed_s + pair[1].elapsed_s));
        let _ = values.push(dv / dt);
    }
    (times, values, VelocitySource::Estimated)
}

/// |Δv/Δt| between consecutive points, skipping non-positive Δt
fn differentiate(times: &[f32], values: &[f32]) -> Series {
    let mut out = Series::new();
    for i in 1..times.len().min(values.len()) {
        let dt = times[i] - times[i - 1];
        if dt <= 0.0 {
            continue;
        }
        let _ = out.push(libm::fabsf((values[i] - values[i - 1]) / dt));
    }
    out
}

/// Centred moving average; the window shrinks at the ends
pub fn moving_average(values: &[f32], window: usize) -> Series {
    let half = window / 2;
    let mut out = Series::new();
    for i in 0..values.len() {
        let lo = i.saturating_sub(half);
        let hi = (i + half + 1).min(values.len());
        let slice = &values[lo..hi];
        let _ = out.push(slice.iter().sum::<f32>() / slice.len() as f32);
    }
    out
}

/// Percentile with linear interpolation between closest ranks
pub fn percentile(values: &[f32], pct: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = Series::new();
    for &v in values.iter().take(MAX_PROFILE_SAMPLES) {
        let _ = sorted.push(v);
    }
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lo = libm::floorf(rank) as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - lo as f32;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Mean after dropping `fraction` of the values from each end, in order
pub fn trimmed_mean(values: &[f32], fraction: f32) -> Option<f32> {
    let k = libm::floorf(values.len() as f32 * fraction) as usize;
    if values.len() <= 2 * k {
        return None;
    }
    let middle = &values[k..values.len() - k];
    Some(middle.iter().sum::<f32>() / middle.len() as f32)
}
