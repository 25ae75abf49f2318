//! Profile samples

use heapless::Vec;

use super::sampler::StopReason;
use crate::mapping::AxisReading;

/// Sample store capacity (10 s at 100 Hz)
pub const MAX_PROFILE_SAMPLES: usize = 1024;

/// One reading of both axes of an eye
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileSample {
    /// Seconds since sampling started
    pub elapsed_s: f32,
    /// Native positions
    pub pan_abs: f32,
    pub tilt_abs: f32,
    /// Logical degrees
    pub pan_rel: f32,
    pub tilt_rel: f32,
    /// Native velocities, when the device reports them
    pub pan_vel: Option<f32>,
    pub tilt_vel: Option<f32>,
}

impl ProfileSample {
    pub fn from_readings(elapsed_s: f32, pan: AxisReading, tilt: AxisReading) -> Self {
        Self {
            elapsed_s,
            pan_abs: pan.absolute,
            tilt_abs: tilt.absolute,
            pan_rel: pan.relative,
            tilt_rel: tilt.relative,
            pan_vel: pan.velocity,
            tilt_vel: tilt.velocity,
        }
    }
}

/// Samples of one sampling run
#[derive(Debug, Clone, PartialEq)]
pub struct MotionProfile {
    /// Logical (pan, tilt) target
    pub target: (f32, f32),
    pub samples: Vec<ProfileSample, MAX_PROFILE_SAMPLES>,
    pub stop: StopReason,
}

impl MotionProfile {
    pub fn new(target: (f32, f32)) -> Self {
        Self {
            target,
            samples: Vec::new(),
            stop: StopReason::Reached,
        }
    }

    /// Build from existing samples, e.g. a re-imported export
    ///
    /// Samples beyond capacity are dropped.
    pub fn from_samples<I>(target: (f32, f32), samples: I, stop: StopReason) -> Self
    where
        I: IntoIterator<Item = ProfileSample>,
    {
        let mut profile = Self::new(target);
        for sample in samples {
            if profile.samples.push(sample).is_err() {
                break;
            }
        }
        profile.stop = stop;
        profile
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&ProfileSample> {
        self.samples.last()
    }

    /// Time of the last sample
    pub fn duration_s(&self) -> f32 {
        self.samples.last().map(|s| s.elapsed_s).unwrap_or(0.0)
    }
}
