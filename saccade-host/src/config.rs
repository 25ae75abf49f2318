//! Host configuration file
//!
//! ```toml
//! preset = "absolute-single-eye"
//! backend = "sim"
//! pan_zero = 95.0
//!
//! # Optional full rig description, replaces the preset
//! [rig.limits]
//! static = { range_degrees = 30.0 }
//! ```

use std::path::{Path, PathBuf};

use saccade_core::config::{ConfigError as RigError, EyeId, RigConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Zero reference used by the absolute preset when none is given
pub const DEFAULT_ZERO_DEGREES: f32 = 90.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid rig configuration: {0}")]
    Invalid(RigError),
}

/// Built-in rig layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Two eyes of PWM servos on a PCA9685 board
    PwmDualEye,
    /// One eye on an absolute-position servo controller
    #[default]
    AbsoluteSingleEye,
}

/// Actuator the host talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Simulated absolute-position controller
    #[default]
    Sim,
    /// PCA9685 driver on a bus that logs every write
    Pca9685Trace,
}

/// Contents of the `--config` file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub preset: Preset,
    pub backend: Backend,
    /// Pan zero reference in the axis' physical unit
    pub pan_zero: Option<f32>,
    /// Tilt zero reference in the axis' physical unit
    pub tilt_zero: Option<f32>,
    /// Full rig description; takes precedence over `preset`
    pub rig: Option<RigConfig>,
}

impl HostConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Build the rig, applying command-line zero overrides on top of the file
    pub fn resolve(
        &self,
        pan_zero: Option<f32>,
        tilt_zero: Option<f32>,
    ) -> Result<RigConfig, ConfigError> {
        let pan_zero = pan_zero.or(self.pan_zero);
        let tilt_zero = tilt_zero.or(self.tilt_zero);

        let mut rig = match (&self.rig, self.preset) {
            (Some(rig), _) => rig.clone(),
            (None, Preset::AbsoluteSingleEye) => RigConfig::absolute_single_eye(
                pan_zero.unwrap_or(DEFAULT_ZERO_DEGREES),
                tilt_zero.unwrap_or(DEFAULT_ZERO_DEGREES),
            ),
            (None, Preset::PwmDualEye) => RigConfig::pwm_dual_eye(),
        };
        for eye in EyeId::ALL {
            rig.override_zero(eye, pan_zero, tilt_zero);
        }

        rig.validate().map_err(ConfigError::Invalid)?;
        Ok(rig)
    }
}
