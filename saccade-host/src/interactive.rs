//! Line-oriented shell
//!
//! The batch subcommands run through the same [`Shell`] so both surfaces
//! report moves, positions and errors identically.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use saccade_core::config::{AxisId, EyeId};
use saccade_core::eye::{AxisFailure, EyeMove, EyeSelection, MotionTarget};
use saccade_core::traits::ActuatorError;
use thiserror::Error;

use crate::export;
use crate::profiler::{self, ProfileRequest, ProfileRun};
use crate::rig::HostController;

pub const PROMPT: &str = "saccade> ";

pub const HELP: &str = "\
Commands:
  saccade <x> <y> [accel] [velocity]   move to (x, y) degrees from zero
  profile <x> <y> [accel] [velocity]   move and record a motion profile
  save [filename]                      write the last profile as CSV
  position                             read the current position
  limits                               show the range of every axis
  zero                                 centre every eye
  disengage                            power the servos off
  engage                               power the servos on
  help                                 show this text
  quit | exit                          leave the shell";

#[derive(Error, Debug, PartialEq)]
pub enum ShellError {
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// Target and optional ramp overrides of a move command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveArgs {
    pub x: f32,
    pub y: f32,
    pub acceleration: Option<f32>,
    pub max_velocity: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Saccade(MoveArgs),
    Profile(MoveArgs),
    Save(Option<PathBuf>),
    Position,
    Limits,
    Zero,
    Disengage,
    Engage,
    Help,
    Quit,
}

fn number(token: &str) -> Result<f32, ShellError> {
    match token.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ShellError::InvalidNumber(token.to_string())),
    }
}

fn move_args(args: &[&str], usage: &'static str) -> Result<MoveArgs, ShellError> {
    if !(2..=4).contains(&args.len()) {
        return Err(ShellError::Usage(usage));
    }
    Ok(MoveArgs {
        x: number(args[0])?,
        y: number(args[1])?,
        acceleration: args.get(2).map(|a| number(a)).transpose()?,
        max_velocity: args.get(3).map(|v| number(v)).transpose()?,
    })
}

impl ShellCommand {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>, ShellError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&keyword, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let no_args = |command: ShellCommand, usage: &'static str| {
            if args.is_empty() {
                Ok(command)
            } else {
                Err(ShellError::Usage(usage))
            }
        };

        let command = match keyword.to_ascii_lowercase().as_str() {
            "saccade" => ShellCommand::Saccade(move_args(
                args,
                "saccade <x> <y> [accel] [velocity]",
            )?),
            "profile" => ShellCommand::Profile(move_args(
                args,
                "profile <x> <y> [accel] [velocity]",
            )?),
            "save" => match args {
                [] => ShellCommand::Save(None),
                [name] => ShellCommand::Save(Some(PathBuf::from(*name))),
                _ => return Err(ShellError::Usage("save [filename]")),
            },
            "position" => no_args(ShellCommand::Position, "position")?,
            "limits" => no_args(ShellCommand::Limits, "limits")?,
            "zero" => no_args(ShellCommand::Zero, "zero")?,
            "disengage" => no_args(ShellCommand::Disengage, "disengage")?,
            "engage" => no_args(ShellCommand::Engage, "engage")?,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            _ => return Err(ShellError::Unknown(keyword.to_string())),
        };
        Ok(Some(command))
    }
}

/// Whether the shell keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn eye_name(eye: EyeId) -> &'static str {
    match eye {
        EyeId::Left => "Left",
        EyeId::Right => "Right",
    }
}

/// Controller plus the session state of the shell
pub struct Shell {
    controller: HostController,
    last_profile: Option<ProfileRun>,
    acceleration: f32,
    max_velocity: f32,
}

impl Shell {
    /// Ramp defaults come from the rig configuration
    pub fn new(controller: HostController) -> Self {
        let acceleration = controller.config().acceleration;
        let max_velocity = controller.config().max_velocity;
        Self {
            controller,
            last_profile: None,
            acceleration,
            max_velocity,
        }
    }

    pub fn controller(&self) -> &HostController {
        &self.controller
    }

    pub fn last_profile(&self) -> Option<&ProfileRun> {
        self.last_profile.as_ref()
    }

    fn eyes(&self) -> Result<EyeSelection> {
        self.controller
            .config()
            .configured_eyes()
            .ok_or_else(|| anyhow!("no eye configured"))
    }

    fn target(&self, args: &MoveArgs) -> Result<MotionTarget> {
        Ok(MotionTarget {
            eyes: self.eyes()?,
            pan: args.x,
            tilt: args.y,
            acceleration: args.acceleration.unwrap_or(self.acceleration),
            max_velocity: args.max_velocity.unwrap_or(self.max_velocity),
        })
    }

    /// Configure ramps, engage and move every configured eye
    pub fn move_to<W: Write>(&mut self, out: &mut W, target: &MotionTarget) -> Result<()> {
        writeln!(
            out,
            "Executing saccade to ({}°, {}°), acceleration {}°/s², max velocity {}°/s",
            target.pan, target.tilt, target.acceleration, target.max_velocity
        )?;
        let moves = self
            .controller
            .execute(target)
            .map_err(|e| anyhow!("move setup failed: {e}"))?;
        report_moves(out, &moves)
    }

    /// Centre every eye with the given ramp
    pub fn init<W: Write>(
        &mut self,
        out: &mut W,
        acceleration: f32,
        max_velocity: f32,
    ) -> Result<()> {
        let target = MotionTarget {
            eyes: self.eyes()?,
            pan: 0.0,
            tilt: 0.0,
            acceleration,
            max_velocity,
        };
        for (eye, axis, config) in self.controller.config().axes() {
            writeln!(
                out,
                "  {} {} zero: {}",
                eye_name(eye),
                axis.label(),
                config.kind.zero()
            )?;
        }
        self.move_to(out, &target)?;
        writeln!(out, "Initialization complete")?;
        Ok(())
    }

    pub fn write_position<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let eyes = self.eyes()?;
        for &eye in eyes.eyes() {
            let prefix = match eyes {
                EyeSelection::Both => format!("{} eye position", eye_name(eye)),
                _ => "Current position".to_string(),
            };
            match self.controller.read_position(eye) {
                Ok((x, y)) => writeln!(out, "{prefix}: X={x:.2}°, Y={y:.2}°")?,
                Err(AxisFailure::Device(ActuatorError::Unsupported)) => {
                    // PWM boards cannot report back, show the last command
                    let state = self.controller.eye_state(eye);
                    writeln!(
                        out,
                        "{prefix}: X={:.2}°, Y={:.2}° (commanded)",
                        state.pan_degrees, state.tilt_degrees
                    )?;
                }
                Err(e) => bail!("error reading {} eye position: {e}", eye_name(eye)),
            }
        }
        Ok(())
    }

    pub fn write_limits<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let eyes = self.eyes()?;
        for &eye in eyes.eyes() {
            for axis in AxisId::ALL {
                match self.controller.axis_limits(eye, axis) {
                    Ok(limits) => writeln!(
                        out,
                        "{} {}: {:+.2}° to {:+.2}°",
                        eye_name(eye),
                        axis.label(),
                        limits.min,
                        limits.max
                    )?,
                    Err(AxisFailure::NotConfigured) => {}
                    Err(e) => bail!("{} {} limits: {e}", eye_name(eye), axis.label()),
                }
            }
        }
        Ok(())
    }

    pub fn set_engaged<W: Write>(&mut self, out: &mut W, engaged: bool) -> Result<()> {
        let (verb, state) = if engaged {
            ("engaging", "engaged")
        } else {
            ("disengaging", "disengaged")
        };
        self.controller
            .set_engaged(engaged)
            .map_err(|e| anyhow!("error {verb} servos: {e}"))?;
        writeln!(out, "Servos {state}")?;
        Ok(())
    }

    /// Run one command; errors are for the caller to print
    pub fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<Flow> {
        match command {
            ShellCommand::Saccade(args) => {
                let target = self.target(&args)?;
                self.move_to(out, &target)?;
            }
            ShellCommand::Profile(args) => {
                let target = self.target(&args)?;
                let request = ProfileRequest {
                    pan: target.pan,
                    tilt: target.tilt,
                    acceleration: target.acceleration,
                    max_velocity: target.max_velocity,
                };
                let run = profiler::profile_move(&mut self.controller, &request)?;
                report_moves(out, &run.moves)?;
                profiler::write_summary(out, &run)?;
                self.last_profile = Some(run);
            }
            ShellCommand::Save(name) => {
                let run = self
                    .last_profile
                    .as_ref()
                    .ok_or_else(|| anyhow!("no profile recorded yet, run 'profile' first"))?;
                let path = name.unwrap_or_else(export::default_filename);
                export::save_samples(&path, &run.profile.samples)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                writeln!(out, "Saved {} samples to {}", run.profile.len(), path.display())?;
            }
            ShellCommand::Position => self.write_position(out)?,
            ShellCommand::Limits => self.write_limits(out)?,
            ShellCommand::Zero => {
                let moves = self.controller.zero();
                report_moves(out, &moves)?;
            }
            ShellCommand::Disengage => self.set_engaged(out, false)?,
            ShellCommand::Engage => self.set_engaged(out, true)?,
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

/// Print per-eye results; fails if any axis did not move
fn report_moves<W: Write>(out: &mut W, moves: &[EyeMove]) -> Result<()> {
    let mut failed = false;
    for eye_move in moves {
        let eye = eye_name(eye_move.eye);
        if let Some(out_of_range) = eye_move.out_of_range() {
            writeln!(out, "{eye} eye: {out_of_range}")?;
            failed = true;
            continue;
        }
        for (axis, result) in [(AxisId::Pan, eye_move.pan), (AxisId::Tilt, eye_move.tilt)] {
            match result {
                Ok(degrees) => writeln!(out, "{eye} {}: {degrees:+.2}°", axis.label())?,
                Err(e) => {
                    writeln!(out, "{eye} {}: {e}", axis.label())?;
                    failed = true;
                }
            }
        }
    }
    if failed {
        bail!("move incomplete");
    }
    Ok(())
}

/// Read commands until `quit` or end of input
pub fn run<R: BufRead, W: Write>(shell: &mut Shell, input: R, out: &mut W) -> io::Result<()> {
    info!("Interactive shell started");
    writeln!(out, "Type 'help' for commands")?;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        match ShellCommand::parse(&line) {
            Ok(Some(command)) => match shell.execute(command, out) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => {
                    warn!("{e:#}");
                    writeln!(out, "Error: {e:#}")?;
                }
            },
            Ok(None) => {}
            Err(e) => writeln!(out, "Error: {e}")?,
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}
