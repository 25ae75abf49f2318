//! Saccade rig bench tool
//!
//! # Usage
//!
//! ```bash
//! # Centre the servos with the default zero references (90°, 90°)
//! saccade init
//!
//! # Custom zero references
//! saccade --pan-zero 100 --tilt-zero 85 init
//!
//! # Saccade to (10°, -5°), then with a faster ramp
//! saccade saccade 10 -5
//! saccade saccade 15 20 --velocity 500 --acceleration 3000
//!
//! # Record and save a motion profile
//! saccade profile 10 0 --output run.csv
//!
//! saccade position
//! saccade disengage
//!
//! # Long-running front ends
//! saccade interactive
//! saccade serve
//! saccade --preset pwm-dual-eye panel
//! ```
//!
//! `RUST_LOG=debug` shows every bus write of the trace backend.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::error;
use saccade_host::config::{Backend, HostConfig, Preset};
use saccade_host::export;
use saccade_host::interactive::{self, MoveArgs, Shell, ShellCommand};
use saccade_host::panel::{self, Panel, TerminalBackend};
use saccade_host::profiler::{self, ProfileRequest};
use saccade_host::rig::{build_controller, HostController};
use saccade_host::serve::{self, SerialSession};

/// Saccade control for servo-driven eye rigs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pan zero reference in the servo's unit (degrees or µs)
    #[arg(long, global = true)]
    pan_zero: Option<f32>,

    /// Tilt zero reference in the servo's unit (degrees or µs)
    #[arg(long, global = true)]
    tilt_zero: Option<f32>,

    /// TOML file with preset, backend and rig settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rig layout, overrides the config file
    #[arg(long, global = true, value_enum)]
    preset: Option<Preset>,

    /// Actuator backend, overrides the config file
    #[arg(long, global = true, value_enum)]
    backend: Option<Backend>,

    /// Simulate a controller that is not plugged in
    #[arg(long, global = true)]
    detached: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct Ramp {
    /// Acceleration in °/s² (default from the rig, 2000)
    #[arg(long)]
    acceleration: Option<f32>,

    /// Max velocity in °/s (default from the rig, 400)
    #[arg(long)]
    velocity: Option<f32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize servos to the zero position
    Init {
        #[command(flatten)]
        ramp: Ramp,
    },

    /// Perform a saccade to a target position
    Saccade {
        /// Target X in degrees from zero
        #[arg(allow_negative_numbers = true)]
        x: f32,
        /// Target Y in degrees from zero
        #[arg(allow_negative_numbers = true)]
        y: f32,
        #[command(flatten)]
        ramp: Ramp,
    },

    /// Perform a saccade and record its motion profile
    Profile {
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
        #[command(flatten)]
        ramp: Ramp,
        /// CSV file for the samples
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Get the current position
    Position,

    /// Disengage (power off) the servos
    Disengage,

    /// Interactive command shell
    Interactive,

    /// Serve the serial line protocol on stdin/stdout
    Serve,

    /// Emulate the button panel on the terminal
    Panel {
        /// Draw without ANSI escapes
        #[arg(long)]
        plain: bool,
    },
}

fn open_controller(args: &Args) -> Result<HostController> {
    let mut config = match &args.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    if let Some(preset) = args.preset {
        config.preset = preset;
        config.rig = None;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    let rig = config
        .resolve(args.pan_zero, args.tilt_zero)
        .context("invalid configuration")?;
    Ok(build_controller(rig, config.backend, args.detached))
}

fn move_args(x: f32, y: f32, ramp: Ramp) -> MoveArgs {
    MoveArgs {
        x,
        y,
        acceleration: ramp.acceleration,
        max_velocity: ramp.velocity,
    }
}

fn run(args: Args) -> Result<()> {
    let mut controller = open_controller(&args)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Init { ramp } => {
            let rig = controller.config();
            let acceleration = ramp.acceleration.unwrap_or(rig.acceleration);
            let velocity = ramp.velocity.unwrap_or(rig.max_velocity);
            controller
                .ensure_connected()
                .map_err(|e| anyhow::anyhow!("error connecting to servo controller: {e}"))?;
            writeln!(out, "Initializing servos to zero position...")?;
            Shell::new(controller).init(&mut out, acceleration, velocity)?;
        }
        Command::Saccade { x, y, ramp } => {
            let command = ShellCommand::Saccade(move_args(x, y, ramp));
            Shell::new(controller).execute(command, &mut out)?;
            writeln!(out, "Saccade complete")?;
        }
        Command::Profile { x, y, ramp, output } => {
            let rig = controller.config();
            let request = ProfileRequest {
                pan: x,
                tilt: y,
                acceleration: ramp.acceleration.unwrap_or(rig.acceleration),
                max_velocity: ramp.velocity.unwrap_or(rig.max_velocity),
            };
            let run = profiler::profile_move(&mut controller, &request)?;
            profiler::write_summary(&mut out, &run)?;
            let path = output.unwrap_or_else(export::default_filename);
            export::save_samples(&path, &run.profile.samples)
                .with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(out, "Saved {} samples to {}", run.profile.len(), path.display())?;
        }
        Command::Position => {
            Shell::new(controller).execute(ShellCommand::Position, &mut out)?;
        }
        Command::Disengage => {
            Shell::new(controller).execute(ShellCommand::Disengage, &mut out)?;
        }
        Command::Interactive => {
            let mut shell = Shell::new(controller);
            interactive::run(&mut shell, io::stdin().lock(), &mut out)?;
        }
        Command::Serve => {
            if let Err(e) = controller.set_engaged(true) {
                log::warn!("Servo controller unavailable: {e}");
            }
            let mut session = SerialSession::new(controller);
            serve::run(&mut session, io::stdin().lock(), &mut out)?;
        }
        Command::Panel { plain } => {
            let ansi = !plain && io::stdout().is_terminal();
            let mut panel = Panel::new(controller, TerminalBackend::new(out, ansi));
            panel::run(&mut panel, io::stdin().lock())?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
