use std::time::Duration;

use clap::{Args, Subcommand};
use skyroof_device::{
    ConnectionSupervisor, RoofCommand, RoofControl, RoofProfile, SupervisorConfig,
    TelescopeProfile,
};
use skyroof_link::{SerialPortOpener, DEFAULT_BAUD_RATE};
use skyroof_telemetry::{MotionState, RoofSchema};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod authorize;
pub mod info;
pub mod monitor;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Poll the controllers and print status every tick.
    Monitor(MonitorArgs),
    /// Send one roof command through the interlock.
    Send(SendArgs),
    /// Evaluate the roof interlock for a given state, offline.
    Authorize(AuthorizeArgs),
    /// Print telemetry schemas and command opcodes.
    Info(InfoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Monitor(args) => monitor::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Authorize(args) => authorize::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Roof controller connection flags shared by `monitor` and `send`.
#[derive(Args, Debug, Clone)]
pub struct RoofLinkArgs {
    /// Roof controller serial device.
    #[arg(long = "roof", value_name = "PATH", env = "SKYROOF_ROOF_DEVICE")]
    pub device: String,
    /// Roof controller firmware schema.
    #[arg(long = "roof-schema", value_name = "SCHEMA", default_value = "extended")]
    pub schema: RoofSchema,
    /// Serial line speed.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

impl RoofLinkArgs {
    pub fn control(&self) -> RoofControl<SerialPortOpener> {
        RoofControl::new(ConnectionSupervisor::new(
            RoofProfile::new(self.schema),
            SerialPortOpener,
            SupervisorConfig::new(&self.device).with_baud_rate(self.baud),
        ))
    }
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub roof: RoofLinkArgs,
    /// Telescope controller serial device.
    #[arg(long, value_name = "PATH", env = "SKYROOF_TELESCOPE_DEVICE")]
    pub telescope: Option<String>,
    /// Telescope serial line speed.
    #[arg(long, value_name = "BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub telescope_baud: u32,
    /// Tick interval (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub tick: String,
    /// Exit after N ticks.
    #[arg(long)]
    pub count: Option<u64>,
}

impl MonitorArgs {
    pub fn telescope_supervisor(
        &self,
    ) -> Option<ConnectionSupervisor<TelescopeProfile, SerialPortOpener>> {
        self.telescope.as_ref().map(|path| {
            ConnectionSupervisor::new(
                TelescopeProfile,
                SerialPortOpener,
                SupervisorConfig::new(path).with_baud_rate(self.telescope_baud),
            )
        })
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Roof command, e.g. raise-roof, stop-lock.
    pub command: RoofCommand,
    #[command(flatten)]
    pub roof: RoofLinkArgs,
    /// Arm roof control before sending.
    #[arg(long)]
    pub enable: bool,
    /// How long to wait for the controller to connect and report (e.g. 2s).
    #[arg(long, default_value = "2s")]
    pub settle: String,
    /// Tick interval while settling.
    #[arg(long, default_value = "100ms")]
    pub tick: String,
}

#[derive(Args, Debug)]
pub struct AuthorizeArgs {
    /// Roof motion state.
    #[arg(long, value_name = "STATE", default_value = "unknown")]
    pub roof_state: MotionState,
    /// Lock motion state.
    #[arg(long, value_name = "STATE", default_value = "unknown")]
    pub lock_state: MotionState,
    /// Operator master-enable flag.
    #[arg(long)]
    pub enable: bool,
}

#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    /// Only show this schema (roof-legacy, roof, telescope).
    #[arg(long)]
    pub schema: Option<skyroof_telemetry::SchemaKind>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
