use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use skyroof_telemetry::ParseError;

/// A command that goes on the wire as a single opcode byte.
pub trait Opcode: Copy + fmt::Debug + fmt::Display {
    /// Keep-alive sent every tick while connected.
    const HEARTBEAT: Self;

    /// The opcode byte sent after the sync marker.
    fn opcode(self) -> u8;
}

/// Roof controller command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoofCommand {
    RaiseRoof,
    LowerRoof,
    StopRoof,
    EngageLock,
    DisengageLock,
    StopLock,
    Heartbeat,
}

impl RoofCommand {
    pub const ALL: [RoofCommand; 7] = [
        RoofCommand::RaiseRoof,
        RoofCommand::LowerRoof,
        RoofCommand::StopRoof,
        RoofCommand::EngageLock,
        RoofCommand::DisengageLock,
        RoofCommand::StopLock,
        RoofCommand::Heartbeat,
    ];

    pub const fn opcode(self) -> u8 {
        match self {
            RoofCommand::RaiseRoof => 0xAB,
            RoofCommand::LowerRoof => 0xCD,
            RoofCommand::StopRoof => 0xEF,
            RoofCommand::EngageLock => 0x12,
            RoofCommand::DisengageLock => 0x34,
            RoofCommand::StopLock => 0x56,
            RoofCommand::Heartbeat => 0xF1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoofCommand::RaiseRoof => "raise-roof",
            RoofCommand::LowerRoof => "lower-roof",
            RoofCommand::StopRoof => "stop-roof",
            RoofCommand::EngageLock => "engage-lock",
            RoofCommand::DisengageLock => "disengage-lock",
            RoofCommand::StopLock => "stop-lock",
            RoofCommand::Heartbeat => "heartbeat",
        }
    }

    /// `StopRoof` or `StopLock`.
    pub fn is_stop(self) -> bool {
        matches!(self, RoofCommand::StopRoof | RoofCommand::StopLock)
    }

    /// Commands that start motion and are subject to the interlock.
    pub fn is_actuation(self) -> bool {
        matches!(
            self,
            RoofCommand::RaiseRoof
                | RoofCommand::LowerRoof
                | RoofCommand::EngageLock
                | RoofCommand::DisengageLock
        )
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Opcode for RoofCommand {
    const HEARTBEAT: Self = RoofCommand::Heartbeat;

    fn opcode(self) -> u8 {
        RoofCommand::opcode(self)
    }
}

impl fmt::Display for RoofCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoofCommand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let wanted = normalize(s);
        RoofCommand::ALL
            .into_iter()
            .find(|cmd| cmd.as_str() == wanted)
            .ok_or_else(|| ParseError::new("roof command", s))
    }
}

/// Telescope / environment controller command. Not interlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TelescopeCommand {
    LensCapOpen,
    LensCapClose,
    LightOn,
    LightOff,
    Heater1Enable,
    Heater1Disable,
    Heater2Enable,
    Heater2Disable,
    Heater3Enable,
    Heater3Disable,
    Heartbeat,
}

impl TelescopeCommand {
    pub const ALL: [TelescopeCommand; 11] = [
        TelescopeCommand::LensCapOpen,
        TelescopeCommand::LensCapClose,
        TelescopeCommand::LightOn,
        TelescopeCommand::LightOff,
        TelescopeCommand::Heater1Enable,
        TelescopeCommand::Heater1Disable,
        TelescopeCommand::Heater2Enable,
        TelescopeCommand::Heater2Disable,
        TelescopeCommand::Heater3Enable,
        TelescopeCommand::Heater3Disable,
        TelescopeCommand::Heartbeat,
    ];

    pub const fn opcode(self) -> u8 {
        match self {
            TelescopeCommand::LensCapOpen => 0x21,
            TelescopeCommand::LensCapClose => 0x22,
            TelescopeCommand::LightOn => 0x31,
            TelescopeCommand::LightOff => 0x32,
            TelescopeCommand::Heater1Enable => 0x41,
            TelescopeCommand::Heater1Disable => 0x42,
            TelescopeCommand::Heater2Enable => 0x43,
            TelescopeCommand::Heater2Disable => 0x44,
            TelescopeCommand::Heater3Enable => 0x45,
            TelescopeCommand::Heater3Disable => 0x46,
            TelescopeCommand::Heartbeat => 0xF1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TelescopeCommand::LensCapOpen => "lens-cap-open",
            TelescopeCommand::LensCapClose => "lens-cap-close",
            TelescopeCommand::LightOn => "light-on",
            TelescopeCommand::LightOff => "light-off",
            TelescopeCommand::Heater1Enable => "heater1-enable",
            TelescopeCommand::Heater1Disable => "heater1-disable",
            TelescopeCommand::Heater2Enable => "heater2-enable",
            TelescopeCommand::Heater2Disable => "heater2-disable",
            TelescopeCommand::Heater3Enable => "heater3-enable",
            TelescopeCommand::Heater3Disable => "heater3-disable",
            TelescopeCommand::Heartbeat => "heartbeat",
        }
    }
}

impl Opcode for TelescopeCommand {
    const HEARTBEAT: Self = TelescopeCommand::Heartbeat;

    fn opcode(self) -> u8 {
        TelescopeCommand::opcode(self)
    }
}

impl fmt::Display for TelescopeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TelescopeCommand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let wanted = normalize(s);
        TelescopeCommand::ALL
            .into_iter()
            .find(|cmd| cmd.as_str() == wanted)
            .ok_or_else(|| ParseError::new("telescope command", s))
    }
}

// Accepts `RAISE_ROOF`, `raise-roof`, `Raise_Roof`.
fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('_', "-")
}
