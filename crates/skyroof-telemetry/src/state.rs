use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ParseError;

/// Position / travel status of the roof or of its lock.
///
/// The lock uses the same four terminal/travel states as the roof: `Raised`
/// is engaged, `Lowered` is retracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum MotionState {
    #[default]
    Unknown = 0,
    Raising = 1,
    Lowering = 2,
    Raised = 3,
    Lowered = 4,
}

impl MotionState {
    pub const ALL: [MotionState; 5] = [
        MotionState::Unknown,
        MotionState::Raising,
        MotionState::Lowering,
        MotionState::Raised,
        MotionState::Lowered,
    ];

    /// True for the two end-of-travel states.
    pub fn is_terminal(self) -> bool {
        matches!(self, MotionState::Raised | MotionState::Lowered)
    }

    /// True while travelling in either direction.
    pub fn is_moving(self) -> bool {
        matches!(self, MotionState::Raising | MotionState::Lowering)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MotionState::Unknown => "unknown",
            MotionState::Raising => "raising",
            MotionState::Lowering => "lowering",
            MotionState::Raised => "raised",
            MotionState::Lowered => "lowered",
        }
    }
}

impl TryFrom<u8> for MotionState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(MotionState::Unknown),
            1 => Ok(MotionState::Raising),
            2 => Ok(MotionState::Lowering),
            3 => Ok(MotionState::Raised),
            4 => Ok(MotionState::Lowered),
            other => Err(other),
        }
    }
}

impl From<MotionState> for u8 {
    fn from(state: MotionState) -> u8 {
        state as u8
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        MotionState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("motion state", s))
    }
}

/// Binary on/off state of a telescope-side actuator input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SwitchState {
    #[default]
    Off = 0,
    On = 1,
}

impl SwitchState {
    pub fn is_on(self) -> bool {
        self == SwitchState::On
    }
}

impl TryFrom<u8> for SwitchState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(SwitchState::Off),
            1 => Ok(SwitchState::On),
            other => Err(other),
        }
    }
}

impl From<SwitchState> for u8 {
    fn from(state: SwitchState) -> u8 {
        state as u8
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SwitchState::Off => "off",
            SwitchState::On => "on",
        })
    }
}

/// Controller view of one actuator: what the host asked for, what the
/// manual override panel asks for, and what the output actually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SwitchTriad {
    pub driver: SwitchState,
    pub manual: SwitchState,
    pub real: SwitchState,
}

impl SwitchTriad {
    /// Whether either the host or the manual panel is asking for "on".
    pub fn commanded(&self) -> SwitchState {
        if self.driver.is_on() || self.manual.is_on() {
            SwitchState::On
        } else {
            SwitchState::Off
        }
    }

    /// Output disagrees with what is being commanded.
    pub fn is_mismatched(&self) -> bool {
        self.commanded() != self.real
    }
}

impl fmt::Display for SwitchTriad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.real)?;
        if self.manual.is_on() {
            f.write_str(" (manual)")?;
        }
        if self.is_mismatched() {
            f.write_str(" !")?;
        }
        Ok(())
    }
}
