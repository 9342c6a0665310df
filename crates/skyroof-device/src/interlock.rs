use serde::ser::{Serialize, SerializeMap, Serializer};
use skyroof_telemetry::{MotionState, RoofTelemetry};

use crate::command::RoofCommand;

/// Which roof commands may be sent right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSet {
    allowed: [bool; RoofCommand::ALL.len()],
}

impl PermissionSet {
    pub fn allows(&self, command: RoofCommand) -> bool {
        self.allowed[command.index()]
    }

    /// Every command with its decision, in [`RoofCommand::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (RoofCommand, bool)> + '_ {
        RoofCommand::ALL.into_iter().map(|cmd| (cmd, self.allows(cmd)))
    }

    /// Commands currently permitted.
    pub fn permitted(&self) -> Vec<RoofCommand> {
        self.iter().filter(|(_, ok)| *ok).map(|(cmd, _)| cmd).collect()
    }
}

impl Default for PermissionSet {
    /// Nothing armed: only stops and heartbeat.
    fn default() -> Self {
        authorize(&RoofTelemetry::default(), false)
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.allowed.len()))?;
        for (cmd, ok) in self.iter() {
            map.serialize_entry(cmd.as_str(), &ok)?;
        }
        map.end()
    }
}

/// Evaluate the interlock table for every roof command.
///
/// Pure: depends only on the snapshot's roof/lock state and the operator
/// master-enable flag.
pub fn authorize(telemetry: &RoofTelemetry, enable: bool) -> PermissionSet {
    let mut allowed = [false; RoofCommand::ALL.len()];
    for cmd in RoofCommand::ALL {
        allowed[cmd.index()] = permits(cmd, telemetry.roof_state, telemetry.lock_state, enable);
    }
    PermissionSet { allowed }
}

/// Interlock decision for a single command.
pub fn permits(command: RoofCommand, roof: MotionState, lock: MotionState, enable: bool) -> bool {
    use MotionState::*;

    // The roof only travels with the lock retracted or unreported.
    let lock_clear = matches!(lock, Lowered | Unknown);

    match command {
        RoofCommand::StopRoof | RoofCommand::StopLock | RoofCommand::Heartbeat => true,
        RoofCommand::RaiseRoof => enable && roof != Raising && roof != Raised && lock_clear,
        RoofCommand::LowerRoof => enable && roof != Lowered && roof != Raising && lock_clear,
        RoofCommand::EngageLock => enable && lock != Raised && lock != Lowering,
        RoofCommand::DisengageLock => enable && lock != Lowered && lock != Raising,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyroof_telemetry::MotionState::*;

    fn snapshot(roof: MotionState, lock: MotionState) -> RoofTelemetry {
        RoofTelemetry {
            roof_state: roof,
            lock_state: lock,
            ..RoofTelemetry::default()
        }
    }

    #[test]
    fn lowered_and_unlocked() {
        let perms = authorize(&snapshot(Lowered, Lowered), true);
        assert!(perms.allows(RoofCommand::RaiseRoof));
        assert!(!perms.allows(RoofCommand::LowerRoof));
        assert!(perms.allows(RoofCommand::StopRoof));
        assert!(perms.allows(RoofCommand::EngageLock));
        assert!(!perms.allows(RoofCommand::DisengageLock));
    }

    #[test]
    fn disabled_permits_only_stops_and_heartbeat() {
        for roof in MotionState::ALL {
            for lock in MotionState::ALL {
                let perms = authorize(&snapshot(roof, lock), false);
                assert_eq!(
                    perms.permitted(),
                    vec![RoofCommand::StopRoof, RoofCommand::StopLock, RoofCommand::Heartbeat],
                    "roof={roof} lock={lock}"
                );
            }
        }
    }

    #[test]
    fn engaged_lock_blocks_roof_motion() {
        for lock in [Raised, Raising, Lowering] {
            let perms = authorize(&snapshot(Lowered, lock), true);
            assert!(!perms.allows(RoofCommand::RaiseRoof), "lock={lock}");
            assert!(!perms.allows(RoofCommand::LowerRoof), "lock={lock}");
        }
    }

    #[test]
    fn unknown_states_allow_everything_when_armed() {
        let perms = authorize(&snapshot(Unknown, Unknown), true);
        assert_eq!(perms.permitted().len(), RoofCommand::ALL.len());
    }

    #[test]
    fn roof_travel_rules() {
        // Raising blocks both directions; lowering may be reversed.
        assert!(!permits(RoofCommand::RaiseRoof, Raising, Lowered, true));
        assert!(!permits(RoofCommand::LowerRoof, Raising, Lowered, true));
        assert!(permits(RoofCommand::RaiseRoof, Lowering, Lowered, true));
        assert!(permits(RoofCommand::LowerRoof, Lowering, Lowered, true));
        assert!(permits(RoofCommand::LowerRoof, Raised, Unknown, true));
        assert!(!permits(RoofCommand::RaiseRoof, Raised, Unknown, true));
    }

    #[test]
    fn lock_travel_rules() {
        assert!(!permits(RoofCommand::EngageLock, Lowered, Lowering, true));
        assert!(permits(RoofCommand::EngageLock, Lowered, Raising, true));
        assert!(!permits(RoofCommand::DisengageLock, Lowered, Raising, true));
        assert!(permits(RoofCommand::DisengageLock, Lowered, Raised, true));
        assert!(permits(RoofCommand::DisengageLock, Lowered, Lowering, true));
    }

    #[test]
    fn stops_ignore_state() {
        assert!(permits(RoofCommand::StopRoof, Raising, Raised, false));
        assert!(permits(RoofCommand::StopLock, Unknown, Raising, false));
    }

    #[test]
    fn default_is_disarmed() {
        let perms = PermissionSet::default();
        assert!(!perms.allows(RoofCommand::RaiseRoof));
        assert!(perms.allows(RoofCommand::Heartbeat));
    }

    #[test]
    fn serializes_as_command_map() {
        let json = serde_json::to_value(authorize(&snapshot(Lowered, Lowered), true)).unwrap();
        assert_eq!(json["raise-roof"], true);
        assert_eq!(json["lower-roof"], false);
        assert_eq!(json["stop-lock"], true);
    }
}
