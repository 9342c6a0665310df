use serde::Serialize;
use skyroof_link::LinkOpener;
use skyroof_telemetry::TelescopeTelemetry;

use crate::command::TelescopeCommand;
use crate::control::{RoofControl, RoofStatus};
use crate::error::{DeviceError, Result};
use crate::profile::TelescopeProfile;
use crate::supervisor::{ConnectionSupervisor, LinkState};

/// Telescope controller after one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TelescopeStatus {
    pub telemetry: TelescopeTelemetry,
    pub link: LinkState,
    pub telemetry_valid: bool,
}

/// Everything one tick produced.
#[derive(Debug, Clone, Serialize)]
pub struct ObservatoryStatus {
    pub roof: RoofStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telescope: Option<TelescopeStatus>,
}

/// The devices of one observatory, built once at startup and handed to
/// whatever drives the tick loop.
pub struct Observatory<R: LinkOpener, T: LinkOpener = R> {
    roof: RoofControl<R>,
    telescope: Option<ConnectionSupervisor<TelescopeProfile, T>>,
}

impl<R: LinkOpener> Observatory<R, R> {
    /// An observatory with only a roof controller.
    pub fn new(roof: RoofControl<R>) -> Self {
        Self {
            roof,
            telescope: None,
        }
    }
}

impl<R: LinkOpener, T: LinkOpener> Observatory<R, T> {
    /// Attach a telescope controller.
    pub fn with_telescope<U: LinkOpener>(
        self,
        telescope: ConnectionSupervisor<TelescopeProfile, U>,
    ) -> Observatory<R, U> {
        Observatory {
            roof: self.roof,
            telescope: Some(telescope),
        }
    }

    /// Tick the roof, then the telescope.
    pub fn tick(&mut self) -> ObservatoryStatus {
        let roof = self.roof.tick();
        let telescope = self.telescope.as_mut().map(|sup| {
            let outcome = sup.poll();
            if outcome.link.is_connected() {
                let _ = sup.send_heartbeat();
            }
            TelescopeStatus {
                telemetry: outcome.telemetry,
                link: sup.link_state(),
                telemetry_valid: sup.telemetry_valid(),
            }
        });
        ObservatoryStatus { roof, telescope }
    }

    /// Route a command to the telescope controller.
    pub fn send_telescope(&mut self, command: TelescopeCommand) -> Result<()> {
        match self.telescope.as_mut() {
            Some(sup) => sup.send_command(command),
            None => Err(DeviceError::NotConnected),
        }
    }

    pub fn roof(&self) -> &RoofControl<R> {
        &self.roof
    }

    pub fn roof_mut(&mut self) -> &mut RoofControl<R> {
        &mut self.roof
    }

    pub fn telescope(&self) -> Option<&ConnectionSupervisor<TelescopeProfile, T>> {
        self.telescope.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use skyroof_frame::encode_frame;
    use skyroof_link::{MockOpener, MockPort};
    use skyroof_telemetry::{RoofSchema, SwitchState, SwitchTriad};

    use super::*;
    use crate::command::RoofCommand;
    use crate::profile::RoofProfile;
    use crate::supervisor::SupervisorConfig;

    fn roof(port: &MockPort) -> RoofControl<MockOpener> {
        RoofControl::new(ConnectionSupervisor::new(
            RoofProfile::new(RoofSchema::Extended),
            port.opener(),
            SupervisorConfig::new("/dev/mock-roof"),
        ))
    }

    fn telescope(port: &MockPort) -> ConnectionSupervisor<TelescopeProfile, MockOpener> {
        ConnectionSupervisor::new(
            TelescopeProfile,
            port.opener(),
            SupervisorConfig::new("/dev/mock-scope"),
        )
    }

    #[test]
    fn roof_only() {
        let roof_port = MockPort::new();
        let mut obs = Observatory::new(roof(&roof_port));

        let status = obs.tick();
        assert_eq!(status.roof.link, LinkState::Connected);
        assert!(status.telescope.is_none());
        assert!(matches!(
            obs.send_telescope(TelescopeCommand::LightOn),
            Err(DeviceError::NotConnected)
        ));
    }

    #[test]
    fn telescope_commands_route_to_its_link() {
        let roof_port = MockPort::new();
        let scope_port = MockPort::new();
        let mut obs = Observatory::new(roof(&roof_port)).with_telescope(telescope(&scope_port));

        obs.tick();
        roof_port.take_written();
        scope_port.take_written();

        obs.send_telescope(TelescopeCommand::Heater2Enable).unwrap();
        assert_eq!(scope_port.take_written(), [0x50, 0x50, 0x50, 0x43]);
        assert!(roof_port.take_written().is_empty());
    }

    #[test]
    fn telescope_telemetry_flows_through_tick() {
        let roof_port = MockPort::new();
        let scope_port = MockPort::new();
        let mut obs = Observatory::new(roof(&roof_port)).with_telescope(telescope(&scope_port));
        obs.tick();

        let t = TelescopeTelemetry {
            temp_ref: 4.5,
            lens_cap: SwitchTriad {
                driver: SwitchState::On,
                manual: SwitchState::Off,
                real: SwitchState::On,
            },
            ..TelescopeTelemetry::default()
        };
        let mut payload = BytesMut::new();
        t.encode(&mut payload).unwrap();
        let mut wire = BytesMut::new();
        encode_frame(&payload, &mut wire);
        scope_port.push_bytes(&wire);

        let status = obs.tick();
        let scope = status.telescope.unwrap();
        assert!(scope.telemetry_valid);
        assert_eq!(scope.telemetry, t);
    }

    #[test]
    fn independent_instances() {
        let a_port = MockPort::new();
        let b_port = MockPort::new();
        let mut a = Observatory::new(roof(&a_port));
        let mut b = Observatory::new(roof(&b_port));
        a.tick();
        b.tick();

        a.roof_mut().set_enabled(true).unwrap();
        assert!(a.roof().is_enabled());
        assert!(!b.roof().is_enabled());
        assert!(matches!(
            b.roof_mut().request(RoofCommand::LowerRoof),
            Err(DeviceError::NotPermitted(_))
        ));
    }
}
