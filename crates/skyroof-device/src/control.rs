use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use skyroof_link::LinkOpener;
use skyroof_telemetry::RoofTelemetry;
use tracing::{info, warn};

use crate::command::RoofCommand;
use crate::edge::EdgeEvent;
use crate::error::{DeviceError, Result};
use crate::interlock::{authorize, PermissionSet};
use crate::profile::RoofProfile;
use crate::supervisor::{ConnectionSupervisor, LinkState};

/// What the roof looks like after one tick.
#[derive(Debug, Clone, Serialize)]
pub struct RoofStatus {
    pub telemetry: RoofTelemetry,
    pub link: LinkState,
    pub telemetry_valid: bool,
    pub enabled: bool,
    pub permissions: PermissionSet,
    pub events: Vec<EdgeEvent>,
}

/// Operator-facing roof control: the supervised link plus the master-enable
/// flag that arms actuation.
///
/// The flag drops on its own whenever the roof or lock reaches an end stop,
/// a stop is requested, or the link goes down. Each actuation needs a fresh
/// arming.
pub struct RoofControl<O: LinkOpener> {
    supervisor: ConnectionSupervisor<RoofProfile, O>,
    enabled: Arc<AtomicBool>,
    permissions: PermissionSet,
}

impl<O: LinkOpener> RoofControl<O> {
    pub fn new(mut supervisor: ConnectionSupervisor<RoofProfile, O>) -> Self {
        let enabled = Arc::new(AtomicBool::new(false));
        for kind in EdgeEvent::ALL {
            let flag = Arc::clone(&enabled);
            supervisor.register_edge_listener(kind, move |event| {
                if flag.swap(false, Ordering::SeqCst) {
                    info!(%event, "roof control disarmed at end of travel");
                }
            });
        }

        Self {
            supervisor,
            enabled,
            permissions: PermissionSet::default(),
        }
    }

    /// Poll the link, keep it alive, and recompute permissions.
    pub fn tick(&mut self) -> RoofStatus {
        let outcome = self.supervisor.poll();

        if outcome.link.is_connected() {
            // A failed heartbeat already dropped the link.
            let _ = self.supervisor.send_heartbeat();
        }
        let connected = self.supervisor.link_state().is_connected();
        if !connected && self.enabled.swap(false, Ordering::SeqCst) {
            warn!("roof link down; roof control disarmed");
        }

        self.permissions = authorize(&outcome.telemetry, self.is_enabled());
        RoofStatus {
            telemetry: outcome.telemetry,
            link: self.supervisor.link_state(),
            telemetry_valid: self.supervisor.telemetry_valid(),
            enabled: self.is_enabled(),
            permissions: self.permissions,
            events: outcome.events,
        }
    }

    /// Arm or disarm actuation.
    ///
    /// Any change sends `StopRoof` so motion started under the previous
    /// arming halts. Arming while disconnected is refused.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if enabled && !self.supervisor.link_state().is_connected() {
            return Err(DeviceError::NotConnected);
        }

        let previous = self.enabled.swap(enabled, Ordering::SeqCst);
        if previous == enabled {
            return Ok(());
        }
        info!(enabled, "roof control {}", if enabled { "armed" } else { "disarmed" });

        match self.supervisor.send_command(RoofCommand::StopRoof) {
            Err(DeviceError::NotConnected) => Ok(()),
            other => other,
        }
    }

    /// Send a roof command if the interlock allows it.
    pub fn request(&mut self, command: RoofCommand) -> Result<()> {
        let permissions = authorize(self.supervisor.last_telemetry(), self.is_enabled());
        if !permissions.allows(command) {
            warn!(%command, "command refused by interlock");
            return Err(DeviceError::NotPermitted(command));
        }

        if command.is_stop() {
            self.enabled.store(false, Ordering::SeqCst);
        }
        self.supervisor.send_command(command)?;
        info!(%command, "roof command sent");
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Permissions computed on the last tick.
    pub fn permissions(&self) -> PermissionSet {
        self.permissions
    }

    pub fn supervisor(&self) -> &ConnectionSupervisor<RoofProfile, O> {
        &self.supervisor
    }

    pub fn supervisor_mut(&mut self) -> &mut ConnectionSupervisor<RoofProfile, O> {
        &mut self.supervisor
    }
}
