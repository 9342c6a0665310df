use std::fmt;

use serde::Serialize;
use skyroof_frame::{FrameConfig, FrameError, FramedLink, DEFAULT_BUFFER_CAPACITY};
use skyroof_link::{LinkConfig, LinkOpener};
use tracing::{debug, info, trace, warn};

use crate::command::Opcode;
use crate::edge::{EdgeDetector, EdgeEvent, ListenerHandle};
use crate::error::{DeviceError, Result};
use crate::profile::DeviceProfile;

/// Whether the supervisor currently holds an open link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    #[default]
    Disconnected,
    Connected,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        self == LinkState::Connected
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connected => "connected",
        })
    }
}

/// Configuration for one supervised controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Where and how to open the link.
    pub link: LinkConfig,
    /// Receive buffer cap in bytes. Default: 1024.
    pub buffer_capacity: usize,
}

impl SupervisorConfig {
    pub fn new(device_path: impl Into<String>) -> Self {
        Self {
            link: LinkConfig::new(device_path),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.link.baud_rate = baud_rate;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Result of one [`ConnectionSupervisor::poll`].
#[derive(Debug, Clone, Serialize)]
pub struct PollOutcome<T> {
    /// Snapshot to show for this tick.
    pub telemetry: T,
    /// Link state after the poll.
    pub link: LinkState,
    /// Frames decoded this tick.
    pub frames: usize,
    /// Edge events fired this tick, in stream order.
    pub events: Vec<EdgeEvent>,
}

/// Owns one controller link: opens it, reads telemetry, writes commands,
/// and reopens after any fault.
///
/// Driven by [`ConnectionSupervisor::poll`] once per tick. Never blocks
/// waiting for data.
pub struct ConnectionSupervisor<P: DeviceProfile, O: LinkOpener> {
    profile: P,
    opener: O,
    config: SupervisorConfig,
    link: Option<FramedLink<O::Link>>,
    last: P::Telemetry,
    valid: bool,
    edges: EdgeDetector,
    failed_opens: u64,
}

impl<P: DeviceProfile, O: LinkOpener> ConnectionSupervisor<P, O> {
    /// Create a disconnected supervisor. Nothing is opened until the first poll.
    pub fn new(profile: P, opener: O, config: SupervisorConfig) -> Self {
        Self {
            profile,
            opener,
            config,
            link: None,
            last: P::Telemetry::default(),
            valid: false,
            edges: EdgeDetector::new(),
            failed_opens: 0,
        }
    }

    /// Advance one tick.
    ///
    /// Disconnected: try to open and report a zeroed snapshot. Connected:
    /// read what is pending and decode every complete frame in order.
    pub fn poll(&mut self) -> PollOutcome<P::Telemetry> {
        if self.link.is_none() {
            let _ = self.connect();
            return PollOutcome {
                telemetry: P::Telemetry::default(),
                link: self.link_state(),
                frames: 0,
                events: Vec::new(),
            };
        }

        let mut frames = 0;
        let mut events = Vec::new();
        if let Err(err) = self.service(&mut frames, &mut events) {
            self.drop_link(&err);
        }

        PollOutcome {
            telemetry: self.last,
            link: self.link_state(),
            frames,
            events,
        }
    }

    /// Open the link now if it is not already open.
    pub fn connect(&mut self) -> Result<()> {
        if self.link.is_some() {
            return Ok(());
        }

        match self.opener.open(&self.config.link) {
            Ok(link) => {
                let frame_config = FrameConfig {
                    packet_size: self.profile.schema().packet_size(),
                    buffer_capacity: self.config.buffer_capacity,
                };
                self.link = Some(FramedLink::new(link, frame_config));
                self.last = P::Telemetry::default();
                self.valid = false;
                info!(
                    device = self.profile.name(),
                    path = %self.config.link.device_path,
                    schema = self.profile.schema().name,
                    retries = self.failed_opens,
                    "link connected"
                );
                self.failed_opens = 0;
                Ok(())
            }
            Err(err) => {
                if self.failed_opens == 0 {
                    warn!(
                        device = self.profile.name(),
                        error = %err,
                        "link open failed; retrying every tick"
                    );
                } else {
                    trace!(
                        device = self.profile.name(),
                        error = %err,
                        attempt = self.failed_opens + 1,
                        "link open failed"
                    );
                }
                self.failed_opens += 1;
                Err(err.into())
            }
        }
    }

    fn service(
        &mut self,
        frames: &mut usize,
        events: &mut Vec<EdgeEvent>,
    ) -> std::result::Result<(), FrameError> {
        let Some(link) = self.link.as_mut() else {
            return Ok(());
        };

        // Each fill is bounded by buffer room; drain and refill until the link is dry.
        loop {
            let read = link.fill()?;
            while let Some(frame) = link.next_frame()? {
                if frame.skipped > 0 {
                    debug!(
                        device = self.profile.name(),
                        skipped = frame.skipped,
                        "resynced on sync marker"
                    );
                }

                let next = match self.profile.decode(&frame.payload) {
                    Ok(next) => next,
                    Err(err) => {
                        warn!(
                            device = self.profile.name(),
                            error = %err,
                            "dropping undecodable frame"
                        );
                        continue;
                    }
                };

                let motion = (self.profile.motion(&self.last), self.profile.motion(&next));
                if let (Some(prev), Some(curr)) = motion {
                    let fired = self.edges.observe(prev, curr);
                    for event in &fired {
                        info!(device = self.profile.name(), event = %event, "motion edge");
                    }
                    events.extend(fired);
                }

                self.last = next;
                self.valid = true;
                *frames += 1;
            }
            if read == 0 {
                break;
            }
        }

        Ok(())
    }

    /// Send one command.
    ///
    /// A write fault drops the link; the next poll reopens it.
    pub fn send_command(&mut self, command: P::Command) -> Result<()> {
        let Some(link) = self.link.as_mut() else {
            return Err(DeviceError::NotConnected);
        };

        match link.send_opcode(command.opcode()) {
            Ok(()) => {
                trace!(device = self.profile.name(), %command, "command sent");
                Ok(())
            }
            Err(err) => {
                self.drop_link(&err);
                Err(err.into())
            }
        }
    }

    /// Send the keep-alive opcode.
    pub fn send_heartbeat(&mut self) -> Result<()> {
        self.send_command(P::Command::HEARTBEAT)
    }

    /// Call `listener` every time `kind` fires on this link.
    pub fn register_edge_listener<F>(&mut self, kind: EdgeEvent, listener: F) -> ListenerHandle
    where
        F: FnMut(EdgeEvent) + Send + 'static,
    {
        self.edges.register(kind, listener)
    }

    /// Close the link. The next poll reopens it.
    pub fn disconnect(&mut self) {
        if self.link.take().is_some() {
            self.valid = false;
            info!(device = self.profile.name(), "link closed");
        }
    }

    fn drop_link(&mut self, err: &FrameError) {
        warn!(device = self.profile.name(), error = %err, "link fault; reconnecting");
        self.link = None;
        self.valid = false;
    }

    pub fn link_state(&self) -> LinkState {
        if self.link.is_some() {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    /// Most recent decoded snapshot. Kept across a link fault.
    pub fn last_telemetry(&self) -> &P::Telemetry {
        &self.last
    }

    /// Whether [`Self::last_telemetry`] came from the current link.
    pub fn telemetry_valid(&self) -> bool {
        self.valid
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }

    /// Bytes waiting in the receive buffer.
    pub fn buffered(&self) -> usize {
        self.link.as_ref().map_or(0, |link| link.buffer().len())
    }
}

impl<P, O> fmt::Debug for ConnectionSupervisor<P, O>
where
    P: DeviceProfile + fmt::Debug,
    O: LinkOpener,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSupervisor")
            .field("profile", &self.profile)
            .field("config", &self.config)
            .field("link", &self.link_state())
            .field("last", &self.last)
            .field("valid", &self.valid)
            .field("edges", &self.edges)
            .finish()
    }
}
