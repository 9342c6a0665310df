//! Device layer for observatory controllers.
//!
//! One generic [`ConnectionSupervisor`] drives any controller described by a
//! [`DeviceProfile`]: it owns the serial link, reopens it after faults, decodes
//! telemetry and fires motion [`EdgeEvent`]s. On top of that sit the roof
//! interlock ([`authorize`]), operator roof control ([`RoofControl`]) and the
//! [`Observatory`] context tying the controllers together.

pub mod command;
pub mod control;
pub mod edge;
pub mod error;
pub mod interlock;
pub mod observatory;
pub mod profile;
pub mod supervisor;

pub use command::{Opcode, RoofCommand, TelescopeCommand};
pub use control::{RoofControl, RoofStatus};
pub use edge::{detect, EdgeDetector, EdgeEvent, ListenerHandle, MotionSnapshot};
pub use error::{DeviceError, Result};
pub use interlock::{authorize, permits, PermissionSet};
pub use observatory::{Observatory, ObservatoryStatus, TelescopeStatus};
pub use profile::{DeviceProfile, RoofProfile, TelescopeProfile};
pub use supervisor::{ConnectionSupervisor, LinkState, PollOutcome, SupervisorConfig};
