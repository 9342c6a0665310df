//! Serial telemetry, motion interlocks and operator control for observatory
//! roofs and telescopes.
//!
//! # Crate Structure
//!
//! - [`link`]: serial link abstraction (real ports, scripted mock)
//! - [`frame`]: sync-marker framing over a bounded receive buffer
//! - [`telemetry`]: schema field tables and the roof/telescope snapshots
//! - [`device`]: connection supervision, edge events, interlock, roof control
//!
//! The `skyroof` binary (feature `cli`) monitors controllers and sends
//! interlocked commands from the shell.

/// Re-export link types.
pub mod link {
    pub use skyroof_link::*;
}

/// Re-export frame types.
pub mod frame {
    pub use skyroof_frame::*;
}

/// Re-export telemetry types.
pub mod telemetry {
    pub use skyroof_telemetry::*;
}

/// Re-export device types.
pub mod device {
    pub use skyroof_device::*;
}
