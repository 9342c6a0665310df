//! Telemetry schemas and binary codec for the observatory controllers.
//!
//! A schema is a named, ordered field table. The payload length follows from
//! the table, and one generic decoder/encoder walks it for every device kind.
//! Typed snapshots ([`RoofTelemetry`], [`TelescopeTelemetry`]) are built on
//! top of the decoded field values.

pub mod error;
pub mod roof;
pub mod schema;
pub mod state;
pub mod telescope;

pub use error::{DecodeError, ParseError, Result};
pub use roof::{RoofSchema, RoofTelemetry, ROOF_LEGACY_SCHEMA, ROOF_SCHEMA};
pub use schema::{FieldKind, FieldSpec, FieldValue, Fields, SchemaKind, TelemetrySchema};
pub use state::{MotionState, SwitchState, SwitchTriad};
pub use telescope::{TelescopeTelemetry, TELESCOPE_SCHEMA};
