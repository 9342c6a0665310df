use std::fmt;

use serde::Serialize;
use skyroof_telemetry::{
    DecodeError, RoofSchema, RoofTelemetry, TelemetrySchema, TelescopeTelemetry, TELESCOPE_SCHEMA,
};

use crate::command::{Opcode, RoofCommand, TelescopeCommand};
use crate::edge::MotionSnapshot;

/// What a supervisor needs to know about one kind of controller.
pub trait DeviceProfile {
    /// Decoded snapshot. `Default` is the zeroed "no data" snapshot.
    type Telemetry: Copy + Default + fmt::Debug + Serialize;
    /// Commands the controller accepts.
    type Command: Opcode;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Payload layout on this link.
    fn schema(&self) -> &'static TelemetrySchema;

    /// Decode one frame payload.
    fn decode(&self, payload: &[u8]) -> Result<Self::Telemetry, DecodeError>;

    /// Motion channels for edge detection. `None` if the device reports none.
    fn motion(&self, _telemetry: &Self::Telemetry) -> Option<MotionSnapshot> {
        None
    }
}

/// Roof controller, legacy or extended firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoofProfile {
    schema: RoofSchema,
}

impl RoofProfile {
    pub fn new(schema: RoofSchema) -> Self {
        Self { schema }
    }

    pub fn roof_schema(&self) -> RoofSchema {
        self.schema
    }
}

impl DeviceProfile for RoofProfile {
    type Telemetry = RoofTelemetry;
    type Command = RoofCommand;

    fn name(&self) -> &'static str {
        "roof"
    }

    fn schema(&self) -> &'static TelemetrySchema {
        self.schema.descriptor()
    }

    fn decode(&self, payload: &[u8]) -> Result<RoofTelemetry, DecodeError> {
        RoofTelemetry::decode(self.schema, payload)
    }

    fn motion(&self, telemetry: &RoofTelemetry) -> Option<MotionSnapshot> {
        self.schema
            .reports_motion()
            .then(|| MotionSnapshot::from(telemetry))
    }
}

/// Telescope / environment controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelescopeProfile;

impl DeviceProfile for TelescopeProfile {
    type Telemetry = TelescopeTelemetry;
    type Command = TelescopeCommand;

    fn name(&self) -> &'static str {
        "telescope"
    }

    fn schema(&self) -> &'static TelemetrySchema {
        &TELESCOPE_SCHEMA
    }

    fn decode(&self, payload: &[u8]) -> Result<TelescopeTelemetry, DecodeError> {
        TelescopeTelemetry::decode(payload)
    }
}
