use std::fmt;
use std::str::FromStr;

use bytes::BytesMut;
use serde::Serialize;

use crate::error::{ParseError, Result};
use crate::schema::{FieldKind, FieldSpec, FieldValue, SchemaKind, TelemetrySchema};
use crate::state::MotionState;

/// Roof controller firmware without position reporting.
pub const ROOF_LEGACY_SCHEMA: TelemetrySchema = TelemetrySchema {
    name: "roof-legacy",
    fields: &[
        FieldSpec::new("h_bridge_current", FieldKind::F32),
        FieldSpec::new("voltage_5v", FieldKind::F32),
        FieldSpec::new("voltage_12v", FieldKind::F32),
        FieldSpec::new("raise_1_sw", FieldKind::Flag),
        FieldSpec::new("raise_2_sw", FieldKind::Flag),
        FieldSpec::new("lower_1_sw", FieldKind::Flag),
        FieldSpec::new("lower_2_sw", FieldKind::Flag),
    ],
};

/// Roof controller firmware reporting roof and lock motion state.
pub const ROOF_SCHEMA: TelemetrySchema = TelemetrySchema {
    name: "roof",
    fields: &[
        FieldSpec::new("h_bridge_current", FieldKind::F32),
        FieldSpec::new("voltage_5v", FieldKind::F32),
        FieldSpec::new("voltage_12v", FieldKind::F32),
        FieldSpec::new("raise_1_sw", FieldKind::Flag),
        FieldSpec::new("raise_2_sw", FieldKind::Flag),
        FieldSpec::new("lower_1_sw", FieldKind::Flag),
        FieldSpec::new("lower_2_sw", FieldKind::Flag),
        FieldSpec::new("roof_state", FieldKind::Motion),
        FieldSpec::new("lock_state", FieldKind::Motion),
    ],
};

/// Which roof firmware a link talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofSchema {
    Legacy,
    #[default]
    Extended,
}

impl RoofSchema {
    pub fn descriptor(self) -> &'static TelemetrySchema {
        match self {
            RoofSchema::Legacy => &ROOF_LEGACY_SCHEMA,
            RoofSchema::Extended => &ROOF_SCHEMA,
        }
    }

    pub fn kind(self) -> SchemaKind {
        match self {
            RoofSchema::Legacy => SchemaKind::RoofLegacy,
            RoofSchema::Extended => SchemaKind::Roof,
        }
    }

    /// Whether snapshots carry roof/lock motion state.
    pub fn reports_motion(self) -> bool {
        self == RoofSchema::Extended
    }
}

impl fmt::Display for RoofSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoofSchema::Legacy => "legacy",
            RoofSchema::Extended => "extended",
        })
    }
}

impl FromStr for RoofSchema {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "roof-legacy" => Ok(RoofSchema::Legacy),
            "extended" | "roof" => Ok(RoofSchema::Extended),
            _ => Err(ParseError::new("roof schema", s)),
        }
    }
}

/// One complete roof controller snapshot.
///
/// Snapshots are replaced whole; nothing mutates one field at a time. The
/// zeroed default is what a fresh or failed connection reports.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RoofTelemetry {
    pub h_bridge_current: f32,
    pub voltage_5v: f32,
    pub voltage_12v: f32,
    pub raise_1_sw: bool,
    pub raise_2_sw: bool,
    pub lower_1_sw: bool,
    pub lower_2_sw: bool,
    pub roof_state: MotionState,
    pub lock_state: MotionState,
}

impl RoofTelemetry {
    /// Decode a frame payload. Legacy payloads report both states as
    /// [`MotionState::Unknown`].
    pub fn decode(schema: RoofSchema, payload: &[u8]) -> Result<Self> {
        let mut fields = schema.descriptor().decode(payload)?;
        let mut telemetry = Self {
            h_bridge_current: fields.f32()?,
            voltage_5v: fields.f32()?,
            voltage_12v: fields.f32()?,
            raise_1_sw: fields.flag()?,
            raise_2_sw: fields.flag()?,
            lower_1_sw: fields.flag()?,
            lower_2_sw: fields.flag()?,
            roof_state: MotionState::Unknown,
            lock_state: MotionState::Unknown,
        };
        if schema.reports_motion() {
            telemetry.roof_state = fields.motion()?;
            telemetry.lock_state = fields.motion()?;
        }
        Ok(telemetry)
    }

    /// Field values in `schema` table order.
    pub fn to_fields(&self, schema: RoofSchema) -> Vec<FieldValue> {
        let mut values = vec![
            FieldValue::F32(self.h_bridge_current),
            FieldValue::F32(self.voltage_5v),
            FieldValue::F32(self.voltage_12v),
            FieldValue::Flag(self.raise_1_sw),
            FieldValue::Flag(self.raise_2_sw),
            FieldValue::Flag(self.lower_1_sw),
            FieldValue::Flag(self.lower_2_sw),
        ];
        if schema.reports_motion() {
            values.push(FieldValue::Motion(self.roof_state));
            values.push(FieldValue::Motion(self.lock_state));
        }
        values
    }

    /// Encode as a `schema` payload (no sync marker).
    pub fn encode(&self, schema: RoofSchema, dst: &mut BytesMut) -> Result<()> {
        schema.descriptor().encode(&self.to_fields(schema), dst)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::error::DecodeError;

    fn motion() -> impl Strategy<Value = MotionState> {
        prop::sample::select(MotionState::ALL.to_vec())
    }

    fn telemetry() -> impl Strategy<Value = RoofTelemetry> {
        (
            (-50.0f32..50.0, 0.0f32..6.0, 0.0f32..15.0),
            any::<[bool; 4]>(),
            (motion(), motion()),
        )
            .prop_map(|((current, v5, v12), sw, (roof_state, lock_state))| RoofTelemetry {
                h_bridge_current: current,
                voltage_5v: v5,
                voltage_12v: v12,
                raise_1_sw: sw[0],
                raise_2_sw: sw[1],
                lower_1_sw: sw[2],
                lower_2_sw: sw[3],
                roof_state,
                lock_state,
            })
    }

    proptest! {
        #[test]
        fn extended_payload_round_trips(original in telemetry()) {
            let mut buf = BytesMut::new();
            original.encode(RoofSchema::Extended, &mut buf).unwrap();
            prop_assert_eq!(buf.len(), ROOF_SCHEMA.payload_len());
            prop_assert_eq!(RoofTelemetry::decode(RoofSchema::Extended, &buf).unwrap(), original);
        }

        #[test]
        fn valid_extended_bytes_reencode_identically(
            analog in prop::array::uniform3(-100.0f32..100.0),
            flags in prop::array::uniform4(0u8..=1),
            states in prop::array::uniform2(0u8..=4)
        ) {
            let mut payload = Vec::with_capacity(ROOF_SCHEMA.payload_len());
            for value in analog {
                payload.extend_from_slice(&value.to_le_bytes());
            }
            payload.extend_from_slice(&flags);
            payload.extend_from_slice(&states);

            let decoded = RoofTelemetry::decode(RoofSchema::Extended, &payload).unwrap();
            let mut buf = BytesMut::new();
            decoded.encode(RoofSchema::Extended, &mut buf).unwrap();
            prop_assert_eq!(&buf[..], &payload[..]);
        }

        #[test]
        fn legacy_payload_round_trips_without_motion(original in telemetry()) {
            let mut buf = BytesMut::new();
            original.encode(RoofSchema::Legacy, &mut buf).unwrap();
            let expected = RoofTelemetry {
                roof_state: MotionState::Unknown,
                lock_state: MotionState::Unknown,
                ..original
            };
            prop_assert_eq!(RoofTelemetry::decode(RoofSchema::Legacy, &buf).unwrap(), expected);
        }
    }

    fn sample() -> RoofTelemetry {
        RoofTelemetry {
            h_bridge_current: 1.25,
            voltage_5v: 5.02,
            voltage_12v: 11.875,
            raise_1_sw: true,
            raise_2_sw: false,
            lower_1_sw: false,
            lower_2_sw: true,
            roof_state: MotionState::Raising,
            lock_state: MotionState::Lowered,
        }
    }

    #[test]
    fn extended_round_trip() {
        let original = sample();
        let mut buf = BytesMut::new();
        original.encode(RoofSchema::Extended, &mut buf).unwrap();
        assert_eq!(buf.len(), 18);
        assert_eq!(&buf[16..], &[1, 4]);

        let decoded = RoofTelemetry::decode(RoofSchema::Extended, &buf).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn legacy_round_trip_reports_unknown_states() {
        let original = sample();
        let mut buf = BytesMut::new();
        original.encode(RoofSchema::Legacy, &mut buf).unwrap();
        assert_eq!(buf.len(), 16);

        let decoded = RoofTelemetry::decode(RoofSchema::Legacy, &buf).unwrap();
        assert_eq!(decoded.h_bridge_current, original.h_bridge_current);
        assert_eq!(decoded.voltage_12v, original.voltage_12v);
        assert!(decoded.raise_1_sw && decoded.lower_2_sw);
        assert_eq!(decoded.roof_state, MotionState::Unknown);
        assert_eq!(decoded.lock_state, MotionState::Unknown);
    }

    #[test]
    fn nonzero_flag_bytes_are_true() {
        let mut payload = vec![0u8; 16];
        payload[12] = 0x80;
        payload[14] = 0xFF;
        let decoded = RoofTelemetry::decode(RoofSchema::Legacy, &payload).unwrap();
        assert!(decoded.raise_1_sw);
        assert!(!decoded.raise_2_sw);
        assert!(decoded.lower_1_sw);
        assert!(!decoded.lower_2_sw);
    }

    #[test]
    fn legacy_payload_against_extended_schema_fails() {
        let err = RoofTelemetry::decode(RoofSchema::Extended, &[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LengthMismatch {
                expected: 18,
                actual: 16,
                ..
            }
        ));
    }

    #[test]
    fn invalid_lock_state_names_field() {
        let mut payload = vec![0u8; 18];
        payload[17] = 7;
        let err = RoofTelemetry::decode(RoofSchema::Extended, &payload).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidEnum {
                field: "lock_state",
                value: 7,
                ..
            }
        ));
    }

    #[test]
    fn default_snapshot_is_zeroed() {
        let zero = RoofTelemetry::default();
        assert_eq!(zero.h_bridge_current, 0.0);
        assert!(!zero.raise_1_sw);
        assert_eq!(zero.roof_state, MotionState::Unknown);
    }

    #[test]
    fn schema_names_parse() {
        assert_eq!("legacy".parse::<RoofSchema>(), Ok(RoofSchema::Legacy));
        assert_eq!("Extended".parse::<RoofSchema>(), Ok(RoofSchema::Extended));
        assert!("v3".parse::<RoofSchema>().is_err());
        assert_eq!(RoofSchema::default().kind(), SchemaKind::Roof);
    }

    #[test]
    fn snapshot_serializes_states_lowercase() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["roof_state"], "raising");
        assert_eq!(json["lock_state"], "lowered");
        assert_eq!(json["raise_1_sw"], true);
    }
}
