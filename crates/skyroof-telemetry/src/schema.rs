use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use skyroof_frame::SYNC_LEN;

use crate::error::{DecodeError, ParseError, Result};
use crate::roof::{ROOF_LEGACY_SCHEMA, ROOF_SCHEMA};
use crate::state::{MotionState, SwitchState};
use crate::telescope::TELESCOPE_SCHEMA;

/// Wire representation of one telemetry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Little-endian IEEE-754 single.
    F32,
    /// One byte; zero is false, anything else true.
    Flag,
    /// One byte holding a [`MotionState`].
    Motion,
    /// One byte holding a [`SwitchState`].
    Switch,
}

impl FieldKind {
    /// Encoded width in bytes.
    pub const fn width(self) -> usize {
        match self {
            FieldKind::F32 => 4,
            FieldKind::Flag | FieldKind::Motion | FieldKind::Switch => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::F32 => "f32",
            FieldKind::Flag => "flag",
            FieldKind::Motion => "motion",
            FieldKind::Switch => "switch",
        }
    }
}

/// One named entry in a schema's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A telemetry payload layout: name plus ordered field table.
///
/// There is no type tag on the wire, so the schema for a link comes from
/// configuration. Payload and packet sizes follow from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TelemetrySchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl TelemetrySchema {
    /// Payload bytes after the sync marker.
    pub const fn payload_len(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].kind.width();
            i += 1;
        }
        total
    }

    /// Full frame size, sync marker included.
    pub const fn packet_size(&self) -> usize {
        SYNC_LEN + self.payload_len()
    }

    /// Decode a payload by walking the field table.
    pub fn decode(&self, payload: &[u8]) -> Result<Fields> {
        let expected = self.payload_len();
        if payload.len() != expected {
            return Err(DecodeError::LengthMismatch {
                schema: self.name,
                expected,
                actual: payload.len(),
            });
        }

        let mut cursor = payload;
        let mut values = Vec::with_capacity(self.fields.len());
        for spec in self.fields {
            let value = match spec.kind {
                FieldKind::F32 => FieldValue::F32(cursor.get_f32_le()),
                FieldKind::Flag => FieldValue::Flag(cursor.get_u8() != 0),
                FieldKind::Motion => {
                    let raw = cursor.get_u8();
                    let state = MotionState::try_from(raw)
                        .map_err(|value| self.invalid_enum(spec, value))?;
                    FieldValue::Motion(state)
                }
                FieldKind::Switch => {
                    let raw = cursor.get_u8();
                    let state = SwitchState::try_from(raw)
                        .map_err(|value| self.invalid_enum(spec, value))?;
                    FieldValue::Switch(state)
                }
            };
            values.push(value);
        }

        Ok(Fields {
            schema: self.name,
            values: values.into_iter(),
        })
    }

    /// Encode field values in table order.
    ///
    /// `values` must line up one-to-one with the field table by kind.
    pub fn encode(&self, values: &[FieldValue], dst: &mut BytesMut) -> Result<()> {
        let aligned = values.len() == self.fields.len()
            && values
                .iter()
                .zip(self.fields)
                .all(|(value, spec)| value.kind() == spec.kind);
        if !aligned {
            return Err(DecodeError::SchemaMismatch { schema: self.name });
        }

        dst.reserve(self.payload_len());
        for value in values {
            match *value {
                FieldValue::F32(v) => dst.put_f32_le(v),
                FieldValue::Flag(v) => dst.put_u8(u8::from(v)),
                FieldValue::Motion(v) => dst.put_u8(u8::from(v)),
                FieldValue::Switch(v) => dst.put_u8(u8::from(v)),
            }
        }
        Ok(())
    }

    fn invalid_enum(&self, spec: &FieldSpec, value: u8) -> DecodeError {
        DecodeError::InvalidEnum {
            schema: self.name,
            field: spec.name,
            value,
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    F32(f32),
    Flag(bool),
    Motion(MotionState),
    Switch(SwitchState),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::F32(_) => FieldKind::F32,
            FieldValue::Flag(_) => FieldKind::Flag,
            FieldValue::Motion(_) => FieldKind::Motion,
            FieldValue::Switch(_) => FieldKind::Switch,
        }
    }
}

/// Decoded values of one payload, consumed in table order.
#[derive(Debug, Clone)]
pub struct Fields {
    schema: &'static str,
    values: std::vec::IntoIter<FieldValue>,
}

impl Fields {
    pub fn f32(&mut self) -> Result<f32> {
        match self.values.next() {
            Some(FieldValue::F32(v)) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    pub fn flag(&mut self) -> Result<bool> {
        match self.values.next() {
            Some(FieldValue::Flag(v)) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    pub fn motion(&mut self) -> Result<MotionState> {
        match self.values.next() {
            Some(FieldValue::Motion(v)) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    pub fn switch(&mut self) -> Result<SwitchState> {
        match self.values.next() {
            Some(FieldValue::Switch(v)) => Ok(v),
            _ => Err(self.mismatch()),
        }
    }

    /// Values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn mismatch(&self) -> DecodeError {
        DecodeError::SchemaMismatch {
            schema: self.schema,
        }
    }
}

/// The schemas a link can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    RoofLegacy,
    Roof,
    Telescope,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 3] = [
        SchemaKind::RoofLegacy,
        SchemaKind::Roof,
        SchemaKind::Telescope,
    ];

    pub fn descriptor(self) -> &'static TelemetrySchema {
        match self {
            SchemaKind::RoofLegacy => &ROOF_LEGACY_SCHEMA,
            SchemaKind::Roof => &ROOF_SCHEMA,
            SchemaKind::Telescope => &TELESCOPE_SCHEMA,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

impl FromStr for SchemaKind {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseError> {
        SchemaKind::ALL
            .into_iter()
            .find(|kind| kind.descriptor().name.eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("schema", s))
    }
}
