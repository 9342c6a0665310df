use bytes::BytesMut;
use serde::Serialize;

use crate::error::Result;
use crate::schema::{FieldKind, FieldSpec, FieldValue, Fields, TelemetrySchema};
use crate::state::SwitchTriad;

/// Telescope / environment controller: two temperatures and five actuators.
pub const TELESCOPE_SCHEMA: TelemetrySchema = TelemetrySchema {
    name: "telescope",
    fields: &[
        FieldSpec::new("temp_ref", FieldKind::F32),
        FieldSpec::new("temp_1", FieldKind::F32),
        FieldSpec::new("lens_cap_driver", FieldKind::Switch),
        FieldSpec::new("lens_cap_manual", FieldKind::Switch),
        FieldSpec::new("lens_cap_real", FieldKind::Switch),
        FieldSpec::new("flat_light_driver", FieldKind::Switch),
        FieldSpec::new("flat_light_manual", FieldKind::Switch),
        FieldSpec::new("flat_light_real", FieldKind::Switch),
        FieldSpec::new("heater_1_driver", FieldKind::Switch),
        FieldSpec::new("heater_1_manual", FieldKind::Switch),
        FieldSpec::new("heater_1_real", FieldKind::Switch),
        FieldSpec::new("heater_2_driver", FieldKind::Switch),
        FieldSpec::new("heater_2_manual", FieldKind::Switch),
        FieldSpec::new("heater_2_real", FieldKind::Switch),
        FieldSpec::new("heater_3_driver", FieldKind::Switch),
        FieldSpec::new("heater_3_manual", FieldKind::Switch),
        FieldSpec::new("heater_3_real", FieldKind::Switch),
    ],
};

/// One complete telescope controller snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TelescopeTelemetry {
    pub temp_ref: f32,
    pub temp_1: f32,
    pub lens_cap: SwitchTriad,
    pub flat_light: SwitchTriad,
    pub heater_1: SwitchTriad,
    pub heater_2: SwitchTriad,
    pub heater_3: SwitchTriad,
}

impl TelescopeTelemetry {
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut fields = TELESCOPE_SCHEMA.decode(payload)?;
        Ok(Self {
            temp_ref: fields.f32()?,
            temp_1: fields.f32()?,
            lens_cap: triad(&mut fields)?,
            flat_light: triad(&mut fields)?,
            heater_1: triad(&mut fields)?,
            heater_2: triad(&mut fields)?,
            heater_3: triad(&mut fields)?,
        })
    }

    pub fn to_fields(&self) -> Vec<FieldValue> {
        let mut values = vec![FieldValue::F32(self.temp_ref), FieldValue::F32(self.temp_1)];
        for t in self.triads() {
            values.extend([
                FieldValue::Switch(t.driver),
                FieldValue::Switch(t.manual),
                FieldValue::Switch(t.real),
            ]);
        }
        values
    }

    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        TELESCOPE_SCHEMA.encode(&self.to_fields(), dst)
    }

    /// Actuators in wire order.
    pub fn triads(&self) -> [SwitchTriad; 5] {
        [
            self.lens_cap,
            self.flat_light,
            self.heater_1,
            self.heater_2,
            self.heater_3,
        ]
    }
}

fn triad(fields: &mut Fields) -> Result<SwitchTriad> {
    Ok(SwitchTriad {
        driver: fields.switch()?,
        manual: fields.switch()?,
        real: fields.switch()?,
    })
}
