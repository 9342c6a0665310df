use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use skyroof_device::{ObservatoryStatus, PermissionSet, RoofStatus, TelescopeStatus};
use skyroof_telemetry::RoofTelemetry;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    tick: u64,
    timestamp: String,
    #[serde(flatten)]
    status: &'a ObservatoryStatus,
}

pub fn print_status(tick: u64, status: &ObservatoryStatus, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&StatusOutput {
            kind: "status",
            tick,
            timestamp: now_unix_seconds(),
            status,
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec![
                "TICK", "LINK", "DATA", "ROOF", "LOCK", "12V", "5V", "MOTOR A", "SWITCHES",
                "ARMED", "PERMITTED",
            ]);
            let roof = &status.roof;
            table.add_row(vec![
                tick.to_string(),
                roof.link.to_string(),
                freshness(roof.telemetry_valid).to_string(),
                roof.telemetry.roof_state.to_string(),
                roof.telemetry.lock_state.to_string(),
                format!("{:.2}", roof.telemetry.voltage_12v),
                format!("{:.2}", roof.telemetry.voltage_5v),
                format!("{:.2}", roof.telemetry.h_bridge_current),
                switches(&roof.telemetry),
                yes_no(roof.enabled).to_string(),
                permitted_list(&roof.permissions),
            ]);
            println!("{table}");

            if let Some(scope) = &status.telescope {
                println!("{}", telescope_table(scope));
            }
        }
        OutputFormat::Pretty => {
            println!("#{tick} {}", roof_line(&status.roof));
            if let Some(scope) = &status.telescope {
                println!("#{tick} {}", telescope_line(scope));
            }
        }
    }
}

fn telescope_table(scope: &TelescopeStatus) -> Table {
    let mut table = new_table(vec![
        "LINK", "DATA", "T REF", "T 1", "LENS CAP", "FLAT", "HEATER 1", "HEATER 2", "HEATER 3",
    ]);
    let t = &scope.telemetry;
    let mut row = vec![
        scope.link.to_string(),
        freshness(scope.telemetry_valid).to_string(),
        format!("{:.1}", t.temp_ref),
        format!("{:.1}", t.temp_1),
    ];
    row.extend(t.triads().iter().map(ToString::to_string));
    table.add_row(row);
    table
}

fn roof_line(roof: &RoofStatus) -> String {
    format!(
        "roof link={} data={} roof={} lock={} 12v={:.2} 5v={:.2} motor={:.2}A {} armed={} permitted=[{}]",
        roof.link,
        freshness(roof.telemetry_valid),
        roof.telemetry.roof_state,
        roof.telemetry.lock_state,
        roof.telemetry.voltage_12v,
        roof.telemetry.voltage_5v,
        roof.telemetry.h_bridge_current,
        switches(&roof.telemetry),
        yes_no(roof.enabled),
        permitted_list(&roof.permissions),
    )
}

fn telescope_line(scope: &TelescopeStatus) -> String {
    let t = &scope.telemetry;
    format!(
        "telescope link={} data={} t_ref={:.1} t_1={:.1} lens_cap={} flat={} heaters=[{}, {}, {}]",
        scope.link,
        freshness(scope.telemetry_valid),
        t.temp_ref,
        t.temp_1,
        t.lens_cap,
        t.flat_light,
        t.heater_1,
        t.heater_2,
        t.heater_3,
    )
}

/// Limit switch bits, e.g. `raise=10 lower=00`.
pub fn switches(t: &RoofTelemetry) -> String {
    let bit = |on: bool| if on { '1' } else { '0' };
    format!(
        "raise={}{} lower={}{}",
        bit(t.raise_1_sw),
        bit(t.raise_2_sw),
        bit(t.lower_1_sw),
        bit(t.lower_2_sw)
    )
}

pub fn permitted_list(permissions: &PermissionSet) -> String {
    permissions
        .permitted()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn freshness(valid: bool) -> &'static str {
    if valid {
        "live"
    } else {
        "stale"
    }
}

pub fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use skyroof_device::authorize;
    use skyroof_telemetry::MotionState;

    use super::*;

    #[test]
    fn switch_bits() {
        let t = RoofTelemetry {
            raise_1_sw: true,
            lower_2_sw: true,
            ..RoofTelemetry::default()
        };
        assert_eq!(switches(&t), "raise=10 lower=01");
    }

    #[test]
    fn permitted_list_when_disarmed() {
        let perms = authorize(&RoofTelemetry::default(), false);
        assert_eq!(permitted_list(&perms), "stop-roof, stop-lock, heartbeat");
    }

    #[test]
    fn roof_line_mentions_states() {
        let status = RoofStatus {
            telemetry: RoofTelemetry {
                roof_state: MotionState::Raising,
                lock_state: MotionState::Lowered,
                ..RoofTelemetry::default()
            },
            link: skyroof_device::LinkState::Connected,
            telemetry_valid: true,
            enabled: true,
            permissions: PermissionSet::default(),
            events: Vec::new(),
        };
        let line = roof_line(&status);
        assert!(line.contains("roof=raising"));
        assert!(line.contains("lock=lowered"));
        assert!(line.contains("link=connected data=live"));
    }
}
