use serde::Serialize;
use skyroof_device::{RoofCommand, TelescopeCommand};
use skyroof_frame::SYNC_MARKER;
use skyroof_telemetry::{FieldSpec, SchemaKind};

use crate::cmd::InfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

#[derive(Serialize)]
struct SchemaInfo {
    name: &'static str,
    payload_len: usize,
    packet_size: usize,
    fields: &'static [FieldSpec],
}

#[derive(Serialize)]
struct OpcodeInfo {
    command: String,
    opcode: String,
}

#[derive(Serialize)]
struct InfoOutput {
    #[serde(rename = "type")]
    kind: &'static str,
    sync_marker: String,
    schemas: Vec<SchemaInfo>,
    roof_commands: Vec<OpcodeInfo>,
    telescope_commands: Vec<OpcodeInfo>,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let out = collect(&args);
    print_info(&out, format);
    Ok(SUCCESS)
}

fn collect(args: &InfoArgs) -> InfoOutput {
    let schemas = SchemaKind::ALL
        .into_iter()
        .filter(|kind| args.schema.is_none_or(|wanted| wanted == *kind))
        .map(|kind| {
            let schema = kind.descriptor();
            SchemaInfo {
                name: schema.name,
                payload_len: schema.payload_len(),
                packet_size: schema.packet_size(),
                fields: schema.fields,
            }
        })
        .collect();

    InfoOutput {
        kind: "info",
        sync_marker: hex(&SYNC_MARKER),
        schemas,
        roof_commands: RoofCommand::ALL
            .into_iter()
            .map(|c| opcode_info(c.as_str(), c.opcode()))
            .collect(),
        telescope_commands: TelescopeCommand::ALL
            .into_iter()
            .map(|c| opcode_info(c.as_str(), c.opcode()))
            .collect(),
    }
}

fn opcode_info(command: &str, opcode: u8) -> OpcodeInfo {
    OpcodeInfo {
        command: command.to_string(),
        opcode: format!("0x{opcode:02X}"),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            println!("Sync marker: {}", out.sync_marker);
            for schema in &out.schemas {
                println!(
                    "Schema {} ({} payload bytes, {} per packet):",
                    schema.name, schema.payload_len, schema.packet_size
                );
                let mut table = new_table(vec!["#", "FIELD", "KIND"]);
                for (i, field) in schema.fields.iter().enumerate() {
                    table.add_row(vec![
                        i.to_string(),
                        field.name.to_string(),
                        field.kind.as_str().to_string(),
                    ]);
                }
                println!("{table}");
            }
            for (title, commands) in [
                ("Roof commands:", &out.roof_commands),
                ("Telescope commands:", &out.telescope_commands),
            ] {
                println!("{title}");
                let mut table = new_table(vec!["COMMAND", "OPCODE"]);
                for c in commands {
                    table.add_row(vec![c.command.clone(), c.opcode.clone()]);
                }
                println!("{table}");
            }
        }
        OutputFormat::Pretty => {
            println!("sync {}", out.sync_marker);
            for schema in &out.schemas {
                let fields = schema
                    .fields
                    .iter()
                    .map(|f| format!("{}:{}", f.name, f.kind.as_str()))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("schema {} packet={} {fields}", schema.name, schema.packet_size);
            }
            for c in out.roof_commands.iter().chain(&out.telescope_commands) {
                println!("opcode {} {}", c.opcode, c.command);
            }
        }
    }
}
