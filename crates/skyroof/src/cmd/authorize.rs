use serde::Serialize;
use skyroof_device::{permits, RoofCommand};
use skyroof_telemetry::MotionState;

use crate::cmd::AuthorizeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{new_table, print_json, yes_no, OutputFormat};

#[derive(Serialize)]
struct Decision {
    command: RoofCommand,
    opcode: String,
    permitted: bool,
}

#[derive(Serialize)]
struct AuthorizeOutput {
    #[serde(rename = "type")]
    kind: &'static str,
    roof_state: MotionState,
    lock_state: MotionState,
    enable: bool,
    decisions: Vec<Decision>,
}

pub fn run(args: AuthorizeArgs, format: OutputFormat) -> CliResult<i32> {
    let out = evaluate(&args);
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            println!(
                "roof={} lock={} enable={}",
                out.roof_state,
                out.lock_state,
                yes_no(out.enable)
            );
            let mut table = new_table(vec!["COMMAND", "OPCODE", "PERMITTED"]);
            for d in &out.decisions {
                table.add_row(vec![
                    d.command.to_string(),
                    d.opcode.clone(),
                    yes_no(d.permitted).to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for d in &out.decisions {
                let verdict = if d.permitted { "permit" } else { "deny" };
                println!("{verdict:<6} {} ({})", d.command, d.opcode);
            }
        }
    }
    Ok(SUCCESS)
}

fn evaluate(args: &AuthorizeArgs) -> AuthorizeOutput {
    let decisions = RoofCommand::ALL
        .into_iter()
        .map(|command| Decision {
            command,
            opcode: format!("0x{:02X}", command.opcode()),
            permitted: permits(command, args.roof_state, args.lock_state, args.enable),
        })
        .collect();

    AuthorizeOutput {
        kind: "authorize",
        roof_state: args.roof_state,
        lock_state: args.lock_state,
        enable: args.enable,
        decisions,
    }
}
