use std::time::Instant;

use serde::Serialize;
use skyroof_device::{RoofCommand, RoofControl, RoofStatus};
use skyroof_link::LinkOpener;
use skyroof_telemetry::RoofTelemetry;

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{device_error, CliError, CliResult, LINK_ERROR, SUCCESS, TIMEOUT};
use crate::output::{new_table, print_json, switches, OutputFormat};

#[derive(Serialize)]
struct SendOutput {
    #[serde(rename = "type")]
    kind: &'static str,
    command: RoofCommand,
    opcode: String,
    telemetry: RoofTelemetry,
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let settle = parse_duration(&args.settle)?;
    let tick = parse_duration(&args.tick)?;
    let mut control = args.roof.control();

    let status = settle_link(&mut control, settle, tick)?;

    if args.enable && args.command.is_actuation() {
        control
            .set_enabled(true)
            .map_err(|err| device_error("arm failed", err))?;
    }
    control
        .request(args.command)
        .map_err(|err| device_error("send failed", err))?;

    print_sent(
        &SendOutput {
            kind: "sent",
            command: args.command,
            opcode: format!("0x{:02X}", args.command.opcode()),
            telemetry: status.telemetry,
        },
        format,
    );
    Ok(SUCCESS)
}

/// Tick until the controller is connected and has reported, or give up
/// once `settle` has elapsed.
fn settle_link<O: LinkOpener>(
    control: &mut RoofControl<O>,
    settle: std::time::Duration,
    tick: std::time::Duration,
) -> CliResult<RoofStatus> {
    let start = Instant::now();
    loop {
        let status = control.tick();
        if status.link.is_connected() && status.telemetry_valid {
            return Ok(status);
        }
        if start.elapsed() >= settle {
            let path = &control.supervisor().config().link.device_path;
            return Err(if status.link.is_connected() {
                CliError::new(TIMEOUT, format!("no telemetry from {path} after {settle:?}"))
            } else {
                CliError::new(LINK_ERROR, format!("could not open {path} within {settle:?}"))
            });
        }
        std::thread::sleep(tick);
    }
}

fn print_sent(out: &SendOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["COMMAND", "OPCODE", "ROOF", "LOCK", "SWITCHES"]);
            table.add_row(vec![
                out.command.to_string(),
                out.opcode.clone(),
                out.telemetry.roof_state.to_string(),
                out.telemetry.lock_state.to_string(),
                switches(&out.telemetry),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sent {} ({}) roof={} lock={}",
                out.command, out.opcode, out.telemetry.roof_state, out.telemetry.lock_state
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::BytesMut;
    use skyroof_device::{ConnectionSupervisor, RoofProfile, SupervisorConfig};
    use skyroof_frame::encode_frame;
    use skyroof_link::{MockOpener, MockPort};
    use skyroof_telemetry::{MotionState, RoofSchema};

    use super::*;

    fn control(port: &MockPort) -> RoofControl<MockOpener> {
        RoofControl::new(ConnectionSupervisor::new(
            RoofProfile::new(RoofSchema::Extended),
            port.opener(),
            SupervisorConfig::new("/dev/ttyACM0"),
        ))
    }

    fn lowered_frame() -> Vec<u8> {
        let t = RoofTelemetry {
            roof_state: MotionState::Lowered,
            lock_state: MotionState::Lowered,
            ..RoofTelemetry::default()
        };
        let mut payload = BytesMut::new();
        t.encode(RoofSchema::Extended, &mut payload).unwrap();
        let mut out = BytesMut::new();
        encode_frame(&payload, &mut out);
        out.to_vec()
    }

    #[test]
    fn settles_once_telemetry_arrives() {
        let port = MockPort::new();
        port.push_bytes(&lowered_frame());
        let mut ctl = control(&port);

        let status = settle_link(&mut ctl, Duration::from_secs(1), Duration::from_millis(1))
            .expect("link should settle");
        assert_eq!(status.telemetry.roof_state, MotionState::Lowered);
    }

    #[test]
    fn silent_controller_times_out() {
        let port = MockPort::new();
        let mut ctl = control(&port);

        let err = settle_link(&mut ctl, Duration::from_millis(5), Duration::from_millis(1))
            .expect_err("no telemetry should time out");
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn unopenable_controller_is_a_link_error() {
        let port = MockPort::new();
        port.refuse_opens(usize::MAX);
        let mut ctl = control(&port);

        let err = settle_link(&mut ctl, Duration::from_millis(5), Duration::from_millis(1))
            .expect_err("open failures should surface");
        assert_eq!(err.code, LINK_ERROR);
    }
}
