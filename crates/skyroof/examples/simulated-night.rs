//! Simulated night: unlock, open, and later close a roof over scripted
//! controllers, with a telescope controller alongside.
//!
//! Run with:
//!   cargo run --example simulated-night

use bytes::BytesMut;
use skyroof::device::{
    ConnectionSupervisor, Observatory, ObservatoryStatus, RoofCommand, RoofControl, RoofProfile,
    SupervisorConfig, TelescopeCommand, TelescopeProfile,
};
use skyroof::frame::encode_frame;
use skyroof::link::MockPort;
use skyroof::telemetry::{
    MotionState, RoofSchema, RoofTelemetry, SwitchState, SwitchTriad, TelescopeTelemetry,
};

fn roof_frame(roof_state: MotionState, lock_state: MotionState) -> BytesMut {
    let telemetry = RoofTelemetry {
        h_bridge_current: if roof_state.is_moving() || lock_state.is_moving() {
            2.4
        } else {
            0.0
        },
        voltage_5v: 5.02,
        voltage_12v: 12.6,
        raise_1_sw: roof_state == MotionState::Raised,
        raise_2_sw: roof_state == MotionState::Raised,
        lower_1_sw: roof_state == MotionState::Lowered,
        lower_2_sw: roof_state == MotionState::Lowered,
        roof_state,
        lock_state,
        ..RoofTelemetry::default()
    };
    let mut payload = BytesMut::new();
    // Field values always match the extended table.
    let _ = telemetry.encode(RoofSchema::Extended, &mut payload);
    let mut frame = BytesMut::new();
    encode_frame(&payload, &mut frame);
    frame
}

fn telescope_frame(cap_open: bool, temp: f32) -> BytesMut {
    let cap = if cap_open { SwitchState::On } else { SwitchState::Off };
    let telemetry = TelescopeTelemetry {
        temp_ref: temp,
        temp_1: temp - 1.5,
        lens_cap: SwitchTriad {
            driver: cap,
            manual: SwitchState::Off,
            real: cap,
        },
        ..TelescopeTelemetry::default()
    };
    let mut payload = BytesMut::new();
    let _ = telemetry.encode(&mut payload);
    let mut frame = BytesMut::new();
    encode_frame(&payload, &mut frame);
    frame
}

fn report(step: &str, status: &ObservatoryStatus) {
    let roof = &status.roof;
    eprintln!(
        "[{step:<10}] roof={} lock={} armed={} events={:?} permitted={:?}",
        roof.telemetry.roof_state,
        roof.telemetry.lock_state,
        roof.enabled,
        roof.events,
        roof.permissions.permitted(),
    );
    if let Some(scope) = &status.telescope {
        eprintln!(
            "[{step:<10}] telescope t_ref={:.1} lens_cap={}",
            scope.telemetry.temp_ref, scope.telemetry.lens_cap
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let roof_port = MockPort::new();
    let scope_port = MockPort::new();

    let roof = RoofControl::new(ConnectionSupervisor::new(
        RoofProfile::new(RoofSchema::Extended),
        roof_port.opener(),
        SupervisorConfig::new("/dev/ttyROOF"),
    ));
    let telescope = ConnectionSupervisor::new(
        TelescopeProfile,
        scope_port.opener(),
        SupervisorConfig::new("/dev/ttySCOPE"),
    );
    let mut obs = Observatory::new(roof).with_telescope(telescope);

    // Dusk: roof closed and locked, lens cap on.
    roof_port.push_bytes(&roof_frame(MotionState::Lowered, MotionState::Raised));
    scope_port.push_bytes(&telescope_frame(false, 14.0));
    obs.tick();
    report("dusk", &obs.tick());

    // Unlock.
    obs.roof_mut().set_enabled(true)?;
    obs.roof_mut().request(RoofCommand::DisengageLock)?;
    roof_port.push_bytes(&roof_frame(MotionState::Lowered, MotionState::Lowering));
    report("unlocking", &obs.tick());
    roof_port.push_bytes(&roof_frame(MotionState::Lowered, MotionState::Lowered));
    report("unlocked", &obs.tick());

    // Open the roof; the arming dropped at the lock end stop.
    obs.roof_mut().set_enabled(true)?;
    obs.roof_mut().request(RoofCommand::RaiseRoof)?;
    roof_port.push_bytes(&roof_frame(MotionState::Raising, MotionState::Lowered));
    report("raising", &obs.tick());
    roof_port.push_bytes(&roof_frame(MotionState::Raised, MotionState::Lowered));
    report("open", &obs.tick());

    obs.send_telescope(TelescopeCommand::LensCapOpen)?;
    scope_port.push_bytes(&telescope_frame(true, 11.5));
    report("observing", &obs.tick());

    // Dawn: cap on, roof down, lock on.
    obs.send_telescope(TelescopeCommand::LensCapClose)?;
    obs.roof_mut().set_enabled(true)?;
    obs.roof_mut().request(RoofCommand::LowerRoof)?;
    roof_port.push_bytes(&roof_frame(MotionState::Lowering, MotionState::Lowered));
    scope_port.push_bytes(&telescope_frame(false, 9.0));
    report("lowering", &obs.tick());
    roof_port.push_bytes(&roof_frame(MotionState::Lowered, MotionState::Lowered));
    report("closed", &obs.tick());

    obs.roof_mut().set_enabled(true)?;
    obs.roof_mut().request(RoofCommand::EngageLock)?;
    roof_port.push_bytes(&roof_frame(MotionState::Lowered, MotionState::Raised));
    report("locked", &obs.tick());

    let opcodes: Vec<String> = roof_port
        .take_written()
        .chunks(4)
        .map(|c| format!("{:02X}", c[3]))
        .collect();
    eprintln!("roof opcodes written: {}", opcodes.join(" "));
    Ok(())
}
