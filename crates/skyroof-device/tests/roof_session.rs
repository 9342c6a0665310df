use bytes::BytesMut;
use skyroof_device::{
    ConnectionSupervisor, EdgeEvent, LinkState, Observatory, RoofCommand, RoofControl,
    RoofProfile, SupervisorConfig,
};
use skyroof_frame::encode_frame;
use skyroof_link::{MockOpener, MockPort};
use skyroof_telemetry::{MotionState, RoofSchema, RoofTelemetry};

fn wire(roof_state: MotionState, lock_state: MotionState) -> Vec<u8> {
    let t = RoofTelemetry {
        h_bridge_current: 0.5,
        voltage_5v: 5.0,
        voltage_12v: 12.0,
        roof_state,
        lock_state,
        ..RoofTelemetry::default()
    };
    let mut payload = BytesMut::new();
    t.encode(RoofSchema::Extended, &mut payload).unwrap();
    let mut out = BytesMut::new();
    encode_frame(&payload, &mut out);
    out.to_vec()
}

fn control(port: &MockPort) -> RoofControl<MockOpener> {
    RoofControl::new(ConnectionSupervisor::new(
        RoofProfile::new(RoofSchema::Extended),
        port.opener(),
        SupervisorConfig::new("/dev/ttyACM0"),
    ))
}

#[test]
fn full_open_close_cycle() {
    let port = MockPort::new();
    let mut obs = Observatory::new(control(&port));

    // Connect, then a lowered roof with the lock engaged.
    obs.tick();
    port.push_bytes(&wire(MotionState::Lowered, MotionState::Raised));
    let status = obs.tick();
    assert!(status.roof.telemetry_valid);
    assert!(!status.roof.permissions.allows(RoofCommand::RaiseRoof));

    // Unlock.
    obs.roof_mut().set_enabled(true).unwrap();
    obs.roof_mut().request(RoofCommand::DisengageLock).unwrap();
    port.push_bytes(&wire(MotionState::Lowered, MotionState::Lowering));
    obs.tick();
    port.push_bytes(&wire(MotionState::Lowered, MotionState::Lowered));
    let status = obs.tick();
    assert_eq!(status.roof.events, vec![EdgeEvent::Unlocked]);
    assert!(!status.roof.enabled);

    // Raise needs a fresh arming.
    assert!(obs.roof_mut().request(RoofCommand::RaiseRoof).is_err());
    obs.roof_mut().set_enabled(true).unwrap();
    obs.tick();
    obs.roof_mut().request(RoofCommand::RaiseRoof).unwrap();
    port.push_bytes(&wire(MotionState::Raising, MotionState::Lowered));
    port.push_bytes(&wire(MotionState::Raised, MotionState::Lowered));
    let status = obs.tick();
    assert_eq!(status.roof.events, vec![EdgeEvent::Raised]);
    assert!(!status.roof.enabled);
    assert_eq!(status.roof.telemetry.roof_state, MotionState::Raised);

    let written = port.take_written();
    let opcodes: Vec<u8> = written
        .chunks(4)
        .map(|c| c[3])
        .filter(|&op| op != 0xF1)
        .collect();
    assert_eq!(opcodes, vec![0xEF, 0x34, 0xEF, 0xAB]);
}

#[test]
fn frame_split_across_ticks() {
    let port = MockPort::new();
    let mut ctl = control(&port);
    ctl.tick();

    let frame = wire(MotionState::Raising, MotionState::Lowered);
    port.push_bytes(&frame[..10]);
    assert!(!ctl.tick().telemetry_valid);
    port.push_bytes(&frame[10..]);
    let status = ctl.tick();
    assert!(status.telemetry_valid);
    assert_eq!(status.telemetry.roof_state, MotionState::Raising);
}

#[test]
fn noise_and_overflow_recover() {
    let port = MockPort::new();
    let mut sup = ConnectionSupervisor::new(
        RoofProfile::new(RoofSchema::Extended),
        port.opener(),
        SupervisorConfig::new("/dev/ttyACM0"),
    );
    sup.poll();

    port.push_bytes(&[0u8; 2000]);
    port.push_bytes(&wire(MotionState::Lowered, MotionState::Lowered));

    let report = sup.poll();
    assert_eq!(report.frames, 1);
    assert_eq!(report.telemetry.roof_state, MotionState::Lowered);
    assert_eq!(sup.buffered(), 0);
    assert_eq!(port.pending_inbound(), 0);
}

#[test]
fn burst_after_partial_frame_keeps_every_frame() {
    let port = MockPort::new();
    let mut sup = ConnectionSupervisor::new(
        RoofProfile::new(RoofSchema::Extended),
        port.opener(),
        SupervisorConfig::new("/dev/ttyACM0"),
    );
    sup.poll();

    let head = wire(MotionState::Raising, MotionState::Lowered);
    port.push_bytes(&head[..12]);
    assert_eq!(sup.poll().frames, 0);
    assert_eq!(sup.buffered(), 12);

    // The tail plus 48 more frames is more than the buffer has room for.
    port.push_bytes(&head[12..]);
    for _ in 0..48 {
        port.push_bytes(&wire(MotionState::Raised, MotionState::Lowered));
    }

    let report = sup.poll();
    assert_eq!(report.frames, 49);
    assert_eq!(report.telemetry.roof_state, MotionState::Raised);
    assert_eq!(sup.buffered(), 0);
}

#[test]
fn read_fault_then_fresh_open() {
    let port = MockPort::new();
    let mut ctl = control(&port);
    ctl.tick();
    port.push_bytes(&wire(MotionState::Raised, MotionState::Lowered));
    ctl.tick();
    assert_eq!(port.open_count(), 1);

    port.fail_next_read();
    let down = ctl.tick();
    assert_eq!(down.link, LinkState::Disconnected);
    assert_eq!(down.telemetry.roof_state, MotionState::Raised);

    let up = ctl.tick();
    assert_eq!(up.link, LinkState::Connected);
    assert_eq!(port.open_count(), 2);
    assert_eq!(up.telemetry, RoofTelemetry::default());
}

#[test]
fn bytes_from_dead_link_are_discarded() {
    let port = MockPort::new();
    let mut sup = ConnectionSupervisor::new(
        RoofProfile::new(RoofSchema::Extended),
        port.opener(),
        SupervisorConfig::new("/dev/ttyACM0"),
    );
    sup.poll();

    let frame = wire(MotionState::Raised, MotionState::Lowered);
    port.push_bytes(&frame[..12]);
    sup.poll();
    assert_eq!(sup.buffered(), 12);

    port.fail_next_read();
    sup.poll();
    assert_eq!(sup.buffered(), 0);
    sup.poll();

    // Only the tail of the old frame arrives on the new link: no frame.
    port.push_bytes(&frame[12..]);
    assert_eq!(sup.poll().frames, 0);
}
