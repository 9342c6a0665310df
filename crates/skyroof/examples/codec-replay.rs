//! Replay a captured roof byte stream through the `tokio_util` codec.
//!
//! Bytes arrive in uneven chunks with line noise in between, the way a
//! serial capture looks; every complete frame is decoded and printed.
//!
//! Run with:
//!   cargo run --example codec-replay --features async

use bytes::BytesMut;
use skyroof::frame::{encode_frame, SyncCodec};
use skyroof::telemetry::{MotionState, RoofSchema, RoofTelemetry};
use tokio_util::codec::{Decoder, Encoder};

fn capture() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut stream = vec![0x13, 0x37];
    for (roof_state, lock_state) in [
        (MotionState::Lowered, MotionState::Lowered),
        (MotionState::Raising, MotionState::Lowered),
        (MotionState::Raising, MotionState::Lowered),
        (MotionState::Raised, MotionState::Lowered),
    ] {
        let telemetry = RoofTelemetry {
            voltage_12v: 12.4,
            voltage_5v: 5.0,
            roof_state,
            lock_state,
            ..RoofTelemetry::default()
        };
        let mut payload = BytesMut::new();
        telemetry.encode(RoofSchema::Extended, &mut payload)?;
        let mut frame = BytesMut::new();
        encode_frame(&payload, &mut frame);
        stream.extend_from_slice(&frame);
        stream.push(0xFF);
    }
    Ok(stream)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = RoofSchema::Extended;
    let mut codec = SyncCodec::new(schema.descriptor().packet_size());
    let mut buf = BytesMut::new();

    for chunk in capture()?.chunks(7) {
        buf.extend_from_slice(chunk);
        while let Some(frame) = codec.decode(&mut buf)? {
            let telemetry = RoofTelemetry::decode(schema, &frame.payload)?;
            println!(
                "roof={} lock={} 12v={:.1} skipped={}",
                telemetry.roof_state, telemetry.lock_state, telemetry.voltage_12v, frame.skipped
            );
        }
    }

    let mut out = BytesMut::new();
    codec.encode(0xEF, &mut out)?;
    println!("stop-roof on the wire: {:02X?}", &out[..]);
    Ok(())
}
