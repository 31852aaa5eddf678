use std::fs::File;
use std::io::BufWriter;

use speedlog_frame::{DecodedFrame, PacketWriter, MARKER_SIZE};
use tracing::info;

use crate::cmd::SynthArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};

// Bytes outside the sync alphabet, so noise never forms a marker.
const LINE_NOISE: [u8; 5] = [0x00, 0x55, 0xAA, 0x13, 0x7E];

pub fn run(args: SynthArgs) -> CliResult<i32> {
    let file = File::create(&args.output).map_err(|err| {
        io_error(&format!("cannot create {}", args.output.display()), err)
    })?;
    let mut writer = PacketWriter::new(BufWriter::new(file));

    let mut corrupted = 0u32;
    for index in 0..args.packets {
        if args.noise {
            let len = 1 + usize::from(index) % LINE_NOISE.len();
            writer
                .write_raw(&LINE_NOISE[..len])
                .map_err(|err| frame_error("write failed", err))?;
        }

        let frame = synthetic_frame(index);
        let corrupt = args.corrupt_every > 0 && (index + 1) % args.corrupt_every == 0;
        if corrupt {
            let mut staged = PacketWriter::new(Vec::new());
            staged
                .write_frame(&frame)
                .map_err(|err| frame_error("encode failed", err))?;
            let mut bytes = staged.into_inner();
            // Flip a bit in roll_target; the crc no longer matches.
            bytes[MARKER_SIZE + 4] ^= 0x01;
            writer
                .write_raw(&bytes)
                .map_err(|err| frame_error("write failed", err))?;
            corrupted += 1;
        } else {
            writer
                .write_frame(&frame)
                .map_err(|err| frame_error("write failed", err))?;
        }
    }
    writer
        .flush()
        .map_err(|err| frame_error("write failed", err))?;

    info!(
        path = %args.output.display(),
        packets = args.packets,
        corrupted,
        "synthetic stream written"
    );
    Ok(SUCCESS)
}

/// A plausible flight-controller frame that changes with `index`.
fn synthetic_frame(index: u16) -> DecodedFrame {
    let t = f32::from(index) * 0.1;
    let throttle = 1100 + index % 800;
    DecodedFrame {
        sync_echo: index,
        crc: 0,
        roll_target: (t.sin() * 30.0).round(),
        roll_meas: t.sin() * 29.5,
        pitch_target: (t.cos() * 15.0).round(),
        pitch_meas: t.cos() * 14.75,
        yaw_target: 0.0,
        yaw_meas: (t * 0.5).sin(),
        motor_target: [throttle; 4],
        motor_meas: [
            throttle.saturating_sub(3),
            throttle.saturating_sub(1),
            throttle + 1,
            throttle + 2,
        ],
        roll_in: 1500,
        pitch_in: 1500,
        yaw_in: 1500,
        throttle_in: throttle,
        engine_speed_limit: 9000,
        engine_speed_target: 3 * throttle,
        engine_speed: 3 * throttle - index % 7,
        throttle_position: (index % 101) * 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_frames_vary_by_index() {
        let a = synthetic_frame(0);
        let b = synthetic_frame(10);
        assert_eq!(a.sync_echo, 0);
        assert_eq!(b.sync_echo, 10);
        assert_ne!(a.throttle_in, b.throttle_in);
        assert!(b.engine_speed <= b.engine_speed_target);
    }

    #[test]
    fn noise_never_contains_sync_bytes() {
        assert!(LINE_NOISE
            .iter()
            .all(|b| !speedlog_frame::layout::is_sync_byte(*b)));
    }
}
