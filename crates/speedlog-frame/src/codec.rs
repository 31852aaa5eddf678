use bytes::{Buf, BufMut, BytesMut};

use crate::checksum::crc16_modbus;
use crate::error::{FrameError, Result};
use crate::layout::{FieldValue, CHECKSUM_OFFSET, FIELD_COUNT, MARKER, MARKER_SIZE, PACKET_SIZE};

/// One telemetry packet, decoded.
///
/// Field order matches the wire and [`FIELD_NAMES`](crate::layout::FIELD_NAMES).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedFrame {
    /// Echo of the sender's sync counter.
    pub sync_echo: u16,
    /// CRC-16/Modbus of the packet body as computed by the sender.
    pub crc: u16,
    pub roll_target: f32,
    pub roll_meas: f32,
    pub pitch_target: f32,
    pub pitch_meas: f32,
    pub yaw_target: f32,
    pub yaw_meas: f32,
    /// V1..V4 (FL) targets.
    pub motor_target: [u16; 4],
    /// V1..V4 (FL) measurements.
    pub motor_meas: [u16; 4],
    pub roll_in: u16,
    pub pitch_in: u16,
    pub yaw_in: u16,
    pub throttle_in: u16,
    pub engine_speed_limit: u16,
    pub engine_speed_target: u16,
    pub engine_speed: u16,
    pub throttle_position: u16,
}

impl DecodedFrame {
    /// All fields in wire order.
    pub fn columns(&self) -> [FieldValue; FIELD_COUNT] {
        use FieldValue::{F32, U16};

        let [t1, t2, t3, t4] = self.motor_target;
        let [m1, m2, m3, m4] = self.motor_meas;
        [
            U16(self.sync_echo),
            U16(self.crc),
            F32(self.roll_target),
            F32(self.roll_meas),
            F32(self.pitch_target),
            F32(self.pitch_meas),
            F32(self.yaw_target),
            F32(self.yaw_meas),
            U16(t1),
            U16(t2),
            U16(t3),
            U16(t4),
            U16(m1),
            U16(m2),
            U16(m3),
            U16(m4),
            U16(self.roll_in),
            U16(self.pitch_in),
            U16(self.yaw_in),
            U16(self.throttle_in),
            U16(self.engine_speed_limit),
            U16(self.engine_speed_target),
            U16(self.engine_speed),
            U16(self.throttle_position),
        ]
    }
}

/// Decode a packet.
///
/// Layout (little-endian, packed): `u16 u16 f32×6 u16×16`.
pub fn decode_frame(packet: &[u8]) -> Result<DecodedFrame> {
    if packet.len() != PACKET_SIZE {
        return Err(FrameError::MalformedFrame {
            len: packet.len(),
            expected: PACKET_SIZE,
        });
    }

    let mut src = packet;
    Ok(DecodedFrame {
        sync_echo: src.get_u16_le(),
        crc: src.get_u16_le(),
        roll_target: src.get_f32_le(),
        roll_meas: src.get_f32_le(),
        pitch_target: src.get_f32_le(),
        pitch_meas: src.get_f32_le(),
        yaw_target: src.get_f32_le(),
        yaw_meas: src.get_f32_le(),
        motor_target: get_quad(&mut src),
        motor_meas: get_quad(&mut src),
        roll_in: src.get_u16_le(),
        pitch_in: src.get_u16_le(),
        yaw_in: src.get_u16_le(),
        throttle_in: src.get_u16_le(),
        engine_speed_limit: src.get_u16_le(),
        engine_speed_target: src.get_u16_le(),
        engine_speed: src.get_u16_le(),
        throttle_position: src.get_u16_le(),
    })
}

fn get_quad(src: &mut &[u8]) -> [u16; 4] {
    [
        src.get_u16_le(),
        src.get_u16_le(),
        src.get_u16_le(),
        src.get_u16_le(),
    ]
}

/// Encode a frame as it appears on the wire: marker followed by the packet.
///
/// The `crc` field of `frame` is ignored; the checksum is computed over the
/// encoded body and written in its place. Returns that checksum.
///
/// ```text
/// ┌──────────────┬──────────┬──────────┬────────────────────┐
/// │ Marker (4B)  │ sync     │ crc      │ body (56B)         │
/// │ EF FF EF FE  │ (2B LE)  │ (2B LE)  │ f32×6, u16×16 (LE) │
/// └──────────────┴──────────┴──────────┴────────────────────┘
/// ```
pub fn encode_packet(frame: &DecodedFrame, dst: &mut BytesMut) -> u16 {
    let start = dst.len();
    dst.reserve(MARKER_SIZE + PACKET_SIZE);

    dst.put_u32_le(MARKER);
    dst.put_u16_le(frame.sync_echo);
    dst.put_u16_le(0);

    for value in [
        frame.roll_target,
        frame.roll_meas,
        frame.pitch_target,
        frame.pitch_meas,
        frame.yaw_target,
        frame.yaw_meas,
    ] {
        dst.put_f32_le(value);
    }
    for value in frame.motor_target.iter().chain(frame.motor_meas.iter()) {
        dst.put_u16_le(*value);
    }
    for value in [
        frame.roll_in,
        frame.pitch_in,
        frame.yaw_in,
        frame.throttle_in,
        frame.engine_speed_limit,
        frame.engine_speed_target,
        frame.engine_speed,
        frame.throttle_position,
    ] {
        dst.put_u16_le(value);
    }

    let crc_at = start + MARKER_SIZE + 2;
    let body_at = start + MARKER_SIZE + CHECKSUM_OFFSET;
    let crc = crc16_modbus(&dst[body_at..]);
    dst[crc_at..body_at].copy_from_slice(&crc.to_le_bytes());
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DecodedFrame {
        DecodedFrame {
            sync_echo: 7,
            crc: 0,
            roll_target: 1.5,
            roll_meas: -2.25,
            pitch_target: 0.125,
            pitch_meas: 3.0,
            yaw_target: -0.5,
            yaw_meas: 100.75,
            motor_target: [1000, 1100, 1200, 1300],
            motor_meas: [990, 1090, 1190, 1290],
            roll_in: 1500,
            pitch_in: 1501,
            yaw_in: 1502,
            throttle_in: 1100,
            engine_speed_limit: 9000,
            engine_speed_target: 6000,
            engine_speed: 5980,
            throttle_position: 42,
        }
    }

    #[test]
    fn decodes_fields_at_documented_offsets() {
        let mut packet = [0u8; PACKET_SIZE];
        packet[0..2].copy_from_slice(&7u16.to_le_bytes());
        packet[2..4].copy_from_slice(&0xBEEFu16.to_le_bytes());
        packet[4..8].copy_from_slice(&1.5f32.to_le_bytes());
        packet[24..28].copy_from_slice(&(-8.0f32).to_le_bytes());
        packet[28..30].copy_from_slice(&11u16.to_le_bytes());
        packet[36..38].copy_from_slice(&22u16.to_le_bytes());
        packet[44..46].copy_from_slice(&33u16.to_le_bytes());
        packet[52..54].copy_from_slice(&44u16.to_le_bytes());
        packet[58..60].copy_from_slice(&55u16.to_le_bytes());

        let frame = decode_frame(&packet).unwrap();
        assert_eq!(frame.sync_echo, 7);
        assert_eq!(frame.crc, 0xBEEF);
        assert_eq!(frame.roll_target, 1.5);
        assert_eq!(frame.yaw_meas, -8.0);
        assert_eq!(frame.motor_target, [11, 0, 0, 0]);
        assert_eq!(frame.motor_meas, [22, 0, 0, 0]);
        assert_eq!(frame.roll_in, 33);
        assert_eq!(frame.engine_speed_limit, 44);
        assert_eq!(frame.throttle_position, 55);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = decode_frame(&[0u8; PACKET_SIZE - 1]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::MalformedFrame {
                len: 59,
                expected: PACKET_SIZE
            }
        ));
        assert!(decode_frame(&[0u8; PACKET_SIZE + 1]).is_err());
        assert!(decode_frame(&[]).is_err());
    }

    #[test]
    fn encode_writes_marker_and_checksum() {
        let mut wire = BytesMut::new();
        let crc = encode_packet(&sample(), &mut wire);

        assert_eq!(wire.len(), MARKER_SIZE + PACKET_SIZE);
        assert_eq!(&wire[..MARKER_SIZE], &MARKER.to_le_bytes());

        let decoded = decode_frame(&wire[MARKER_SIZE..]).unwrap();
        assert_eq!(decoded.crc, crc);
        assert_eq!(crc, crc16_modbus(&wire[MARKER_SIZE + CHECKSUM_OFFSET..]));
        assert_eq!(DecodedFrame { crc: 0, ..decoded }, sample());
    }

    #[test]
    fn encode_appends_after_existing_bytes() {
        let mut wire = BytesMut::from(&[0x01, 0x02, 0x03][..]);
        encode_packet(&sample(), &mut wire);
        encode_packet(&sample(), &mut wire);

        let first = &wire[3..3 + MARKER_SIZE + PACKET_SIZE];
        let second = &wire[3 + MARKER_SIZE + PACKET_SIZE..];
        assert_eq!(first, second);
    }

    #[test]
    fn columns_follow_wire_order() {
        let columns = sample().columns();
        assert_eq!(columns[0], FieldValue::U16(7));
        assert_eq!(columns[2], FieldValue::F32(1.5));
        assert_eq!(columns[8], FieldValue::U16(1000));
        assert_eq!(columns[15], FieldValue::U16(1290));
        assert_eq!(columns[16], FieldValue::U16(1500));
        assert_eq!(columns[23], FieldValue::U16(42));
    }
}
