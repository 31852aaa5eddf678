//! Wire constants and the packet schema.
//!
//! ```text
//! ┌──────────────┬───────────────┬──────────────────────────────────────┐
//! │ Marker (4B)  │ sync (2B LE)  │ crc (2B LE) │ body (56B, CRC'd)      │
//! │ 0xFEEFFFEF   │               │             │ 6 × f32, 16 × u16      │
//! └──────────────┴───────────────┴──────────────────────────────────────┘
//!                 └────────────────── packet, 60 bytes ─────────────────┘
//! ```

use std::fmt;

/// Stream marker, read as a little-endian u32.
pub const MARKER: u32 = 0xFEEF_FFEF;

/// Marker length on the wire.
pub const MARKER_SIZE: usize = 4;

/// Packet length following a marker.
pub const PACKET_SIZE: usize = 60;

/// Leading packet bytes (`sync` and `crc`) excluded from the checksum.
pub const CHECKSUM_OFFSET: usize = 4;

/// Byte values the marker is drawn from. Everything else is invisible to sync.
pub const SYNC_ALPHABET: [u8; 3] = [0xEF, 0xFE, 0xFF];

/// Number of decoded fields.
pub const FIELD_COUNT: usize = 24;

/// Column names in wire order.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "sync",
    "crc",
    "roll_target",
    "roll_meas",
    "pitch_target",
    "pitch_meas",
    "yaw_target",
    "yaw_meas",
    "V1(FL)_target",
    "V2(FL)_target",
    "V3(FL)_target",
    "V4(FL)_target",
    "V1(FL)_meas",
    "V2(FL)_meas",
    "V3(FL)_meas",
    "V4(FL)_meas",
    "roll_in",
    "pitch_in",
    "yaw_in",
    "throttle_in",
    "engine_speed_limit",
    "engine_speed_target",
    "engine_speed",
    "throttle_position",
];

/// Returns true if `byte` can take part in a marker.
pub fn is_sync_byte(byte: u8) -> bool {
    SYNC_ALPHABET.contains(&byte)
}

/// A single decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    U16(u16),
    F32(f32),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::U16(v) => write!(f, "{v}"),
            FieldValue::F32(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_bytes_are_in_alphabet() {
        assert!(MARKER.to_le_bytes().iter().all(|b| is_sync_byte(*b)));
        assert_eq!(MARKER.to_le_bytes(), [0xEF, 0xFF, 0xEF, 0xFE]);
    }

    #[test]
    fn field_sizes_add_up() {
        assert_eq!(2 + 2 + 6 * 4 + 16 * 2, PACKET_SIZE);
        assert_eq!(2 + 6 + 16, FIELD_COUNT);
    }

    #[test]
    fn header_starts_with_sync_and_crc() {
        assert_eq!(&FIELD_NAMES[..2], &["sync", "crc"]);
        assert_eq!(FIELD_NAMES[FIELD_COUNT - 1], "throttle_position");
    }

    #[test]
    fn values_display_plainly() {
        assert_eq!(FieldValue::U16(42).to_string(), "42");
        assert_eq!(FieldValue::F32(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::F32(-0.25).to_string(), "-0.25");
    }
}
