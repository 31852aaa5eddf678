//! Marker-synchronised, CRC-checked telemetry packet decoding.
//!
//! This is the core of speedlog. The byte stream coming off the serial
//! link carries fixed 60-byte packets, each preceded by:
//! - A 4-byte little-endian marker (`0xFEEFFFEF`) for stream synchronization
//!
//! and each protected by a CRC-16/Modbus over everything after its first
//! two fields. Bytes flow through:
//!
//! ```text
//! SyncDetector -> PacketAssembler -> decode_frame -> validate -> RecordSink
//! ```
//!
//! [`Session`] owns all of that state and drives it one byte at a time.

pub mod assembler;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod layout;
pub mod session;
pub mod sink;
pub mod sync;
pub mod writer;

pub use assembler::{Packet, PacketAssembler};
pub use checksum::{crc16_modbus, validate, ValidatedRecord};
pub use codec::{decode_frame, encode_packet, DecodedFrame};
pub use error::{FrameError, Result};
pub use layout::{FieldValue, FIELD_COUNT, FIELD_NAMES, MARKER, MARKER_SIZE, PACKET_SIZE};
pub use session::{Session, SessionConfig, SessionStats, State, Step, StopReason};
pub use sink::RecordSink;
pub use sync::{ByteWindow, SyncDetector};
pub use writer::PacketWriter;
