use std::ops::Deref;

use crc::{Crc, CRC_16_MODBUS};

use crate::codec::DecodedFrame;
use crate::error::{FrameError, Result};
use crate::layout::{CHECKSUM_OFFSET, PACKET_SIZE};

/// CRC-16/Modbus: poly 0x8005 reflected (0xA001), init 0xFFFF, no final XOR.
const MODBUS: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Compute the CRC-16/Modbus of `bytes`.
pub fn crc16_modbus(bytes: &[u8]) -> u16 {
    MODBUS.checksum(bytes)
}

/// A decoded frame whose checksum matched.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct ValidatedRecord(DecodedFrame);

impl ValidatedRecord {
    pub fn frame(&self) -> &DecodedFrame {
        &self.0
    }

    pub fn into_frame(self) -> DecodedFrame {
        self.0
    }
}

impl Deref for ValidatedRecord {
    type Target = DecodedFrame;

    fn deref(&self) -> &DecodedFrame {
        &self.0
    }
}

/// Check `decoded.crc` against the CRC of `packet` minus its first four bytes.
pub fn validate(packet: &[u8], decoded: DecodedFrame) -> Result<ValidatedRecord> {
    if packet.len() != PACKET_SIZE {
        return Err(FrameError::MalformedFrame {
            len: packet.len(),
            expected: PACKET_SIZE,
        });
    }

    let computed = crc16_modbus(&packet[CHECKSUM_OFFSET..]);
    if computed != decoded.crc {
        return Err(FrameError::ChecksumMismatch {
            expected: decoded.crc,
            computed,
        });
    }

    Ok(ValidatedRecord(decoded))
}
