use bytes::{BufMut, Bytes, BytesMut};

use crate::layout::PACKET_SIZE;

/// A complete, immutable packet of exactly [`PACKET_SIZE`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet(Bytes);

impl Packet {
    /// The packet bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Collects the bytes following a marker into one packet.
///
/// The assembler knows nothing about markers. The session resets it
/// whenever the sync detector fires, which abandons whatever was collected.
#[derive(Debug)]
pub struct PacketAssembler {
    buf: BytesMut,
}

impl PacketAssembler {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(PACKET_SIZE),
        }
    }

    /// Discard any partially collected packet.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Append a byte. Returns the packet once [`PACKET_SIZE`] bytes are in.
    pub fn feed(&mut self, byte: u8) -> Option<Packet> {
        self.buf.put_u8(byte);
        if self.buf.len() < PACKET_SIZE {
            return None;
        }

        let packet = Packet(self.buf.split().freeze());
        self.buf.reserve(PACKET_SIZE);
        Some(packet)
    }

    /// Bytes collected so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for PacketAssembler {
    fn default() -> Self {
        Self::new()
    }
}
