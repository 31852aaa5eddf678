use speedlog_transport::TransportError;

/// Errors that can occur while decoding the telemetry stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A buffer of the wrong size reached the decoder.
    ///
    /// The assembler only ever emits full packets, so this is a bug rather
    /// than bad input.
    #[error("malformed frame ({len} bytes, expected {expected})")]
    MalformedFrame { len: usize, expected: usize },

    /// The embedded CRC does not match the packet contents.
    #[error("checksum mismatch (embedded {expected:#06x}, computed {computed:#06x})")]
    ChecksumMismatch { expected: u16, computed: u16 },

    /// The byte source failed and the stream cannot continue.
    #[error("byte source unavailable: {0}")]
    ByteSourceUnavailable(#[from] TransportError),

    /// An I/O error occurred while writing packets.
    #[error("packet I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
