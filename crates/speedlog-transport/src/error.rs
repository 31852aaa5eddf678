use std::path::PathBuf;

/// Errors raised by byte sources.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The device opened but could not be put into raw mode.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested baud rate has no termios equivalent on this platform.
    #[error("unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// An I/O error occurred while reading from the source.
    #[error("byte source I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port enumeration failed.
    #[error("failed to enumerate ports under {path}: {source}")]
    Discovery {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The device went away mid-read (hang-up, unplugged adapter).
    #[error("serial device disconnected: {0}")]
    Disconnected(PathBuf),

    /// The source reached end of stream.
    #[error("byte source closed")]
    Closed,
}

impl TransportError {
    /// Returns true if this error only signals a normal end of stream.
    pub fn is_closed(&self) -> bool {
        matches!(self, TransportError::Closed)
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
