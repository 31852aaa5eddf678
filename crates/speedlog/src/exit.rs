use std::fmt;
use std::io;

use speedlog_frame::FrameError;
use speedlog_transport::TransportError;

// Exit code constants, sysexits-flavoured.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        TransportError::Open { source, .. } | TransportError::Configure { source, .. }
            if source.kind() == io::ErrorKind::PermissionDenied =>
        {
            PERMISSION_DENIED
        }
        TransportError::UnsupportedBaudRate(_) => USAGE,
        TransportError::Discovery { source, .. } => {
            return io_error(context, io::Error::new(source.kind(), err.to_string()))
        }
        TransportError::Closed => FAILURE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::ByteSourceUnavailable(err) => transport_error(context, err),
        FrameError::Io(source) => io_error(context, source),
        FrameError::ChecksumMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::MalformedFrame { .. } => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}
