//! Serial telemetry datalogger.
//!
//! speedlog reads the byte stream of a telemetry link, finds packet
//! boundaries by their marker, validates each packet's CRC-16/Modbus and
//! keeps the decoded records for export as CSV.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte sources (serial devices, recorded streams) and port discovery
//! - [`frame`]: Marker sync, packet assembly, decoding, validation and the capture session
//! - [`export`]: CSV export of validated records

pub mod export;

/// Re-export transport types.
pub mod transport {
    pub use speedlog_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use speedlog_frame::*;
}
