//! Byte sources for serial telemetry capture.
//!
//! Provides a unified, byte-at-a-time interface over the places telemetry
//! bytes come from:
//! - Serial devices configured for raw 8N1 at a fixed baud rate (Unix)
//! - Any `Read` implementation, e.g. a recorded capture file
//!
//! This is the lowest layer of speedlog. The decoder pulls from the
//! [`ByteSource`] trait defined here and never opens devices itself.

pub mod discovery;
pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod serial;

pub use discovery::{find_port, list_ports, PortInfo, DEFAULT_PORT};
pub use error::{Result, TransportError};
pub use traits::{ByteSource, ReaderSource};

#[cfg(unix)]
pub use serial::{SerialConfig, SerialPort};
