//! Serial port enumeration.
//!
//! Ports are discovered through sysfs: every `/sys/class/tty/<name>` entry
//! backed by a real `device` is a candidate, and the USB `manufacturer` and
//! `product` attributes are read from the device directory or its closest
//! ancestors.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TransportError};

/// Port used when nothing matching is discovered.
pub const DEFAULT_PORT: &str = "/dev/ttyAMA0";

/// Sysfs directory listing tty devices.
pub const SYSFS_TTY_ROOT: &str = "/sys/class/tty";

// USB attributes live on the usb_device, one or two levels above the
// interface the tty hangs off.
const MAX_ATTRIBUTE_DEPTH: usize = 4;

/// A discovered serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device node, e.g. `/dev/ttyACM0`.
    pub device: PathBuf,
    /// USB manufacturer string, when the port is USB backed.
    pub manufacturer: Option<String>,
    /// USB product string, when the port is USB backed.
    pub product: Option<String>,
}

/// List serial ports known to the system.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    list_ports_in(Path::new(SYSFS_TTY_ROOT), Path::new("/dev"))
}

/// List serial ports from an explicit sysfs tty root and device directory.
pub fn list_ports_in(sys_root: &Path, dev_root: &Path) -> Result<Vec<PortInfo>> {
    let entries = match std::fs::read_dir(sys_root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %sys_root.display(), "no sysfs tty root");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(TransportError::Discovery {
                path: sys_root.to_path_buf(),
                source,
            })
        }
    };

    let mut ports = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| TransportError::Discovery {
            path: sys_root.to_path_buf(),
            source,
        })?;

        // Virtual consoles and ptys have no backing device.
        let Ok(device_dir) = std::fs::canonicalize(entry.path().join("device")) else {
            continue;
        };

        let (manufacturer, product) = usb_attributes(&device_dir);
        ports.push(PortInfo {
            device: dev_root.join(entry.file_name()),
            manufacturer,
            product,
        });
    }

    ports.sort_by(|a, b| a.device.cmp(&b.device));
    Ok(ports)
}

/// Find a port whose manufacturer contains `manufacturer`.
///
/// When several ports match, the last one in device order wins.
pub fn find_port(manufacturer: &str) -> Result<Option<PortInfo>> {
    Ok(select_by_manufacturer(list_ports()?, manufacturer))
}

/// Pick the last port whose manufacturer contains `manufacturer`.
pub fn select_by_manufacturer(ports: Vec<PortInfo>, manufacturer: &str) -> Option<PortInfo> {
    ports.into_iter().rev().find(|port| {
        port.manufacturer
            .as_deref()
            .is_some_and(|m| m.contains(manufacturer))
    })
}

fn usb_attributes(device_dir: &Path) -> (Option<String>, Option<String>) {
    for dir in device_dir.ancestors().take(MAX_ATTRIBUTE_DEPTH) {
        if let Some(manufacturer) = read_attribute(&dir.join("manufacturer")) {
            return (Some(manufacturer), read_attribute(&dir.join("product")));
        }
    }
    (None, None)
}

fn read_attribute(path: &Path) -> Option<String> {
    let value = std::fs::read_to_string(path).ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
