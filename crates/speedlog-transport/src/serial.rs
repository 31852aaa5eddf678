use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::ByteSource;

/// Serial line settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Line speed in bits per second. Default: 115200.
    pub baud_rate: u32,
    /// Longest a single read blocks before reporting "no data".
    ///
    /// Rounded to tenths of a second and clamped to 0.1s..=25.5s (termios `VTIME`).
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// A serial device opened in raw 8N1 mode.
///
/// Reads are blocking but bounded by [`SerialConfig::read_timeout`], so a
/// silent line surfaces as `Ok(None)` from [`ByteSource::next_byte`]
/// instead of hanging the caller forever. A hung-up device is reported as
/// [`TransportError::Disconnected`].
pub struct SerialPort {
    file: File,
    path: PathBuf,
    baud_rate: u32,
    poll_timeout_ms: libc::c_int,
}

impl SerialPort {
    /// Open and configure a serial device.
    pub fn open(path: impl AsRef<Path>, config: &SerialConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let speed = baud_constant(config.baud_rate)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        configure_raw(&file, speed, config.read_timeout).map_err(|source| {
            TransportError::Configure {
                path: path.clone(),
                source,
            }
        })?;

        info!(path = %path.display(), baud = config.baud_rate, "serial port opened");

        Ok(Self {
            file,
            path,
            baud_rate: config.baud_rate,
            poll_timeout_ms: libc::c_int::from(vtime(config.read_timeout)) * 100,
        })
    }

    /// Device path this port was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured line speed.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Release the device.
    pub fn close(self) {
        info!(path = %self.path.display(), "serial port closed");
        drop(self.file);
    }
}

impl ByteSource for SerialPort {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        let events = loop {
            match poll_readable(&self.file, self.poll_timeout_ms) {
                Ok(events) => break events,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        };

        if events == 0 {
            return Ok(None);
        }
        if events & libc::POLLIN == 0 {
            // POLLHUP, POLLERR or POLLNVAL with nothing left to read.
            return Err(TransportError::Disconnected(self.path.clone()));
        }

        let mut byte = [0u8; 1];
        loop {
            match self.file.read(&mut byte) {
                // Readable but empty: the line was hung up.
                Ok(0) => return Err(TransportError::Disconnected(self.path.clone())),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

/// Wait up to `timeout_ms` for the port to become readable. Returns the
/// `revents` mask, 0 on timeout.
fn poll_readable(file: &File, timeout_ms: libc::c_int) -> std::io::Result<libc::c_short> {
    let mut pfd = libc::pollfd {
        fd: file.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };

    // SAFETY: `pfd` is a single valid pollfd for an fd owned by `file`.
    let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    match rc {
        -1 => Err(std::io::Error::last_os_error()),
        0 => Ok(0),
        _ => Ok(pfd.revents),
    }
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("path", &self.path)
            .field("baud_rate", &self.baud_rate)
            .finish()
    }
}

fn baud_constant(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        #[cfg(target_os = "linux")]
        460_800 => libc::B460800,
        #[cfg(target_os = "linux")]
        921_600 => libc::B921600,
        other => return Err(TransportError::UnsupportedBaudRate(other)),
    };
    Ok(speed)
}

fn vtime(timeout: Duration) -> libc::cc_t {
    (timeout.as_millis() / 100).clamp(1, 255) as libc::cc_t
}

fn configure_raw(file: &File, speed: libc::speed_t, read_timeout: Duration) -> std::io::Result<()> {
    let fd = file.as_raw_fd();

    // SAFETY: an all-zero termios is a valid out-parameter; tcgetattr fills it.
    let mut tty: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: `fd` is an open descriptor owned by `file`, `tty` is a valid
    // writable termios for the duration of each call.
    unsafe {
        if libc::tcgetattr(fd, &mut tty) != 0 {
            return Err(std::io::Error::last_os_error());
        }

        libc::cfmakeraw(&mut tty);
        tty.c_cflag |= libc::CLOCAL | libc::CREAD;
        tty.c_cflag &= !(libc::CSTOPB | libc::PARENB);
        tty.c_cc[libc::VMIN] = 0;
        tty.c_cc[libc::VTIME] = vtime(read_timeout);

        if libc::cfsetispeed(&mut tty, speed) != 0 || libc::cfsetospeed(&mut tty, speed) != 0 {
            return Err(std::io::Error::last_os_error());
        }
        if libc::tcsetattr(fd, libc::TCSANOW, &tty) != 0 {
            return Err(std::io::Error::last_os_error());
        }

        // Drop whatever the driver buffered before we took the port.
        if libc::tcflush(fd, libc::TCIFLUSH) != 0 {
            debug!("tcflush failed: {}", std::io::Error::last_os_error());
        }
    }

    Ok(())
}
