use std::io::{ErrorKind, Read};

use crate::error::{Result, TransportError};

/// A blocking, byte-at-a-time source of telemetry bytes.
///
/// Implementations block until a byte is available or their read timeout
/// elapses. A timeout is reported as `Ok(None)` so the consumer can check
/// for cancellation before asking again.
pub trait ByteSource {
    /// Read the next byte.
    ///
    /// Returns `Err(TransportError::Closed)` once the source is exhausted.
    fn next_byte(&mut self) -> Result<Option<u8>>;
}

/// Adapts any `Read` stream into a [`ByteSource`].
///
/// Used for recorded captures and in-memory buffers. EOF maps to
/// [`TransportError::Closed`]; `WouldBlock` and `TimedOut` map to `Ok(None)`.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Borrow the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the source and return the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    return Ok(None)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn yields_bytes_then_closed() {
        let mut source = ReaderSource::new(Cursor::new(vec![0xEF, 0x01]));

        assert_eq!(source.next_byte().unwrap(), Some(0xEF));
        assert_eq!(source.next_byte().unwrap(), Some(0x01));
        let err = source.next_byte().unwrap_err();
        assert!(err.is_closed());
    }

    #[test]
    fn interrupted_read_retries() {
        let mut source = ReaderSource::new(Scripted::new(vec![
            Err(ErrorKind::Interrupted),
            Ok(0x42),
        ]));
        assert_eq!(source.next_byte().unwrap(), Some(0x42));
    }

    #[test]
    fn timeout_reports_no_data() {
        let mut source = ReaderSource::new(Scripted::new(vec![
            Err(ErrorKind::TimedOut),
            Err(ErrorKind::WouldBlock),
            Ok(0x07),
        ]));
        assert_eq!(source.next_byte().unwrap(), None);
        assert_eq!(source.next_byte().unwrap(), None);
        assert_eq!(source.next_byte().unwrap(), Some(0x07));
    }

    #[test]
    fn hard_io_error_propagates() {
        let mut source = ReaderSource::new(Scripted::new(vec![Err(ErrorKind::BrokenPipe)]));
        let err = source.next_byte().unwrap_err();
        assert!(matches!(err, TransportError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    struct Scripted {
        steps: std::collections::VecDeque<std::result::Result<u8, ErrorKind>>,
    }

    impl Scripted {
        fn new(steps: Vec<std::result::Result<u8, ErrorKind>>) -> Self {
            Self {
                steps: steps.into(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.steps.pop_front() {
                None => Ok(0),
                Some(Ok(byte)) => {
                    buf[0] = byte;
                    Ok(1)
                }
                Some(Err(kind)) => Err(std::io::Error::from(kind)),
            }
        }
    }
}
