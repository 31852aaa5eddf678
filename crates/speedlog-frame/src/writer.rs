use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_packet, DecodedFrame};
use crate::error::Result;
use crate::layout::{MARKER_SIZE, PACKET_SIZE};

/// Writes marker-framed packets to any `Write` stream.
///
/// This is the sending side of the link: device emulation, loopback tests
/// and synthetic capture files.
pub struct PacketWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> PacketWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MARKER_SIZE + PACKET_SIZE),
        }
    }

    /// Encode and write one frame. Returns the checksum that was sent.
    pub fn write_frame(&mut self, frame: &DecodedFrame) -> Result<u16> {
        self.buf.clear();
        let crc = encode_packet(frame, &mut self.buf);
        write_all(&mut self.inner, &self.buf)?;
        Ok(crc)
    }

    /// Write bytes as-is, e.g. line noise between packets.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        write_all(&mut self.inner, bytes)
    }

    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn write_all<T: Write>(inner: &mut T, mut bytes: &[u8]) -> Result<()> {
    while !bytes.is_empty() {
        match inner.write(bytes) {
            Ok(0) => return Err(std::io::Error::from(ErrorKind::WriteZero).into()),
            Ok(n) => bytes = &bytes[n..],
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::AtomicBool;

    use speedlog_transport::ReaderSource;

    use super::*;
    use crate::error::FrameError;
    use crate::session::{Session, StopReason};

    #[test]
    fn written_packets_decode_back() {
        let mut writer = PacketWriter::new(Vec::new());
        writer.write_raw(&[0x00, 0xEF, 0x33]).unwrap();
        for sync_echo in 0..5u16 {
            writer
                .write_frame(&DecodedFrame {
                    sync_echo,
                    engine_speed: 1000 + sync_echo,
                    ..DecodedFrame::default()
                })
                .unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(
            writer.get_ref().len(),
            3 + 5 * (MARKER_SIZE + PACKET_SIZE)
        );

        let mut source = ReaderSource::new(Cursor::new(writer.into_inner()));
        let mut session = Session::new();
        let reason = session
            .run(&mut source, &AtomicBool::new(false))
            .unwrap();
        assert_eq!(reason, StopReason::EndOfStream);

        let speeds: Vec<u16> = session.records().iter().map(|r| r.engine_speed).collect();
        assert_eq!(speeds, vec![1000, 1001, 1002, 1003, 1004]);
    }

    #[test]
    fn short_writes_are_completed() {
        let mut writer = PacketWriter::new(Trickle::default());
        writer.write_frame(&DecodedFrame::default()).unwrap();
        assert_eq!(writer.get_ref().data.len(), MARKER_SIZE + PACKET_SIZE);
    }

    #[test]
    fn zero_write_is_an_error() {
        let mut writer = PacketWriter::new(Full);
        let err = writer.write_frame(&DecodedFrame::default()).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[derive(Default)]
    struct Trickle {
        data: Vec<u8>,
        interrupted: bool,
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.interrupted = !self.interrupted;
            if self.interrupted {
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.push(buf[0]);
            Ok(1)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct Full;

    impl Write for Full {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
