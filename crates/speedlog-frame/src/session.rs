use std::sync::atomic::{AtomicBool, Ordering};

use speedlog_transport::ByteSource;
use tracing::{debug, info};

use crate::assembler::{Packet, PacketAssembler};
use crate::checksum::{validate, ValidatedRecord};
use crate::codec::decode_frame;
use crate::error::{FrameError, Result};
use crate::sink::RecordSink;
use crate::sync::SyncDetector;

/// Session tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Log a progress line every N sync events. 0 disables progress logging.
    pub progress_interval: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            progress_interval: 100,
        }
    }
}

/// Counters for one capture session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SessionStats {
    /// Bytes pulled from the source.
    pub bytes_read: u64,
    /// Markers detected.
    pub sync_count: u64,
    /// Packets that passed validation.
    pub success_count: u64,
    /// Partial packets dropped because a new marker arrived.
    pub abandoned_count: u64,
    /// Complete packets dropped on checksum mismatch.
    pub checksum_failures: u64,
}

/// Where the per-byte state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for a marker; bytes only feed the sync detector.
    SeekingSync,
    /// After a marker; bytes are collected into a packet.
    Collecting,
}

/// What one byte did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Seeking sync; byte consumed by the detector only.
    Idle,
    /// Byte completed a marker; collection starts fresh.
    Synced,
    /// Byte completed a marker mid-packet; the partial packet was dropped.
    Abandoned,
    /// Byte appended to the packet in progress.
    Collecting,
    /// Byte completed a packet that validated and was stored.
    Accepted,
    /// Byte completed a packet with a bad checksum; it was dropped.
    Rejected,
}

/// Why [`Session::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop flag was raised.
    Cancelled,
    /// The byte source reported end of stream.
    EndOfStream,
}

/// Decoder state for one capture: detector, assembler, counters and records.
///
/// Everything is owned here and driven from a single loop; nothing is shared.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    detector: SyncDetector,
    assembler: PacketAssembler,
    sink: RecordSink,
    stats: SessionStats,
    state: State,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            detector: SyncDetector::new(),
            assembler: PacketAssembler::new(),
            sink: RecordSink::new(),
            stats: SessionStats::default(),
            state: State::SeekingSync,
        }
    }

    /// Pull bytes from `source` until `stop` is raised or the source ends.
    ///
    /// `stop` is checked before every read. On return any partially
    /// collected packet has been discarded. Checksum mismatches are absorbed;
    /// source failures and malformed frames propagate.
    pub fn run<S>(&mut self, source: &mut S, stop: &AtomicBool) -> Result<StopReason>
    where
        S: ByteSource + ?Sized,
    {
        let reason = loop {
            if stop.load(Ordering::SeqCst) {
                break StopReason::Cancelled;
            }

            let byte = match source.next_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => continue,
                Err(err) if err.is_closed() => break StopReason::EndOfStream,
                Err(err) => {
                    self.halt();
                    return Err(FrameError::ByteSourceUnavailable(err));
                }
            };

            if let Err(err) = self.push_byte(byte) {
                self.halt();
                return Err(err);
            }
        };

        self.halt();
        info!(
            ?reason,
            syncs = self.stats.sync_count,
            records = self.stats.success_count,
            "session stopped"
        );
        Ok(reason)
    }

    /// Advance the state machine by one byte.
    pub fn push_byte(&mut self, byte: u8) -> Result<Step> {
        self.stats.bytes_read += 1;

        if self.detector.observe(byte) {
            return Ok(self.on_marker());
        }

        match self.state {
            State::SeekingSync => Ok(Step::Idle),
            State::Collecting => match self.assembler.feed(byte) {
                None => Ok(Step::Collecting),
                Some(packet) => {
                    self.state = State::SeekingSync;
                    self.decode_validate(&packet)
                }
            },
        }
    }

    fn on_marker(&mut self) -> Step {
        let abandoned = self.state == State::Collecting && !self.assembler.is_empty();
        if abandoned {
            self.stats.abandoned_count += 1;
            debug!(
                collected = self.assembler.len(),
                "marker inside packet, dropping partial packet"
            );
        }

        self.assembler.reset();
        self.state = State::Collecting;
        self.stats.sync_count += 1;

        let interval = self.config.progress_interval;
        if interval > 0 && self.stats.sync_count % interval == 0 {
            info!(
                syncs = self.stats.sync_count,
                records = self.stats.success_count,
                "capture progress"
            );
        }

        if abandoned {
            Step::Abandoned
        } else {
            Step::Synced
        }
    }

    fn decode_validate(&mut self, packet: &Packet) -> Result<Step> {
        let decoded = decode_frame(packet.as_bytes())?;

        match validate(packet.as_bytes(), decoded) {
            Ok(record) => {
                self.sink.append(record);
                self.stats.success_count += 1;
                Ok(Step::Accepted)
            }
            Err(FrameError::ChecksumMismatch { expected, computed }) => {
                self.stats.checksum_failures += 1;
                debug!(
                    expected = format_args!("{expected:#06x}"),
                    computed = format_args!("{computed:#06x}"),
                    "checksum mismatch, dropping packet"
                );
                Ok(Step::Rejected)
            }
            Err(err) => Err(err),
        }
    }

    fn halt(&mut self) {
        self.assembler.reset();
        self.state = State::SeekingSync;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Records accepted so far, in arrival order.
    pub fn records(&self) -> &[ValidatedRecord] {
        self.sink.records()
    }

    pub fn sink(&self) -> &RecordSink {
        &self.sink
    }

    /// Tear down the session, keeping its records and counters.
    pub fn finish(self) -> (RecordSink, SessionStats) {
        (self.sink, self.stats)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
