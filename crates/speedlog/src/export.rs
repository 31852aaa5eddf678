//! CSV export of validated records.
//!
//! One header row ([`FIELD_NAMES`]) followed by one row per record in
//! arrival order. Rows end in CRLF. Floats use Rust's shortest round-trip
//! formatting.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use speedlog_frame::{ValidatedRecord, FIELD_NAMES};

const LINE_END: &str = "\r\n";

/// Write `records` as CSV to `writer`.
pub fn write_csv<W: Write>(records: &[ValidatedRecord], mut writer: W) -> io::Result<()> {
    writer.write_all(FIELD_NAMES.join(",").as_bytes())?;
    writer.write_all(LINE_END.as_bytes())?;

    for record in records {
        let mut first = true;
        for value in record.columns() {
            if !first {
                writer.write_all(b",")?;
            }
            first = false;
            write!(writer, "{value}")?;
        }
        writer.write_all(LINE_END.as_bytes())?;
    }

    writer.flush()
}

/// Create (or truncate) `path` and write `records` to it.
pub fn export_csv(records: &[ValidatedRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_csv(records, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use speedlog_frame::{decode_frame, validate, DecodedFrame, PacketWriter, MARKER_SIZE};

    use super::*;

    fn record(frame: DecodedFrame) -> ValidatedRecord {
        let mut writer = PacketWriter::new(Vec::new());
        writer.write_frame(&frame).unwrap();
        let wire = writer.into_inner();
        let packet = &wire[MARKER_SIZE..];
        validate(packet, decode_frame(packet).unwrap()).unwrap()
    }

    #[test]
    fn empty_export_is_header_only() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("sync,crc,roll_target,roll_meas,"));
        assert!(text.ends_with("engine_speed,throttle_position\r\n"));
        assert!(text.contains(",V1(FL)_target,"));
    }

    #[test]
    fn rows_follow_arrival_order() {
        let records = [
            record(DecodedFrame {
                sync_echo: 2,
                roll_target: 1.5,
                throttle_position: 42,
                ..DecodedFrame::default()
            }),
            record(DecodedFrame {
                sync_echo: 1,
                yaw_meas: -0.25,
                ..DecodedFrame::default()
            }),
        ];

        let mut out = Vec::new();
        write_csv(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(rows.len(), 3);

        let first: Vec<&str> = rows[1].split(',').collect();
        assert_eq!(first.len(), FIELD_NAMES.len());
        assert_eq!(first[0], "2");
        assert_eq!(first[1], records[0].crc.to_string());
        assert_eq!(first[2], "1.5");
        assert_eq!(first[23], "42");

        let second: Vec<&str> = rows[2].split(',').collect();
        assert_eq!(second[0], "1");
        assert_eq!(second[7], "-0.25");
    }

    #[test]
    fn export_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "speedlog-export-{}-{}.csv",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));

        export_csv(&[record(DecodedFrame::default())], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        let _ = std::fs::remove_file(&path);
    }
}
