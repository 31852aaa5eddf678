use std::io::IsTerminal;
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use speedlog_frame::{SessionStats, StopReason};
use speedlog_transport::PortInfo;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub schema_id: &'static str,
    pub source: String,
    pub output: String,
    pub stop_reason: &'static str,
    #[serde(flatten)]
    pub stats: SessionStats,
}

impl SessionSummary {
    pub fn new(source: &Path, output: &Path, reason: StopReason, stats: SessionStats) -> Self {
        Self {
            schema_id: "speedlog/cli/v1/session-summary",
            source: source.display().to_string(),
            output: output.display().to_string(),
            stop_reason: stop_reason_name(reason),
            stats,
        }
    }
}

pub fn stop_reason_name(reason: StopReason) -> &'static str {
    match reason {
        StopReason::Cancelled => "cancelled",
        StopReason::EndOfStream => "end_of_stream",
    }
}

pub fn print_summary(summary: &SessionSummary, format: OutputFormat) {
    let stats = &summary.stats;
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "SOURCE",
                    "BYTES",
                    "SYNCS",
                    "RECORDS",
                    "ABANDONED",
                    "CRC FAIL",
                    "OUTPUT",
                ])
                .add_row(vec![
                    summary.source.clone(),
                    stats.bytes_read.to_string(),
                    stats.sync_count.to_string(),
                    stats.success_count.to_string(),
                    stats.abandoned_count.to_string(),
                    stats.checksum_failures.to_string(),
                    summary.output.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Session ({}):", summary.stop_reason);
            println!("  Source:          {}", summary.source);
            println!("  Bytes read:      {}", stats.bytes_read);
            println!("  Syncs:           {}", stats.sync_count);
            println!("  Records:         {}", stats.success_count);
            println!("  Abandoned:       {}", stats.abandoned_count);
            println!("  CRC failures:    {}", stats.checksum_failures);
            println!("  Written to:      {}", summary.output);
        }
        OutputFormat::Raw => {
            println!("{}", summary.output);
        }
    }
}

#[derive(Debug, Serialize)]
struct PortOutput<'a> {
    device: String,
    manufacturer: Option<&'a str>,
    product: Option<&'a str>,
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    let rows: Vec<PortOutput<'_>> = ports
        .iter()
        .map(|p| PortOutput {
            device: p.device.display().to_string(),
            manufacturer: p.manufacturer.as_deref(),
            product: p.product.as_deref(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DEVICE", "MANUFACTURER", "PRODUCT"]);
            for row in &rows {
                table.add_row(vec![
                    row.device.clone(),
                    row.manufacturer.unwrap_or("-").to_string(),
                    row.product.unwrap_or("-").to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if rows.is_empty() {
                println!("No serial ports found.");
            }
            for row in &rows {
                println!(
                    "{}  {} {}",
                    row.device,
                    row.manufacturer.unwrap_or("(unknown manufacturer)"),
                    row.product.unwrap_or("")
                );
            }
        }
        OutputFormat::Raw => {
            for row in &rows {
                println!("{}", row.device);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_json_flattens_stats() {
        let stats = SessionStats {
            bytes_read: 128,
            sync_count: 2,
            success_count: 1,
            abandoned_count: 0,
            checksum_failures: 1,
        };
        let summary = SessionSummary::new(
            Path::new("/dev/ttyACM0"),
            Path::new("out.csv"),
            StopReason::Cancelled,
            stats,
        );

        let json = serde_json::to_string(&summary).expect("summary should serialize");
        assert!(json.contains("\"stop_reason\":\"cancelled\""));
        assert!(json.contains("\"success_count\":1"));
        assert!(json.contains("\"checksum_failures\":1"));
        assert!(json.contains("\"source\":\"/dev/ttyACM0\""));
    }
}
