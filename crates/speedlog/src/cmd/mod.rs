use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod capture;
pub mod decode;
pub mod ports;
pub mod synth;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture telemetry from a serial port until interrupted, then export CSV.
    Capture(CaptureArgs),
    /// Decode a recorded raw byte stream into CSV.
    Decode(DecodeArgs),
    /// Write a synthetic raw byte stream of valid packets.
    Synth(SynthArgs),
    /// List serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Capture(args) => capture::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Synth(args) => synth::run(args),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Serial device. Auto-detected by manufacturer when omitted.
    #[arg(long, short = 'p', env = "SPEEDLOG_PORT")]
    pub port: Option<PathBuf>,
    /// Line speed in bits per second.
    #[arg(long, short = 'b', env = "SPEEDLOG_BAUD", default_value_t = 115_200)]
    pub baud: u32,
    /// Manufacturer substring used for auto-detection.
    #[arg(long, env = "SPEEDLOG_MANUFACTURER", default_value = "Arduino")]
    pub manufacturer: String,
    /// CSV file to write. Default: <YYYYmmdd-HHMMSS>.csv in the working directory.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Log a progress line every N markers (0 disables).
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub progress_every: u64,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Raw capture file.
    pub input: PathBuf,
    /// CSV file to write. Default: the input path with a .csv extension.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// File to write the raw stream to.
    pub output: PathBuf,
    /// Number of packets.
    #[arg(long, short = 'n', default_value_t = 100)]
    pub packets: u16,
    /// Corrupt the body of every Nth packet (0 disables).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub corrupt_every: u16,
    /// Put line noise between packets.
    #[arg(long)]
    pub noise: bool,
}

#[derive(Args, Debug)]
pub struct PortsArgs {
    /// Only show ports whose manufacturer contains this string.
    #[arg(long)]
    pub manufacturer: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
