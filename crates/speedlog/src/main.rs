mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "speedlog",
    version,
    about = "Serial telemetry datalogger"
)]
struct Cli {
    /// Output format for command results.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn parses_capture_subcommand() {
        let cli = Cli::try_parse_from([
            "speedlog",
            "capture",
            "--port",
            "/dev/ttyACM0",
            "--baud",
            "57600",
            "-o",
            "run.csv",
        ])
        .expect("capture args should parse");

        match cli.command {
            Command::Capture(args) => {
                assert_eq!(args.port, Some(PathBuf::from("/dev/ttyACM0")));
                assert_eq!(args.baud, 57_600);
                assert_eq!(args.output, Some(PathBuf::from("run.csv")));
                assert_eq!(args.progress_every, 100);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn decode_requires_input() {
        let err = Cli::try_parse_from(["speedlog", "decode"])
            .expect_err("missing input should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "speedlog",
            "ports",
            "--format",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("global flags should parse after subcommand");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn synth_defaults() {
        let cli = Cli::try_parse_from(["speedlog", "synth", "stream.bin"])
            .expect("synth args should parse");
        match cli.command {
            Command::Synth(args) => {
                assert_eq!(args.packets, 100);
                assert_eq!(args.corrupt_every, 0);
                assert!(!args.noise);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
