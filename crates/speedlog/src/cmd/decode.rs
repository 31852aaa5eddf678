use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::AtomicBool;

use speedlog::export::export_csv;
use speedlog_frame::Session;
use speedlog_transport::ReaderSource;
use tracing::info;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_summary, OutputFormat, SessionSummary};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("csv"));
    if output == args.input {
        return Err(CliError::new(
            USAGE,
            format!("output would overwrite input: {}", output.display()),
        ));
    }

    let file = File::open(&args.input).map_err(|err| {
        io_error(&format!("cannot open {}", args.input.display()), err)
    })?;
    let mut source = ReaderSource::new(BufReader::new(file));

    let mut session = Session::new();
    let reason = session
        .run(&mut source, &AtomicBool::new(false))
        .map_err(|err| frame_error("decode failed", err))?;

    info!(
        path = %output.display(),
        records = session.records().len(),
        "writing records"
    );
    export_csv(session.records(), &output).map_err(|err| io_error("export failed", err))?;

    let (_, stats) = session.finish();
    print_summary(
        &SessionSummary::new(&args.input, &output, reason, stats),
        format,
    );
    Ok(SUCCESS)
}
