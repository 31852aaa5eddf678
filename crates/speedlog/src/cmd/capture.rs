use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;
use speedlog::export::export_csv;
use speedlog_frame::{Session, SessionConfig};
use speedlog_transport::{find_port, DEFAULT_PORT};
use tracing::{info, warn};

use crate::cmd::CaptureArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat, SessionSummary};

#[cfg(unix)]
pub fn run(args: CaptureArgs, format: OutputFormat) -> CliResult<i32> {
    use speedlog_transport::{SerialConfig, SerialPort};

    use crate::exit::transport_error;

    let port_path = resolve_port(&args);
    let output = args.output.clone().unwrap_or_else(timestamped_output);

    let config = SerialConfig {
        baud_rate: args.baud,
        ..SerialConfig::default()
    };
    let mut port =
        SerialPort::open(&port_path, &config).map_err(|err| transport_error("open failed", err))?;

    let stop = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(stop.clone())?;

    let mut session = Session::with_config(SessionConfig {
        progress_interval: args.progress_every,
    });
    info!(port = %port_path.display(), "capturing, press Ctrl-C to stop");
    let result = session.run(&mut port, &stop);

    // Whatever stopped the loop, records are exported once before the port goes.
    info!(
        path = %output.display(),
        records = session.records().len(),
        "writing records"
    );
    let exported =
        export_csv(session.records(), &output).map_err(|err| io_error("export failed", err));
    port.close();

    let reason = result.map_err(|err| frame_error("capture failed", err))?;
    exported?;

    let (_, stats) = session.finish();
    print_summary(
        &SessionSummary::new(&port_path, &output, reason, stats),
        format,
    );
    Ok(SUCCESS)
}

#[cfg(not(unix))]
pub fn run(_args: CaptureArgs, _format: OutputFormat) -> CliResult<i32> {
    Err(CliError::new(
        crate::exit::TRANSPORT_ERROR,
        "serial capture is only supported on Unix platforms",
    ))
}

/// Explicit port, else the last port from the wanted manufacturer, else the default.
fn resolve_port(args: &CaptureArgs) -> PathBuf {
    if let Some(port) = &args.port {
        return port.clone();
    }

    match find_port(&args.manufacturer) {
        Ok(Some(port)) => {
            info!(port = %port.device.display(), manufacturer = %args.manufacturer, "found port");
            port.device
        }
        Ok(None) => {
            warn!(
                manufacturer = %args.manufacturer,
                fallback = DEFAULT_PORT,
                "no matching serial port found, using default"
            );
            PathBuf::from(DEFAULT_PORT)
        }
        Err(err) => {
            warn!(error = %err, fallback = DEFAULT_PORT, "port discovery failed, using default");
            PathBuf::from(DEFAULT_PORT)
        }
    }
}

fn timestamped_output() -> PathBuf {
    let name = output_file_name(chrono::Local::now().naive_local());
    match std::env::current_dir() {
        Ok(dir) => dir.join(name),
        Err(_) => PathBuf::from(name),
    }
}

fn output_file_name(at: NaiveDateTime) -> String {
    format!("{}.csv", at.format("%Y%m%d-%H%M%S"))
}

fn install_ctrlc_handler(stop: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
