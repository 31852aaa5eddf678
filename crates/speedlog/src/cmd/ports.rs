use speedlog_transport::list_ports;

use crate::cmd::PortsArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_ports, OutputFormat};

pub fn run(args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let mut ports = list_ports().map_err(|err| transport_error("port listing failed", err))?;

    if let Some(needle) = &args.manufacturer {
        ports.retain(|p| {
            p.manufacturer
                .as_deref()
                .is_some_and(|m| m.contains(needle.as_str()))
        });
    }

    print_ports(&ports, format);
    Ok(SUCCESS)
}
