use fadelink_client::Connection;
use tracing::info;

use crate::cmd::OffArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: OffArgs, format: OutputFormat) -> CliResult<i32> {
    let conn = Connection::open(&args.addr).map_err(|err| client_error("connect failed", err))?;
    let count = conn.devices().len();

    conn.all_lights_off()
        .map_err(|err| client_error("lights-off failed", err))?;
    info!(devices = count, "all lights off");

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "devices": count })),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("blanked {count} device(s)");
        }
    }
    conn.close();
    Ok(SUCCESS)
}
