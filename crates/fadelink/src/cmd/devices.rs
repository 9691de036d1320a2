use fadelink_client::Connection;

use crate::cmd::DevicesArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_devices, OutputFormat};

pub fn run(args: DevicesArgs, format: OutputFormat) -> CliResult<i32> {
    let conn = Connection::open(&args.addr).map_err(|err| client_error("connect failed", err))?;
    print_devices(conn.devices(), format);
    conn.close();
    Ok(SUCCESS)
}
