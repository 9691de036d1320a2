use fadelink_client::Connection;
use fadelink_map::led_descriptor;

use crate::cmd::IdentifyArgs;
use crate::exit::{client_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_descriptor, OutputFormat};

pub fn run(args: IdentifyArgs, format: OutputFormat) -> CliResult<i32> {
    let conn = Connection::open(&args.addr).map_err(|err| client_error("connect failed", err))?;

    let Some(target) = conn.device(&args.serial).cloned() else {
        let known: Vec<&str> = conn.devices().iter().map(|d| d.serial.as_str()).collect();
        return Err(CliError::new(
            FAILURE,
            format!(
                "unknown device serial '{}' (attached: {})",
                args.serial,
                known.join(", ")
            ),
        ));
    };

    conn.identify_light(&target, args.index)
        .map_err(|err| client_error("identify failed", err))?;

    let index = u32::try_from(args.index)
        .map_err(|_| CliError::new(FAILURE, "pixel index does not fit in u32"))?;
    print_descriptor(&led_descriptor(&target.serial, index), format);
    conn.close();
    Ok(SUCCESS)
}
