use std::fs;

use fadelink_map::MappingCompiler;
use fadelink_proto::LEDS_PER_DEVICE;

use crate::cmd::MapgenArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};

/// One `--device SERIAL=COUNT` argument.
#[derive(Debug, Clone)]
pub struct DeviceSpec {
    pub serial: String,
    pub count: u32,
}

/// clap value parser for `SERIAL=COUNT`.
pub fn parse_device_spec(input: &str) -> Result<DeviceSpec, String> {
    let (serial, count) = input
        .split_once('=')
        .ok_or_else(|| format!("expected SERIAL=COUNT, got '{input}'"))?;
    if serial.is_empty() {
        return Err("device serial must not be empty".to_string());
    }

    let count: u32 = count
        .parse()
        .map_err(|_| format!("invalid pixel count in '{input}'"))?;
    if count == 0 || count as usize > LEDS_PER_DEVICE {
        return Err(format!(
            "pixel count must be between 1 and {LEDS_PER_DEVICE}, got {count}"
        ));
    }

    Ok(DeviceSpec {
        serial: serial.to_string(),
        count,
    })
}

pub fn run(args: MapgenArgs) -> CliResult<i32> {
    let text = compile(&args.device)?;

    match &args.out {
        Some(path) => {
            fs::write(path, text).map_err(|err| {
                io_error(&format!("failed writing {}", path.display()), err)
            })?;
        }
        None => print!("{text}"),
    }
    Ok(SUCCESS)
}

/// Register each device's pixels contiguously from index 0, in the
/// order given, and render the resulting server configuration.
fn compile(specs: &[DeviceSpec]) -> CliResult<String> {
    let mut compiler = MappingCompiler::new();
    for spec in specs {
        if compiler.device_table(&spec.serial).is_some() {
            return Err(CliError::new(
                DATA_INVALID,
                format!("device '{}' specified more than once", spec.serial),
            ));
        }
        for index in 0..spec.count {
            compiler.register_pixel(&spec.serial, index);
        }
    }

    let config = compiler.server_config();
    let mut text = serde_json::to_string_pretty(&config)
        .map_err(|err| CliError::new(DATA_INVALID, format!("config serialization: {err}")))?;
    text.push('\n');
    Ok(text)
}
