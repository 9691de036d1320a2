mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "fadelink", version, about = "LED controller client CLI")]
struct Cli {
    /// Output format.
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
    use super::*;

    #[test]
    fn parses_devices_subcommand() {
        let cli = Cli::try_parse_from(["fadelink", "devices", "--addr", "10.0.0.5:7890"])
            .expect("devices args should parse");
        assert!(matches!(cli.command, Command::Devices(_)));
    }

    #[test]
    fn parses_identify_subcommand() {
        let cli = Cli::try_parse_from(["fadelink", "identify", "FC0001", "130"])
            .expect("identify args should parse");
        match cli.command {
            Command::Identify(args) => {
                assert_eq!(args.serial, "FC0001");
                assert_eq!(args.index, 130);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_mapgen_device_specs() {
        let cli = Cli::try_parse_from([
            "fadelink",
            "mapgen",
            "--device",
            "FC0001=512",
            "--device",
            "FC0002=64",
        ])
        .expect("mapgen args should parse");
        match cli.command {
            Command::Mapgen(args) => {
                assert_eq!(args.device.len(), 2);
                assert_eq!(args.device[0].serial, "FC0001");
                assert_eq!(args.device[0].count, 512);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_mapgen_without_devices() {
        let err = Cli::try_parse_from(["fadelink", "mapgen"])
            .expect_err("mapgen without devices should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }
}
