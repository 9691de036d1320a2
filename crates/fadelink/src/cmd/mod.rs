use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod devices;
pub mod identify;
pub mod mapgen;
pub mod off;

/// Default fcserver listen address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:7890";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List controllers attached to the server.
    Devices(DevicesArgs),
    /// Blank every pixel on every controller.
    Off(OffArgs),
    /// Light one LED full white to locate it.
    Identify(IdentifyArgs),
    /// Compile a pixel mapping into a server configuration.
    Mapgen(MapgenArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Devices(args) => devices::run(args, format),
        Command::Off(args) => off::run(args, format),
        Command::Identify(args) => identify::run(args, format),
        Command::Mapgen(args) => mapgen::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DevicesArgs {
    /// Server address to connect to.
    #[arg(long, short = 'a', default_value = DEFAULT_ADDR)]
    pub addr: String,
}

#[derive(Args, Debug)]
pub struct OffArgs {
    /// Server address to connect to.
    #[arg(long, short = 'a', default_value = DEFAULT_ADDR)]
    pub addr: String,
}

#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// Serial of the target controller.
    pub serial: String,
    /// Device-local pixel index to light.
    pub index: usize,
    /// Server address to connect to.
    #[arg(long, short = 'a', default_value = DEFAULT_ADDR)]
    pub addr: String,
}

#[derive(Args, Debug)]
pub struct MapgenArgs {
    /// Device spec as SERIAL=COUNT; repeat per controller. Pixels are
    /// registered contiguously from device index 0 in the given order.
    #[arg(long, required = true, value_parser = mapgen::parse_device_spec)]
    pub device: Vec<mapgen::DeviceSpec>,
    /// Write the configuration here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}
