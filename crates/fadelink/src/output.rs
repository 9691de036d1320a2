use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use fadelink_map::LedDescriptor;
use fadelink_proto::{Device, LEDS_PER_DEVICE, LEDS_PER_STRIP};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct DeviceListOutput<'a> {
    count: usize,
    devices: &'a [Device],
}

pub fn print_devices(devices: &[Device], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = DeviceListOutput {
                count: devices.len(),
                devices,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SERIAL", "PIXELS", "STRIPS"]);
            for device in devices {
                table.add_row(vec![
                    device.serial.clone(),
                    LEDS_PER_DEVICE.to_string(),
                    (LEDS_PER_DEVICE / LEDS_PER_STRIP).to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for device in devices {
                println!("{} ({LEDS_PER_DEVICE} pixels)", device.serial);
            }
        }
    }
}

pub fn print_descriptor(descriptor: &LedDescriptor, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(descriptor).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LABEL", "STRIP", "POSITION"])
                .add_row(vec![
                    descriptor.label.clone(),
                    descriptor.strip_index.to_string(),
                    descriptor.strip_position.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} strip={} position={}",
                descriptor.label, descriptor.strip_index, descriptor.strip_position
            );
        }
    }
}
