use serde::{Deserialize, Serialize};

use fadelink_proto::{ColorCorrection, DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT};

use crate::compiler::{MappingCompiler, MappingEntry};

/// Device type string the server expects in its configuration.
pub const DEVICE_TYPE: &str = "fadecandy";

/// One device block in a compiled server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub serial: String,
    pub map: Vec<MappingEntry>,
}

/// Compiled server configuration, ready to be written to disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// `[host, port]` pair the server listens on.
    pub listen: (String, u16),
    pub verbose: bool,
    /// Global color correction applied by the server.
    pub color: ColorCorrection,
    pub devices: Vec<DeviceConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: (DEFAULT_LISTEN_HOST.to_string(), DEFAULT_LISTEN_PORT),
            verbose: true,
            color: ColorCorrection::default(),
            devices: Vec::new(),
        }
    }
}

impl MappingCompiler {
    /// Compiled configuration for everything registered so far.
    ///
    /// Devices appear in first-registration order with their mapping
    /// tables; listen address and color correction take the server
    /// defaults.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            devices: self
                .tables()
                .iter()
                .map(|table| DeviceConfig {
                    kind: DEVICE_TYPE.to_string(),
                    serial: table.serial.clone(),
                    map: table.entries.clone(),
                })
                .collect(),
            ..ServerConfig::default()
        }
    }
}
