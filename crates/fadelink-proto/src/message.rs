use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GAMMA, DEFAULT_WHITEPOINT};

/// One physical controller, identified by serial number.
///
/// The discovery reply may carry additional per-device fields; they are
/// ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    pub serial: String,
}

impl Device {
    /// Create a device handle for `serial`.
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
        }
    }
}

/// Per-device output options for `device_options` requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceOptions {
    /// Status LED override. `None` leaves the LED under server control.
    pub led: Option<bool>,
    /// Temporal dithering between frames.
    pub dither: bool,
    /// Interpolation between keyframes.
    pub interpolate: bool,
}

impl DeviceOptions {
    /// Options that guarantee raw, unprocessed output.
    pub fn raw() -> Self {
        Self {
            led: None,
            dither: false,
            interpolate: false,
        }
    }
}

/// Gamma and whitepoint correction for `device_color_correction`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ColorCorrection {
    pub gamma: f64,
    pub whitepoint: [f64; 3],
}

impl ColorCorrection {
    /// Identity correction: raw bytes reach the hardware unmodified.
    pub fn unity() -> Self {
        Self {
            gamma: 1.0,
            whitepoint: [1.0, 1.0, 1.0],
        }
    }
}

impl Default for ColorCorrection {
    fn default() -> Self {
        Self {
            gamma: DEFAULT_GAMMA,
            whitepoint: DEFAULT_WHITEPOINT,
        }
    }
}

/// Request body, tagged on the wire by its `type` string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Enumerate attached controllers.
    ListConnectedDevices,
    /// Set per-device output options.
    DeviceOptions {
        device: Device,
        options: DeviceOptions,
    },
    /// Set per-device color correction.
    DeviceColorCorrection {
        device: Device,
        color: ColorCorrection,
    },
    /// Push a raw pixel byte array to one device.
    DevicePixels { device: Device, pixels: Vec<u8> },
}

impl Request {
    /// Wire `type` string, used in timeout diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Request::ListConnectedDevices => "list_connected_devices",
            Request::DeviceOptions { .. } => "device_options",
            Request::DeviceColorCorrection { .. } => "device_color_correction",
            Request::DevicePixels { .. } => "device_pixels",
        }
    }
}

/// Outbound envelope: a request body stamped with its correlation id.
///
/// The sequence id is assigned by the connection at send time; bodies
/// themselves never carry one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestFrame {
    pub sequence: u64,
    #[serde(flatten)]
    pub body: Request,
}

/// Inbound reply envelope.
///
/// Only the fields the client acts on are modeled; anything else the
/// server includes is ignored. A missing `sequence` makes the frame
/// undispatchable and fails deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub sequence: u64,
    /// Set when the addressed device rejected or failed the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present on `list_connected_devices` replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Device>>,
}
