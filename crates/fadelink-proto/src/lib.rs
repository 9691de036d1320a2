//! Wire message types for the LED-controller server protocol.
//!
//! Every request carries a `type` string and a `sequence` correlation
//! id; replies echo the `sequence`. Unknown reply fields are ignored so
//! the client tolerates newer servers.

pub mod constants;
pub mod message;

pub use constants::{
    DEFAULT_GAMMA, DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_TIMEOUT, DEFAULT_WHITEPOINT,
    LEDS_PER_DEVICE, LEDS_PER_STRIP,
};
pub use message::{ColorCorrection, Device, DeviceOptions, Reply, Request, RequestFrame};
