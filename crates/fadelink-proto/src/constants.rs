//! Protocol constants shared across the workspace.

use std::time::Duration;

/// Default per-request reply deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4000);

/// Fixed pixel address space of one controller.
pub const LEDS_PER_DEVICE: usize = 512;

/// Pixels per output strip on one controller.
pub const LEDS_PER_STRIP: usize = 64;

/// Default listen host for compiled server configurations.
pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";

/// Default listen port for compiled server configurations.
pub const DEFAULT_LISTEN_PORT: u16 = 7890;

/// Default gamma for compiled server configurations.
pub const DEFAULT_GAMMA: f64 = 2.5;

/// Default whitepoint for compiled server configurations.
pub const DEFAULT_WHITEPOINT: [f64; 3] = [1.0, 1.0, 1.0];
