//! Client driver for a Fadecandy-style LED-controller server.
//!
//! One duplex JSON-message connection; outgoing requests are stamped
//! with monotonically increasing sequence ids and replies are matched
//! back to their callers purely by sequence lookup, so any number of
//! requests can be in flight at once. Device commands (raw pixel push,
//! lights-off, single-light identify) are layered on top of that
//! primitive.

pub mod connection;
pub mod error;
mod ops;

pub use connection::Connection;
pub use error::{ClientError, Result};
