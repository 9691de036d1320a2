//! TCP transport and text-frame plumbing for the fadelink client.
//!
//! The device server speaks one JSON document per newline-terminated
//! line over a single TCP connection. This crate provides:
//! - [`WireStream`]: the connected duplex stream (clonable into
//!   independent read and write halves)
//! - a line codec over [`bytes::BytesMut`]
//! - [`LineReader`] / [`LineWriter`]: no partial frames, no buffer
//!   management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod tcp;
pub mod writer;

pub use codec::{decode_line, encode_line, WireConfig, DEFAULT_MAX_FRAME, DELIMITER};
pub use error::{Result, WireError};
pub use reader::LineReader;
pub use tcp::{ServerEndpoint, WireStream};
pub use writer::LineWriter;
