use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, WireError};

/// Frame delimiter: one JSON document per line.
pub const DELIMITER: u8 = b'\n';

/// Default maximum frame size: 1 MiB.
///
/// A full raw pixel frame for one controller is 512 pixels encoded as a
/// JSON number array, well under this cap.
pub const DEFAULT_MAX_FRAME: usize = 1024 * 1024;

/// Encode a payload as one delimited frame.
///
/// The payload must not itself contain the delimiter; compact JSON
/// output never does.
pub fn encode_line(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.contains(&DELIMITER) {
        return Err(WireError::EmbeddedDelimiter);
    }
    dst.reserve(payload.len() + 1);
    dst.put_slice(payload);
    dst.put_u8(DELIMITER);
    Ok(())
}

/// Decode one frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame and its delimiter from the buffer.
pub fn decode_line(src: &mut BytesMut, max_frame: usize) -> Result<Option<Bytes>> {
    match src.iter().position(|&b| b == DELIMITER) {
        Some(pos) => {
            if pos > max_frame {
                return Err(WireError::FrameTooLarge {
                    size: pos,
                    max: max_frame,
                });
            }
            let payload = src.split_to(pos).freeze();
            src.advance(1);
            Ok(Some(payload))
        }
        None => {
            // Reject a runaway frame before buffering the rest of it.
            if src.len() > max_frame {
                return Err(WireError::FrameTooLarge {
                    size: src.len(),
                    max: max_frame,
                });
            }
            Ok(None)
        }
    }
}

/// Configuration for the wire codec.
#[derive(Debug, Clone)]
pub struct WireConfig {
    /// Maximum frame size in bytes. Default: 1 MiB.
    pub max_frame_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
