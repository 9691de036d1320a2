use std::time::Duration;

/// Errors surfaced by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport or framing failure. Fatal to the session.
    #[error("wire error: {0}")]
    Wire(#[from] fadelink_wire::WireError),

    /// A request went unanswered within its deadline.
    ///
    /// Recoverable: the connection stays usable and retry policy
    /// belongs to the caller.
    #[error("request '{request}' (sequence {sequence}) timed out after {after:?}")]
    Timeout {
        request: &'static str,
        sequence: u64,
        after: Duration,
    },

    /// The server reported a device command failure.
    #[error("device command failed: {message}")]
    Device { message: String },

    /// JSON serialization failed for an outgoing request.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The connection closed while a request was in flight.
    #[error("connection closed")]
    Closed,

    /// Pixel index outside the device's address space.
    #[error("pixel index {index} out of range (device holds {max} pixels)")]
    PixelOutOfRange { index: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, ClientError>;
