use std::io;
use thiserror::Error;

/// The primary error type for the `omron-env-lib` library.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Serial port {port} could not be opened: {source}")]
    TransportUnavailable {
        port: String,
        #[source]
        source: io::Error,
    },

    #[error("Incomplete frame: expected {expected} bytes, got {actual}")]
    IncompleteFrame { expected: usize, actual: usize },

    #[error("Serial transport error: {0}")]
    TransportError(#[from] io::Error),

    /// Reserved for malformed content in a full-length frame.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl SensorError {
    /// Whether the error invalidated the serial connection.
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            SensorError::TransportUnavailable { .. } | SensorError::TransportError(_)
        )
    }
}
