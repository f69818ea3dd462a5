//! # Error Types
//!
//! Custom error types for the gateway using `thiserror`.

use thiserror::Error;

/// Main error type for the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Serial port errors (open, write, flush)
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No radio serial port found (tried: {0})")]
    SerialPortNotFound(String),

    /// The radio channel reached end-of-file
    #[error("Radio serial channel closed")]
    ChannelClosed,

    /// Outbound radio payload exceeds the module's transmit limit
    #[error("Radio payload of {len} bytes exceeds maximum {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Receive-frame structure errors
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Payload decode errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Problems detected while splitting a `+RCV=` line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Fewer than four delimiters after the marker
    #[error("malformed frame: expected at least 4 delimiters, found {delimiters}")]
    Malformed { delimiters: usize },

    /// The rssi or snr position holds something that is not an integer
    #[error("non-numeric {field} field: {value:?}")]
    NonNumericSignal { field: &'static str, value: String },
}

/// Problems decoding the structured payload of a frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Payload is not valid JSON
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    /// Payload is valid JSON but not a key-value object
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// Payload has more fields than the document can hold
    #[error("document capacity of {capacity} fields exceeded")]
    CapacityExceeded { capacity: usize },
}

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;
