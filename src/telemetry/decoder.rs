//! # Payload Decoder
//!
//! Turns a split radio frame into a [`TelemetryDocument`].
//!
//! The payload is parsed as a JSON object. Whether or not that succeeds, the
//! four metadata keys are written into the document afterwards, so a corrupt
//! payload still yields a document that can be logged, published and
//! acknowledged. A frame that failed to split (too few delimiters, or
//! non-numeric rssi/snr) only gets zeroed metadata and is never usable.

use tracing::{debug, warn};

use super::document::{TelemetryDocument, Value};
use crate::error::DecodeError;
use crate::rylr998::protocol::{parse_or_zero, RadioFrame};

pub const KEY_ADDRESS: &str = "address";
pub const KEY_LENGTH: &str = "length";
pub const KEY_RSSI: &str = "rssi";
pub const KEY_SNR: &str = "snr";

/// Keys injected into every decoded document
pub const METADATA_KEYS: [&str; 4] = [KEY_ADDRESS, KEY_LENGTH, KEY_RSSI, KEY_SNR];

/// Result of decoding one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub document: TelemetryDocument,
    /// True when the frame split cleanly and metadata injection completed
    pub usable: bool,
    /// Why the payload itself could not be used, if it could not
    pub error: Option<DecodeError>,
}

/// Decode `frame` into a document holding at most `field_capacity` payload
/// fields plus the metadata keys
pub fn decode_payload(frame: &RadioFrame, field_capacity: usize) -> DecodedFrame {
    let mut document = TelemetryDocument::with_capacity(field_capacity + METADATA_KEYS.len());

    let error = match parse_fields(&frame.payload, field_capacity, &mut document) {
        Ok(()) => None,
        Err(e) => {
            warn!("Payload decode failed: {} (payload: {:?})", e, frame.payload);
            document.clear();
            Some(e)
        }
    };

    let declared = parse_or_zero(&frame.length);
    if usize::try_from(declared).ok() != Some(frame.payload.len()) {
        debug!(
            "Declared length {} differs from received payload of {} bytes",
            frame.length,
            frame.payload.len()
        );
    }

    let injected = inject_metadata(&mut document, frame).is_ok();
    let usable = frame.is_well_formed() && injected;

    DecodedFrame {
        document,
        usable,
        error,
    }
}

/// Parse the payload object into `document`, stopping at `field_capacity`
fn parse_fields(payload: &str, field_capacity: usize, document: &mut TelemetryDocument) -> Result<(), DecodeError> {
    let parsed: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;

    let serde_json::Value::Object(fields) = parsed else {
        return Err(DecodeError::NotAnObject);
    };

    if fields.len() > field_capacity {
        return Err(DecodeError::CapacityExceeded {
            capacity: field_capacity,
        });
    }

    for (key, value) in &fields {
        document.set(key, Value::from_json(value))?;
    }
    Ok(())
}

/// Overwrite the metadata keys with parse-or-zero integers from the frame
fn inject_metadata(document: &mut TelemetryDocument, frame: &RadioFrame) -> Result<(), DecodeError> {
    for (key, text) in [
        (KEY_ADDRESS, &frame.address),
        (KEY_LENGTH, &frame.length),
        (KEY_RSSI, &frame.rssi),
        (KEY_SNR, &frame.snr),
    ] {
        document.set(key, Value::Int(parse_or_zero(text)))?;
    }
    Ok(())
}
