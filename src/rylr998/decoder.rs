//! # RYLR998 Line Decoder
//!
//! Classifies lines coming from the module and splits `+RCV=` frames.
//!
//! The frame payload is itself structured text that may legally contain
//! commas, so a frame is split from both ends: address and length are taken
//! from the left, snr and rssi from the right, and everything in between is
//! the payload, untouched.

use super::protocol::*;
use crate::error::FrameError;

/// Split a received line into a frame, if it is one
///
/// Returns `None` for anything without the receive marker (command
/// responses are handled by whoever issued the command).
///
/// # Examples
///
/// ```
/// use lora_mqtt_gateway::rylr998::decoder::decode_frame;
///
/// let frame = decode_frame(r#"+RCV=3,9,{"a":1,"b":2},-47,12"#).unwrap();
/// assert_eq!(frame.address, "3");
/// assert_eq!(frame.payload, r#"{"a":1,"b":2}"#);
/// assert_eq!(frame.snr, "12");
/// ```
pub fn decode_frame(line: &str) -> Option<RadioFrame> {
    let body = line.strip_prefix(RCV_MARKER)?;
    Some(split_frame_body(body))
}

/// Split the text after the marker into address/length/payload/rssi/snr
///
/// Never fails: a body with fewer than four delimiters yields empty fields
/// and a [`FrameError::Malformed`] marker.
pub fn split_frame_body(body: &str) -> RadioFrame {
    let delimiters = body.matches(FIELD_DELIMITER).count();
    if delimiters < FRAME_MIN_DELIMITERS {
        return RadioFrame {
            error: Some(FrameError::Malformed { delimiters }),
            ..RadioFrame::default()
        };
    }

    // At least four delimiters, so all four positions exist and are distinct.
    let Some(first) = body.find(FIELD_DELIMITER) else {
        return malformed(delimiters);
    };
    let Some(second) = body[first + 1..].find(FIELD_DELIMITER).map(|i| first + 1 + i) else {
        return malformed(delimiters);
    };
    let Some(last) = body.rfind(FIELD_DELIMITER) else {
        return malformed(delimiters);
    };
    let Some(before_last) = body[..last].rfind(FIELD_DELIMITER) else {
        return malformed(delimiters);
    };

    let frame = RadioFrame {
        address: body[..first].to_string(),
        length: body[first + 1..second].to_string(),
        payload: body[second + 1..before_last].to_string(),
        rssi: body[before_last + 1..last].to_string(),
        snr: body[last + 1..].to_string(),
        error: None,
    };

    // A mis-split frame keeps none of its fields, only the reason.
    match check_signal_fields(&frame) {
        Some(error) => RadioFrame {
            error: Some(error),
            ..RadioFrame::default()
        },
        None => frame,
    }
}

fn malformed(delimiters: usize) -> RadioFrame {
    RadioFrame {
        error: Some(FrameError::Malformed { delimiters }),
        ..RadioFrame::default()
    }
}

/// rssi and snr sit at fixed positions from the right; if the payload was
/// cut short they pick up payload text instead of numbers.
fn check_signal_fields(frame: &RadioFrame) -> Option<FrameError> {
    for (field, value) in [("rssi", &frame.rssi), ("snr", &frame.snr)] {
        if value.trim().parse::<i64>().is_err() {
            return Some(FrameError::NonNumericSignal {
                field,
                value: value.clone(),
            });
        }
    }
    None
}

/// Classify a (trimmed) command response
pub fn classify_response(response: &str) -> ResponseCode {
    if response.is_empty() {
        ResponseCode::Timeout
    } else if response == RESPONSE_OK {
        ResponseCode::Ok
    } else if let Some(code) = response.strip_prefix(RESPONSE_ERR_PREFIX) {
        ResponseCode::Error(code.to_string())
    } else if response == RESPONSE_READY {
        ResponseCode::Ready
    } else {
        ResponseCode::Other(response.to_string())
    }
}

/// Human readable explanation of an `+ERR=` code for log messages
pub fn describe_error(code: &str) -> String {
    match code.trim().parse::<u8>().ok().and_then(RadioErrorCode::from_code) {
        Some(known) => format!("+ERR={} ({})", code, known.description()),
        None => format!("+ERR={}", code),
    }
}
