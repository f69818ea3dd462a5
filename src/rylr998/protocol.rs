//! # RYLR998 Protocol Constants and Types
//!
//! Core definitions for the module's line-oriented AT command protocol.

use crate::error::FrameError;

/// Marker that starts an unsolicited receive frame
pub const RCV_MARKER: &str = "+RCV=";

/// Generic success response
pub const RESPONSE_OK: &str = "+OK";

/// Prefix of a generic failure response, followed by the error code
pub const RESPONSE_ERR_PREFIX: &str = "+ERR=";

/// Emitted after a reset completes
pub const RESPONSE_READY: &str = "+READY";

/// Field delimiter inside frames and command arguments
pub const FIELD_DELIMITER: char = ',';

/// Line terminator the module expects after every command
pub const LINE_TERMINATOR: &str = "\r\n";

/// Largest payload `AT+SEND` accepts
pub const MAX_SEND_PAYLOAD: usize = 240;

/// Minimum delimiters in a well-formed frame body (address,length,payload,rssi,snr)
pub const FRAME_MIN_DELIMITERS: usize = 4;

/// Longest line the module can emit: `+RCV=65535,240,` plus a full payload
/// and the signal fields, rounded up
pub const MAX_LINE_LEN: usize = 280;

/// Classified response line from the module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// `+OK`
    Ok,
    /// `+ERR=<code>`; the code text is kept verbatim
    Error(String),
    /// `+READY`
    Ready,
    /// Nothing arrived before the deadline
    Timeout,
    /// Any other text, e.g. the answer to a query
    Other(String),
}

impl ResponseCode {
    pub fn is_ok(&self) -> bool {
        matches!(self, ResponseCode::Ok)
    }
}

/// Documented `+ERR` codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioErrorCode {
    MissingTerminator,
    MissingAtPrefix,
    UnknownCommand,
    LengthMismatch,
    TxTimeout,
    CrcError,
    TxTooLong,
    FlashWriteFailed,
    UnknownFailure,
    TxNotCompleted,
    PreambleNotAllowed,
    RxHeaderError,
}

impl RadioErrorCode {
    /// Look up a numeric code; unknown codes stay opaque
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::MissingTerminator),
            2 => Some(Self::MissingAtPrefix),
            4 => Some(Self::UnknownCommand),
            5 => Some(Self::LengthMismatch),
            10 => Some(Self::TxTimeout),
            12 => Some(Self::CrcError),
            13 => Some(Self::TxTooLong),
            14 => Some(Self::FlashWriteFailed),
            15 => Some(Self::UnknownFailure),
            17 => Some(Self::TxNotCompleted),
            18 => Some(Self::PreambleNotAllowed),
            19 => Some(Self::RxHeaderError),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingTerminator => "command not terminated with CR LF",
            Self::MissingAtPrefix => "command does not start with AT",
            Self::UnknownCommand => "unknown command or data length mismatch",
            Self::LengthMismatch => "data to send does not match declared length",
            Self::TxTimeout => "transmission timed out",
            Self::CrcError => "CRC error",
            Self::TxTooLong => "TX data exceeds 240 bytes",
            Self::FlashWriteFailed => "failed to write flash memory",
            Self::UnknownFailure => "unknown failure",
            Self::TxNotCompleted => "last TX was not completed",
            Self::PreambleNotAllowed => "preamble value is not allowed",
            Self::RxHeaderError => "RX failed, header error",
        }
    }
}

/// One received `+RCV=` frame, split into its text fields
///
/// `length` is whatever the module declared; it is never used to bound the
/// payload. All fields are empty when the line was too short to split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RadioFrame {
    pub address: String,
    pub length: String,
    pub payload: String,
    pub rssi: String,
    pub snr: String,
    /// Structural problem detected while splitting, if any
    pub error: Option<FrameError>,
}

impl RadioFrame {
    /// True when the frame split cleanly and carries numeric signal fields
    pub fn is_well_formed(&self) -> bool {
        self.error.is_none()
    }
}

/// Integer parse with C `atoi` semantics
///
/// Skips leading whitespace, accepts an optional sign and then as many
/// decimal digits as follow. Anything else parses to 0; overflow saturates.
pub fn parse_or_zero(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = value.saturating_mul(10);
        value = if negative {
            value.saturating_sub(digit)
        } else {
            value.saturating_add(digit)
        };
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_constants() {
        assert_eq!(RCV_MARKER, "+RCV=");
        assert_eq!(RESPONSE_OK, "+OK");
        assert_eq!(LINE_TERMINATOR, "\r\n");
        assert_eq!(MAX_SEND_PAYLOAD, 240);
        assert!(MAX_LINE_LEN > MAX_SEND_PAYLOAD + "+RCV=65535,240,,-164,-20\r\n".len());
    }

    #[test]
    fn test_error_code_lookup() {
        assert_eq!(RadioErrorCode::from_code(13), Some(RadioErrorCode::TxTooLong));
        assert_eq!(RadioErrorCode::from_code(3), None);
        assert_eq!(RadioErrorCode::from_code(99), None);
        assert!(RadioErrorCode::TxTimeout.description().contains("timed out"));
    }

    #[test]
    fn test_parse_or_zero() {
        assert_eq!(parse_or_zero("42"), 42);
        assert_eq!(parse_or_zero("-47"), -47);
        assert_eq!(parse_or_zero("+5"), 5);
        assert_eq!(parse_or_zero("  12"), 12);
        assert_eq!(parse_or_zero("12abc"), 12);
        assert_eq!(parse_or_zero("abc"), 0);
        assert_eq!(parse_or_zero(""), 0);
        assert_eq!(parse_or_zero("-"), 0);
    }

    #[test]
    fn test_parse_or_zero_saturates() {
        assert_eq!(parse_or_zero("99999999999999999999999"), i64::MAX);
        assert_eq!(parse_or_zero("-99999999999999999999999"), i64::MIN);
    }

    #[test]
    fn test_default_frame_is_well_formed_but_empty() {
        let frame = RadioFrame::default();
        assert!(frame.is_well_formed());
        assert!(frame.payload.is_empty());
    }
}
