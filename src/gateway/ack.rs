//! # Acknowledgement Sender
//!
//! Tells the originating node whether its report made it to the broker.

use serde::Serialize;
use tracing::{debug, warn};

use crate::rylr998::Rylr998;
use crate::serial::SerialPortIO;
use crate::telemetry::decoder::KEY_ADDRESS;
use crate::telemetry::TelemetryDocument;

/// Body sent back over the radio: `{"ack":true}` or `{"ack":false}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AckMessage {
    pub ack: bool,
}

impl AckMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Address the ack goes to: the document's already-decoded `address`
pub fn ack_address(document: &TelemetryDocument) -> Option<u16> {
    let raw = document.get(KEY_ADDRESS)?.as_int()?;
    u16::try_from(raw).ok()
}

/// Send an ack (or nak) for the cycle; true if the module answered `+OK`
///
/// Transport problems are logged and reported as `false`, never retried.
pub async fn send_ack<P: SerialPortIO>(
    radio: &mut Rylr998<P>,
    success: bool,
    document: &TelemetryDocument,
) -> bool {
    let Some(address) = ack_address(document) else {
        warn!(
            "Cannot acknowledge: address {:?} is not a radio address",
            document.get(KEY_ADDRESS)
        );
        return false;
    };

    let body = match (AckMessage { ack: success }).to_json() {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to serialize ack: {}", e);
            return false;
        }
    };

    match radio.send(address, &body).await {
        Ok(true) => {
            debug!("Sent {} to {}", body, address);
            true
        }
        Ok(false) => {
            warn!("Radio did not confirm ack to {}", address);
            false
        }
        Err(e) => {
            warn!("Failed to send ack to {}: {}", address, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::port_trait::mocks::MockSerialPort;
    use crate::telemetry::Value;
    use std::time::Duration;

    fn document_from(address: Value) -> TelemetryDocument {
        let mut doc = TelemetryDocument::with_capacity(4);
        doc.set(KEY_ADDRESS, address).unwrap();
        doc
    }

    #[test]
    fn test_ack_message_json() {
        assert_eq!(AckMessage { ack: true }.to_json().unwrap(), r#"{"ack":true}"#);
        assert_eq!(AckMessage { ack: false }.to_json().unwrap(), r#"{"ack":false}"#);
    }

    #[test]
    fn test_ack_address() {
        assert_eq!(ack_address(&document_from(Value::Int(7))), Some(7));
        assert_eq!(ack_address(&document_from(Value::Int(65535))), Some(65535));
        assert_eq!(ack_address(&document_from(Value::Int(65536))), None);
        assert_eq!(ack_address(&document_from(Value::Int(-1))), None);
        assert_eq!(ack_address(&document_from(Value::String("7".into()))), None);
        assert_eq!(ack_address(&TelemetryDocument::with_capacity(1)), None);
    }

    #[tokio::test]
    async fn test_send_ack_to_decoded_address() {
        let port = MockSerialPort::new();
        port.push_incoming("+OK\r\n");
        let mut radio = Rylr998::with_timeout(port.clone(), Duration::from_millis(50));

        assert!(send_ack(&mut radio, true, &document_from(Value::Int(3))).await);
        assert_eq!(port.written_text(), "AT+SEND=3,12,{\"ack\":true}\r\n");
    }

    #[tokio::test]
    async fn test_send_nak() {
        let port = MockSerialPort::new();
        port.push_incoming("+OK\r\n");
        let mut radio = Rylr998::with_timeout(port.clone(), Duration::from_millis(50));

        assert!(send_ack(&mut radio, false, &document_from(Value::Int(3))).await);
        assert_eq!(port.written_text(), "AT+SEND=3,13,{\"ack\":false}\r\n");
    }

    #[tokio::test]
    async fn test_ack_fails_on_timeout() {
        let port = MockSerialPort::new();
        let mut radio = Rylr998::with_timeout(port.clone(), Duration::from_millis(20));
        assert!(!send_ack(&mut radio, true, &document_from(Value::Int(3))).await);
    }

    #[tokio::test]
    async fn test_ack_fails_on_error_response() {
        let port = MockSerialPort::new();
        port.push_incoming("+ERR=10\r\n");
        let mut radio = Rylr998::with_timeout(port.clone(), Duration::from_millis(50));
        assert!(!send_ack(&mut radio, true, &document_from(Value::Int(3))).await);
    }

    #[tokio::test]
    async fn test_ack_not_sent_without_valid_address() {
        let port = MockSerialPort::new();
        let mut radio = Rylr998::with_timeout(port.clone(), Duration::from_millis(20));
        assert!(!send_ack(&mut radio, true, &document_from(Value::Int(70000))).await);
        assert!(port.get_written_data().is_empty());
    }
}
