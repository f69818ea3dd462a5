//! # Gateway Module
//!
//! One cycle per received frame: split → decode → publish → acknowledge.
//!
//! [`Gateway`] is the explicit context the control loop drives. It owns the
//! radio driver and the report emitter; nothing is shared between cycles
//! except the emitter's display queue. Every outcome is returned as counts
//! and flags, nothing in a cycle aborts the loop.

pub mod ack;

use tracing::{debug, info, warn};

use crate::error::{DecodeError, FrameError, Result};
use crate::rylr998::decoder::decode_frame;
use crate::rylr998::Rylr998;
use crate::serial::SerialPortIO;
use crate::telemetry::{decode_payload, ReportEmitter};

/// Derived result of one cycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleOutcome {
    pub published_count: usize,
    pub field_count: usize,
    /// Whether the radio confirmed the acknowledgement
    pub ack_sent: bool,
    /// Structural problem with the frame, if any
    pub frame_error: Option<FrameError>,
    /// Why the payload could not be decoded, if it could not
    pub decode_error: Option<DecodeError>,
}

impl CycleOutcome {
    /// Publish side of the cycle; tracked separately from [`Self::ack_sent`]
    pub fn publish_succeeded(&self) -> bool {
        self.published_count >= self.field_count
    }
}

pub struct Gateway<P: SerialPortIO> {
    radio: Rylr998<P>,
    emitter: ReportEmitter,
    field_capacity: usize,
}

impl<P: SerialPortIO> std::fmt::Debug for Gateway<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("radio", &self.radio)
            .field("emitter", &self.emitter)
            .field("field_capacity", &self.field_capacity)
            .finish()
    }
}

impl<P: SerialPortIO> Gateway<P> {
    pub fn new(radio: Rylr998<P>, emitter: ReportEmitter, field_capacity: usize) -> Self {
        Self {
            radio,
            emitter,
            field_capacity,
        }
    }

    pub fn emitter_mut(&mut self) -> &mut ReportEmitter {
        &mut self.emitter
    }

    /// Wait for the next line from the radio
    pub async fn next_line(&mut self) -> Result<String> {
        self.radio.next_line().await
    }

    /// Process one received line
    ///
    /// Returns `None` for lines that are not receive frames (stray command
    /// responses, `+READY`, blank lines).
    pub async fn handle_line(&mut self, line: &str) -> Option<CycleOutcome> {
        debug!("Received from radio: {}", line);

        let Some(frame) = decode_frame(line) else {
            if !line.is_empty() {
                debug!("Ignoring non-frame line: {}", line);
            }
            return None;
        };

        if let Some(e) = &frame.error {
            warn!("Frame problem: {}", e);
        }

        let decoded = decode_payload(&frame, self.field_capacity);
        if !decoded.usable {
            warn!("Dropping frame without publishing or acknowledging: {}", line);
            return Some(CycleOutcome {
                frame_error: frame.error,
                decode_error: decoded.error,
                ..CycleOutcome::default()
            });
        }

        match serde_json::to_string(&decoded.document) {
            Ok(json) => debug!("Document: {}", json),
            Err(e) => debug!("Document could not be serialized: {}", e),
        }

        let report = self.emitter.emit(&decoded.document).await;
        let ack_sent = ack::send_ack(&mut self.radio, report.success(), &decoded.document).await;

        let outcome = CycleOutcome {
            published_count: report.published,
            field_count: report.fields,
            ack_sent,
            frame_error: frame.error,
            decode_error: decoded.error,
        };

        info!(
            "Cycle complete: published {}/{} fields, ack {}",
            outcome.published_count,
            outcome.field_count,
            if outcome.ack_sent { "sent" } else { "failed" }
        );
        Some(outcome)
    }
}
