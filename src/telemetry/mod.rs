//! # Telemetry Module
//!
//! Handles sensor reports carried inside radio frames.
//!
//! This module handles:
//! - Decoding the frame payload into an ordered, bounded document
//! - Injecting frame metadata (address, length, rssi, snr)
//! - Formatting values and publishing each field under the topic root
//! - Queueing display lines for an attached screen

pub mod document;
pub mod decoder;
pub mod format;
pub mod display;
pub mod publisher;
pub mod emitter;

pub use decoder::{decode_payload, DecodedFrame};
pub use document::{TelemetryDocument, Value};
pub use emitter::{EmitReport, ReportEmitter};
pub use publisher::{JsonlPublisher, Publisher};
