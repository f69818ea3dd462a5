//! # RYLR998 Module
//!
//! Implementation of the REYAX RYLR998 LoRa module's UART protocol.
//!
//! This module handles:
//! - `AT+...` command encoding (send, configuration setters, queries)
//! - `+RCV=` frame splitting and response classification
//! - Time-bounded request/response over the serial line

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod driver;

pub use driver::{ConfigureReport, Rylr998};
pub use protocol::RadioFrame;
