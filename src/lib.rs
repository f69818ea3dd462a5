//! # LoRa MQTT Gateway Library
//!
//! Republish sensor reports received by an RYLR998 LoRa module.
//!
//! Every `+RCV` frame the module reports is split into its fields, the JSON
//! payload is decoded into an ordered document with the frame metadata
//! added, each field is published under a topic root, and the sending node
//! is told over the radio whether publishing worked.

pub mod config;
pub mod error;
pub mod gateway;
pub mod rylr998;
pub mod serial;
pub mod telemetry;
