//! # Publisher
//!
//! The broker side of the gateway. The MQTT client itself lives outside this
//! crate; anything that can report its connection state and publish a
//! retained string message implements [`Publisher`].

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;

/// Output value for [`JsonlPublisher::open`] meaning standard output
pub const STDOUT_OUTPUT: &str = "-";

/// Publish collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send {
    /// Whether the broker connection is currently up
    fn is_connected(&self) -> bool;

    /// Publish `payload` on `topic`; true if the broker accepted it
    async fn publish(&mut self, topic: &str, payload: &str, retain: bool) -> bool;
}

/// One published message as written by [`JsonlPublisher`]
#[derive(Debug, Serialize)]
struct PublishRecord<'a> {
    timestamp: String,
    topic: &'a str,
    payload: &'a str,
    retain: bool,
}

/// Writes each publish as one JSON line
///
/// Meant to be tailed by a broker bridge. Always reports itself connected.
pub struct JsonlPublisher {
    writer: Box<dyn Write + Send>,
    published: u64,
}

impl std::fmt::Debug for JsonlPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlPublisher")
            .field("published", &self.published)
            .finish_non_exhaustive()
    }
}

impl JsonlPublisher {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            published: 0,
        }
    }

    /// Open `output`: `-` for stdout, otherwise a file opened for appending
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or opened
    pub fn open(output: &str) -> Result<Self> {
        if output == STDOUT_OUTPUT {
            info!("Publishing to stdout");
            return Ok(Self::new(Box::new(io::stdout())));
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(Path::new(output))?;
        info!("Publishing to {}", output);
        Ok(Self::new(Box::new(io::LineWriter::new(file))))
    }

    /// Messages written so far
    pub fn published(&self) -> u64 {
        self.published
    }

    fn write_record(&mut self, topic: &str, payload: &str, retain: bool) -> Result<()> {
        let record = PublishRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            topic,
            payload,
            retain,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl Publisher for JsonlPublisher {
    fn is_connected(&self) -> bool {
        true
    }

    async fn publish(&mut self, topic: &str, payload: &str, retain: bool) -> bool {
        match self.write_record(topic, payload, retain) {
            Ok(()) => {
                self.published += 1;
                true
            }
            Err(e) => {
                warn!("Failed to publish {}: {}", topic, e);
                false
            }
        }
    }
}
