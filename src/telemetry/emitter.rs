//! # Report Emitter
//!
//! Publishes every field of a decoded document under `<topic_root><key>`
//! and queues a `key:value` line per field for the display.

use tracing::{debug, warn};

use super::display::DisplayQueue;
use super::document::TelemetryDocument;
use super::format::format_value;
use super::publisher::Publisher;

/// Publish tally for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmitReport {
    pub published: usize,
    pub fields: usize,
}

impl EmitReport {
    /// True when every field was published (or no broker is configured)
    pub fn success(&self) -> bool {
        self.published >= self.fields
    }
}

pub struct ReportEmitter {
    topic_root: String,
    /// `None` when no broker is configured
    publisher: Option<Box<dyn Publisher>>,
    display: DisplayQueue,
}

impl std::fmt::Debug for ReportEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEmitter")
            .field("topic_root", &self.topic_root)
            .field("broker_configured", &self.publisher.is_some())
            .field("display", &self.display)
            .finish()
    }
}

impl ReportEmitter {
    pub fn new(topic_root: impl Into<String>, publisher: Option<Box<dyn Publisher>>, display_len: usize) -> Self {
        Self {
            topic_root: topic_root.into(),
            publisher,
            display: DisplayQueue::new(display_len),
        }
    }

    pub fn display_mut(&mut self) -> &mut DisplayQueue {
        &mut self.display
    }

    /// Publish each field in insertion order
    ///
    /// Without a broker every field counts as published and nothing goes
    /// out. With a broker that is not connected every field fails without
    /// a publish attempt. Failures are never retried here.
    pub async fn emit(&mut self, document: &TelemetryDocument) -> EmitReport {
        let mut report = EmitReport {
            published: 0,
            fields: document.len(),
        };

        for (key, value) in document.iter() {
            let formatted = format_value(value);
            let topic = format!("{}{}", self.topic_root, key);
            debug!("{} {}", topic, formatted);

            let ok = match self.publisher.as_mut() {
                None => true,
                Some(publisher) if publisher.is_connected() => publisher.publish(&topic, &formatted, true).await,
                Some(_) => false,
            };

            if ok {
                report.published += 1;
            } else {
                warn!("Failed publishing {}", topic);
            }

            self.display.push(format!("{}:{}", key, formatted));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::document::Value;
    use crate::telemetry::publisher::MockPublisher;
    use mockall::predicate::eq;

    fn sample_document() -> TelemetryDocument {
        let mut doc = TelemetryDocument::with_capacity(8);
        doc.set("distance", Value::Int(8123)).unwrap();
        doc.set("battery", Value::Float(3.41)).unwrap();
        doc.set("present", Value::Bool(true)).unwrap();
        doc.set("state", Value::String("YES".to_string())).unwrap();
        doc
    }

    #[tokio::test]
    async fn test_publishes_each_field_retained() {
        let mut publisher = MockPublisher::new();
        publisher.expect_is_connected().return_const(true);
        let mut seq = mockall::Sequence::new();
        for (topic, payload) in [
            ("mailbox/distance", "8123"),
            ("mailbox/battery", "3.41"),
            ("mailbox/present", "true"),
            ("mailbox/state", "YES"),
        ] {
            publisher
                .expect_publish()
                .with(eq(topic), eq(payload), eq(true))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _, _| true);
        }

        let mut emitter = ReportEmitter::new("mailbox/", Some(Box::new(publisher)), 8);
        let report = emitter.emit(&sample_document()).await;

        assert_eq!(report, EmitReport { published: 4, fields: 4 });
        assert!(report.success());
    }

    #[tokio::test]
    async fn test_partial_publish_failure() {
        let mut publisher = MockPublisher::new();
        publisher.expect_is_connected().return_const(true);
        publisher
            .expect_publish()
            .returning(|topic, _, _| !topic.ends_with("battery"));

        let mut emitter = ReportEmitter::new("mailbox/", Some(Box::new(publisher)), 8);
        let report = emitter.emit(&sample_document()).await;

        assert_eq!(report.published, 3);
        assert_eq!(report.fields, 4);
        assert!(!report.success());
    }

    #[tokio::test]
    async fn test_disconnected_broker_fails_without_publishing() {
        let mut publisher = MockPublisher::new();
        publisher.expect_is_connected().return_const(false);
        publisher.expect_publish().never();

        let mut emitter = ReportEmitter::new("mailbox/", Some(Box::new(publisher)), 8);
        let report = emitter.emit(&sample_document()).await;

        assert_eq!(report.published, 0);
        assert!(!report.success());
    }

    #[tokio::test]
    async fn test_no_broker_counts_every_field_as_published() {
        let mut emitter = ReportEmitter::new("", None, 8);
        let report = emitter.emit(&sample_document()).await;
        assert_eq!(report, EmitReport { published: 4, fields: 4 });
        assert!(report.success());
    }

    #[tokio::test]
    async fn test_empty_document_is_success() {
        let mut emitter = ReportEmitter::new("", None, 8);
        let report = emitter.emit(&TelemetryDocument::with_capacity(4)).await;
        assert!(report.success());
    }

    #[tokio::test]
    async fn test_display_lines_are_queued_and_bounded() {
        let mut emitter = ReportEmitter::new("", None, 3);
        emitter.emit(&sample_document()).await;

        let lines = emitter.display_mut().drain();
        assert_eq!(lines, vec!["battery:3.41", "present:true", "state:YES"]);
        assert_eq!(emitter.display_mut().dropped(), 1);
    }
}
