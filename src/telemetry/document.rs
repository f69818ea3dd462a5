//! # Telemetry Document
//!
//! Ordered, bounded key-value document built fresh for every received frame.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::DecodeError;

/// Scalar value stored in a [`TelemetryDocument`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert one JSON value; nested arrays and objects keep their compact
    /// JSON text, `null` becomes the string `"null"`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Null => Value::String("null".to_string()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Value::String(value.to_string()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::String(v) => serializer.serialize_str(v),
        }
    }
}

/// Insertion-ordered mapping with a hard entry limit
///
/// Setting an existing key replaces its value in place; only new keys count
/// against the capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryDocument {
    entries: Vec<(String, Value)>,
    capacity: usize,
}

impl TelemetryDocument {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite `key`
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::CapacityExceeded`] if `key` is new and the
    /// document is full. The document is left unchanged.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), DecodeError> {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
            return Ok(());
        }
        if self.entries.len() >= self.capacity {
            return Err(DecodeError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.entries.push((key.to_string(), value));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Serialize for TelemetryDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
