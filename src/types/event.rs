//! Telemetry event record
//!
//! An event is an ordered JSON object. Three fields are required by the
//! ingestion API (`sourceId`, `eventName`, `timestamp`); everything else is
//! passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the event source identifier
pub const SOURCE_ID: &str = "sourceId";
/// Field holding the event name
pub const EVENT_NAME: &str = "eventName";
/// Field holding the epoch-millisecond timestamp
pub const TIMESTAMP: &str = "timestamp";

/// A single telemetry record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Map<String, Value>);

impl Event {
    /// Create an empty event
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Create an event with only `eventName` set
    pub fn named(event_name: impl Into<String>) -> Self {
        Self::new().with(EVENT_NAME, event_name.into())
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field, returning the previous value if any
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Get a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether a field is present with a non-null value
    pub fn has(&self, field: &str) -> bool {
        !matches!(self.0.get(field), None | Some(Value::Null))
    }

    pub fn source_id(&self) -> Option<&str> {
        self.get(SOURCE_ID).and_then(Value::as_str)
    }

    pub fn event_name(&self) -> Option<&str> {
        self.get(EVENT_NAME).and_then(Value::as_str)
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.get(TIMESTAMP).and_then(Value::as_i64)
    }

    /// Fill in defaults for missing fields
    ///
    /// `sourceId` comes from `default_source_id` (if any), `timestamp` from
    /// `now_ms`. Present values are never overwritten.
    pub fn enrich(&mut self, default_source_id: Option<&str>, now_ms: i64) {
        if !self.has(SOURCE_ID) {
            if let Some(source_id) = default_source_id {
                self.insert(SOURCE_ID, source_id);
            }
        }
        if !self.has(TIMESTAMP) {
            self.insert(TIMESTAMP, now_ms);
        }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Event {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Event {
    type Error = Value;

    /// Only JSON objects are events; any other value is handed back
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}
