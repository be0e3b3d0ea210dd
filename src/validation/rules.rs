//! Declarative field rules for ingestion events
//!
//! Each required field maps to a list of rules checked in order. A field
//! stops being checked at its first failing rule, but every field is always
//! checked, so one pass reports everything that is wrong with an event.

use serde_json::Value;

use crate::error::{EventValidationError, FieldViolation, ViolationKind};
use crate::types::{Event, EVENT_NAME, SOURCE_ID, TIMESTAMP};

/// JSON value kinds a rule can require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
}

impl ValueKind {
    fn name(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
        }
    }
}

/// A single validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field must be present and not null
    Required,
    /// Field must hold a value of this kind
    Type(ValueKind),
    /// String field must contain something other than whitespace
    NonBlank,
    /// Integer field must be at least this value
    Minimum(i64),
}

/// Rule table for events accepted by the ingestion API
pub const EVENT_SCHEMA: &[(&str, &[Rule])] = &[
    (
        SOURCE_ID,
        &[Rule::Required, Rule::Type(ValueKind::String), Rule::NonBlank],
    ),
    (
        EVENT_NAME,
        &[Rule::Required, Rule::Type(ValueKind::String), Rule::NonBlank],
    ),
    (
        TIMESTAMP,
        &[Rule::Required, Rule::Type(ValueKind::Integer), Rule::Minimum(0)],
    ),
];

/// Check one rule against a (possibly missing) field value
fn check(rule: Rule, value: Option<&Value>) -> Option<ViolationKind> {
    match (rule, value) {
        (Rule::Required, None | Some(Value::Null)) => Some(ViolationKind::Required),
        (_, None | Some(Value::Null)) => None,
        (Rule::Required, Some(_)) => None,
        (Rule::Type(kind), Some(v)) => {
            (!kind.matches(v)).then_some(ViolationKind::WrongType(kind.name()))
        }
        (Rule::NonBlank, Some(v)) => v
            .as_str()
            .filter(|s| s.trim().is_empty())
            .map(|_| ViolationKind::Blank),
        (Rule::Minimum(min), Some(v)) => v
            .as_i64()
            .filter(|n| *n < min)
            .map(|_| ViolationKind::BelowMinimum(min)),
    }
}

/// Collect every violation of `schema` in `event`
pub fn violations(
    event: &Event,
    schema: &[(&'static str, &[Rule])],
    index: Option<usize>,
) -> Vec<FieldViolation> {
    let mut found = Vec::new();

    for &(field, rules) in schema {
        let value = event.get(field);
        if let Some(kind) = rules.iter().find_map(|rule| check(*rule, value)) {
            found.push(FieldViolation {
                index,
                field,
                kind,
            });
        }
    }

    found
}

/// Validate a single event against the ingestion schema
pub fn validate_event(event: &Event) -> Result<(), EventValidationError> {
    let found = violations(event, EVENT_SCHEMA, None);
    if found.is_empty() {
        Ok(())
    } else {
        Err(EventValidationError { violations: found })
    }
}

/// Validate a batch, reporting violations of every event with its index
pub fn validate_events(events: &[Event]) -> Result<(), EventValidationError> {
    let found: Vec<FieldViolation> = events
        .iter()
        .enumerate()
        .flat_map(|(i, event)| violations(event, EVENT_SCHEMA, Some(i)))
        .collect();

    if found.is_empty() {
        Ok(())
    } else {
        Err(EventValidationError { violations: found })
    }
}
