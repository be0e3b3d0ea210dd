//! Event validation
//!
//! This module provides table-driven validation of events against the
//! ingestion API requirements.

mod rules;

pub use rules::{validate_event, validate_events, violations, Rule, ValueKind, EVENT_SCHEMA};
