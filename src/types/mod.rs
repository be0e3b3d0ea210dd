//! Data types for the Samsara SDK

mod event;

pub use event::{Event, EVENT_NAME, SOURCE_ID, TIMESTAMP};
