//! Samsara SDK
//!
//! Client-side event ingestion: record telemetry events from any thread,
//! buffer them in memory, and publish them in batches to a Samsara
//! ingestion endpoint.
//!
//! # Features
//!
//! - **Bounded buffer**: fixed-capacity ring buffer, oldest events are
//!   dropped when full
//! - **Consistent flush**: events are removed only after the ingestion API
//!   accepted them, and events recorded during a publish are never lost
//! - **Background publishing**: a worker thread publishes every
//!   `publish_interval_ms` once `min_buffer_size` events are queued
//! - **Validation**: every problem in an event (or batch) is reported at once
//!
//! # Modules
//!
//! - `buffer`: `RingBuffer` with snapshot/commit flushing
//! - `types`: the `Event` record
//! - `validation`: table-driven event validation
//! - `config`: client configuration, JSON and environment loading
//! - `publisher`: `Publisher` trait and the HTTP implementation
//! - `client`: `Client`, the main entry point
//! - `error`: error types
//! - `utils`: timestamp helpers
//!
//! # Example
//!
//! ```no_run
//! use samsara_sdk::{Client, Config, Event};
//!
//! fn main() -> samsara_sdk::SdkResult<()> {
//!     let config = Config::new("http://samsara-ingestion.local/").with_source_id("my-app");
//!     let client = Client::new(config)?;
//!
//!     client.record_event(Event::named("app.started").with("version", "1.2.0"))?;
//!     client.flush_buffer();
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod client;
pub mod config;
pub mod error;
pub mod publisher;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items at crate root
pub use buffer::{RingBuffer, Snapshot};
pub use client::Client;
pub use config::{Compression, Config, API_PATH, PUBLISHED_TIMESTAMP_HEADER};
pub use error::{
    ConfigError, EventValidationError, FieldViolation, SdkError, SdkResult, ViolationKind,
};
pub use publisher::{HttpPublisher, Publisher};
pub use types::Event;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
