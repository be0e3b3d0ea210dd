//! Event publishing
//!
//! - `Publisher`: seam between the client and the network
//! - `HttpPublisher`: one POST per call to the ingestion API
//! - `encoding`: JSON body with optional gzip

pub mod encoding;
mod http;

use std::sync::Arc;

use crate::types::Event;

pub use encoding::{encode_body, EncodeError};
pub use http::HttpPublisher;

/// Something that can deliver events to the ingestion API
///
/// Implementations report failure as `false` and never panic on transport
/// errors; the caller decides whether to keep the events.
pub trait Publisher: Send + Sync {
    /// Send a batch (JSON array body)
    fn post(&self, events: &[Event]) -> bool;

    /// Send a single event
    ///
    /// The default sends a one-element batch; `HttpPublisher` overrides it
    /// to send the bare JSON object.
    fn post_one(&self, event: &Event) -> bool {
        self.post(std::slice::from_ref(event))
    }
}

impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    fn post(&self, events: &[Event]) -> bool {
        (**self).post(events)
    }

    fn post_one(&self, event: &Event) -> bool {
        (**self).post_one(event)
    }
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn post(&self, events: &[Event]) -> bool {
        (**self).post(events)
    }

    fn post_one(&self, event: &Event) -> bool {
        (**self).post_one(event)
    }
}
