//! HTTP publisher for the Samsara ingestion API

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use super::encoding::encode_body;
use super::Publisher;
use crate::config::{Compression, Config, PUBLISHED_TIMESTAMP_HEADER};
use crate::types::Event;
use crate::utils::{current_timestamp_millis, millis};

/// Blocking HTTP transport that POSTs events to `<url>/v1/events`
///
/// Each call makes exactly one attempt. Only `202 Accepted` counts as
/// success; any other status, a timeout or a connection error is `false`.
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: Client,
    endpoint: String,
    compression: Compression,
}

impl HttpPublisher {
    /// Create a publisher from client configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(millis(config.send_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.events_url(),
            compression: config.compression,
        })
    }

    /// Target URL of every POST
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send<T>(&self, payload: &T, count: usize) -> bool
    where
        T: Serialize + ?Sized,
    {
        let body = match encode_body(payload, self.compression) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to encode events");
                return false;
            }
        };

        let result = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_ENCODING, self.compression.content_encoding())
            .header(
                PUBLISHED_TIMESTAMP_HEADER,
                current_timestamp_millis().to_string(),
            )
            .body(body)
            .send();

        match result {
            Ok(response) if response.status() == StatusCode::ACCEPTED => {
                debug!(count, endpoint = %self.endpoint, "published events");
                true
            }
            Ok(response) => {
                warn!(
                    count,
                    status = %response.status(),
                    endpoint = %self.endpoint,
                    "ingestion API rejected events"
                );
                false
            }
            Err(e) => {
                warn!(count, error = %e, endpoint = %self.endpoint, "failed to publish events");
                false
            }
        }
    }
}

impl Publisher for HttpPublisher {
    fn post(&self, events: &[Event]) -> bool {
        self.send(events, events.len())
    }

    fn post_one(&self, event: &Event) -> bool {
        self.send(event, 1)
    }
}
