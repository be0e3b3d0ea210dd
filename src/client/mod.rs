//! Samsara client
//!
//! The client owns the event buffer and a publisher. Events recorded with
//! `record_event` are enriched, validated and queued; a background worker
//! periodically publishes the queue and only removes what the ingestion API
//! accepted. `publish_events` bypasses the queue entirely.
//!
//! ```text
//! record_event ──► enrich ──► validate ──► RingBuffer::push
//!
//! worker tick ──► count >= min_buffer_size?
//!                      │ yes
//!                      ▼
//!               snapshot ──► Publisher::post ──► 202? commit : keep
//! ```

mod worker;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::buffer::RingBuffer;
use crate::config::Config;
use crate::error::{EventValidationError, SdkResult};
use crate::publisher::{HttpPublisher, Publisher};
use crate::types::Event;
use crate::utils::{current_timestamp_millis, millis};
use crate::validation::{validate_event, validate_events};

use worker::PublishingWorker;

/// State shared between the client handle and its worker thread
struct Shared<P> {
    config: Config,
    publisher: P,
    buffer: RingBuffer<Event>,
}

impl<P: Publisher> Shared<P> {
    fn enrich(&self, event: &mut Event) {
        event.enrich(self.config.source_id.as_deref(), current_timestamp_millis());
    }

    /// One publish attempt; returns the number of events removed
    fn publish_buffered(&self, force: bool) -> usize {
        let count = self.buffer.count();
        if count == 0 || (!force && count < self.config.min_buffer_size) {
            return 0;
        }

        let snapshot = self.buffer.snapshot();
        if self.publisher.post(snapshot.items()) {
            let removed = self.buffer.commit(&snapshot);
            debug!(sent = snapshot.len(), removed, "buffered events published");
            removed
        } else {
            warn!(
                kept = snapshot.len(),
                "publish failed, keeping events for the next cycle"
            );
            0
        }
    }
}

/// A client for ingesting events into Samsara
///
/// `Client` is `Send + Sync`; share it between threads with `Arc`.
/// Dropping it stops the publishing worker.
pub struct Client<P: Publisher + 'static = HttpPublisher> {
    shared: Arc<Shared<P>>,
    worker: Mutex<Option<PublishingWorker>>,
}

impl Client<HttpPublisher> {
    /// Create a client that publishes over HTTP
    ///
    /// Starts the publishing worker if `start_publishing_thread` is set.
    pub fn new(config: Config) -> SdkResult<Self> {
        config.validate()?;
        let publisher = HttpPublisher::new(&config)?;
        Self::with_publisher(config, publisher)
    }
}

impl<P: Publisher + 'static> Client<P> {
    /// Create a client with a custom publisher
    pub fn with_publisher(config: Config, publisher: P) -> SdkResult<Self> {
        config.validate()?;

        let buffer = RingBuffer::new(config.max_buffer_size);
        let start = config.start_publishing_thread;
        let client = Self {
            shared: Arc::new(Shared {
                config,
                publisher,
                buffer,
            }),
            worker: Mutex::new(None),
        };

        if start {
            client.start_publishing()?;
        }

        Ok(client)
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// The queue of recorded events
    pub fn buffer(&self) -> &RingBuffer<Event> {
        &self.shared.buffer
    }

    /// Number of events waiting to be published
    pub fn buffered_count(&self) -> usize {
        self.shared.buffer.count()
    }

    /// Enrich, validate and queue an event
    ///
    /// An invalid event is rejected and the queue is left untouched.
    pub fn record_event(&self, mut event: Event) -> Result<(), EventValidationError> {
        self.shared.enrich(&mut event);
        validate_event(&event)?;
        self.shared.buffer.push(event);
        Ok(())
    }

    /// Enrich, validate and queue several events
    ///
    /// Nothing is queued unless every event is valid.
    pub fn record_events(&self, mut events: Vec<Event>) -> Result<(), EventValidationError> {
        for event in events.iter_mut() {
            self.shared.enrich(event);
        }
        validate_events(&events)?;
        self.shared.buffer.push_all(events);
        Ok(())
    }

    /// Publish events immediately, bypassing the queue
    ///
    /// Returns `Ok(true)` if the ingestion API accepted them. All validation
    /// errors are collected before anything is sent.
    pub fn publish_events(&self, mut events: Vec<Event>) -> Result<bool, EventValidationError> {
        for event in events.iter_mut() {
            self.shared.enrich(event);
        }
        validate_events(&events)?;
        Ok(self.shared.publisher.post(&events))
    }

    /// Publish a single event immediately as a JSON object body
    pub fn publish_event(&self, mut event: Event) -> Result<bool, EventValidationError> {
        self.shared.enrich(&mut event);
        validate_event(&event)?;
        Ok(self.shared.publisher.post_one(&event))
    }

    /// Publish whatever is queued now, ignoring `min_buffer_size`
    ///
    /// Returns the number of events removed from the queue (0 on failure).
    pub fn flush_buffer(&self) -> usize {
        self.shared.publish_buffered(true)
    }

    /// Start the periodic publishing worker; no-op if already running
    pub fn start_publishing(&self) -> SdkResult<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let interval = millis(shared.config.publish_interval_ms);
        *worker = Some(PublishingWorker::spawn(interval, move || {
            shared.publish_buffered(false);
        })?);
        Ok(())
    }

    /// Stop the periodic publishing worker; no-op if not running
    ///
    /// Returns once the worker has exited. A POST already in flight is
    /// allowed to finish or time out.
    pub fn stop_publishing(&self) {
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.stop();
        }
    }

    pub fn is_publishing(&self) -> bool {
        self.worker.lock().is_some()
    }
}

impl<P: Publisher + 'static> Drop for Client<P> {
    fn drop(&mut self) {
        self.stop_publishing();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EVENT_NAME, SOURCE_ID, TIMESTAMP};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Publisher that records every batch and answers with a switchable result
    #[derive(Default)]
    struct RecordingPublisher {
        accept: AtomicBool,
        batches: Mutex<Vec<Vec<Event>>>,
    }

    impl RecordingPublisher {
        fn accepting() -> Self {
            let publisher = Self::default();
            publisher.accept.store(true, Ordering::SeqCst);
            publisher
        }

        fn batches(&self) -> Vec<Vec<Event>> {
            self.batches.lock().clone()
        }
    }

    impl Publisher for RecordingPublisher {
        fn post(&self, events: &[Event]) -> bool {
            self.batches.lock().push(events.to_vec());
            self.accept.load(Ordering::SeqCst)
        }
    }

    fn idle_config() -> Config {
        Config::new("http://localhost:9000")
            .with_source_id("test-source")
            .with_publishing_thread(false)
            .with_buffer_sizes(2, 5)
    }

    fn idle_client(publisher: RecordingPublisher) -> Client<Arc<RecordingPublisher>> {
        let publisher = Arc::new(publisher);
        Client::with_publisher(idle_config(), publisher).unwrap()
    }

    #[test]
    fn test_record_event_enriches_and_queues() {
        let client = idle_client(RecordingPublisher::accepting());
        client.record_event(Event::named("opened")).unwrap();

        let queued = client.buffer().flush();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].source_id(), Some("test-source"));
        assert!(queued[0].timestamp().unwrap() > 0);
    }

    #[test]
    fn test_record_invalid_event_leaves_queue_untouched() {
        let client = idle_client(RecordingPublisher::accepting());
        let err = client
            .record_event(Event::new().with(EVENT_NAME, "  "))
            .unwrap_err();
        assert!(err.mentions(EVENT_NAME));
        assert_eq!(client.buffered_count(), 0);
    }

    #[test]
    fn test_record_events_is_all_or_nothing() {
        let client = idle_client(RecordingPublisher::accepting());
        let err = client
            .record_events(vec![
                Event::named("ok"),
                Event::named("bad").with(TIMESTAMP, -3),
            ])
            .unwrap_err();
        assert_eq!(err.violations[0].index, Some(1));
        assert_eq!(client.buffered_count(), 0);

        client
            .record_events(vec![Event::named("a"), Event::named("b")])
            .unwrap();
        assert_eq!(client.buffered_count(), 2);
    }

    #[test]
    fn test_publish_events_bypasses_queue() {
        let publisher = Arc::new(RecordingPublisher::accepting());
        let client = Client::with_publisher(idle_config(), Arc::clone(&publisher)).unwrap();

        let sent = client
            .publish_events(vec![Event::named("direct")])
            .unwrap();
        assert!(sent);
        assert_eq!(client.buffered_count(), 0);
        assert_eq!(publisher.batches().len(), 1);
    }

    #[test]
    fn test_publish_events_collects_all_errors_before_sending() {
        let publisher = Arc::new(RecordingPublisher::accepting());
        let config = Config::new("http://x").with_publishing_thread(false);
        let client = Client::with_publisher(config, Arc::clone(&publisher)).unwrap();

        let err = client
            .publish_events(vec![
                Event::named(""),
                Event::new().with(SOURCE_ID, "s"),
            ])
            .unwrap_err();

        assert!(err.violations.len() >= 3);
        assert!(publisher.batches().is_empty());
    }

    #[test]
    fn test_periodic_cycle_respects_min_buffer_size() {
        let publisher = Arc::new(RecordingPublisher::accepting());
        let client = Client::with_publisher(idle_config(), Arc::clone(&publisher)).unwrap();

        client.record_event(Event::named("one")).unwrap();
        assert_eq!(client.shared.publish_buffered(false), 0);
        assert!(publisher.batches().is_empty());

        client.record_event(Event::named("two")).unwrap();
        assert_eq!(client.shared.publish_buffered(false), 2);
        assert_eq!(client.buffered_count(), 0);
    }

    #[test]
    fn test_failed_publish_keeps_events() {
        let publisher = Arc::new(RecordingPublisher::default());
        let client = Client::with_publisher(idle_config(), Arc::clone(&publisher)).unwrap();

        client.record_event(Event::named("a")).unwrap();
        client.record_event(Event::named("b")).unwrap();
        assert_eq!(client.flush_buffer(), 0);
        assert_eq!(client.buffered_count(), 2);

        publisher.accept.store(true, Ordering::SeqCst);
        assert_eq!(client.flush_buffer(), 2);
        assert_eq!(client.buffered_count(), 0);
        assert_eq!(publisher.batches().len(), 2);
    }

    #[test]
    fn test_flush_buffer_skips_empty_queue() {
        let publisher = Arc::new(RecordingPublisher::accepting());
        let client = Client::with_publisher(idle_config(), Arc::clone(&publisher)).unwrap();
        assert_eq!(client.flush_buffer(), 0);
        assert!(publisher.batches().is_empty());
    }

    #[test]
    fn test_start_and_stop_publishing() {
        let client = idle_client(RecordingPublisher::accepting());
        assert!(!client.is_publishing());

        client.start_publishing().unwrap();
        client.start_publishing().unwrap();
        assert!(client.is_publishing());

        client.stop_publishing();
        client.stop_publishing();
        assert!(!client.is_publishing());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config::new("").with_publishing_thread(false);
        let result = Client::with_publisher(config, RecordingPublisher::default());
        assert!(matches!(
            result,
            Err(crate::error::SdkError::Config(crate::error::ConfigError::MissingUrl))
        ));
    }
}
