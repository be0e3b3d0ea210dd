//! Background publishing worker
//!
//! A dedicated thread that runs one tick per interval. The wait between
//! ticks sits on a condition variable so `stop` wakes it immediately; a
//! tick already in progress is allowed to finish.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    cv: Condvar,
}

impl StopSignal {
    /// Wait up to `timeout`; true if a stop was requested
    fn wait(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        self.cv
            .wait_while_for(&mut stopped, |stopped| !*stopped, timeout);
        *stopped
    }

    fn stop(&self) {
        *self.stopped.lock() = true;
        self.cv.notify_all();
    }
}

/// Handle to a running periodic task
pub(crate) struct PublishingWorker {
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl PublishingWorker {
    /// Spawn a thread calling `tick` every `interval` until stopped
    pub(crate) fn spawn<F>(interval: Duration, mut tick: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name("samsara-publisher".to_string())
            .spawn(move || {
                info!(interval_ms = interval.as_millis() as u64, "publishing worker started");
                while !thread_signal.wait(interval) {
                    tick();
                }
                info!("publishing worker stopped");
            })?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit
    pub(crate) fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.signal.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("publishing worker panicked");
            }
        }
    }
}

impl Drop for PublishingWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
