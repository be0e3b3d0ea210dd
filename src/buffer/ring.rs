//! Bounded ring buffer with snapshot/commit flushing
//!
//! Every pushed element gets a monotonically increasing sequence number.
//! The buffer keeps two counters:
//!
//! - `low`: sequence of the oldest live element
//! - `high`: sequence the next push will receive
//!
//! The element with sequence `s` lives in slot `s % capacity`, so
//! `high - low` is the occupied count and `low..high` is FIFO order.
//!
//! ```text
//!   slots:  [ f ][ b ][ c ][ d ]        capacity 4
//!             ^    ^
//!           s=4  s=1 (low)              high = 5
//! ```
//!
//! A snapshot records `high` as its commit mark. Committing moves `low`
//! forward to the mark, but never backwards: if pushes during the external
//! work already evicted past the mark, the current `low` wins.

use parking_lot::Mutex;
use tracing::trace;

/// Point-in-time FIFO copy of the buffer plus the mark needed to commit it
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    items: Vec<T>,
    mark: u64,
}

impl<T> Snapshot<T> {
    /// Elements in FIFO order (oldest first)
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of elements captured
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was captured
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Commit mark: sequence one past the newest captured element
    pub fn mark(&self) -> u64 {
        self.mark
    }

    /// Take ownership of the captured elements
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

struct Inner<T> {
    slots: Vec<Option<T>>,
    low: u64,
    high: u64,
}

impl<T> Inner<T> {
    fn capacity(&self) -> u64 {
        self.slots.len() as u64
    }

    fn position(&self, seq: u64) -> usize {
        (seq % self.capacity()) as usize
    }

    fn count(&self) -> usize {
        (self.high - self.low) as usize
    }

    fn push(&mut self, value: T) {
        if self.slots.is_empty() {
            return;
        }

        let pos = self.position(self.high);
        self.slots[pos] = Some(value);
        self.high += 1;

        if self.high - self.low > self.capacity() {
            trace!(evicted_seq = self.low, "ring buffer full, evicting oldest element");
            self.low += 1;
        }
    }
}

/// Thread-safe bounded FIFO that overwrites its oldest element when full
///
/// All state is guarded by one mutex. `flush_with` releases the lock while
/// the caller processes the snapshot, so producers are never blocked by
/// network I/O.
pub struct RingBuffer<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Create a buffer with a fixed capacity
    ///
    /// A zero-capacity buffer is legal: every push is silently dropped.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            inner: Mutex::new(Inner {
                slots,
                low: 0,
                high: 0,
            }),
            capacity,
        }
    }

    /// Maximum number of elements held at once
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of elements
    pub fn count(&self) -> usize {
        self.inner.lock().count()
    }

    /// Whether the buffer holds `capacity` elements
    ///
    /// A zero-capacity buffer is both empty and full.
    pub fn is_full(&self) -> bool {
        self.count() == self.capacity
    }

    /// Whether the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Push an element, evicting the oldest one if the buffer is full
    pub fn push(&self, value: T) {
        self.inner.lock().push(value);
    }

    /// Push several elements under a single lock acquisition
    pub fn push_all<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut inner = self.inner.lock();
        for value in values {
            inner.push(value);
        }
    }

    /// Copy out the live elements in FIFO order together with a commit mark
    pub fn snapshot(&self) -> Snapshot<T> {
        let inner = self.inner.lock();

        let items = (inner.low..inner.high)
            .filter_map(|seq| inner.slots[inner.position(seq)].clone())
            .collect();

        Snapshot {
            items,
            mark: inner.high,
        }
    }

    /// Remove the elements captured by `snapshot` that are still buffered
    ///
    /// Elements pushed after the snapshot was taken are kept. Returns the
    /// number of elements actually removed.
    pub fn commit(&self, snapshot: &Snapshot<T>) -> usize {
        let mut inner = self.inner.lock();

        // A mark past `high` cannot come from this buffer
        let old_low = inner.low;
        let new_low = old_low.max(snapshot.mark.min(inner.high));
        for seq in old_low..new_low {
            let pos = inner.position(seq);
            inner.slots[pos] = None;
        }
        inner.low = new_low;

        (new_low - old_low) as usize
    }

    /// Extract every element and clear them from the buffer
    pub fn flush(&self) -> Vec<T> {
        self.flush_with(|_| true)
    }

    /// Extract every element, hand them to `process`, and clear them only if
    /// `process` returns true
    ///
    /// `process` runs without the lock held. Elements pushed while it runs
    /// are always retained. The snapshot is returned whatever the outcome.
    pub fn flush_with<F>(&self, process: F) -> Vec<T>
    where
        F: FnOnce(&[T]) -> bool,
    {
        let snapshot = self.snapshot();
        if process(snapshot.items()) {
            self.commit(&snapshot);
        }
        snapshot.into_items()
    }
}

impl<T: Clone> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("count", &self.count())
            .finish()
    }
}
