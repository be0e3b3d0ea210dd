//! Event queue between producers and the publisher
//!
//! - `RingBuffer`: bounded, overwrite-on-full FIFO with snapshot/commit flush
//! - `Snapshot`: what a flush captured, and how to commit it

mod ring;

pub use ring::{RingBuffer, Snapshot};
