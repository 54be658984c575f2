//! Output byte-sink contract
//!
//! Validated payload bytes are handed downstream through a bounded,
//! single-writer sink with a reserve/commit protocol: the writer reserves a
//! contiguous writable span, fills it, then commits the bytes actually
//! written. The ring-buffer implementation backing a real deployment lives
//! with the storage/display stage; this crate only defines the contract and
//! a growable in-memory sink for tests and non-realtime front ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::error::CaptureError;

/// Byte-addressed output sink with a reserve/commit write protocol.
///
/// Implementations are written to from a single thread. `reserve` followed by
/// `commit` must be paired; committing fewer bytes than reserved releases the
/// unused tail.
pub trait ByteSink {
    /// True when `len` bytes can currently be reserved.
    ///
    /// Space only grows between the writer's calls (the reader drains, never
    /// fills), so a `true` result stays valid until the next `reserve`.
    fn can_reserve(&self, len: usize) -> bool;

    /// Writable span of `len` bytes at the current write position, or `None`
    /// when the sink is full.
    fn reserve(&mut self, len: usize) -> Option<&mut [u8]>;

    /// Publish `len` bytes previously written into the reserved span.
    fn commit(&mut self, len: usize);
}

/// Block until `sink` has room for `len` bytes, re-checking the cancellation
/// flag on every retry so shutdown is never stuck behind a full buffer.
pub fn wait_for_space<S: ByteSink + ?Sized>(
    sink: &S,
    len: usize,
    cancel: &AtomicBool,
    retry_interval: Duration,
) -> Result<(), CaptureError> {
    while !sink.can_reserve(len) {
        if cancel.load(Ordering::SeqCst) {
            return Err(CaptureError::Cancelled);
        }
        thread::sleep(retry_interval);
    }
    Ok(())
}

/// Growable in-memory sink.
///
/// Never reports "busy"; useful for tests and for front ends that buffer a
/// whole capture in memory before post-processing.
#[derive(Debug, Default)]
pub struct VecSink {
    data: Vec<u8>,
    staged: usize,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes committed so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ByteSink for VecSink {
    fn can_reserve(&self, _len: usize) -> bool {
        true
    }

    fn reserve(&mut self, len: usize) -> Option<&mut [u8]> {
        self.staged = self.data.len();
        self.data.resize(self.staged + len, 0);
        Some(&mut self.data[self.staged..])
    }

    fn commit(&mut self, len: usize) {
        // Drop the unused tail of the reservation.
        self.data.truncate(self.staged + len);
    }
}
