//! Frame-counter synchronization tracking
//!
//! The transport stamps every frame with a wrapping 16-bit counter. The
//! stream is only trusted after a run of consecutive in-order counters; any
//! break resets the run, and a magic mismatch (handled one level up, in the
//! frame processor) drops sync entirely.

use serde::Serialize;

/// Outcome of checking one frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncResult {
    /// Counter is in order (or we are still accumulating trust).
    Ok,
    /// Same counter as the previous frame.
    Duplicate,
    /// One or more frames skipped while synced.
    Missed,
    /// Sync dropped (invalid magic).
    Lost,
    /// Enough in-order frames accumulated; stream is now trusted.
    Acquired,
}

/// How one observed counter relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Observation {
    Duplicate,
    InOrder,
    OutOfOrder,
}

/// Wrapping frame-counter state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTracker {
    last_frame_counter: u16,
    in_order_count: u32,
    synced: bool,
    frames_without_sync: u32,
}

impl SyncTracker {
    /// Fresh, unsynced state.
    ///
    /// `last_frame_counter` starts at 0xFFFF so a stream beginning at
    /// counter 0 is in order from its very first frame.
    pub fn new() -> Self {
        Self {
            last_frame_counter: u16::MAX,
            in_order_count: 0,
            synced: false,
            frames_without_sync: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn synced(&self) -> bool {
        self.synced
    }

    pub fn in_order_count(&self) -> u32 {
        self.in_order_count
    }

    pub fn frames_without_sync(&self) -> u32 {
        self.frames_without_sync
    }

    pub fn last_frame_counter(&self) -> u16 {
        self.last_frame_counter
    }

    /// Record one frame counter. Duplicates mutate nothing; otherwise the
    /// in-order run length and last counter are updated.
    pub(crate) fn observe(&mut self, frame_counter: u16) -> Observation {
        if frame_counter == self.last_frame_counter {
            return Observation::Duplicate;
        }

        let expected = self.last_frame_counter.wrapping_add(1);
        let in_order = frame_counter == expected;

        if in_order {
            self.in_order_count += 1;
        } else {
            self.in_order_count = 0;
        }
        self.last_frame_counter = frame_counter;

        if in_order {
            Observation::InOrder
        } else {
            Observation::OutOfOrder
        }
    }

    /// Transition to synced once more than `threshold` consecutive in-order
    /// frames have been seen. Returns true on the transition frame only.
    pub(crate) fn try_acquire(&mut self, threshold: u32) -> bool {
        if !self.synced && self.in_order_count > threshold {
            self.synced = true;
            self.frames_without_sync = 0;
            true
        } else {
            false
        }
    }

    /// Drop sync after a magic mismatch.
    pub(crate) fn lose(&mut self) {
        self.synced = false;
        self.in_order_count = 0;
        self.frames_without_sync += 1;
    }

    /// Count a frame that could not be trusted while still unsynced.
    pub(crate) fn note_unsynced_frame(&mut self) {
        self.frames_without_sync += 1;
    }

    /// Classify one frame counter and update tracking state.
    ///
    /// The `Lost` outcome never originates here: this tracker only sees
    /// frames whose magic already validated.
    pub fn check(&mut self, frame_counter: u16, threshold: u32) -> SyncResult {
        match self.observe(frame_counter) {
            Observation::Duplicate => SyncResult::Duplicate,
            observation => {
                if self.try_acquire(threshold) {
                    return SyncResult::Acquired;
                }
                if observation == Observation::OutOfOrder && self.synced {
                    SyncResult::Missed
                } else {
                    SyncResult::Ok
                }
            }
        }
    }
}

impl Default for SyncTracker {
    fn default() -> Self {
        Self::new()
    }
}
