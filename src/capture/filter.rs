//! Audio/RF alignment filter
//!
//! After sync is acquired (or re-acquired) the RF and audio streams are not
//! yet known to start at the same instant. RF payloads are held back until
//! the first audio payload proves the audio path live, and the first audio
//! payload after that marks the two streams aligned. Both streams flow from
//! the second audio line onward, which bounds the skew between the recorded
//! RF and audio starts to under one frame.

/// Two-stage alignment state machine, reset on every sync transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioAlignment {
    stage1: bool,
    stage2: bool,
    just_aligned: bool,
}

impl AudioAlignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Decide whether one line's payload may be emitted.
    ///
    /// With audio capture disabled the filter is transparent for RF and the
    /// stages never advance.
    pub fn accept(&mut self, stream_id: u16, capture_rf: bool, capture_audio: bool) -> bool {
        match stream_id {
            0 => capture_rf && (!capture_audio || self.stage1),
            1 => {
                if !capture_audio {
                    return false;
                }
                if !self.stage1 {
                    self.stage1 = true;
                    false
                } else if !self.stage2 {
                    self.stage2 = true;
                    self.just_aligned = true;
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    /// True once both streams are flowing.
    pub fn aligned(&self) -> bool {
        self.stage2
    }

    /// True exactly once, on the call after alignment completed.
    pub fn take_just_aligned(&mut self) -> bool {
        std::mem::take(&mut self.just_aligned)
    }
}
