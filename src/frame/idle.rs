//! Idle-pattern validation
//!
//! The idle filler between a line's payload and its trailing fields carries
//! a monotonically incrementing 16-bit counter. Breaks in the sequence are
//! a direct signal of transport corruption.

/// Running idle-counter state, continuous across lines and frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleState {
    counter: u16,
}

impl IdleState {
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Verify that `idle_words` continue the counter sequence.
    ///
    /// Returns the number of discontinuities. The counter resynchronizes to
    /// each observed value, so one corrupt word costs a bounded number of
    /// errors instead of poisoning the rest of the capture.
    pub fn check(&mut self, idle_words: &[u16]) -> u32 {
        let mut errors = 0;
        for &raw in idle_words {
            let word = u16::from_le(raw);
            if word != self.counter.wrapping_add(1) {
                errors += 1;
            }
            self.counter = word;
        }
        errors
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }
}
