//! Frame processor
//!
//! Composes the line codec, sync tracker, and integrity validators over
//! every line of one frame and produces a single verdict. Validation runs
//! before the sync gate: lines are parsed and the CRC/idle state advanced
//! even while unsynced, so the running references never go stale across a
//! sync gap and acquisition can never happen on a corrupt frame.

use std::mem::size_of;

use serde::Serialize;

use super::crc::CrcState;
use super::idle::IdleState;
use super::line::{idle_region, parse_line};
use super::metadata::{FrameGeometry, FrameMetadata};
use super::sync::{Observation, SyncResult, SyncTracker};

/// Verdict for one processed frame. Built once, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameVerdict {
    /// Sync classification for this frame.
    pub sync: SyncResult,
    /// Payload bytes seen for stream 0 (RF); counted only while synced.
    pub stream0_bytes: usize,
    /// Payload bytes seen for stream 1 (audio); counted only while synced.
    pub stream1_bytes: usize,
    /// CRC and idle-pattern errors found in this frame.
    pub error_count: u32,
    /// True when the frame may be handed downstream.
    pub valid: bool,
    /// True when the errors occurred while synced and should be surfaced.
    pub report_errors: bool,
}

impl FrameVerdict {
    fn skipped(sync: SyncResult) -> Self {
        Self {
            sync,
            stream0_bytes: 0,
            stream1_bytes: 0,
            error_count: 0,
            valid: false,
            report_errors: false,
        }
    }
}

/// Combined per-session validation state.
#[derive(Debug, Clone, Copy)]
pub struct FrameProcessor {
    sync: SyncTracker,
    crc: CrcState,
    idle: IdleState,
    frames_since_error: u32,
}

impl FrameProcessor {
    pub fn new() -> Self {
        Self {
            sync: SyncTracker::new(),
            crc: CrcState::new(),
            idle: IdleState::new(),
            frames_since_error: 0,
        }
    }

    /// Reinitialize every state block explicitly. Required on session
    /// restart; reusing stale CRC/counter history across a restart would
    /// generate false mismatches.
    pub fn reset(&mut self) {
        self.sync.reset();
        self.crc.reset();
        self.idle.reset();
        self.frames_since_error = 0;
    }

    pub fn sync(&self) -> &SyncTracker {
        &self.sync
    }

    pub fn frames_since_error(&self) -> u32 {
        self.frames_since_error
    }

    /// Process one frame: magic check, counter tracking, per-line
    /// validation, payload accounting, and the sync-acquisition gate.
    pub fn process(
        &mut self,
        buf: &[u16],
        geometry: FrameGeometry,
        meta: &FrameMetadata,
        sync_threshold: u32,
    ) -> FrameVerdict {
        // Magic mismatch invalidates sync outright, before any counter logic.
        if !meta.magic_valid() {
            self.sync.lose();
            return FrameVerdict::skipped(SyncResult::Lost);
        }

        let mut verdict = FrameVerdict::skipped(SyncResult::Ok);
        match self.sync.observe(meta.frame_counter) {
            Observation::Duplicate => return FrameVerdict::skipped(SyncResult::Duplicate),
            Observation::OutOfOrder if self.sync.synced() => verdict.sync = SyncResult::Missed,
            _ => {}
        }

        let has_stream_id = meta.has_stream_id();
        let has_crc = meta.has_crc();

        // Parse every line, synced or not, to keep the CRC/idle state warm.
        for index in 0..geometry.height {
            let Some(line) = geometry.line(buf, index) else {
                if !self.sync.synced() {
                    self.sync.note_unsynced_frame();
                }
                return verdict;
            };

            let parsed = parse_line(line, has_stream_id, has_crc);
            if !parsed.valid {
                // Corrupt line voids the whole frame.
                if !self.sync.synced() {
                    self.sync.note_unsynced_frame();
                }
                return verdict;
            }

            verdict.error_count +=
                self.idle
                    .check(idle_region(line, parsed.payload_len, has_stream_id, has_crc));

            if has_crc {
                let matches = self.crc.check(line, parsed.crc, meta.crc_mode);
                // Pre-sync CRC noise is expected and must not block
                // acquisition; only count mismatches while synced.
                if !matches && self.sync.synced() {
                    verdict.error_count += 1;
                }
            }

            if parsed.payload_len > 0 && self.sync.synced() {
                let bytes = parsed.payload_len as usize * size_of::<u16>();
                match parsed.stream_id {
                    0 => verdict.stream0_bytes += bytes,
                    1 => verdict.stream1_bytes += bytes,
                    _ => {}
                }
            }
        }

        if verdict.error_count > 0 && self.sync.synced() {
            verdict.report_errors = true;
            self.frames_since_error = 0;
            return verdict;
        }

        self.frames_since_error += 1;

        if verdict.error_count == 0 && self.sync.try_acquire(sync_threshold) {
            // The acquiring frame primes the validators and is never handed
            // downstream.
            verdict.sync = SyncResult::Acquired;
            return verdict;
        }

        if self.sync.synced() {
            verdict.valid = true;
        }

        verdict
    }
}

impl Default for FrameProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::metadata::CrcMode;
    use super::super::testutil::FrameBuilder;
    use super::*;

    #[test]
    fn test_acquisition_scenario() {
        let mut builder = FrameBuilder::new(16, 4);
        let mut processor = FrameProcessor::new();

        for counter in 0u16..4 {
            let (buf, meta) = builder.frame_with_counter(counter, &[(0, &[0x1111, 0x2222])]);
            let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
            assert_eq!(verdict.sync, SyncResult::Ok);
            assert!(!verdict.valid);
            assert_eq!(verdict.error_count, 0);
        }

        let (buf, meta) = builder.frame_with_counter(4, &[(0, &[0x3333])]);
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert_eq!(verdict.sync, SyncResult::Acquired);
        assert!(!verdict.valid, "the priming frame is never valid");
        assert_eq!(processor.sync().in_order_count(), 5);
    }

    /// Sync up a fresh processor; frame counters 0..=threshold consumed.
    fn synced_processor(builder: &mut FrameBuilder) -> FrameProcessor {
        let mut processor = FrameProcessor::new();
        for counter in 0u16..=4 {
            let (buf, meta) = builder.frame_with_counter(counter, &[]);
            processor.process(&buf, builder.geometry(), &meta, 4);
        }
        assert!(processor.sync().synced());
        processor
    }

    #[test]
    fn test_payload_totals_while_synced() {
        let mut builder = FrameBuilder::new(16, 4)
            .with_stream_id()
            .with_crc(CrcMode::OneLineDelay);
        let mut processor = synced_processor(&mut builder);

        let (buf, meta) =
            builder.frame_with_counter(5, &[(0, &[1, 2, 3]), (1, &[4, 5]), (0, &[6])]);
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert!(verdict.valid);
        assert_eq!(verdict.stream0_bytes, 8);
        assert_eq!(verdict.stream1_bytes, 4);
    }

    #[test]
    fn test_unknown_stream_ids_ignored_in_totals() {
        let mut builder = FrameBuilder::new(16, 4)
            .with_stream_id()
            .with_crc(CrcMode::OneLineDelay);
        let mut processor = synced_processor(&mut builder);

        let (buf, meta) = builder.frame_with_counter(5, &[(2, &[1, 2, 3])]);
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert!(verdict.valid);
        assert_eq!(verdict.stream0_bytes, 0);
        assert_eq!(verdict.stream1_bytes, 0);
    }

    #[test]
    fn test_missed_frame_keeps_sync() {
        let mut builder = FrameBuilder::new(16, 4);
        let mut processor = synced_processor(&mut builder);

        let (buf, meta) = builder.frame_with_counter(5, &[]);
        processor.process(&buf, builder.geometry(), &meta, 4);

        // Gap: 5 -> 7.
        let (buf, meta) = builder.frame_with_counter(7, &[]);
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert_eq!(verdict.sync, SyncResult::Missed);
        assert!(processor.sync().synced());
        assert_eq!(processor.sync().in_order_count(), 0);
    }

    #[test]
    fn test_duplicate_frame_short_circuits() {
        let mut builder = FrameBuilder::new(16, 4);
        let mut processor = synced_processor(&mut builder);

        let (buf, meta) = builder.frame_with_counter(5, &[]);
        processor.process(&buf, builder.geometry(), &meta, 4);

        let state_before = processor;
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert_eq!(verdict.sync, SyncResult::Duplicate);
        assert!(!verdict.valid);
        assert_eq!(processor.sync(), state_before.sync());
    }

    #[test]
    fn test_magic_mismatch_forces_lost() {
        let mut builder = FrameBuilder::new(16, 4);
        let mut processor = synced_processor(&mut builder);

        let (buf, mut meta) = builder.frame_with_counter(5, &[]);
        meta.magic = 0;
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert_eq!(verdict.sync, SyncResult::Lost);
        assert!(!processor.sync().synced());
        assert_eq!(processor.sync().in_order_count(), 0);
        assert_eq!(processor.sync().frames_without_sync(), 1);
    }

    #[test]
    fn test_corrupt_line_voids_frame() {
        let mut builder = FrameBuilder::new(16, 4);
        let mut processor = synced_processor(&mut builder);

        let (mut buf, meta) = builder.frame_with_counter(5, &[]);
        // Declare an impossible payload length on line 1.
        buf[2 * 16 - 1] = 0x0FFFu16.to_le();
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert!(!verdict.valid);
        assert_eq!(verdict.error_count, 0);
    }

    #[test]
    fn test_idle_corruption_rejects_synced_frame() {
        let mut builder = FrameBuilder::new(16, 4);
        let mut processor = synced_processor(&mut builder);

        let (mut buf, meta) = builder.frame_with_counter(5, &[]);
        // Smash one idle word in line 0 (payload empty, idle starts at 0).
        buf[3] = buf[3].wrapping_add(7);
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert!(!verdict.valid);
        assert!(verdict.report_errors);
        assert!(verdict.error_count > 0);
        assert_eq!(processor.frames_since_error(), 0);
    }

    #[test]
    fn test_crc_mismatch_rejects_synced_frame() {
        let mut builder = FrameBuilder::new(16, 4).with_crc(CrcMode::OneLineDelay);
        let mut processor = synced_processor(&mut builder);

        let (mut buf, meta) = builder.frame_with_counter(5, &[]);
        // Corrupt the declared CRC of the last line so only one comparison
        // in this frame can fail.
        let crc_slot = 4 * 16 - 2;
        buf[crc_slot] = buf[crc_slot].wrapping_add(1);
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert!(!verdict.valid);
        assert!(verdict.report_errors);
        assert_eq!(verdict.error_count, 1);
    }

    #[test]
    fn test_crc_clean_stream_stays_valid() {
        let mut builder = FrameBuilder::new(16, 4).with_crc(CrcMode::TwoLineDelay);
        let mut processor = synced_processor(&mut builder);

        for counter in 5u16..10 {
            let (buf, meta) = builder.frame_with_counter(counter, &[(0, &[counter])]);
            let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
            assert!(verdict.valid, "frame {counter} should be clean");
            assert_eq!(verdict.error_count, 0);
        }
    }

    #[test]
    fn test_errors_before_sync_do_not_block_acquisition_forever() {
        let mut builder = FrameBuilder::new(16, 4).with_crc(CrcMode::OneLineDelay);
        let mut processor = FrameProcessor::new();

        // The builder starts its CRC history in step with a fresh validator,
        // so even the very first frames are clean; acquisition proceeds
        // exactly as without CRC.
        for counter in 0u16..4 {
            let (buf, meta) = builder.frame_with_counter(counter, &[]);
            let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
            assert_eq!(verdict.sync, SyncResult::Ok);
        }
        let (buf, meta) = builder.frame_with_counter(4, &[]);
        let verdict = processor.process(&buf, builder.geometry(), &meta, 4);
        assert_eq!(verdict.sync, SyncResult::Acquired);
    }

    #[test]
    fn test_corrupt_frame_verdict_is_deterministic() {
        let mut builder = FrameBuilder::new(16, 4);
        let (mut buf, meta) = builder.frame_with_counter(0, &[(0, &[1, 2])]);
        buf[4] = buf[4].wrapping_add(3);

        let mut first = FrameProcessor::new();
        let mut second = FrameProcessor::new();
        let verdict_a = first.process(&buf, builder.geometry(), &meta, 4);
        let verdict_b = second.process(&buf, builder.geometry(), &meta, 4);
        assert_eq!(verdict_a, verdict_b);
    }

    #[test]
    fn test_reset_clears_all_state() {
        let mut builder = FrameBuilder::new(16, 4).with_crc(CrcMode::OneLineDelay);
        let mut processor = synced_processor(&mut builder);

        processor.reset();
        assert!(!processor.sync().synced());
        assert_eq!(processor.sync().in_order_count(), 0);
        assert_eq!(processor.frames_since_error(), 0);
    }
}
