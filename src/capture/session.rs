//! Capture session
//!
//! Owns the per-session state: frame processor, audio alignment filter,
//! output sinks, observer, and shared counters. The transport driver calls
//! [`CaptureSession::process_frame`] once per received frame; everything
//! else (sync bookkeeping, error reporting, backpressure, demultiplexing)
//! happens inside.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::buffer::{wait_for_space, ByteSink};
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::frame::{copy_payloads, FrameGeometry, FrameMetadata, FrameProcessor, SyncResult};

use super::events::{CaptureMessage, CaptureObserver};
use super::filter::AudioAlignment;

/// Counters shared with monitoring threads.
///
/// Written by the capture thread, read from anywhere. Individual loads are
/// not mutually consistent; good enough for progress display.
#[derive(Debug, Default)]
pub struct SessionStats {
    pub frames_processed: AtomicU64,
    pub frames_valid: AtomicU64,
    pub duplicate_frames: AtomicU64,
    pub missed_frames: AtomicU64,
    pub sync_losses: AtomicU64,
    pub frame_errors: AtomicU64,
    pub stream0_bytes: AtomicU64,
    pub stream1_bytes: AtomicU64,
    /// Sample-rate hint from the most recent frame metadata, 0 if none seen.
    pub sample_rate: AtomicU32,
    pub synced: AtomicBool,
}

impl SessionStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reset(&self) {
        self.frames_processed.store(0, Ordering::Relaxed);
        self.frames_valid.store(0, Ordering::Relaxed);
        self.duplicate_frames.store(0, Ordering::Relaxed);
        self.missed_frames.store(0, Ordering::Relaxed);
        self.sync_losses.store(0, Ordering::Relaxed);
        self.frame_errors.store(0, Ordering::Relaxed);
        self.stream0_bytes.store(0, Ordering::Relaxed);
        self.stream1_bytes.store(0, Ordering::Relaxed);
        self.sample_rate.store(0, Ordering::Relaxed);
        self.synced.store(false, Ordering::Relaxed);
    }
}

/// What happened to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame produced no output; the sync classification says why not
    /// directly (`Ok` here means the frame failed validation or the
    /// session is still acquiring).
    Skipped(SyncResult),
    /// Payload bytes were committed to the sinks.
    Copied {
        stream0_bytes: usize,
        stream1_bytes: usize,
    },
}

/// Per-capture state machine tying validation, alignment, and output
/// together. One instance per capture run; `reset` rearms it for the next.
pub struct CaptureSession<R: ByteSink, A: ByteSink> {
    config: CaptureConfig,
    processor: FrameProcessor,
    alignment: AudioAlignment,
    rf_sink: Option<R>,
    audio_sink: Option<A>,
    observer: Box<dyn CaptureObserver>,
    stats: Arc<SessionStats>,
    cancel: Arc<AtomicBool>,
    audio_warning_sent: bool,
}

impl<R: ByteSink, A: ByteSink> CaptureSession<R, A> {
    pub fn new(
        config: CaptureConfig,
        rf_sink: Option<R>,
        audio_sink: Option<A>,
        observer: Box<dyn CaptureObserver>,
    ) -> Self {
        Self {
            config,
            processor: FrameProcessor::new(),
            alignment: AudioAlignment::new(),
            rf_sink,
            audio_sink,
            observer,
            stats: SessionStats::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            audio_warning_sent: false,
        }
    }

    /// Shared counters handle for monitoring threads.
    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }

    /// Flag that aborts `process_frame` and any backpressure wait when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Request cancellation from any thread.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn synced(&self) -> bool {
        self.processor.sync().synced()
    }

    pub fn rf_sink(&self) -> Option<&R> {
        self.rf_sink.as_ref()
    }

    pub fn audio_sink(&self) -> Option<&A> {
        self.audio_sink.as_ref()
    }

    pub fn into_sinks(self) -> (Option<R>, Option<A>) {
        (self.rf_sink, self.audio_sink)
    }

    /// Rearm the session for a fresh capture run: validation state,
    /// alignment stages, counters, and the cancellation flag all restart.
    pub fn reset(&mut self) {
        self.processor.reset();
        self.alignment.reset();
        self.audio_warning_sent = false;
        self.stats.reset();
        self.cancel.store(false, Ordering::SeqCst);
    }

    fn update_sample_rate(&self, meta: &FrameMetadata) {
        let rate = meta.stream_info[0].sample_rate;
        if rate != 0 {
            self.stats.sample_rate.store(rate, Ordering::Relaxed);
        }
    }

    /// Process one frame from the transport.
    ///
    /// Blocks while a sink lacks space, re-checking the cancellation flag
    /// at the configured interval.
    pub fn process_frame(
        &mut self,
        buf: &[u16],
        geometry: FrameGeometry,
        meta: &FrameMetadata,
    ) -> Result<FrameOutcome, CaptureError> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(CaptureError::Cancelled);
        }
        if buf.len() < geometry.words() {
            return Err(CaptureError::GeometryMismatch {
                expected: geometry.words(),
                actual: buf.len(),
            });
        }

        let was_synced = self.processor.sync().synced();
        let unsynced_before = self.processor.sync().frames_without_sync();
        let verdict = self
            .processor
            .process(buf, geometry, meta, self.config.sync_threshold);

        self.stats.frames_processed.fetch_add(1, Ordering::Relaxed);
        self.stats
            .synced
            .store(self.processor.sync().synced(), Ordering::Relaxed);

        self.observer.sync_event(verdict.sync, meta, was_synced);
        let unsynced_after = self.processor.sync().frames_without_sync();
        if unsynced_after > unsynced_before {
            self.observer.sync_progress(unsynced_after);
        }

        match verdict.sync {
            SyncResult::Lost => {
                self.alignment.reset();
                self.stats.sync_losses.fetch_add(1, Ordering::Relaxed);
                return Ok(FrameOutcome::Skipped(SyncResult::Lost));
            }
            SyncResult::Duplicate => {
                self.stats.duplicate_frames.fetch_add(1, Ordering::Relaxed);
                return Ok(FrameOutcome::Skipped(SyncResult::Duplicate));
            }
            SyncResult::Acquired => {
                // Fresh acquisition restarts audio alignment from scratch.
                self.alignment.reset();
                if self.config.capture_audio && !meta.has_stream_id() && !self.audio_warning_sent {
                    self.audio_warning_sent = true;
                    self.observer.message(&CaptureMessage::AudioUnavailable);
                }
                self.update_sample_rate(meta);
                return Ok(FrameOutcome::Skipped(SyncResult::Acquired));
            }
            SyncResult::Missed => {
                self.stats.missed_frames.fetch_add(1, Ordering::Relaxed);
            }
            SyncResult::Ok => {}
        }

        self.update_sample_rate(meta);

        if verdict.report_errors {
            self.stats
                .frame_errors
                .fetch_add(verdict.error_count as u64, Ordering::Relaxed);
            self.observer.message(&CaptureMessage::FrameErrors {
                error_count: verdict.error_count,
            });
            return Ok(FrameOutcome::Skipped(verdict.sync));
        }
        if !verdict.valid {
            return Ok(FrameOutcome::Skipped(verdict.sync));
        }
        self.stats.frames_valid.fetch_add(1, Ordering::Relaxed);

        // Wait for space before reserving anything, so a stall on one sink
        // never leaves a dangling reservation on the other.
        if self.config.capture_rf && verdict.stream0_bytes > 0 {
            if let Some(sink) = &self.rf_sink {
                wait_for_space(
                    sink,
                    verdict.stream0_bytes,
                    &self.cancel,
                    self.config.sink_retry_interval,
                )?;
            }
        }
        if self.config.capture_audio && verdict.stream1_bytes > 0 {
            if let Some(sink) = &self.audio_sink {
                wait_for_space(
                    sink,
                    verdict.stream1_bytes,
                    &self.cancel,
                    self.config.sink_retry_interval,
                )?;
            }
        }

        let capture_rf = self.config.capture_rf;
        let capture_audio = self.config.capture_audio;
        let alignment = &mut self.alignment;

        let rf_span = if capture_rf && verdict.stream0_bytes > 0 {
            self.rf_sink
                .as_mut()
                .and_then(|sink| sink.reserve(verdict.stream0_bytes))
        } else {
            None
        };
        let rf_reserved = rf_span.is_some();
        let audio_span = if capture_audio && verdict.stream1_bytes > 0 {
            self.audio_sink
                .as_mut()
                .and_then(|sink| sink.reserve(verdict.stream1_bytes))
        } else {
            None
        };
        let audio_reserved = audio_span.is_some();

        // The alignment filter may pass fewer bytes than were reserved;
        // committing the copied totals releases the unused tail.
        let totals = copy_payloads(buf, geometry, meta, rf_span, audio_span, |stream_id, _| {
            alignment.accept(stream_id, capture_rf, capture_audio)
        });

        if rf_reserved {
            if let Some(sink) = self.rf_sink.as_mut() {
                sink.commit(totals.stream0);
            }
        }
        if audio_reserved {
            if let Some(sink) = self.audio_sink.as_mut() {
                sink.commit(totals.stream1);
            }
        }

        self.stats
            .stream0_bytes
            .fetch_add(totals.stream0 as u64, Ordering::Relaxed);
        self.stats
            .stream1_bytes
            .fetch_add(totals.stream1 as u64, Ordering::Relaxed);

        if self.alignment.take_just_aligned() {
            self.observer.audio_sync_changed(true);
        }

        Ok(FrameOutcome::Copied {
            stream0_bytes: totals.stream0,
            stream1_bytes: totals.stream1,
        })
    }
}
