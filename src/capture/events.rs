//! Session observer contract and stock observers
//!
//! The capture session reports everything a front end may want to surface
//! through a [`CaptureObserver`]: sync transitions, acquisition progress,
//! per-frame error reports, and audio-alignment changes. Observers run on
//! the capture thread and must never block; the channel-backed observer
//! drops events rather than stall the frame path.

use std::fmt;

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::frame::{FrameMetadata, SyncResult};

/// How urgently a [`CaptureMessage`] should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Out-of-band condition reported by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CaptureMessage {
    /// Audio capture is enabled but the incoming stream is not multiplexed.
    AudioUnavailable,
    /// A synced frame contained CRC or idle-pattern errors and was dropped.
    FrameErrors { error_count: u32 },
}

impl CaptureMessage {
    pub fn severity(&self) -> Severity {
        match self {
            Self::AudioUnavailable => Severity::Critical,
            Self::FrameErrors { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for CaptureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AudioUnavailable => {
                write!(f, "audio capture enabled but the stream carries no audio channel")
            }
            Self::FrameErrors { error_count } => {
                write!(f, "{error_count} transport error(s) in frame, frame dropped")
            }
        }
    }
}

/// Callbacks invoked by the session as it processes frames.
///
/// Every method has a no-op default so observers implement only what they
/// care about; `sync_progress` defaults to the stock log output.
pub trait CaptureObserver: Send {
    /// An out-of-band condition worth surfacing to the user.
    fn message(&mut self, _message: &CaptureMessage) {}

    /// Sync classification of the frame just processed, with its metadata
    /// and whether the session was synced going in. Invoked for every
    /// frame, including the unremarkable `Ok` ones.
    fn sync_event(&mut self, _result: SyncResult, _meta: &FrameMetadata, _was_synced: bool) {}

    /// Another frame went by without acquiring sync.
    fn sync_progress(&mut self, frames_without_sync: u32) {
        default_sync_progress(frames_without_sync);
    }

    /// The audio stream reached (or left) alignment with the RF stream.
    fn audio_sync_changed(&mut self, _aligned: bool) {}
}

/// Stock acquisition-progress output: a note every fifth frame, and a
/// warning once the wait becomes suspicious.
pub fn default_sync_progress(frames_without_sync: u32) {
    if frames_without_sync % 5 == 0 {
        info!(frames = frames_without_sync + 1, "waiting for sync");
    }
    if frames_without_sync == 500 {
        warn!("still no sync after 500 frames, check the capture signal");
    }
}

/// Observer that forwards everything to the `tracing` output.
#[derive(Debug, Default)]
pub struct LogObserver;

impl CaptureObserver for LogObserver {
    fn message(&mut self, message: &CaptureMessage) {
        match message.severity() {
            Severity::Info => info!(%message),
            Severity::Warning => warn!(%message),
            Severity::Error | Severity::Critical => error!(%message),
        }
    }

    fn sync_event(&mut self, result: SyncResult, meta: &FrameMetadata, _was_synced: bool) {
        match result {
            SyncResult::Acquired => {
                info!(frame_counter = meta.frame_counter, "stream sync acquired")
            }
            SyncResult::Lost => warn!("stream sync lost"),
            SyncResult::Missed => {
                debug!(frame_counter = meta.frame_counter, "frame counter skipped")
            }
            SyncResult::Duplicate => {
                debug!(frame_counter = meta.frame_counter, "duplicate frame")
            }
            SyncResult::Ok => {}
        }
    }

    fn audio_sync_changed(&mut self, aligned: bool) {
        info!(aligned, "audio alignment changed");
    }
}

/// One observer callback, reified for cross-thread delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Message(CaptureMessage),
    Sync {
        result: SyncResult,
        frame_counter: u16,
        was_synced: bool,
    },
    SyncProgress(u32),
    AudioAligned(bool),
}

/// Observer that forwards events over a bounded channel.
///
/// Sends never block; when the receiver falls behind, events are dropped on
/// the floor in favor of keeping the frame path running.
#[derive(Debug)]
pub struct ChannelObserver {
    tx: Sender<CaptureEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, Receiver<CaptureEvent>) {
        let (tx, rx) = bounded(1024);
        (Self { tx }, rx)
    }
}

impl CaptureObserver for ChannelObserver {
    fn message(&mut self, message: &CaptureMessage) {
        let _ = self.tx.try_send(CaptureEvent::Message(message.clone()));
    }

    fn sync_event(&mut self, result: SyncResult, meta: &FrameMetadata, was_synced: bool) {
        let _ = self.tx.try_send(CaptureEvent::Sync {
            result,
            frame_counter: meta.frame_counter,
            was_synced,
        });
    }

    fn sync_progress(&mut self, frames_without_sync: u32) {
        let _ = self.tx.try_send(CaptureEvent::SyncProgress(frames_without_sync));
    }

    fn audio_sync_changed(&mut self, aligned: bool) {
        let _ = self.tx.try_send(CaptureEvent::AudioAligned(aligned));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_severity() {
        assert_eq!(CaptureMessage::AudioUnavailable.severity(), Severity::Critical);
        assert_eq!(
            CaptureMessage::FrameErrors { error_count: 3 }.severity(),
            Severity::Warning
        );
    }

    #[test]
    fn test_channel_observer_forwards_events() {
        let (mut observer, rx) = ChannelObserver::new();
        observer.sync_event(SyncResult::Acquired, &FrameMetadata::new(5), false);
        observer.message(&CaptureMessage::FrameErrors { error_count: 2 });
        observer.audio_sync_changed(true);

        assert_eq!(
            rx.try_recv().unwrap(),
            CaptureEvent::Sync {
                result: SyncResult::Acquired,
                frame_counter: 5,
                was_synced: false,
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            CaptureEvent::Message(CaptureMessage::FrameErrors { error_count: 2 })
        );
        assert_eq!(rx.try_recv().unwrap(), CaptureEvent::AudioAligned(true));
        assert!(rx.try_recv().is_err());
    }
}
