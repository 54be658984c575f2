//! Capture session configuration

use std::time::Duration;

use serde::Serialize;

/// Configuration for a capture session
#[derive(Debug, Clone, Serialize)]
pub struct CaptureConfig {
    /// Whether to capture the RF stream (stream id 0)
    pub capture_rf: bool,

    /// Whether to capture the audio stream (stream id 1)
    pub capture_audio: bool,

    /// Consecutive in-order frame counters required before the stream is trusted
    pub sync_threshold: u32,

    /// Sleep between retries when a downstream sink has no space
    pub sink_retry_interval: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            capture_rf: true,
            capture_audio: false,
            sync_threshold: 4,
            sink_retry_interval: Duration::from_millis(4),
        }
    }
}

impl CaptureConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            capture_rf: std::env::var("CAPTURE_RF")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.capture_rf),

            capture_audio: std::env::var("CAPTURE_AUDIO")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.capture_audio),

            sync_threshold: std::env::var("SYNC_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sync_threshold),

            sink_retry_interval: std::env::var("SINK_RETRY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.sink_retry_interval),
        }
    }
}
