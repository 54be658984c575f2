//! Capture session orchestration
//!
//! Everything above the frame level: the session state machine driving
//! validation and demultiplexing, the audio/RF alignment filter, and the
//! observer surface front ends hook into.

mod events;
mod filter;
mod session;

pub use events::{
    default_sync_progress, CaptureEvent, CaptureMessage, CaptureObserver, ChannelObserver,
    LogObserver, Severity,
};
pub use filter::AudioAlignment;
pub use session::{CaptureSession, FrameOutcome, SessionStats};
