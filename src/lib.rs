//! Extraction core for HDMI-style capture transports
//!
//! A capture device delivers a continuous stream of fixed-geometry frames,
//! each a grid of 16-bit words. Every scan line carries a small trailing
//! sub-protocol (payload length, optional CRC, optional stream id, idle
//! filler) that this crate extracts and validates:
//!
//! 1. Parse the trailing fields of every line ([`frame::parse_line`])
//! 2. Track synchronization via the wrapping frame counter ([`frame::SyncTracker`])
//! 3. Validate running CRC and idle-counter patterns ([`frame::CrcState`], [`frame::IdleState`])
//! 4. Produce a per-frame verdict ([`frame::FrameProcessor`])
//! 5. Demultiplex payload bytes into per-stream sinks ([`frame::copy_payloads`])
//!
//! [`capture::CaptureSession`] ties the steps together across the lifetime of
//! a capture, including the two-stage audio/RF alignment state machine and
//! backpressure against downstream byte sinks.
//!
//! The transport driver, device enumeration, and any display or recording of
//! the extracted bytes live outside this crate; the boundary is the raw frame
//! buffer plus [`frame::FrameMetadata`] on the way in and the [`buffer::ByteSink`]
//! contract plus [`capture::CaptureObserver`] events on the way out.

pub mod buffer;
pub mod capture;
pub mod config;
pub mod error;
pub mod frame;

pub use buffer::{ByteSink, VecSink};
pub use capture::{
    AudioAlignment, CaptureEvent, CaptureMessage, CaptureObserver, CaptureSession,
    ChannelObserver, FrameOutcome, LogObserver, SessionStats, Severity,
};
pub use config::CaptureConfig;
pub use error::CaptureError;
pub use frame::{
    copy_payloads, parse_line, CopyTotals, CrcMode, CrcState, FrameGeometry, FrameMetadata,
    FrameProcessor, FrameVerdict, IdleState, ParsedLine, StreamInfo, SyncResult, SyncTracker,
};
