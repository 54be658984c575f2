//! Crate error type

use thiserror::Error;

/// Errors surfaced by the capture session.
///
/// Per-frame problems (corrupt lines, CRC mismatches, ordering anomalies) are
/// not errors; they are reported through the frame verdict and observer
/// events. Only conditions that stop the session from doing its job at all
/// end up here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// The session's cancellation flag was set.
    #[error("capture session cancelled")]
    Cancelled,

    /// The frame buffer does not match the geometry the transport declared.
    #[error("frame buffer holds {actual} words, geometry requires {expected}")]
    GeometryMismatch { expected: usize, actual: usize },
}
