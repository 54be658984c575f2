//! Frame-level extraction and validation
//!
//! One frame is a `width × height` grid of 16-bit words delivered by the
//! capture transport. Each line is self-describing through its trailing
//! words; this module extracts those fields, tracks frame-counter
//! synchronization, validates the running CRC and idle-counter patterns, and
//! copies validated payloads out per stream.

mod crc;
mod demux;
mod idle;
mod line;
mod metadata;
mod processor;
mod sync;

#[cfg(test)]
pub(crate) mod testutil;

pub use crc::{crc16_ccitt, CrcState};
pub use demux::{copy_payloads, CopyTotals};
pub use idle::IdleState;
pub use line::{idle_region, parse_line, payload, ParsedLine};
pub use metadata::{
    CrcMode, FrameGeometry, FrameMetadata, StreamInfo, FLAG_STREAM_ID_PRESENT, TRANSPORT_MAGIC,
};
pub use processor::{FrameProcessor, FrameVerdict};
pub use sync::{SyncResult, SyncTracker};
