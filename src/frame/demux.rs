//! Stream demultiplexer / payload copier
//!
//! Walks a validated frame and copies each line's payload into the output
//! span of its stream. The copier owns no sync or alignment policy: a
//! caller-supplied filter decides per line whether the payload is emitted,
//! which is how the audio/RF alignment state machine is injected without
//! coupling the copy step to audio policy.

use super::line::{parse_line, payload};
use super::metadata::{FrameGeometry, FrameMetadata};

/// Bytes copied per stream by one [`copy_payloads`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyTotals {
    pub stream0: usize,
    pub stream1: usize,
}

impl CopyTotals {
    pub fn total(&self) -> usize {
        self.stream0 + self.stream1
    }
}

/// Copy every accepted line payload into the matching output span.
///
/// Lines with invalid or zero payload length are skipped, as are streams
/// whose output span is absent and stream ids other than 0/1. The filter
/// runs once per remaining line, before any bytes move. Payload words are
/// written out as little-endian bytes at each stream's running offset.
pub fn copy_payloads(
    buf: &[u16],
    geometry: FrameGeometry,
    meta: &FrameMetadata,
    mut out_stream0: Option<&mut [u8]>,
    mut out_stream1: Option<&mut [u8]>,
    mut filter: impl FnMut(u16, &[u16]) -> bool,
) -> CopyTotals {
    let has_stream_id = meta.has_stream_id();
    let has_crc = meta.has_crc();
    let mut totals = CopyTotals::default();

    for index in 0..geometry.height {
        let Some(line) = geometry.line(buf, index) else {
            break;
        };

        let parsed = parse_line(line, has_stream_id, has_crc);
        if !parsed.valid || parsed.payload_len == 0 {
            continue;
        }

        let words = payload(line, &parsed);
        if !filter(parsed.stream_id, words) {
            continue;
        }

        let (out, offset) = match parsed.stream_id {
            0 => (out_stream0.as_deref_mut(), &mut totals.stream0),
            1 => (out_stream1.as_deref_mut(), &mut totals.stream1),
            _ => continue,
        };
        let Some(out) = out else {
            continue;
        };

        let bytes = words.len() * 2;
        let Some(dst) = out.get_mut(*offset..*offset + bytes) else {
            // Span exhausted; the reservation was smaller than the frame's
            // accepted payload. Skip rather than write out of bounds.
            continue;
        };
        for (i, &word) in words.iter().enumerate() {
            dst[i * 2..i * 2 + 2].copy_from_slice(&word.to_le_bytes());
        }
        *offset += bytes;
    }

    totals
}
