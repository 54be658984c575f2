//! Test-frame construction.
//!
//! Builds frame buffers whose idle filler and delayed CRC fields stay in
//! lockstep with a fresh validator, across frames. One builder instance
//! stands in for one transport session.
//!
//! With the stream-id field enabled but no CRC mode, the id slot sits
//! inside the span the idle validator checks; enable a CRC mode as well
//! whenever the built frames must validate cleanly.

use super::crc::CrcState;
use super::metadata::{CrcMode, FrameGeometry, FrameMetadata, FLAG_STREAM_ID_PRESENT};

#[derive(Debug, Clone)]
pub struct FrameBuilder {
    width: usize,
    height: usize,
    has_stream_id: bool,
    crc_mode: CrcMode,
    idle: u16,
    crc: CrcState,
}

impl FrameBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            has_stream_id: false,
            crc_mode: CrcMode::None,
            idle: 0,
            crc: CrcState::new(),
        }
    }

    pub fn with_stream_id(mut self) -> Self {
        self.has_stream_id = true;
        self
    }

    pub fn with_crc(mut self, mode: CrcMode) -> Self {
        self.crc_mode = mode;
        self
    }

    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry::new(self.width, self.height)
    }

    /// Build one frame. `lines` gives `(stream_id, payload)` per line from
    /// the top; remaining lines carry an empty payload on stream 0.
    pub fn frame_with_counter(
        &mut self,
        counter: u16,
        lines: &[(u16, &[u16])],
    ) -> (Vec<u16>, FrameMetadata) {
        assert!(lines.len() <= self.height, "more line entries than lines");
        let has_crc = self.crc_mode != CrcMode::None;
        let reserved = 1 + self.has_stream_id as usize + has_crc as usize;

        let mut buf = vec![0u16; self.width * self.height];
        for index in 0..self.height {
            let (stream_id, payload) = lines.get(index).copied().unwrap_or((0, &[]));
            assert!(payload.len() + reserved <= self.width, "payload overflows line");

            let start = index * self.width;
            let line = &mut buf[start..start + self.width];
            line[..payload.len()].copy_from_slice(payload);

            let idle_len = self.width - 1 - payload.len()
                - self.has_stream_id as usize
                - has_crc as usize;
            for word in &mut line[payload.len()..payload.len() + idle_len] {
                self.idle = self.idle.wrapping_add(1);
                *word = self.idle.to_le();
            }

            if self.has_stream_id {
                line[self.width - 3] = stream_id.to_le();
            }
            if has_crc {
                line[self.width - 2] = self.crc.expected(self.crc_mode).to_le();
            }
            line[self.width - 1] = (payload.len() as u16).to_le();

            if has_crc {
                self.crc.advance(line);
            }
        }

        let mut meta = FrameMetadata::new(counter);
        if self.has_stream_id {
            meta.flags |= FLAG_STREAM_ID_PRESENT;
        }
        meta.crc_mode = self.crc_mode;
        (buf, meta)
    }
}
