//! Frame metadata and geometry

use serde::Serialize;

/// Magic constant identifying a trusted transport frame.
///
/// Compared against the metadata magic after normalizing from the
/// transport's little-endian byte order.
pub const TRANSPORT_MAGIC: u32 = 0xDA7A_CAB1;

/// Metadata flag: lines carry a stream-id field (audio multiplexing active).
pub const FLAG_STREAM_ID_PRESENT: u32 = 1 << 0;

/// CRC configuration advertised by the transport.
///
/// The CRC embedded in a line covers an *earlier* line: the transport
/// computes it one or two lines ahead of where it is transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrcMode {
    /// No per-line CRC.
    None,
    /// Line carries the CRC of the previous line.
    OneLineDelay,
    /// Line carries the CRC of the line before the previous one.
    TwoLineDelay,
}

/// Per-stream rate hint carried in the frame metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    /// Sample rate in Hz, 0 when the transport does not report one.
    pub sample_rate: u32,
}

/// Metadata extracted from a frame by the transport driver.
///
/// Consumed read-only; the driver owns extraction from the raw buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameMetadata {
    /// Magic constant in transport byte order.
    pub magic: u32,
    /// Wrapping 16-bit frame counter.
    pub frame_counter: u16,
    /// Flag bitset, see [`FLAG_STREAM_ID_PRESENT`].
    pub flags: u32,
    /// Per-line CRC configuration.
    pub crc_mode: CrcMode,
    /// Rate hints for streams 0 (RF) and 1 (audio).
    pub stream_info: [StreamInfo; 2],
}

impl FrameMetadata {
    /// Metadata with a valid magic, no flags, and no CRC.
    pub fn new(frame_counter: u16) -> Self {
        Self {
            magic: TRANSPORT_MAGIC.to_le(),
            frame_counter,
            flags: 0,
            crc_mode: CrcMode::None,
            stream_info: [StreamInfo::default(); 2],
        }
    }

    /// True when the magic matches the transport constant.
    pub fn magic_valid(&self) -> bool {
        u32::from_le(self.magic) == TRANSPORT_MAGIC
    }

    pub fn has_stream_id(&self) -> bool {
        self.flags & FLAG_STREAM_ID_PRESENT != 0
    }

    pub fn has_crc(&self) -> bool {
        self.crc_mode != CrcMode::None
    }
}

/// Frame dimensions in 16-bit words, supplied per frame by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameGeometry {
    /// Words per line.
    pub width: usize,
    /// Lines per frame.
    pub height: usize,
}

impl FrameGeometry {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total words in one frame buffer.
    pub fn words(&self) -> usize {
        self.width * self.height
    }

    /// The words of line `index`, or `None` when the index or buffer is out
    /// of bounds.
    pub fn line<'a>(&self, buf: &'a [u16], index: usize) -> Option<&'a [u16]> {
        if index >= self.height {
            return None;
        }
        let start = index * self.width;
        buf.get(start..start + self.width)
    }
}
