//! Line codec
//!
//! Each line's trailing words describe the line, counted back from the end:
//!
//! ```text
//! | payload (payload_len words) | idle filler ... | stream_id | crc | length |
//! ```
//!
//! The length word is always present (low 12 bits). The CRC word sits at the
//! fixed slot before it and the stream-id word at the slot before that; each
//! is read only when the corresponding metadata flag is set. Field words are
//! little-endian on the wire and normalized to host order here.

/// Fields extracted from one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedLine {
    /// Payload length in 16-bit words (12-bit value).
    pub payload_len: u16,
    /// Declared CRC, 0 when the CRC field is absent.
    pub crc: u16,
    /// Stream id (0 = RF, 1 = audio), 0 when the field is absent.
    pub stream_id: u16,
    /// True when `payload_len` fits within the line.
    pub valid: bool,
}

/// Word `n` slots back from the end of the line, normalized to host order.
fn field_from_end(line: &[u16], n: usize) -> Option<u16> {
    line.len()
        .checked_sub(n + 1)
        .map(|index| u16::from_le(line[index]))
}

/// Extract the trailing fields of one line.
///
/// Pure field extraction; the only validation is the payload-length bound
/// `payload_len <= width - 1`.
pub fn parse_line(line: &[u16], has_stream_id: bool, has_crc: bool) -> ParsedLine {
    let mut parsed = ParsedLine::default();

    let Some(length_word) = field_from_end(line, 0) else {
        return parsed;
    };
    parsed.payload_len = length_word & 0x0FFF;

    if has_crc {
        match field_from_end(line, 1) {
            Some(crc) => parsed.crc = crc,
            None => return parsed,
        }
    }

    if has_stream_id {
        match field_from_end(line, 2) {
            Some(id) => parsed.stream_id = id & 0x0FFF,
            None => return parsed,
        }
    }

    parsed.valid = (parsed.payload_len as usize) <= line.len() - 1;
    parsed
}

/// The payload words of a parsed line.
pub fn payload<'a>(line: &'a [u16], parsed: &ParsedLine) -> &'a [u16] {
    let len = (parsed.payload_len as usize).min(line.len());
    &line[..len]
}

/// The idle-filler words of a line: everything between the payload and the
/// trailing metadata fields.
pub fn idle_region<'a>(
    line: &'a [u16],
    payload_len: u16,
    has_stream_id: bool,
    has_crc: bool,
) -> &'a [u16] {
    let width = line.len();
    let mut idle_len = width
        .saturating_sub(1)
        .saturating_sub(payload_len as usize);
    if has_stream_id {
        idle_len = idle_len.saturating_sub(1);
    }
    if has_crc {
        idle_len = idle_len.saturating_sub(1);
    }

    let start = (payload_len as usize).min(width);
    let end = (start + idle_len).min(width);
    &line[start..end]
}
