//! Per-line CRC validation
//!
//! The transport computes a CRC-16/CCITT over each full line and transmits
//! it one or two lines later. Validation therefore compares a line's
//! declared CRC against the running history *before* folding the line's own
//! CRC in.

use super::metadata::CrcMode;

const CRC16_POLY: u16 = 0x1021;

/// CRC-16/CCITT (0x1021, init 0xFFFF) over a line's raw words.
pub fn crc16_ccitt(words: &[u16]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &word in words {
        for byte in word.to_le_bytes() {
            crc ^= (byte as u16) << 8;
            for _ in 0..8 {
                if crc & 0x8000 != 0 {
                    crc = (crc << 1) ^ CRC16_POLY;
                } else {
                    crc <<= 1;
                }
            }
        }
    }
    crc
}

#[cfg(test)]
fn crc16_ccitt_bytes(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ CRC16_POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Running CRC history across lines.
///
/// `history[0]` is the CRC of the most recent line, `history[1]` the one
/// before it. The history advances on every line regardless of match result
/// or sync state: keeping the reference warm is what prevents the first
/// frames after sync acquisition from being false-flagged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrcState {
    history: [u16; 2],
}

impl CrcState {
    pub fn new() -> Self {
        Self { history: [0, 0] }
    }

    pub fn reset(&mut self) {
        self.history = [0, 0];
    }

    /// The reference value a line's declared CRC is compared against.
    pub fn expected(&self, mode: CrcMode) -> u16 {
        match mode {
            CrcMode::None => 0,
            CrcMode::OneLineDelay => self.history[0],
            CrcMode::TwoLineDelay => self.history[1],
        }
    }

    /// Compare `received` against the delayed reference, then fold the
    /// line's own CRC into the history.
    pub fn check(&mut self, line: &[u16], received: u16, mode: CrcMode) -> bool {
        if mode == CrcMode::None {
            return true;
        }
        let matches = received == self.expected(mode);
        self.advance(line);
        matches
    }

    /// Shift the history and record this line's CRC.
    pub fn advance(&mut self, line: &[u16]) {
        self.history[1] = self.history[0];
        self.history[0] = crc16_ccitt(line);
    }

    pub fn history(&self) -> [u16; 2] {
        self.history
    }
}
