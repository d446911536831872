//! ADPCM frame reconstruction
//!
//! Each ADX frame is `frame_size` bytes: a 2-byte big-endian scale field
//! followed by packed 4-bit deltas, two per byte, high nibble first. A frame
//! decodes to `2 * (frame_size - 2)` samples given the channel's carried-over
//! two-sample history.

use crate::adx::coeffs::clamp16;

/// Two most recently decoded samples for one channel.
///
/// Owned exclusively by that channel's decode path. Reset to zero only at
/// stream start; loop seek-back re-seeks the bitstream but leaves history
/// intact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// Most recent sample
    pub hist1: i32,
    /// Second most recent sample
    pub hist2: i32,
}

/// Sign-extend the low 4 bits of `byte` to [-8, 7].
pub(crate) fn low_nibble(byte: u8) -> i32 {
    i32::from(byte & 0x07) - i32::from(byte & 0x08)
}

/// Sign-extend the high 4 bits of `byte` to [-8, 7].
pub(crate) fn high_nibble(byte: u8) -> i32 {
    (i32::from(byte & 0x70) - i32::from(byte & 0x80)) >> 4
}

/// Decode one raw frame into `out`, updating the channel history.
///
/// Samples are appended in decode order: high nibble first, then low, per
/// data byte after the 2-byte scale field. A frame too short to hold the
/// scale field decodes to nothing. Returns the number of samples written.
pub fn decode_frame(
    frame: &[u8],
    state: &mut ChannelState,
    coefs: (i32, i32),
    out: &mut Vec<i16>,
) -> usize {
    if frame.len() < 2 {
        return 0;
    }
    let scale = i32::from(u16::from_be_bytes([frame[0], frame[1]])) + 1;
    let (coef1, coef2) = coefs;
    let mut written = 0;

    for &byte in &frame[2..] {
        for nibble in [high_nibble(byte), low_nibble(byte)] {
            // Arithmetic shift: floor division by 4096 for negative sums too.
            let predicted = (coef1 * state.hist1 + coef2 * state.hist2) >> 12;
            let sample = clamp16(predicted + nibble * scale);
            state.hist2 = state.hist1;
            state.hist1 = i32::from(sample);
            out.push(sample);
            written += 1;
        }
    }

    written
}
