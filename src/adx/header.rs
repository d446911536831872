//! ADX header parsing
//!
//! ADX files open with a fixed big-endian header:
//! - Magic: 0x8000 (offset 0)
//! - Stream offset base (offset 2): content starts at `base + 4`
//! - Encoding type (4), frame size (5), channel count (6)
//! - Sample rate (8), total sample count (0xC)
//! - Highpass cutoff in Hz (0x10), version (0x12)
//! - Version-specific loop fields
//! - "(c)CRI" signature in the 6 bytes immediately before the stream offset
//!
//! Loop metadata layout depends on the version word; unrecognized versions
//! silently degrade to no-loop rather than failing, so unloopable variants
//! still play straight through.

use crate::bitread::{u16_be, u32_be};
use crate::looping::LoopSpec;
use crate::{AdxError, Result};
use num_traits::FromPrimitive;

/// Fixed 2-byte magic at offset 0
pub const ADX_MAGIC: u16 = 0x8000;

/// Copyright signature preceding the encoded stream
pub const ADX_SIGNATURE: &[u8; 6] = b"(c)CRI";

/// Frame size used by virtually every ADX file in the wild
pub const DEFAULT_FRAME_SIZE: u8 = 18;

/// Known values of the version word at offset 0x12
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_derive::FromPrimitive)]
pub enum AdxVersion {
    /// Plain version 3 stream
    V3 = 0x0300,
    /// Plain version 4 stream (loop fields shifted by 0xC)
    V4 = 0x0400,
    /// Version 4 with type-8 encryption
    V4Crypt8 = 0x0408,
    /// Version 4 with type-9 encryption
    V4Crypt9 = 0x0409,
}

/// Known values of the encoding type byte at offset 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_derive::FromPrimitive)]
pub enum EncodingType {
    /// Fixed coefficient table
    Fixed = 0x02,
    /// Standard ADX (coefficients derived from cutoff/sample rate)
    Standard = 0x03,
    /// Exponential scale
    Exponential = 0x04,
}

/// Validated ADX file header
#[derive(Debug, Clone)]
pub struct AdxHeader {
    /// Byte offset where the encoded stream begins (`4 + u16@2`)
    pub stream_offset: u32,
    /// Raw encoding type byte; see [`AdxHeader::encoding`]
    pub encoding_type: u8,
    /// Bytes per encoded frame, usually 18
    pub frame_size: u8,
    /// Number of interleaved channels
    pub channel_count: u8,
    /// Playback rate in Hz
    pub sample_rate: u32,
    /// Total samples per channel in the file
    pub sample_count: u32,
    /// Highpass cutoff frequency in Hz, input to coefficient derivation
    pub cutoff_hz: u16,
    /// Raw version word; see [`AdxHeader::version_tag`]
    pub version: u16,
    /// Loop points in absolute samples, or the inert default
    pub loop_spec: LoopSpec,
}

impl AdxHeader {
    /// Parse and validate a header from the leading bytes of a file.
    ///
    /// `data` must cover at least the first `stream_offset` bytes. Fails
    /// with [`AdxError::InvalidFormat`] when the magic is wrong (no further
    /// parsing is attempted) and [`AdxError::SignatureMismatch`] when the
    /// "(c)CRI" signature is absent from its derived position.
    pub fn parse(data: &[u8]) -> Result<AdxHeader> {
        let magic = u16_be(data, 0)
            .ok_or_else(|| AdxError::InvalidFormat("file too small for ADX magic".into()))?;
        if magic != ADX_MAGIC {
            return Err(AdxError::InvalidFormat(format!(
                "bad magic {magic:#06x}, expected {ADX_MAGIC:#06x}"
            )));
        }

        let stream_offset = u32::from(u16_be(data, 2).unwrap_or(0)) + 4;
        let header_end = stream_offset as usize;
        if header_end < 6 + 0x14 || data.len() < header_end {
            return Err(AdxError::InvalidFormat(format!(
                "stream offset {stream_offset:#x} leaves no room for a header"
            )));
        }

        // Signature position is derived from the stream offset, not fixed.
        if &data[header_end - 6..header_end] != ADX_SIGNATURE {
            return Err(AdxError::SignatureMismatch(stream_offset));
        }

        let encoding_type = data[4];
        let frame_size = data[5];
        let channel_count = data[6];
        let sample_rate = u32_be(data, 8).unwrap_or(0);
        let sample_count = u32_be(data, 0xC).unwrap_or(0);
        let cutoff_hz = u16_be(data, 0x10).unwrap_or(0);
        let version = u16_be(data, 0x12).unwrap_or(0);

        let loop_spec = parse_loop_spec(data, stream_offset, version);

        Ok(AdxHeader {
            stream_offset,
            encoding_type,
            frame_size,
            channel_count,
            sample_rate,
            sample_count,
            cutoff_hz,
            version,
            loop_spec,
        })
    }

    /// Classified version word, `None` for unrecognized values.
    pub fn version_tag(&self) -> Option<AdxVersion> {
        AdxVersion::from_u16(self.version)
    }

    /// Classified encoding type, `None` for unrecognized values.
    pub fn encoding(&self) -> Option<EncodingType> {
        EncodingType::from_u8(self.encoding_type)
    }

    /// Whether this crate can decode the stream.
    ///
    /// Plain v3 and v4 streams with standard (derived-coefficient)
    /// encoding decode. Encrypted variants, unknown versions, and the
    /// fixed/exponential encodings are recognized but rejected rather
    /// than silently garbled with the wrong taps.
    pub fn is_decodable(&self) -> bool {
        matches!(self.version_tag(), Some(AdxVersion::V3 | AdxVersion::V4))
            && self.encoding() == Some(EncodingType::Standard)
    }

    /// Decoded samples produced per frame per channel.
    pub fn samples_per_frame(&self) -> u32 {
        2 * (u32::from(self.frame_size).saturating_sub(2))
    }

    /// Bytes consumed per decode iteration (one frame for every channel).
    pub fn frame_stride(&self) -> u64 {
        u64::from(self.frame_size) * u64::from(self.channel_count)
    }
}

/// Extract loop metadata for the given version word.
///
/// Versions without a recognized loop layout, and headers too small to hold
/// the fields, degrade to the inert default spec.
fn parse_loop_spec(data: &[u8], stream_offset: u32, version: u16) -> LoopSpec {
    let header_room = stream_offset.saturating_sub(6);
    let offsets = match AdxVersion::from_u16(version) {
        Some(AdxVersion::V3) if header_room >= 0x2C => Some((0x18, 0x1C, 0x24)),
        Some(AdxVersion::V4 | AdxVersion::V4Crypt8) if header_room >= 0x38 => {
            Some((0x24, 0x2C, 0x34))
        }
        _ => None,
    };

    let Some((enabled_at, start_at, end_at)) = offsets else {
        return LoopSpec::default();
    };

    let enabled = u32_be(data, enabled_at).unwrap_or(0);
    let loop_start = u32_be(data, start_at).unwrap_or(0);
    let loop_end = u32_be(data, end_at).unwrap_or(0);

    LoopSpec {
        has_loop: enabled != 0,
        loop_start: u64::from(loop_start),
        loop_end: u64::from(loop_end),
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Build a minimal valid v3 header with content starting at 0x2C + 6.
    pub(crate) fn build_header(
        channel_count: u8,
        sample_rate: u32,
        sample_count: u32,
        loop_spec: Option<(u32, u32)>,
    ) -> Vec<u8> {
        let stream_offset: u16 = 0x32; // header room 0x2C, loop fields present
        let mut data = Vec::new();
        data.extend_from_slice(&ADX_MAGIC.to_be_bytes()); // Magic (0-1)
        data.extend_from_slice(&(stream_offset - 4).to_be_bytes()); // Offset base (2-3)
        data.push(0x03); // Encoding type (4)
        data.push(DEFAULT_FRAME_SIZE); // Frame size (5)
        data.push(channel_count); // Channels (6)
        data.push(0); // Padding (7)
        data.extend_from_slice(&sample_rate.to_be_bytes()); // Sample rate (8-B)
        data.extend_from_slice(&sample_count.to_be_bytes()); // Sample count (C-F)
        data.extend_from_slice(&500u16.to_be_bytes()); // Cutoff (10-11)
        data.extend_from_slice(&0x0300u16.to_be_bytes()); // Version (12-13)

        data.resize(0x18, 0);
        let (enabled, start, end) = match loop_spec {
            Some((s, e)) => (1u32, s, e),
            None => (0, 0, 0),
        };
        data.extend_from_slice(&enabled.to_be_bytes()); // has_loop (18-1B)
        data.extend_from_slice(&start.to_be_bytes()); // loop_start samples (1C-1F)
        data.extend_from_slice(&0u32.to_be_bytes()); // loop_start bytes (20-23)
        data.extend_from_slice(&end.to_be_bytes()); // loop_end samples (24-27)

        data.resize(usize::from(stream_offset) - 6, 0);
        data.extend_from_slice(ADX_SIGNATURE);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::build_header;
    use super::*;

    #[test]
    fn test_parse_valid_header() {
        let data = build_header(1, 44100, 6000, None);
        let header = AdxHeader::parse(&data).unwrap();

        assert_eq!(header.stream_offset, 0x32);
        assert_eq!(header.encoding(), Some(EncodingType::Standard));
        assert_eq!(header.frame_size, 18);
        assert_eq!(header.channel_count, 1);
        assert_eq!(header.sample_rate, 44100);
        assert_eq!(header.sample_count, 6000);
        assert_eq!(header.cutoff_hz, 500);
        assert_eq!(header.version_tag(), Some(AdxVersion::V3));
        assert!(header.is_decodable());
        assert_eq!(header.samples_per_frame(), 32);
        assert_eq!(header.frame_stride(), 18);
    }

    #[test]
    fn test_magic_required() {
        let mut data = build_header(1, 44100, 6000, None);
        data[0] = 0x7F;
        assert!(matches!(
            AdxHeader::parse(&data),
            Err(AdxError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_signature_mismatch() {
        let mut data = build_header(1, 44100, 6000, None);
        let sig_at = data.len() - 6;
        data[sig_at] = b'X';
        assert!(matches!(
            AdxHeader::parse(&data),
            Err(AdxError::SignatureMismatch(0x32))
        ));
    }

    #[test]
    fn test_too_small_rejected() {
        assert!(matches!(
            AdxHeader::parse(&[0x80]),
            Err(AdxError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_loopless_default_spec() {
        let data = build_header(2, 22050, 1000, None);
        let header = AdxHeader::parse(&data).unwrap();
        assert_eq!(header.loop_spec, LoopSpec::default());
        assert!(!header.loop_spec.has_loop);
        assert_eq!(header.loop_spec.loop_start, 0);
        assert_eq!(header.loop_spec.loop_end, 0);
    }

    #[test]
    fn test_v3_loop_fields() {
        let data = build_header(1, 44100, 6000, Some((320, 5120)));
        let header = AdxHeader::parse(&data).unwrap();
        assert!(header.loop_spec.has_loop);
        assert_eq!(header.loop_spec.loop_start, 320);
        assert_eq!(header.loop_spec.loop_end, 5120);
    }

    #[test]
    fn test_unknown_version_degrades_to_no_loop() {
        let mut data = build_header(1, 44100, 6000, Some((320, 5120)));
        data[0x12] = 0x05; // version 0x0500
        let header = AdxHeader::parse(&data).unwrap();
        assert_eq!(header.version_tag(), None);
        assert!(!header.is_decodable());
        assert_eq!(header.loop_spec, LoopSpec::default());
    }

    #[test]
    fn test_small_header_skips_loop_fields() {
        // stream_offset leaving less than 0x2C of header room: loop fields
        // must not be read even for v3.
        let stream_offset: u16 = 0x20;
        let mut data = Vec::new();
        data.extend_from_slice(&ADX_MAGIC.to_be_bytes());
        data.extend_from_slice(&(stream_offset - 4).to_be_bytes());
        data.push(0x03);
        data.push(DEFAULT_FRAME_SIZE);
        data.push(1);
        data.push(0);
        data.extend_from_slice(&44100u32.to_be_bytes());
        data.extend_from_slice(&6000u32.to_be_bytes());
        data.extend_from_slice(&500u16.to_be_bytes());
        data.extend_from_slice(&0x0300u16.to_be_bytes());
        data.resize(usize::from(stream_offset) - 6, 0);
        data.extend_from_slice(ADX_SIGNATURE);

        let header = AdxHeader::parse(&data).unwrap();
        assert_eq!(header.loop_spec, LoopSpec::default());
    }

    #[test]
    fn test_encrypted_variant_recognized_not_decodable() {
        let mut data = build_header(1, 44100, 6000, None);
        data[0x12] = 0x04;
        data[0x13] = 0x08;
        let header = AdxHeader::parse(&data).unwrap();
        assert_eq!(header.version_tag(), Some(AdxVersion::V4Crypt8));
        assert!(!header.is_decodable());
    }

    #[test]
    fn test_nonstandard_encodings_recognized_not_decodable() {
        // Fixed and exponential streams need different taps; decoding them
        // with the derived linear coefficients would garble silently.
        for encoding in [0x02u8, 0x04] {
            let mut data = build_header(1, 44100, 6000, None);
            data[4] = encoding;
            let header = AdxHeader::parse(&data).unwrap();
            assert_eq!(header.version_tag(), Some(AdxVersion::V3));
            assert!(!header.is_decodable(), "encoding {encoding:#04x}");
        }
    }

    /// Build a v4 header; loop fields sit 0xC past their v3 offsets.
    fn build_v4_header(stream_offset: u16, loop_pts: Option<(u32, u32)>) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&ADX_MAGIC.to_be_bytes());
        data.extend_from_slice(&(stream_offset - 4).to_be_bytes());
        data.push(0x03);
        data.push(DEFAULT_FRAME_SIZE);
        data.push(1);
        data.push(0);
        data.extend_from_slice(&44100u32.to_be_bytes());
        data.extend_from_slice(&6000u32.to_be_bytes());
        data.extend_from_slice(&500u16.to_be_bytes());
        data.extend_from_slice(&0x0400u16.to_be_bytes());
        if let Some((start, end)) = loop_pts {
            data.resize(0x24, 0);
            data.extend_from_slice(&1u32.to_be_bytes()); // has_loop (24-27)
            data.resize(0x2C, 0);
            data.extend_from_slice(&start.to_be_bytes()); // loop_start samples (2C-2F)
            data.resize(0x34, 0);
            data.extend_from_slice(&end.to_be_bytes()); // loop_end samples (34-37)
        }
        data.resize(usize::from(stream_offset) - 6, 0);
        data.extend_from_slice(ADX_SIGNATURE);
        data
    }

    #[test]
    fn test_v4_loop_fields_shifted() {
        let data = build_v4_header(0x40, Some((320, 5120)));
        let header = AdxHeader::parse(&data).unwrap();
        assert_eq!(header.version_tag(), Some(AdxVersion::V4));
        assert!(header.is_decodable());
        assert!(header.loop_spec.has_loop);
        assert_eq!(header.loop_spec.loop_start, 320);
        assert_eq!(header.loop_spec.loop_end, 5120);
    }

    #[test]
    fn test_small_v4_header_skips_loop_fields() {
        // Header room below 0x38: the shifted fields do not fit, so even a
        // v4 file degrades to no-loop.
        let data = build_v4_header(0x32, None);
        let header = AdxHeader::parse(&data).unwrap();
        assert_eq!(header.version_tag(), Some(AdxVersion::V4));
        assert_eq!(header.loop_spec, LoopSpec::default());
    }
}
