//! Sega-CD PCM Sector Decoding
//!
//! Sega-CD music rips are sequences of 2048-byte sectors. Sector 0 is the
//! header; every later sector is 8-bit sign-magnitude sample data. Stereo
//! files store left and right as consecutive whole sectors rather than
//! interleaved samples, so a stereo "frame" is a sector pair interleaved
//! sample-by-sample only after 8→16 bit expansion.
//!
//! Loop points are absolute byte offsets within the file (the header
//! occupies the first 2048 of them), and a frame unit for loop tracking is
//! one sector (mono) or one sector pair (stereo).

use std::io::{Read, Seek};

use crate::bitread::{u32_be, ByteSource};
use crate::format::AudioDecoder;
use crate::looping::{LoopAction, LoopController, LoopMode, LoopSpec};
use crate::{AdxError, Result};

/// Fixed sector size, the format's frame unit
pub const SECTOR_BYTES: usize = 2048;

/// Sega-CD PCM rips carry no rate field; this is the conventional default.
pub const DEFAULT_SAMPLE_RATE: u32 = 32000;

/// Parsed header sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmHeader {
    /// Decoded channel count (the header stores it inverted)
    pub channel_count: u8,
    /// Loop points as absolute byte offsets, header sector included
    pub loop_spec: LoopSpec,
}

impl PcmHeader {
    /// Parse the first sector of a PCM file.
    ///
    /// Byte 1 encodes the channel count inverted: header value 1 means two
    /// channels and value 2 means one. Bytes 2..6 (big-endian) give the
    /// loop start in 2048-byte blocks; bytes 6..10 give the loop end in
    /// stereo sample-pair units. Both are converted to byte offsets with
    /// the header sector's 2048 bytes added.
    pub fn parse(sector: &[u8]) -> Result<PcmHeader> {
        if sector.len() < SECTOR_BYTES {
            return Err(AdxError::InvalidFormat(format!(
                "PCM header sector truncated: {} of {SECTOR_BYTES} bytes",
                sector.len()
            )));
        }

        let channel_count = invert_channel_code(sector[1])?;
        let raw_start = u32_be(sector, 2).unwrap_or(0);
        let raw_end = u32_be(sector, 6).unwrap_or(0);

        let loop_start = (u64::from(raw_start) << 11) + SECTOR_BYTES as u64;
        let end_units = (u64::from(raw_end) + 1) * u64::from(channel_count);
        let loop_end = end_units + SECTOR_BYTES as u64;

        Ok(PcmHeader {
            channel_count,
            loop_spec: LoopSpec {
                // No explicit flag in the header; a zero end field marks an
                // unlooped rip.
                has_loop: raw_end != 0,
                loop_start,
                loop_end,
            },
        })
    }
}

/// Map the header's inverted channel code to a channel count.
///
/// The swap law only round-trips for values 1 and 2; anything else is
/// malformed.
pub fn invert_channel_code(code: u8) -> Result<u8> {
    match code {
        1 => Ok(2),
        2 => Ok(1),
        other => Err(AdxError::InvalidFormat(format!(
            "PCM channel code {other} (expected 1 or 2)"
        ))),
    }
}

/// Expand one 8-bit sign-magnitude sample to 16 bits.
///
/// Negative values store an unsigned magnitude under the high bit, not
/// two's complement; the expansion preserves that exactly.
pub fn expand_sample(byte: u8) -> i16 {
    if byte & 0x80 != 0 {
        -(0x100 * i16::from(byte & 0x7F))
    } else {
        0x100 * i16::from(byte)
    }
}

/// Stateful Sega-CD PCM decoder over a seekable byte source
pub struct PcmDecoder<R> {
    source: ByteSource<R>,
    header: PcmHeader,
    sample_rate: u32,
    looper: LoopController,
    finished: bool,
}

impl<R: Read + Seek> PcmDecoder<R> {
    /// Parse the header sector and position the source at the content.
    ///
    /// `sample_rate` overrides [`DEFAULT_SAMPLE_RATE`] when the caller
    /// knows better.
    pub fn new(inner: R, loop_mode: LoopMode, sample_rate: Option<u32>) -> Result<Self> {
        let mut source = ByteSource::new(inner);
        let mut sector = vec![0u8; SECTOR_BYTES];
        let got = source.read_fill(&mut sector)?;
        let header = PcmHeader::parse(&sector[..got])?;

        // Loop positions are file-absolute, so tracking starts after the
        // header sector.
        let looper =
            LoopController::with_start(header.loop_spec, loop_mode, SECTOR_BYTES as u64);

        Ok(PcmDecoder {
            source,
            header,
            sample_rate: sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE),
            looper,
            finished: false,
        })
    }

    /// The parsed header sector.
    pub fn header(&self) -> &PcmHeader {
        &self.header
    }

    /// Number of times the loop seam has been taken so far.
    pub fn loops_taken(&self) -> u32 {
        self.looper.loops_taken()
    }

    /// Decode the next sector (mono) or sector pair (stereo).
    ///
    /// Stereo interleaving happens sample-by-sample across the pair after
    /// expansion. Chunks at a loop seam are truncated to the bytes before
    /// the boundary; a short sector read is end-of-stream.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<i16>>> {
        if self.finished {
            return Ok(None);
        }

        let stereo = self.header.channel_count == 2;
        let frame_bytes = if stereo {
            2 * SECTOR_BYTES as u64
        } else {
            SECTOR_BYTES as u64
        };

        // Loop ends aligned to a sector edge (the common case for rips that
        // loop the whole file) seek back before the next read.
        if let Some(resume_at) = self.looper.seek_if_at_boundary() {
            self.source.seek_to(resume_at)?;
        }

        let mut left = vec![0u8; SECTOR_BYTES];
        let got = self.source.read_fill(&mut left)?;
        if got < SECTOR_BYTES {
            self.finished = true;
            return Ok(None);
        }

        let mut right = Vec::new();
        if stereo {
            right.resize(SECTOR_BYTES, 0);
            let got = self.source.read_fill(&mut right)?;
            if got < SECTOR_BYTES {
                self.finished = true;
                return Ok(None);
            }
        }

        let mut keep_bytes = frame_bytes;
        match self.looper.advance(frame_bytes) {
            LoopAction::Continue => {}
            LoopAction::SeekBack { keep, resume_at } => {
                keep_bytes = keep;
                self.source.seek_to(resume_at)?;
            }
        }

        // One content byte is one output sample, so truncation counts match.
        let keep = keep_bytes as usize;
        let mut out = Vec::with_capacity(keep);
        if stereo {
            for i in 0..SECTOR_BYTES {
                if out.len() >= keep {
                    break;
                }
                out.push(expand_sample(left[i]));
                if out.len() < keep {
                    out.push(expand_sample(right[i]));
                }
            }
        } else {
            for &byte in left.iter().take(keep) {
                out.push(expand_sample(byte));
            }
        }
        Ok(Some(out))
    }
}

impl<R: Read + Seek> AudioDecoder for PcmDecoder<R> {
    fn next_chunk(&mut self) -> Result<Option<Vec<i16>>> {
        PcmDecoder::next_chunk(self)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        u16::from(self.header.channel_count)
    }
}
