//! ADX decode loop
//!
//! Pulls one frame per channel per iteration, reconstructs each channel's
//! samples independently, interleaves them sample-by-sample, and consults
//! the loop controller to decide whether the frame is truncated at a loop
//! seam and the source seeked back to the loop start.
//!
//! Loop policy: loop positions are absolute sample counts within the
//! content stream (v3 semantics). `loop_start` is aligned down to a frame
//! boundary before any seek, and predictor history carries across the seam
//! untouched.

use std::io::{Read, Seek};

use crate::adx::coeffs::predictor_coefficients;
use crate::adx::frame::{decode_frame, ChannelState};
use crate::adx::header::AdxHeader;
use crate::bitread::ByteSource;
use crate::format::AudioDecoder;
use crate::looping::{LoopAction, LoopController, LoopMode};
use crate::{AdxError, Result};

/// Bytes probed from the start of the file for header parsing.
///
/// Matches the song-identification probe so one read serves both.
pub const HEADER_PROBE_BYTES: usize = 8192;

/// Stateful ADX decoder over a seekable byte source
#[derive(Debug)]
pub struct AdxDecoder<R> {
    source: ByteSource<R>,
    header: AdxHeader,
    coefs: (i32, i32),
    channels: Vec<ChannelState>,
    looper: LoopController,
    finished: bool,
}

impl<R: Read + Seek> AdxDecoder<R> {
    /// Validate the header and position the source at the encoded stream.
    ///
    /// Fails with [`AdxError::Unsupported`] for encrypted or unrecognized
    /// versions: those must be rejected up front, never silently garbled.
    pub fn new(inner: R, loop_mode: LoopMode) -> Result<Self> {
        let mut source = ByteSource::new(inner);
        let mut probe = vec![0u8; HEADER_PROBE_BYTES];
        let got = source.read_fill(&mut probe)?;
        probe.truncate(got);

        let header = AdxHeader::parse(&probe)?;
        if !header.is_decodable() {
            return Err(AdxError::Unsupported(format!(
                "ADX version {:#06x} (encoding {:#04x}) cannot be decoded",
                header.version, header.encoding_type
            )));
        }
        if header.channel_count == 0 {
            return Err(AdxError::InvalidFormat("zero channel count".into()));
        }
        if header.frame_size < 3 {
            return Err(AdxError::InvalidFormat(format!(
                "frame size {} leaves no sample data",
                header.frame_size
            )));
        }
        if header.sample_rate == 0 {
            return Err(AdxError::InvalidFormat("zero sample rate".into()));
        }

        let coefs = predictor_coefficients(header.cutoff_hz, header.sample_rate);

        // Seeks land on frame boundaries, so the loop start is aligned down
        // before the controller ever sees it.
        let mut spec = header.loop_spec;
        if spec.has_loop {
            let spf = u64::from(header.samples_per_frame());
            spec.loop_start -= spec.loop_start % spf;
        }
        let looper = LoopController::new(spec, loop_mode);

        source.seek_to(u64::from(header.stream_offset))?;

        Ok(AdxDecoder {
            channels: vec![ChannelState::default(); usize::from(header.channel_count)],
            source,
            header,
            coefs,
            looper,
            finished: false,
        })
    }

    /// The validated file header.
    pub fn header(&self) -> &AdxHeader {
        &self.header
    }

    /// Derived predictor coefficients, constant for the whole file.
    pub fn coefficients(&self) -> (i32, i32) {
        self.coefs
    }

    /// Number of times the loop seam has been taken so far.
    pub fn loops_taken(&self) -> u32 {
        self.looper.loops_taken()
    }

    /// Decode the next interleaved chunk of up to one frame's samples.
    ///
    /// Returns `Ok(None)` at end of stream: the declared sample count was
    /// reached, or the source ran out (a truncated final frame is
    /// end-of-stream, not an error). Chunks at a loop seam are truncated to
    /// the samples before the boundary.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<i16>>> {
        if self.finished {
            return Ok(None);
        }

        let spf = u64::from(self.header.samples_per_frame());
        let sample_count = u64::from(self.header.sample_count);
        let frame_size = usize::from(self.header.frame_size);
        let channel_count = usize::from(self.header.channel_count);

        // A loop whose end lands exactly on a frame edge seeks back before
        // the next read, so EOF cannot eat the seam.
        if let Some(resume_at) = self.looper.seek_if_at_boundary() {
            let frame_index = resume_at / spf;
            let byte =
                u64::from(self.header.stream_offset) + frame_index * self.header.frame_stride();
            self.source.seek_to(byte)?;
        }

        let pre_pos = self.looper.position();
        if pre_pos >= sample_count {
            self.finished = true;
            return Ok(None);
        }

        // One frame per channel; channels keep independent history.
        let mut frame = vec![0u8; frame_size];
        let mut per_channel: Vec<Vec<i16>> = Vec::with_capacity(channel_count);
        for state in self.channels.iter_mut() {
            let got = self.source.read_fill(&mut frame)?;
            if got < frame_size {
                self.finished = true;
                return Ok(None);
            }
            let mut samples = Vec::with_capacity(spf as usize);
            decode_frame(&frame, state, self.coefs, &mut samples);
            per_channel.push(samples);
        }

        let mut keep = spf;
        let mut seeked = false;
        match self.looper.advance(spf) {
            LoopAction::Continue => {}
            LoopAction::SeekBack { keep: k, resume_at } => {
                keep = k;
                seeked = true;
                let frame_index = resume_at / spf;
                let byte = u64::from(self.header.stream_offset)
                    + frame_index * self.header.frame_stride();
                self.source.seek_to(byte)?;
            }
        }

        // Clip the final frame to the declared sample count.
        if !seeked && pre_pos + spf > sample_count {
            keep = sample_count - pre_pos;
            self.finished = true;
        }

        let keep = keep as usize;
        let mut out = Vec::with_capacity(keep * channel_count);
        for i in 0..keep {
            for channel in &per_channel {
                out.push(channel[i]);
            }
        }
        Ok(Some(out))
    }
}

impl<R: Read + Seek> AudioDecoder for AdxDecoder<R> {
    fn next_chunk(&mut self) -> Result<Option<Vec<i16>>> {
        AdxDecoder::next_chunk(self)
    }

    fn sample_rate(&self) -> u32 {
        self.header.sample_rate
    }

    fn channels(&self) -> u16 {
        u16::from(self.header.channel_count)
    }
}
