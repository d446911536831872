//! Format detection and the common decoder surface
//!
//! Routing a raw file to the right decoder is driven by magic bytes (with a
//! filename hint for the magic-less Sega-CD PCM rips), and every decoder
//! exposes the same chunked pull interface so players can hold one
//! `dyn AudioDecoder` regardless of format.

use crate::bitread::u16_be;
use crate::sink::AudioSink;
use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};

/// Container formats this crate knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// CRI ADX ADPCM stream
    Adx,
    /// Sega-CD 2048-byte-sector PCM
    SegaCdPcm,
    /// Anything else; routed to an explicit "unsupported" arm, never decoded
    Unknown,
}

/// Sniff the format from leading bytes, with an optional filename hint.
///
/// ADX is identified by its 0x8000 magic. Sega-CD PCM sectors carry no
/// magic at all, so those are recognized by the `.pcm` extension.
pub fn detect_format(data: &[u8], name_hint: Option<&str>) -> AudioFormat {
    if u16_be(data, 0) == Some(crate::adx::header::ADX_MAGIC) {
        return AudioFormat::Adx;
    }
    if let Some(name) = name_hint {
        if name.to_ascii_lowercase().ends_with(".pcm") {
            return AudioFormat::SegaCdPcm;
        }
    }
    AudioFormat::Unknown
}

/// Common surface of the per-format decoders.
///
/// A decoder is a finite, stateful producer of interleaved PCM16 chunks:
/// lazy, consumed in order, and not restartable once exhausted.
pub trait AudioDecoder {
    /// Decode and return the next interleaved chunk, or `None` at the end
    /// of the stream (natural EOF or loop-budget completion).
    fn next_chunk(&mut self) -> Result<Option<Vec<i16>>>;

    /// Native playback rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Number of interleaved channels.
    fn channels(&self) -> u16;

    /// Run the sequential read → decode → write loop into `sink`.
    ///
    /// The stop flag is checked once per iteration so a caller can cancel
    /// an unbounded (looping) decode; a sink write failure is terminal and
    /// propagates after the loop unwinds. Returns the number of interleaved
    /// samples written.
    fn decode_to(&mut self, sink: &mut dyn AudioSink, stop: &AtomicBool) -> Result<u64> {
        let mut total = 0u64;
        while !stop.load(Ordering::Relaxed) {
            match self.next_chunk()? {
                Some(chunk) => {
                    sink.write(&chunk)?;
                    total += chunk.len() as u64;
                }
                None => break,
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_adx_by_magic() {
        let data = [0x80, 0x00, 0x00, 0x2E];
        assert_eq!(detect_format(&data, None), AudioFormat::Adx);
        assert_eq!(detect_format(&data, Some("music.pcm")), AudioFormat::Adx);
    }

    #[test]
    fn test_detect_pcm_by_extension() {
        let data = [0x00, 0x01, 0x00, 0x00];
        assert_eq!(
            detect_format(&data, Some("track02.PCM")),
            AudioFormat::SegaCdPcm
        );
    }

    #[test]
    fn test_unknown_otherwise() {
        assert_eq!(detect_format(&[0x00, 0x01], None), AudioFormat::Unknown);
        assert_eq!(
            detect_format(&[0x00, 0x01], Some("track.wav")),
            AudioFormat::Unknown
        );
        assert_eq!(detect_format(&[], None), AudioFormat::Unknown);
    }
}
