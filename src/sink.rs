//! PCM output sinks
//!
//! Decoders push interleaved 16-bit samples into an [`AudioSink`], the
//! single-operation append-only consumer the decode loop writes to. A write
//! failure is terminal: the loop stops and unwinds, releasing the input.
//!
//! Byte-order contract: in-memory samples are `i16`; byte order only exists
//! at a sink boundary, and the raw byte sink commits to little-endian.

use crate::{AdxError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-only consumer of interleaved 16-bit PCM
pub trait AudioSink {
    /// Write one block of interleaved samples.
    ///
    /// An error from the sink terminates the decode loop cleanly.
    fn write(&mut self, samples: &[i16]) -> Result<()>;
}

/// Collects samples in memory, for tests and offline analysis
#[derive(Debug, Default)]
pub struct MemorySink {
    samples: Vec<i16>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples collected so far.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Consume the sink, returning everything written to it.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

impl AudioSink for MemorySink {
    fn write(&mut self, samples: &[i16]) -> Result<()> {
        self.samples.extend_from_slice(samples);
        Ok(())
    }
}

/// Writes raw little-endian PCM bytes to any `io::Write`
#[derive(Debug)]
pub struct RawPcmSink<W> {
    inner: W,
    scratch: Vec<u8>,
}

impl<W: Write> RawPcmSink<W> {
    /// Wrap a byte writer.
    pub fn new(inner: W) -> Self {
        RawPcmSink {
            inner,
            scratch: Vec::new(),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> AudioSink for RawPcmSink<W> {
    fn write(&mut self, samples: &[i16]) -> Result<()> {
        self.scratch.clear();
        self.scratch.reserve(samples.len() * 2);
        for &sample in samples {
            self.scratch.extend_from_slice(&sample.to_le_bytes());
        }
        self.inner.write_all(&self.scratch)?;
        Ok(())
    }
}

/// WAV file sink backed by `hound`
pub struct WavSink {
    writer: hound::WavWriter<BufWriter<File>>,
}

impl WavSink {
    /// Create a 16-bit PCM WAV file at `path`.
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path, spec)
            .map_err(|e| AdxError::AudioOutput(format!("failed to create WAV file: {e}")))?;
        Ok(WavSink { writer })
    }

    /// Finish the file, patching up the RIFF length fields.
    pub fn finalize(self) -> Result<()> {
        self.writer
            .finalize()
            .map_err(|e| AdxError::AudioOutput(format!("failed to finalize WAV file: {e}")))
    }
}

impl AudioSink for WavSink {
    fn write(&mut self, samples: &[i16]) -> Result<()> {
        for &sample in samples {
            self.writer
                .write_sample(sample)
                .map_err(|e| AdxError::AudioOutput(format!("WAV write failed: {e}")))?;
        }
        Ok(())
    }
}
