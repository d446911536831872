//! Audio device integration using rodio
//!
//! `AudioDevice` attaches a ring-buffer-backed `rodio::Source` to the
//! default output device. `StreamSink` is the producer half: an
//! [`AudioSink`] that pushes decoded samples into the ring with
//! backpressure, so the decode loop naturally runs at playback speed.

use rodio::{OutputStream, Sink, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{RingBuffer, StreamConfig, BUFFER_BACKOFF_MICROS};
use crate::sink::AudioSink;
use crate::{AdxError, Result};

/// Audio source that drains the ring buffer
struct RingBufferSource {
    ring: Arc<RingBuffer>,
    sample_rate: u32,
    channels: u16,
    finished: Arc<AtomicBool>,
    /// Batch buffer so the ring lock is taken per block, not per sample
    batch: Vec<i16>,
    batch_pos: usize,
    batch_len: usize,
}

impl RingBufferSource {
    fn new(
        ring: Arc<RingBuffer>,
        sample_rate: u32,
        channels: u16,
        finished: Arc<AtomicBool>,
    ) -> Self {
        RingBufferSource {
            ring,
            sample_rate,
            channels,
            finished,
            batch: vec![0i16; 1024],
            batch_pos: 0,
            batch_len: 0,
        }
    }
}

impl Source for RingBufferSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Iterator for RingBufferSource {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.batch_pos >= self.batch_len {
            let read = self.ring.read(&mut self.batch);
            if read == 0 {
                if self.finished.load(Ordering::Relaxed) {
                    return None;
                }
                // Underrun: keep the stream alive with silence.
                return Some(0);
            }
            self.batch_pos = 0;
            self.batch_len = read;
        }

        let sample = self.batch[self.batch_pos];
        self.batch_pos += 1;
        Some(sample)
    }
}

/// Playback device bound to the system's default audio output
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

impl AudioDevice {
    /// Open the default output device and start draining `ring`.
    pub fn new(config: StreamConfig, ring: Arc<RingBuffer>) -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| AdxError::AudioOutput(format!("failed to open audio stream: {e}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| AdxError::AudioOutput(format!("failed to create audio sink: {e}")))?;

        let finished = Arc::new(AtomicBool::new(false));
        let source = RingBufferSource::new(
            ring,
            config.sample_rate,
            config.channels,
            Arc::clone(&finished),
        );
        sink.append(source);

        Ok(AudioDevice {
            _stream: stream,
            sink,
            finished,
        })
    }

    /// Pause playback.
    pub fn pause(&self) {
        self.sink.pause();
    }

    /// Resume playback.
    pub fn play(&self) {
        self.sink.play();
    }

    /// Signal that no more samples will be produced, letting the stream
    /// terminate instead of playing silence forever.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }

    /// Block until the sink has drained.
    pub fn wait_for_finish(&self) {
        self.sink.sleep_until_end();
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.finish();
        self.sink.pause();
    }
}

/// Producer-side sink feeding the ring buffer with backpressure
pub struct StreamSink {
    ring: Arc<RingBuffer>,
    stop: Arc<AtomicBool>,
}

impl StreamSink {
    /// Create a sink writing into `ring`; `stop` aborts a blocked write.
    pub fn new(ring: Arc<RingBuffer>, stop: Arc<AtomicBool>) -> Self {
        StreamSink { ring, stop }
    }

    /// Block until the consumer has drained everything written so far.
    pub fn drain(&self) {
        while self.ring.available_read() > 0 && !self.stop.load(Ordering::Relaxed) {
            std::thread::sleep(Duration::from_micros(BUFFER_BACKOFF_MICROS));
        }
    }
}

impl AudioSink for StreamSink {
    fn write(&mut self, samples: &[i16]) -> Result<()> {
        let mut remaining = samples;
        while !remaining.is_empty() {
            if self.stop.load(Ordering::Relaxed) {
                return Err(AdxError::AudioOutput("playback stopped".into()));
            }
            let written = self.ring.write(remaining);
            if written == 0 {
                // Ring full: wait for the device to drain some.
                std::thread::sleep(Duration::from_micros(BUFFER_BACKOFF_MICROS));
            } else {
                remaining = &remaining[written..];
            }
        }
        Ok(())
    }
}
