//! Audio Output & Streaming
//!
//! Real-time playback with a fixed-size ring buffer between the decode
//! loop (producer) and the audio device callback (consumer). Memory use is
//! bounded by the ring regardless of how long a looping track plays.

pub mod device;
pub mod ring_buffer;

pub use device::{AudioDevice, StreamSink};
pub use ring_buffer::RingBuffer;

/// Producer backoff while the ring is full, in microseconds
pub const BUFFER_BACKOFF_MICROS: u64 = 100;

/// Configuration for streaming playback
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Ring capacity in samples. Larger buffers add latency but tolerate
    /// scheduling hiccups better.
    pub ring_buffer_size: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
}

impl StreamConfig {
    /// Low-latency configuration: 4096 samples ≈ 93 ms at 44.1 kHz mono.
    pub fn low_latency(sample_rate: u32, channels: u16) -> Self {
        StreamConfig {
            ring_buffer_size: 4096,
            sample_rate,
            channels,
        }
    }

    /// Stability-first configuration: 16384 samples ≈ 372 ms at 44.1 kHz.
    pub fn stable(sample_rate: u32, channels: u16) -> Self {
        StreamConfig {
            ring_buffer_size: 16384,
            sample_rate,
            channels,
        }
    }

    /// Buffer latency in milliseconds at this configuration's rate.
    pub fn latency_ms(&self) -> f32 {
        let frames = self.ring_buffer_size as f32 / self.channels.max(1) as f32;
        frames * 1000.0 / self.sample_rate as f32
    }
}
