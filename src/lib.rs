//! CRI ADX decoder for Rust
//!
//! A decoder for CRI Middleware's ADX ADPCM audio format as found on
//! Dreamcast and arcade titles, plus the related Sega-CD PCM sector format.
//! Supports header-driven format validation, predictor-coefficient
//! derivation, sample-accurate seamless looping, and multi-channel
//! interleaved PCM16 output.
//!
//! # Features
//! - Full ADX version 0x0300 decode (0x0400 plain headers are accepted;
//!   encrypted variants are recognized and rejected)
//! - Bit-exact ADPCM frame reconstruction with two-tap linear prediction
//! - Loop-point tracking with finite or unbounded repeat counts
//! - Sega-CD PCM sector decoding with sign-magnitude 8→16 bit expansion
//! - WAV and raw PCM output sinks, optional real-time playback
//!
//! # Crate feature flags
//! - `segacd` (default): Sega-CD PCM sector decoding (`segacd`)
//! - `songdb` (default): CSV-backed song identification table (`songdb`)
//! - `streaming` (opt-in): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ## Decode a file to interleaved PCM16
//! ```no_run
//! use std::fs::File;
//! use adxplay::{AdxDecoder, LoopMode};
//! let file = File::open("song.adx").unwrap();
//! let mut decoder = AdxDecoder::new(file, LoopMode::Count(1)).unwrap();
//! while let Some(chunk) = decoder.next_chunk().unwrap() {
//!     // chunk is interleaved i16 at the file's native rate/channel count
//! }
//! ```
//!
//! ## Render to WAV
//! ```no_run
//! use std::fs::File;
//! use std::sync::atomic::AtomicBool;
//! use adxplay::{AdxDecoder, AudioDecoder, LoopMode, WavSink};
//! let file = File::open("song.adx").unwrap();
//! let mut decoder = AdxDecoder::new(file, LoopMode::Count(1)).unwrap();
//! let mut sink =
//!     WavSink::create("song.wav", decoder.sample_rate(), decoder.channels()).unwrap();
//! let stop = AtomicBool::new(false);
//! decoder.decode_to(&mut sink, &stop).unwrap();
//! sink.finalize().unwrap();
//! ```

#![warn(missing_docs)]

// Domain modules (feature-gated for modular use)
pub mod adx; // ADX header parsing and ADPCM decode
pub mod bitread; // Big-endian reads over a seekable source
pub mod config; // Player configuration
pub mod format; // Format detection and decoder surface
pub mod looping; // Loop point state machine
#[cfg(feature = "segacd")]
pub mod segacd; // Sega-CD PCM sector decoding
pub mod sink; // PCM output sinks
#[cfg(feature = "songdb")]
pub mod songdb; // Song identification table
#[cfg(feature = "streaming")]
pub mod streaming; // Audio output & streaming

/// Error types for decoder operations
#[derive(thiserror::Error, Debug)]
pub enum AdxError {
    /// File rejected before decode: bad magic or malformed header layout
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The "(c)CRI" signature preceding the stream offset did not match
    #[error("Signature mismatch: no \"(c)CRI\" before stream offset {0:#x}")]
    SignatureMismatch(u32),

    /// Recognized but undecodable variant (encrypted ADX, unknown version)
    #[error("Unsupported variant: {0}")]
    Unsupported(String),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Audio output sink or device error
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Song database error
    #[error("Song database error: {0}")]
    SongDb(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for AdxError {
    /// Converts a String into `AdxError::Other`.
    ///
    /// Convenience conversion for generic string errors. Prefer the specific
    /// variant constructors where the error class is known.
    fn from(msg: String) -> Self {
        AdxError::Other(msg)
    }
}

impl From<&str> for AdxError {
    /// Converts a string slice into `AdxError::Other`.
    fn from(msg: &str) -> Self {
        AdxError::Other(msg.to_string())
    }
}

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, AdxError>;

// Public API exports
pub use adx::{AdxDecoder, AdxHeader, ChannelState};
pub use config::PlayerConfig;
pub use format::{detect_format, AudioDecoder, AudioFormat};
pub use looping::{LoopController, LoopMode, LoopSpec};
#[cfg(feature = "segacd")]
pub use segacd::{PcmDecoder, PcmHeader};
pub use sink::{AudioSink, MemorySink, RawPcmSink, WavSink};
#[cfg(feature = "songdb")]
pub use songdb::{content_hash, SongEntry, SongTable};
#[cfg(feature = "streaming")]
pub use streaming::{AudioDevice, RingBuffer, StreamConfig, StreamSink};
