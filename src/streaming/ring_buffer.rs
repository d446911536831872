//! Ring buffer for concurrent decode and playback
//!
//! One producer (the decode loop) and one consumer (the audio device
//! callback) share a fixed circular buffer of PCM16 samples. Buffer access
//! goes through a `parking_lot` mutex; read/write positions are atomics so
//! fill queries never take the lock.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{AdxError, Result};

/// Fixed-capacity circular buffer of interleaved PCM16 samples
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Mutex<Vec<i16>>,
    write_pos: AtomicUsize,
    read_pos: AtomicUsize,
    capacity: usize,
    /// `pos & mask == pos % capacity`; capacity is a power of two
    mask: usize,
}

impl RingBuffer {
    /// Create a ring buffer; capacity is rounded up to a power of two.
    pub fn new(requested_capacity: usize) -> Result<Self> {
        if requested_capacity == 0 {
            return Err(AdxError::AudioOutput(
                "ring buffer capacity must be greater than 0".into(),
            ));
        }

        let capacity = requested_capacity.next_power_of_two();

        // 256 MB of i16 samples is already far past any sane latency.
        const MAX_CAPACITY: usize = 256 * 1024 * 1024 / std::mem::size_of::<i16>();
        if capacity > MAX_CAPACITY {
            return Err(AdxError::AudioOutput(format!(
                "ring buffer capacity {capacity} exceeds maximum {MAX_CAPACITY}"
            )));
        }

        Ok(RingBuffer {
            buffer: Mutex::new(vec![0i16; capacity]),
            write_pos: AtomicUsize::new(0),
            read_pos: AtomicUsize::new(0),
            capacity,
            mask: capacity - 1,
        })
    }

    /// Write as many samples as fit; returns the count actually written.
    pub fn write(&self, samples: &[i16]) -> usize {
        let buffer = &mut *self.buffer.lock();
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);

        // One slot stays empty to distinguish full from empty.
        let free = self.capacity - 1 - (write.wrapping_sub(read));
        let count = samples.len().min(free);
        for (i, &sample) in samples[..count].iter().enumerate() {
            buffer[(write + i) & self.mask] = sample;
        }
        self.write_pos.store(write + count, Ordering::Release);
        count
    }

    /// Read up to `out.len()` samples; returns the count actually read.
    pub fn read(&self, out: &mut [i16]) -> usize {
        let buffer = &mut *self.buffer.lock();
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);

        let available = write.wrapping_sub(read);
        let count = out.len().min(available);
        for (i, slot) in out[..count].iter_mut().enumerate() {
            *slot = buffer[(read + i) & self.mask];
        }
        self.read_pos.store(read + count, Ordering::Release);
        count
    }

    /// Samples currently buffered.
    pub fn available_read(&self) -> usize {
        self.write_pos
            .load(Ordering::Acquire)
            .wrapping_sub(self.read_pos.load(Ordering::Acquire))
    }

    /// Samples that can be written without blocking.
    pub fn available_write(&self) -> usize {
        self.capacity - 1 - self.available_read()
    }

    /// Fill level from 0.0 (empty) to 1.0 (full).
    pub fn fill_percentage(&self) -> f32 {
        self.available_read() as f32 / (self.capacity - 1) as f32
    }

    /// Drop all buffered samples.
    pub fn flush(&self) {
        let _guard = self.buffer.lock();
        let write = self.write_pos.load(Ordering::Acquire);
        self.read_pos.store(write, Ordering::Release);
    }

    /// Total capacity in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
