//! Fixed-capacity byte buffer that keeps the most recent output.
//!
//! Command output can be arbitrarily large; only the tail is worth keeping
//! for parsing and diagnostics. Once full, the oldest bytes are evicted.

use std::collections::VecDeque;
use std::io;

/// Bounded FIFO of bytes.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buf: VecDeque<u8>,
    capacity: usize,
    total_written: u64,
}

impl RingBuffer {
    /// Create an empty buffer holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
        }
    }

    /// Append bytes, evicting from the front when over capacity.
    pub fn push(&mut self, data: &[u8]) {
        self.total_written += data.len() as u64;

        if self.capacity == 0 {
            return;
        }

        // Only the last `capacity` bytes of `data` can survive
        let data = &data[data.len().saturating_sub(self.capacity)..];
        let overflow = (self.buf.len() + data.len()).saturating_sub(self.capacity);
        self.buf.drain(..overflow);
        self.buf.extend(data);
    }

    /// Bytes currently held, oldest first.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.buf.iter().copied().collect()
    }

    /// Contents as (lossy) UTF-8 text.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.as_bytes()).into_owned()
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Maximum number of bytes held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total bytes ever written, including evicted ones.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Whether any bytes were evicted.
    pub fn is_truncated(&self) -> bool {
        self.total_written > self.buf.len() as u64
    }
}

impl io::Write for RingBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.push(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
