//! # Point Batching Buffer
//!
//! Accumulates rendered line-protocol lines between HTTP writes.
//!
//! A batch is due either when the buffer reaches its size limit or when the
//! configured interval has elapsed since the last flush, so a trickle of
//! datagrams still reaches storage promptly.
//!
//! The interval is only checked on `push`; the buffer carries no timer of
//! its own. When traffic stops entirely the owner must call `take` (via the
//! sink's `flush`) on its own cadence, which the pipeline does.

use std::time::{Duration, Instant};

/// Size- and time-bounded buffer of line-protocol lines
pub struct PointBuffer {
    lines: Vec<String>,
    max_size: usize,
    flush_interval: Duration,
    last_flush: Instant,
}

impl PointBuffer {
    /// Create a new buffer
    ///
    /// # Arguments
    ///
    /// * `max_size` - Maximum number of lines before a batch is due
    /// * `flush_interval` - Maximum time between batches
    pub fn new(max_size: usize, flush_interval: Duration) -> Self {
        Self {
            lines: Vec::with_capacity(max_size),
            max_size,
            flush_interval,
            last_flush: Instant::now(),
        }
    }

    /// Add a line to the buffer
    ///
    /// # Returns
    ///
    /// * `Option<Vec<String>>` - The accumulated batch if this addition made
    ///   a flush due (size limit reached or interval elapsed), `None` otherwise
    pub fn push(&mut self, line: String) -> Option<Vec<String>> {
        self.lines.push(line);
        if self.lines.len() >= self.max_size || self.last_flush.elapsed() >= self.flush_interval {
            Some(self.take())
        } else {
            None
        }
    }

    /// Drain the buffer, returning all accumulated lines and resetting the
    /// flush timer. Returns an empty vec when nothing is buffered.
    pub fn take(&mut self) -> Vec<String> {
        self.last_flush = Instant::now();
        std::mem::take(&mut self.lines)
    }

    /// Current number of buffered lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the buffer holds no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
