//! # Persistence Sink Module
//!
//! Accepts constructed points and writes them to the time-series storage
//! backend.
//!
//! This module handles:
//! - The [`PersistenceSink`] trait seam the pipeline writes through
//! - Line-protocol rendering of points
//! - Size/interval batching of outbound writes
//! - Bounded retry with backoff against the InfluxDB HTTP API

use async_trait::async_trait;
use thiserror::Error;

pub mod buffer;
pub mod influx;
pub mod point;

pub use influx::InfluxSink;
pub use point::Point;

/// Unrecoverable sink failures
///
/// Transient conditions (connection refused, HTTP 5xx) are retried inside
/// the sink and never surface here; every variant of this error stops the
/// pipeline.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The backend actively rejected the write (HTTP 4xx); retrying the
    /// same payload would fail identically
    #[error("write rejected by storage backend (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Retries against a transient failure were exhausted
    #[error("storage backend unreachable after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

/// Trait for time-series storage sinks
///
/// Implementations own batching, retry, and connection management. A
/// returned [`SinkError`] is by contract unrecoverable and the caller must
/// stop submitting points.
#[async_trait]
pub trait PersistenceSink: Send {
    /// Accept one point for persistence
    ///
    /// May buffer internally; when buffering triggers an actual write, this
    /// call awaits its completion, which is what propagates storage
    /// backpressure upstream to the datagram source.
    async fn write_point(&mut self, point: Point) -> Result<(), SinkError>;

    /// Write out any buffered points immediately
    async fn flush(&mut self) -> Result<(), SinkError>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;

    /// In-memory sink for pipeline tests
    ///
    /// Records every accepted point in order and can be armed to fail with
    /// an unrecoverable error after a set number of writes.
    pub struct MockSink {
        pub written: Vec<Point>,
        pub flush_count: usize,
        pub fail_after: Option<usize>,
    }

    impl MockSink {
        pub fn new() -> Self {
            Self {
                written: Vec::new(),
                flush_count: 0,
                fail_after: None,
            }
        }

        /// Fail with an unrecoverable error once `count` points were accepted
        pub fn fail_after(count: usize) -> Self {
            Self {
                written: Vec::new(),
                flush_count: 0,
                fail_after: Some(count),
            }
        }
    }

    #[async_trait]
    impl PersistenceSink for MockSink {
        async fn write_point(&mut self, point: Point) -> Result<(), SinkError> {
            if let Some(limit) = self.fail_after {
                if self.written.len() >= limit {
                    return Err(SinkError::Rejected {
                        status: 400,
                        body: "mock rejection".to_string(),
                    });
                }
            }
            self.written.push(point);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), SinkError> {
            self.flush_count += 1;
            Ok(())
        }
    }
}
