//! # Datagram Source Module
//!
//! Produces the raw byte buffers the pipeline consumes.
//!
//! This module handles:
//! - The [`DatagramSource`] trait seam the pipeline reads through
//! - The UDP socket implementation

use async_trait::async_trait;
use bytes::Bytes;
use std::io;

pub mod udp;

pub use udp::UdpDatagramSource;

/// Trait for producers of raw telemetry datagrams
///
/// Implementations yield one owned buffer per network datagram, in receive
/// order. UDP gives no ordering or delivery guarantee across datagrams; the
/// source passes buffers through without correcting for that.
#[async_trait]
pub trait DatagramSource: Send {
    /// Wait for and return the next datagram payload
    ///
    /// # Returns
    ///
    /// * `Ok(Some(bytes))` - The next received payload
    /// * `Ok(None)` - The source is exhausted and will never yield again
    ///   (in-memory sources only; a bound UDP socket never returns this)
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying transport fails unrecoverably.
    async fn next_datagram(&mut self) -> io::Result<Option<Bytes>>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory datagram source for pipeline tests
    pub struct MockSource {
        queue: VecDeque<Bytes>,
        /// When true, an empty queue parks forever instead of reporting
        /// exhaustion, mimicking an idle UDP socket
        block_when_empty: bool,
    }

    impl MockSource {
        /// Source that yields the given datagrams and then reports exhaustion
        pub fn new(datagrams: Vec<Bytes>) -> Self {
            Self {
                queue: datagrams.into(),
                block_when_empty: false,
            }
        }

        /// Source that yields the given datagrams and then blocks forever
        pub fn blocking_after(datagrams: Vec<Bytes>) -> Self {
            Self {
                queue: datagrams.into(),
                block_when_empty: true,
            }
        }
    }

    #[async_trait]
    impl DatagramSource for MockSource {
        async fn next_datagram(&mut self) -> io::Result<Option<Bytes>> {
            match self.queue.pop_front() {
                Some(datagram) => Ok(Some(datagram)),
                None if self.block_when_empty => std::future::pending().await,
                None => Ok(None),
            }
        }
    }
}
