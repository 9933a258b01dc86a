//! # UDP Datagram Source
//!
//! Binds a local UDP socket and yields one buffer per received datagram.

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use super::DatagramSource;

/// Maximum UDP payload size (64 KiB covers the theoretical limit)
pub const MAX_DATAGRAM_SIZE: usize = 65_535;

/// UDP-socket-backed datagram source
///
/// Receives on all interfaces at the configured port. Each received
/// datagram is copied into an owned buffer; the receive buffer is sized so
/// no conforming payload is ever truncated.
pub struct UdpDatagramSource {
    socket: UdpSocket,
    recv_buf: Vec<u8>,
    local_addr: SocketAddr,
}

impl UdpDatagramSource {
    /// Bind the source to a local UDP port
    ///
    /// # Arguments
    ///
    /// * `port` - Local port to listen on (0 picks an ephemeral port)
    ///
    /// # Returns
    ///
    /// * `io::Result<UdpDatagramSource>` - Bound source or bind error
    ///
    /// # Errors
    ///
    /// Returns an error if the port is already in use or cannot be bound.
    pub async fn bind(port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port)).await?;
        let local_addr = socket.local_addr()?;
        info!("Listening for telemetry datagrams on {}", local_addr);

        Ok(Self {
            socket,
            recv_buf: vec![0u8; MAX_DATAGRAM_SIZE],
            local_addr,
        })
    }

    /// The address the socket is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl DatagramSource for UdpDatagramSource {
    async fn next_datagram(&mut self) -> io::Result<Option<Bytes>> {
        let (len, peer) = self.socket.recv_from(&mut self.recv_buf).await?;
        debug!("Received {} byte datagram from {}", len, peer);
        Ok(Some(Bytes::copy_from_slice(&self.recv_buf[..len])))
    }
}
