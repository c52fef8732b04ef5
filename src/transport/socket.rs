//! Async UDP socket wrapper for the tunnel transport.
//!
//! One socket serves exactly one peer. After [`TunnelSocket::connect`]
//! the kernel filters foreign senders, which is all the peer
//! authentication this layer attempts - real authentication is the MAC
//! on every packet.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::core::RECV_BUFFER_SIZE;

/// Async UDP socket with an owned receive buffer.
#[derive(Debug)]
pub struct TunnelSocket {
    socket: UdpSocket,
    recv_buffer: Vec<u8>,
}

impl TunnelSocket {
    /// Bind to the given local address.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket,
            recv_buffer: vec![0u8; RECV_BUFFER_SIZE],
        })
    }

    /// Fix the remote peer for `send`/`recv`.
    pub async fn connect(&self, addr: SocketAddr) -> io::Result<()> {
        self.socket.connect(addr).await
    }

    /// Get the local address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Send one datagram to the connected peer.
    pub async fn send(&self, data: &[u8]) -> io::Result<usize> {
        self.socket.send(data).await
    }

    /// Receive one datagram from the connected peer.
    pub async fn recv(&mut self) -> io::Result<&[u8]> {
        let len = self.socket.recv(&mut self.recv_buffer).await?;
        Ok(&self.recv_buffer[..len])
    }

    /// Receive one datagram and report the sender's address.
    pub async fn recv_from(&mut self) -> io::Result<(&[u8], SocketAddr)> {
        let (len, addr) = self.socket.recv_from(&mut self.recv_buffer).await?;
        Ok((&self.recv_buffer[..len], addr))
    }
}
