//! The tunnel I/O loop.
//!
//! A [`Relay`] multiplexes two readiness sources - the local raw-packet
//! source and the transport socket - and processes exactly one event
//! per iteration. The [`TunnelSession`] is owned by the loop, so the
//! sequence counters need no locks. Per-packet failures are logged and
//! dropped; only a stop signal or the local source going away ends the
//! loop.
//!
//! There is no handshake and no connection state machine. The protocol
//! is stateless per packet apart from the two monotonic counters.

use std::future::Future;
use std::io;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::core::{TunnelConfig, TunnelError};
use crate::crypto::TunnelSession;
use crate::transport::TunnelSocket;

/// The local raw-packet source/sink the relay multiplexes against.
///
/// Implemented by the Linux TUN device and by in-memory doubles in
/// tests. `recv_packet` must be cancel-safe: the relay drops a pending
/// read whenever the other readiness source wins the race.
pub trait PacketIo {
    /// Read one raw IP packet (blocking until one arrives).
    fn recv_packet(&mut self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Inject one raw IP packet for local delivery.
    fn send_packet(&mut self, packet: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}

/// Counters reported when the relay exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    /// Datagrams encrypted and handed to the transport.
    pub sent: u64,
    /// Datagrams decrypted and delivered to the local sink.
    pub received: u64,
    /// Inbound datagrams dropped (malformed, forged, or replayed).
    pub dropped: u64,
    /// Transport send/receive errors survived.
    pub io_errors: u64,
}

/// One event observed by the multiplexed wait.
enum Event {
    /// Raw packet from the local source, bound outward.
    Outbound(io::Result<Vec<u8>>),
    /// Datagram from the transport, bound inward.
    Inbound(io::Result<Vec<u8>>),
    /// External stop signal.
    Stop,
}

/// The single-task relay tying a local packet source to the encrypted
/// transport.
pub struct Relay<P: PacketIo> {
    session: TunnelSession,
    socket: TunnelSocket,
    packets: P,
    stats: RelayStats,
}

impl<P: PacketIo> Relay<P> {
    /// Assemble a relay from its three collaborators.
    pub fn new(session: TunnelSession, socket: TunnelSocket, packets: P) -> Self {
        Self {
            session,
            socket,
            packets,
            stats: RelayStats::default(),
        }
    }

    /// Bind and connect the transport socket, derive the session, and
    /// assemble the relay.
    pub async fn from_config(config: &TunnelConfig, packets: P) -> Result<Self, TunnelError> {
        let session = TunnelSession::from_config(config)?;
        let socket = TunnelSocket::bind(config.local_addr).await?;
        socket.connect(config.remote_addr).await?;
        info!(
            local = %config.local_addr,
            remote = %config.remote_addr,
            "tunnel transport ready"
        );
        Ok(Self::new(session, socket, packets))
    }

    /// Run until the stop signal fires or the local source closes.
    ///
    /// Each iteration waits on whichever source becomes ready first and
    /// runs that one packet to completion. Cryptographic and transport
    /// errors are terminal for the packet that caused them, never for
    /// the loop.
    pub async fn run(mut self, mut stop: oneshot::Receiver<()>) -> Result<RelayStats, TunnelError> {
        loop {
            let event = tokio::select! {
                _ = &mut stop => Event::Stop,
                packet = self.packets.recv_packet() => Event::Outbound(packet),
                datagram = self.socket.recv() => {
                    Event::Inbound(datagram.map(<[u8]>::to_vec))
                }
            };

            match event {
                Event::Stop => {
                    info!(stats = ?self.stats, "relay stopped");
                    return Ok(self.stats);
                }
                Event::Outbound(Ok(packet)) => self.handle_outbound(&packet).await,
                Event::Outbound(Err(e)) => {
                    warn!(error = %e, "local packet source closed, stopping relay");
                    return Ok(self.stats);
                }
                Event::Inbound(Ok(datagram)) => self.handle_inbound(&datagram).await,
                Event::Inbound(Err(e)) => {
                    self.stats.io_errors += 1;
                    warn!(error = %e, "transport receive failed");
                }
            }
        }
    }

    /// Local raw packet: encrypt and send to the peer.
    async fn handle_outbound(&mut self, packet: &[u8]) {
        let wire = match self.session.encrypt_outbound(packet) {
            Ok(wire) => wire,
            Err(e) => {
                self.stats.dropped += 1;
                warn!(error = %e, "outbound encode failed");
                return;
            }
        };

        // The sequence number is already spent; a failed send here
        // loses the packet but never reuses its number.
        match self.socket.send(&wire).await {
            Ok(_) => {
                self.stats.sent += 1;
                debug!(seq = self.session.send_seq(), len = packet.len(), "sent");
            }
            Err(e) => {
                self.stats.io_errors += 1;
                warn!(error = %e, "transport send failed");
            }
        }
    }

    /// Transport datagram: decrypt and deliver to the local sink.
    async fn handle_inbound(&mut self, datagram: &[u8]) {
        let packet = match self.session.decrypt_inbound(datagram) {
            Ok(packet) => packet,
            Err(e) => {
                self.stats.dropped += 1;
                debug!(error = %e, len = datagram.len(), "inbound datagram dropped");
                return;
            }
        };

        match self.packets.send_packet(&packet).await {
            Ok(()) => {
                self.stats.received += 1;
                debug!(seq = self.session.recv_seq(), len = packet.len(), "delivered");
            }
            Err(e) => {
                self.stats.io_errors += 1;
                warn!(error = %e, "local packet sink write failed");
            }
        }
    }
}
