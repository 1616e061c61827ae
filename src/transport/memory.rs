//! In-process transport for simulating switches.
//!
//! [`MemoryTransport::pair`] returns the client half and a [`MemoryPeer`]
//! that sees every request and can inject answers. Like a quiet UDP socket,
//! the client half never reports an error when nobody answers; it simply
//! waits.

use bytes::BytesMut;
use std::io;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::config::REQUEST_PORT;
use crate::core::codec::SwitchCodec;
use crate::core::packet::Packet;
use crate::error::{constants, ProtocolError, Result};
use crate::transport::Transport;

/// Client half of an in-memory link.
#[derive(Debug)]
pub struct MemoryTransport {
    outbound: mpsc::UnboundedSender<(SocketAddr, BytesMut)>,
    inbound: mpsc::UnboundedReceiver<BytesMut>,
}

/// Simulated switch side of an in-memory link.
#[derive(Debug)]
pub struct MemoryPeer {
    requests: mpsc::UnboundedReceiver<(SocketAddr, BytesMut)>,
    replies: mpsc::UnboundedSender<BytesMut>,
    codec: SwitchCodec,
}

impl MemoryTransport {
    pub fn pair() -> (MemoryTransport, MemoryPeer) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        (
            MemoryTransport {
                outbound: request_tx,
                inbound: reply_rx,
            },
            MemoryPeer {
                requests: request_rx,
                replies: reply_tx,
                codec: SwitchCodec::new(),
            },
        )
    }
}

impl Transport for MemoryTransport {
    async fn send_to(&mut self, datagram: &[u8], target: SocketAddr) -> io::Result<()> {
        // A vanished peer is a lost datagram, not an error.
        if self
            .outbound
            .send((target, BytesMut::from(datagram)))
            .is_err()
        {
            trace!(%target, "Peer gone, datagram dropped");
        }
        Ok(())
    }

    async fn recv(&mut self) -> io::Result<BytesMut> {
        match self.inbound.recv().await {
            Some(datagram) => Ok(datagram),
            None => std::future::pending().await,
        }
    }

    fn request_port(&self) -> u16 {
        REQUEST_PORT
    }
}

impl MemoryPeer {
    /// Next request the client sent, deciphered and parsed.
    ///
    /// Returns `None` once the client half is dropped.
    pub async fn next_request(&mut self) -> Option<(SocketAddr, Packet)> {
        loop {
            let (target, mut datagram) = self.requests.recv().await?;
            match self.codec.decode(&mut datagram) {
                Ok(Some(packet)) => return Some((target, packet)),
                Ok(None) => trace!(%target, "Ignoring empty request"),
                Err(e) => trace!(error = %e, "Ignoring undecodable request"),
            }
        }
    }

    /// Cipher and deliver `packet` to the client.
    pub fn reply(&self, packet: &Packet) -> Result<()> {
        let datagram = self.codec.seal(packet)?;
        self.reply_raw(&datagram)
    }

    /// Deliver raw bytes to the client, bypassing the cipher.
    pub fn reply_raw(&self, datagram: &[u8]) -> Result<()> {
        self.replies
            .send(BytesMut::from(datagram))
            .map_err(|_| ProtocolError::TransportError(constants::ERR_PEER_GONE.to_string()))
    }
}
