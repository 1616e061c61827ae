//! UDP transport over two tokio sockets.
//!
//! Switches answer to the response port on the broadcast address, not to the
//! request's source port, so replies are read from a second socket bound to
//! that port.

use bytes::BytesMut;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, trace};

use crate::config::TransportConfig;
use crate::error::{constants, ProtocolError, Result};
use crate::transport::Transport;

#[derive(Debug)]
pub struct UdpTransport {
    sender: UdpSocket,
    receiver: UdpSocket,
    request_port: u16,
    max_datagram_size: usize,
}

impl UdpTransport {
    /// Bind both sockets as described by `config`.
    #[instrument(skip(config), fields(bind = %config.bind_address, response_port = config.response_port))]
    pub async fn bind(config: &TransportConfig) -> Result<Self> {
        let ip = config.bind_ip()?;

        let sender = UdpSocket::bind(SocketAddr::new(ip, 0)).await.map_err(|e| {
            ProtocolError::TransportError(format!("{}: {e}", constants::ERR_BIND_SENDER))
        })?;
        sender.set_broadcast(true).map_err(|e| {
            ProtocolError::TransportError(format!("{}: {e}", constants::ERR_ENABLE_BROADCAST))
        })?;

        let receiver = UdpSocket::bind(SocketAddr::new(ip, config.response_port))
            .await
            .map_err(|e| {
                ProtocolError::TransportError(format!(
                    "{} on port {}: {e}",
                    constants::ERR_BIND_RECEIVER,
                    config.response_port
                ))
            })?;

        debug!(
            sender = ?sender.local_addr().ok(),
            receiver = ?receiver.local_addr().ok(),
            "UDP transport bound"
        );

        Ok(Self {
            sender,
            receiver,
            request_port: config.request_port,
            max_datagram_size: config.max_datagram_size,
        })
    }

    /// Address replies must be sent to.
    pub fn receiver_addr(&self) -> io::Result<SocketAddr> {
        self.receiver.local_addr()
    }

    /// Address requests leave from.
    pub fn sender_addr(&self) -> io::Result<SocketAddr> {
        self.sender.local_addr()
    }
}

impl Transport for UdpTransport {
    async fn send_to(&mut self, datagram: &[u8], target: SocketAddr) -> io::Result<()> {
        let sent = self.sender.send_to(datagram, target).await?;
        trace!(%target, sent, "Datagram sent");
        Ok(())
    }

    async fn recv(&mut self) -> io::Result<BytesMut> {
        let mut buf = BytesMut::zeroed(self.max_datagram_size);
        let (len, peer) = self.receiver.recv_from(&mut buf).await?;
        buf.truncate(len);
        trace!(%peer, len, "Datagram received");
        Ok(buf)
    }

    fn request_port(&self) -> u16 {
        self.request_port
    }
}
