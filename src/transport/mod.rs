//! # Transport Layer
//!
//! Datagram transports the session engine talks through.
//!
//! ## Transports
//! - **UDP**: the real thing; a broadcast-capable sender and a receiver bound
//!   to the response port
//! - **Memory**: in-process channel pair that stands in for a switch
//!
//! Transports move opaque (already ciphered) bytes. Framing, ciphering and
//! correlation all live above this layer.

use bytes::BytesMut;
use std::future::Future;
use std::io;
use std::net::SocketAddr;

pub mod memory;
pub mod udp;

pub use memory::{MemoryPeer, MemoryTransport};
pub use udp::UdpTransport;

/// A connectionless datagram transport.
pub trait Transport {
    /// Send one datagram to `target`.
    fn send_to(
        &mut self,
        datagram: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = io::Result<()>> + Send;

    /// Wait for the next inbound datagram.
    ///
    /// Errors of kind `WouldBlock`, `Interrupted`, `ConnectionReset` and
    /// `ConnectionRefused` are treated as transient by the session.
    fn recv(&mut self) -> impl Future<Output = io::Result<BytesMut>> + Send;

    /// Port requests are addressed to.
    fn request_port(&self) -> u16;
}

/// Whether a receive error should be retried rather than propagated.
pub fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock
            | io::ErrorKind::Interrupted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
    )
}
