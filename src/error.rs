//! # Error Types
//!
//! Error handling for the switch protocol client.
//!
//! Only genuine faults are errors here. The protocol's "soft" outcomes are
//! returned as data instead:
//! - a request that gets no correlated answer before its deadline is `Ok(None)`
//! - a reply carrying a non-zero device error code is an [`ErrorCode`](crate::protocol::status::ErrorCode)
//! - a TLV whose length does not fit its declared type renders as `"malformed"`
//!
//! ## Error Categories
//! - **I/O Errors**: socket bind / send / receive failures
//! - **Wire Errors**: short headers, values or packets too large for their length fields
//! - **Input Errors**: bad cipher keys, unparsable MAC addresses
//! - **Configuration Errors**: invalid or unreadable configuration
//!
//! ## Example Usage
//! ```rust
//! use smartswitch_protocol::core::packet::Packet;
//! use smartswitch_protocol::error::ProtocolError;
//! use tracing::{debug, error};
//!
//! match Packet::try_from_bytes(&[0x01, 0x02]) {
//!     Ok(packet) => debug!(seq = packet.sequence_number, "parsed"),
//!     Err(ProtocolError::InvalidHeader(len)) => debug!(len, "datagram too short"),
//!     Err(e) => error!(error = %e, "unexpected failure"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Static error strings shared by several call sites.
pub mod constants {
    /// Socket setup
    pub const ERR_BIND_SENDER: &str = "Failed to bind sender socket";
    pub const ERR_BIND_RECEIVER: &str = "Failed to bind receiver socket";
    pub const ERR_ENABLE_BROADCAST: &str = "Failed to enable broadcast on sender socket";

    /// Configuration
    pub const ERR_INVALID_BIND_ADDRESS: &str = "Invalid bind address";
    pub const ERR_INVALID_BROADCAST_ADDRESS: &str = "Invalid broadcast address";

    /// In-memory transport
    pub const ERR_PEER_GONE: &str = "Simulated peer has been dropped";
}

// ProtocolError is the primary error type for all client operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Datagram too short for packet header: {0} bytes")]
    InvalidHeader(usize),

    #[error("Packet too large for length field: {0} bytes")]
    OversizedPacket(usize),

    #[error("TLV value too large for length field: {0} bytes")]
    OversizedValue(usize),

    #[error("Cipher key must not be empty")]
    InvalidKey,

    #[error("Invalid MAC address: {0}")]
    InvalidMacAddress(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
