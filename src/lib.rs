//! # smartswitch-protocol
//!
//! Client core for the UDP protocol spoken by small managed switches:
//! discovery, session tokens, login, port statistics, cable diagnostics and
//! QoS queries.
//!
//! ## Layers
//! - [`utils::crypto`]: the keyed RC4-style cipher applied to every datagram
//! - [`core`]: tag registry, TLV records, the 32-byte packet header and a
//!   `tokio_util` codec tying them together
//! - [`transport`]: UDP sockets, or an in-memory pair for simulation
//! - [`protocol`]: request builders and the [`Session`] engine
//!
//! Timeouts are not errors: operations return `Ok(None)` when no answer
//! arrives in time, and device error codes come back as data.

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::config::NetworkConfig;
pub use crate::core::codec::SwitchCodec;
pub use crate::core::packet::{MacAddress, Opcode, Packet};
pub use crate::core::tlv::{Tlv, TlvValue};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::discovery::DiscoveredUnit;
pub use crate::protocol::session::Session;
pub use crate::protocol::status::ErrorCode;
pub use crate::transport::Transport;
