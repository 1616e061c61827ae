//! # Utility Modules
//!
//! Supporting utilities for the cipher, logging, metrics and deadlines.
//!
//! ## Components
//! - **Crypto**: keyed RC4-style datagram obfuscation
//! - **Logging**: tracing-subscriber setup from configuration
//! - **Metrics**: per-session counters
//! - **Timeout**: default deadlines and deadline helpers

pub mod crypto;
pub mod logging;
pub mod metrics;
pub mod timeout;

pub use crypto::{Crypto, SWITCH_KEY};
pub use metrics::{Metrics, MetricsSnapshot};
