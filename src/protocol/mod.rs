//! # Protocol Layer
//!
//! Request/response logic on top of the wire layer.
//!
//! ## Components
//! - **Forge**: builders for every supported request
//! - **Status**: device error-code table
//! - **Discovery**: discovery answers and the discovered-unit set
//! - **Monitor**: typed views of port statistics and cable diagnostics
//! - **Session**: send, correlate by sequence number, time out
//!
//! ## Flow
//! ```text
//! discover -> get_token -> login -> get_port_statistics | cable_test | get_qos
//! ```

pub mod discovery;
pub mod forge;
pub mod monitor;
pub mod session;
pub mod status;
