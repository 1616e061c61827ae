//! # Core Wire Components
//!
//! Byte-level representation of the switch protocol.
//!
//! ## Components
//! - **Registry**: fixed tag → (name, semantic type) table
//! - **TLV**: tag-length-value records and their human-readable rendering
//! - **Packet**: 32-byte header plus TLV stream
//! - **Codec**: `tokio_util` codec that ciphers whole datagrams
//!
//! ## Wire Format
//! ```text
//! cipher( [Header(32)] [Tag(2) Length(2) Value(Length)]* )
//! ```
//!
//! Parsing is tolerant: trailing bytes that do not form a complete record are
//! ignored, and the vestigial checksum is never validated.

pub mod codec;
pub mod packet;
pub mod registry;
pub mod tlv;
