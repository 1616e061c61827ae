//! # TLV Records
//!
//! Tag-length-value records carried in every packet body.
//!
//! ## Wire Format
//! ```text
//! [Tag(2, BE)] [Length(2, BE)] [Value(Length)] ... repeated
//! ```
//!
//! Values are encoded from a closed set of shapes ([`TlvValue`]) and decoded
//! for display according to the [registry](crate::core::registry) type of the
//! tag. Framing never depends on the registry.

use bytes::{BufMut, BytesMut};
use std::net::Ipv4Addr;
use tracing::trace;

use crate::core::registry::{self, tags, TagKind};
use crate::error::{ProtocolError, Result};

/// Size of the tag + length prefix of a record.
pub const TLV_HEADER_SIZE: usize = 4;

/// Rendering of a zero-length value, whatever its type.
pub const UNSET: &str = "unset";

/// Rendering of a value whose length does not fit its type.
pub const MALFORMED: &str = "malformed";

/// Rendering of a [`TagKind::Null`] value.
pub const NULL: &str = "-";

/// Value shapes accepted by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlvValue {
    /// Zero-length value
    Empty,
    /// Bytes used verbatim
    Raw(Vec<u8>),
    /// UTF-8 text followed by a NUL terminator
    Text(String),
    /// `0x01` or `0x00`
    Flag(bool),
}

impl TlvValue {
    /// Wire bytes for this value.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            TlvValue::Empty => Vec::new(),
            TlvValue::Raw(bytes) => bytes.clone(),
            TlvValue::Text(text) => {
                let mut out = Vec::with_capacity(text.len() + 1);
                out.extend_from_slice(text.as_bytes());
                out.push(0x00);
                out
            }
            TlvValue::Flag(flag) => vec![u8::from(*flag)],
        }
    }
}

impl From<&str> for TlvValue {
    fn from(text: &str) -> Self {
        TlvValue::Text(text.to_owned())
    }
}

impl From<String> for TlvValue {
    fn from(text: String) -> Self {
        TlvValue::Text(text)
    }
}

impl From<bool> for TlvValue {
    fn from(flag: bool) -> Self {
        TlvValue::Flag(flag)
    }
}

impl From<Vec<u8>> for TlvValue {
    fn from(bytes: Vec<u8>) -> Self {
        TlvValue::Raw(bytes)
    }
}

impl From<&[u8]> for TlvValue {
    fn from(bytes: &[u8]) -> Self {
        TlvValue::Raw(bytes.to_vec())
    }
}

/// A single TLV record. The length is always the length of `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: u16,
    value: Vec<u8>,
}

impl Tlv {
    /// Encode `value` under `tag`.
    ///
    /// Fails only when the encoded value does not fit the 16-bit length field.
    pub fn new(tag: u16, value: impl Into<TlvValue>) -> Result<Self> {
        Self::from_raw(tag, value.into().encode())
    }

    /// Zero-length record, as used for "get" requests and markers.
    pub fn empty(tag: u16) -> Self {
        Self {
            tag,
            value: Vec::new(),
        }
    }

    /// End-of-transmission sentinel.
    pub fn eot() -> Self {
        Self::empty(tags::EOT)
    }

    /// Record from already-encoded bytes.
    pub fn from_raw(tag: u16, value: Vec<u8>) -> Result<Self> {
        if value.len() > u16::MAX as usize {
            return Err(ProtocolError::OversizedValue(value.len()));
        }
        Ok(Self { tag, value })
    }

    #[inline]
    pub fn tag(&self) -> u16 {
        self.tag
    }

    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Declared length, equal to `value().len()`.
    #[inline]
    pub fn length(&self) -> u16 {
        self.value.len() as u16
    }

    /// Bytes this record occupies on the wire.
    #[inline]
    pub fn wire_len(&self) -> usize {
        TLV_HEADER_SIZE + self.value.len()
    }

    /// Registry name of the tag, `"?"` when unknown.
    pub fn name(&self) -> &'static str {
        registry::tag_name(self.tag)
    }

    /// Registry type of the tag, [`TagKind::Binary`] when unknown.
    pub fn kind(&self) -> TagKind {
        registry::tag_kind(self.tag)
    }

    /// Human-readable value, dispatched on the registry type of the tag.
    pub fn render(&self) -> String {
        render_value(self.kind(), &self.value)
    }

    /// Interpret the value as an IPv4 address.
    pub fn as_ipv4(&self) -> Option<Ipv4Addr> {
        <[u8; 4]>::try_from(self.value.as_slice())
            .ok()
            .map(Ipv4Addr::from)
    }

    /// Append this record to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_len());
        dst.put_u16(self.tag);
        dst.put_u16(self.length());
        dst.put_slice(&self.value);
    }
}

/// Render raw value bytes for a given semantic type.
pub fn render_value(kind: TagKind, value: &[u8]) -> String {
    if value.is_empty() {
        return UNSET.to_string();
    }

    match kind {
        TagKind::Ip => match <[u8; 4]>::try_from(value) {
            Ok(octets) => Ipv4Addr::from(octets).to_string(),
            Err(_) => MALFORMED.to_string(),
        },
        TagKind::Mac => match value {
            [a, b, c, d, e, f] => format!("{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{f:02X}"),
            _ => MALFORMED.to_string(),
        },
        // Last byte is the NUL terminator.
        TagKind::String => String::from_utf8_lossy(&value[..value.len() - 1]).into_owned(),
        TagKind::Boolean => match value {
            [flag] => (*flag == 1).to_string(),
            _ => MALFORMED.to_string(),
        },
        TagKind::Byte => match value {
            [byte] => byte.to_string(),
            _ => MALFORMED.to_string(),
        },
        TagKind::Binary => hex_upper(value),
        TagKind::Null => NULL.to_string(),
    }
}

fn hex_upper(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02X}");
    }
    out
}

/// Iterator over the records of a TLV stream.
///
/// Stops when fewer than four bytes remain. A trailing record whose declared
/// length overruns the buffer is dropped.
#[derive(Debug, Clone)]
pub struct TlvIter<'a> {
    rest: &'a [u8],
}

impl<'a> TlvIter<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self { rest: body }
    }
}

impl Iterator for TlvIter<'_> {
    type Item = Tlv;

    fn next(&mut self) -> Option<Tlv> {
        if self.rest.len() < TLV_HEADER_SIZE {
            return None;
        }

        let tag = u16::from_be_bytes([self.rest[0], self.rest[1]]);
        let length = u16::from_be_bytes([self.rest[2], self.rest[3]]) as usize;
        let end = TLV_HEADER_SIZE + length;

        if end > self.rest.len() {
            trace!(
                tag,
                length,
                remaining = self.rest.len() - TLV_HEADER_SIZE,
                "Dropping truncated trailing TLV"
            );
            self.rest = &[];
            return None;
        }

        let value = self.rest[TLV_HEADER_SIZE..end].to_vec();
        self.rest = &self.rest[end..];
        Some(Tlv { tag, value })
    }
}

/// Parse every complete record in `body`.
pub fn parse_tlvs(body: &[u8]) -> Vec<Tlv> {
    TlvIter::new(body).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tlv(tag: u16, value: &[u8]) -> Tlv {
        Tlv::from_raw(tag, value.to_vec()).unwrap()
    }

    #[test]
    fn test_value_encoding() {
        assert!(TlvValue::Empty.encode().is_empty());
        assert_eq!(TlvValue::from(vec![1, 2, 3]).encode(), vec![1, 2, 3]);
        assert_eq!(TlvValue::from("admin").encode(), b"admin\0".to_vec());
        assert_eq!(TlvValue::from(true).encode(), vec![0x01]);
        assert_eq!(TlvValue::from(false).encode(), vec![0x00]);
    }

    #[test]
    fn test_length_tracks_value() {
        let record = Tlv::new(tags::SYSUSER_OLD_NAME, "admin").unwrap();
        assert_eq!(record.length(), 6);
        assert_eq!(record.wire_len(), 10);
    }

    #[test]
    fn test_oversized_value_rejected() {
        let result = Tlv::new(1, vec![0u8; 70_000]);
        assert!(matches!(result, Err(ProtocolError::OversizedValue(70_000))));
    }

    #[test]
    fn test_render_ip() {
        assert_eq!(tlv(tags::SYSINFO_IP, &[192, 168, 1, 1]).render(), "192.168.1.1");
        assert_eq!(tlv(tags::SYSINFO_IP, &[192, 168, 1]).render(), "malformed");
        assert_eq!(tlv(tags::SYSINFO_IP, &[]).render(), "unset");
    }

    #[test]
    fn test_render_mac() {
        let record = tlv(tags::SYSINFO_MAC, &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(record.render(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(tlv(tags::SYSINFO_MAC, &[0xAA]).render(), "malformed");
    }

    #[test]
    fn test_render_string() {
        assert_eq!(tlv(tags::SYSINFO_DESCRIPTION, b"core-sw\0").render(), "core-sw");
        assert_eq!(tlv(tags::SYSINFO_DESCRIPTION, b"\0").render(), "");
        assert_eq!(tlv(tags::SYSINFO_DESCRIPTION, b"").render(), "unset");
    }

    #[test]
    fn test_render_boolean_and_byte() {
        assert_eq!(tlv(tags::SYSINFO_DHCP_STATE, &[1]).render(), "true");
        assert_eq!(tlv(tags::SYSINFO_DHCP_STATE, &[2]).render(), "false");
        assert_eq!(tlv(tags::SYSINFO_DHCP_STATE, &[1, 1]).render(), "malformed");
        assert_eq!(tlv(tags::SYSINFO_PORT_SUPPORT, &[8]).render(), "8");
        assert_eq!(tlv(tags::SYSINFO_PORT_SUPPORT, &[8, 0]).render(), "malformed");
    }

    #[test]
    fn test_render_binary_and_null() {
        assert_eq!(tlv(tags::MONITOR_CABLE_TEST, &[0x01, 0xAB, 0x0F]).render(), "01AB0F");
        assert_eq!(tlv(0x7777, &[0xDE, 0xAD]).render(), "DEAD");
        assert_eq!(tlv(tags::SYS_GET_TOKEN, &[0x01]).render(), "-");
        assert_eq!(tlv(tags::EOT, &[]).render(), "unset");
    }

    #[test]
    fn test_stream_roundtrip() {
        let records = vec![
            Tlv::new(tags::SYSUSER_OLD_NAME, "admin").unwrap(),
            Tlv::empty(tags::SYS_GET_TOKEN),
            Tlv::eot(),
        ];
        let mut buf = BytesMut::new();
        for record in &records {
            record.encode_into(&mut buf);
        }
        assert_eq!(&buf[..4], &[0x02, 0x00, 0x00, 0x06]);
        assert_eq!(parse_tlvs(&buf), records);
    }

    #[test]
    fn test_truncated_trailing_record_dropped() {
        let mut buf = BytesMut::new();
        tlv(tags::SYSINFO_IP, &[10, 0, 0, 1]).encode_into(&mut buf);
        // Declares 8 bytes, carries 2.
        buf.put_slice(&[0x00, 0x02, 0x00, 0x08, b'a', b'b']);

        let parsed = parse_tlvs(&buf);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].render(), "10.0.0.1");
    }

    #[test]
    fn test_short_tail_ignored() {
        let parsed = parse_tlvs(&[0xFF, 0xFF, 0x00, 0x00, 0x01, 0x02, 0x03]);
        assert_eq!(parsed, vec![Tlv::eot()]);
    }
}
