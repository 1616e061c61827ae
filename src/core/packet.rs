//! # Packet
//!
//! One protocol message: a fixed 32-byte header followed by a TLV stream.
//!
//! ## Header Layout (big-endian)
//! ```text
//! offset  size  field
//!      0     1  version
//!      1     1  opcode
//!      2     6  switch MAC
//!      8     6  host MAC
//!     14     2  sequence number
//!     16     4  error code (signed)
//!     20     2  length (header + body)
//!     22     2  fragment
//!     24     2  flags
//!     26     2  token
//!     28     4  checksum (always zero, never checked)
//! ```

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::config::PROTOCOL_VERSION;
use crate::core::tlv::{Tlv, TlvIter};
use crate::error::{ProtocolError, Result};
use crate::protocol::status::ErrorCode;

/// Size of the fixed packet header.
pub const HEADER_SIZE: usize = 32;

/// Offset of the length field inside the header.
const LENGTH_OFFSET: usize = 20;

/// Six-byte hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const ZERO: MacAddress = MacAddress([0; 6]);

    #[inline]
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }
}

impl TryFrom<&[u8]> for MacAddress {
    type Error = ProtocolError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        <[u8; 6]>::try_from(bytes)
            .map(MacAddress)
            .map_err(|_| ProtocolError::InvalidMacAddress(format!("{} bytes", bytes.len())))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for MacAddress {
    type Err = ProtocolError;

    /// Accepts `AA:BB:CC:DD:EE:FF` or `AA-BB-CC-DD-EE-FF`, any case.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ProtocolError::InvalidMacAddress(s.to_string());
        let mut octets = [0u8; 6];
        let mut parts = s.split([':', '-']);

        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(MacAddress(octets))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Request / response kind carried in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Opcode {
    #[default]
    Discover,
    Get,
    /// Sent by switches in answer to a discovery request
    DiscoveryReply,
    Set,
    Other(u8),
}

impl From<u8> for Opcode {
    fn from(value: u8) -> Self {
        match value {
            0 => Opcode::Discover,
            1 => Opcode::Get,
            2 => Opcode::DiscoveryReply,
            3 => Opcode::Set,
            other => Opcode::Other(other),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        match opcode {
            Opcode::Discover => 0,
            Opcode::Get => 1,
            Opcode::DiscoveryReply => 2,
            Opcode::Set => 3,
            Opcode::Other(other) => other,
        }
    }
}

/// A protocol message.
///
/// `length` mirrors the header field. The wire always carries the computed
/// length; [`Packet::finalize`] and [`Packet::serialize`] also store it on
/// the packet so that `parse(serialize(p)) == p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub version: u8,
    pub opcode: Opcode,
    pub mac_switch: MacAddress,
    pub mac_computer: MacAddress,
    pub sequence_number: u16,
    pub error_code: i32,
    pub length: u16,
    pub fragment: u16,
    pub flags: u16,
    pub token: u16,
    pub checksum: u32,
    pub tlvs: Vec<Tlv>,
}

impl Default for Packet {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            opcode: Opcode::Discover,
            mac_switch: MacAddress::ZERO,
            mac_computer: MacAddress::ZERO,
            sequence_number: 0,
            error_code: 0,
            length: HEADER_SIZE as u16,
            fragment: 0,
            flags: 0,
            token: 0,
            checksum: 0,
            tlvs: Vec::new(),
        }
    }
}

impl Packet {
    /// Total serialized size: header plus every record.
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE + self.tlvs.iter().map(Tlv::wire_len).sum::<usize>()
    }

    /// Store the serialized length in `length`, returning it.
    pub fn finalize(&mut self) -> Result<u16> {
        let total = self.wire_len();
        let length = u16::try_from(total).map_err(|_| ProtocolError::OversizedPacket(total))?;
        self.length = length;
        Ok(length)
    }

    /// Finalize the length field, then serialize to a fresh buffer.
    pub fn serialize(&mut self) -> Result<Vec<u8>> {
        self.finalize()?;
        self.to_bytes()
    }

    /// Append the serialized packet to `dst`, returning its length.
    ///
    /// The header is written first with a zero length, then patched once the
    /// body has been appended.
    pub fn encode_into(&self, dst: &mut BytesMut) -> Result<u16> {
        let total = self.wire_len();
        let length = u16::try_from(total).map_err(|_| ProtocolError::OversizedPacket(total))?;

        dst.reserve(total);
        let start = dst.len();

        dst.put_u8(self.version);
        dst.put_u8(self.opcode.into());
        dst.put_slice(&self.mac_switch.0);
        dst.put_slice(&self.mac_computer.0);
        dst.put_u16(self.sequence_number);
        dst.put_i32(self.error_code);
        dst.put_u16(0);
        dst.put_u16(self.fragment);
        dst.put_u16(self.flags);
        dst.put_u16(self.token);
        dst.put_u32(self.checksum);

        for tlv in &self.tlvs {
            tlv.encode_into(dst);
        }

        let at = start + LENGTH_OFFSET;
        dst[at..at + 2].copy_from_slice(&length.to_be_bytes());
        Ok(length)
    }

    /// Serialize to a fresh buffer, leaving `length` untouched.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        self.encode_into(&mut buf)?;
        Ok(buf.to_vec())
    }

    /// Parse a decrypted datagram, degrading to [`Packet::default`] when it is
    /// too short to hold a header.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::try_from_bytes(data).unwrap_or_default()
    }

    /// Parse a decrypted datagram, failing when it is too short to hold a
    /// header.
    pub fn try_from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(ProtocolError::InvalidHeader(data.len()));
        }

        let u16_at = |at: usize| u16::from_be_bytes([data[at], data[at + 1]]);
        let u32_at =
            |at: usize| u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
        let mac_at = |at: usize| {
            let mut octets = [0u8; 6];
            octets.copy_from_slice(&data[at..at + 6]);
            MacAddress(octets)
        };

        Ok(Self {
            version: data[0],
            opcode: Opcode::from(data[1]),
            mac_switch: mac_at(2),
            mac_computer: mac_at(8),
            sequence_number: u16_at(14),
            error_code: u32_at(16) as i32,
            length: u16_at(20),
            fragment: u16_at(22),
            flags: u16_at(24),
            token: u16_at(26),
            checksum: u32_at(28),
            tlvs: TlvIter::new(&data[HEADER_SIZE..]).collect(),
        })
    }

    /// First record carrying `tag`.
    pub fn find(&self, tag: u16) -> Option<&Tlv> {
        self.tlvs.iter().find(|tlv| tlv.tag() == tag)
    }

    /// Every record carrying `tag`, in packet order.
    pub fn tlvs_with(&self, tag: u16) -> impl Iterator<Item = &Tlv> + '_ {
        self.tlvs.iter().filter(move |tlv| tlv.tag() == tag)
    }

    /// Device status carried in the header.
    pub fn status(&self) -> ErrorCode {
        ErrorCode::from(self.error_code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::core::registry::tags;

    fn sample() -> Packet {
        let mut packet = Packet {
            opcode: Opcode::Set,
            mac_switch: MacAddress([0x50, 0xC7, 0xBF, 0x01, 0x02, 0x03]),
            sequence_number: 0x0102,
            error_code: -2,
            token: 0xBEEF,
            tlvs: vec![
                Tlv::new(tags::SYSUSER_OLD_NAME, "admin").unwrap(),
                Tlv::new(tags::SYSUSER_OLD_PASSWORD, "secret").unwrap(),
                Tlv::eot(),
            ],
            ..Packet::default()
        };
        packet.finalize().unwrap();
        packet
    }

    #[test]
    fn test_default_packet() {
        let packet = Packet::default();
        assert_eq!(packet.version, 1);
        assert_eq!(packet.opcode, Opcode::Discover);
        assert_eq!(packet.mac_switch, MacAddress::ZERO);
        assert!(packet.tlvs.is_empty());
        assert_eq!(packet.length as usize, HEADER_SIZE);
    }

    #[test]
    fn test_default_roundtrip() {
        let packet = Packet::default();
        let parsed = Packet::try_from_bytes(&packet.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, packet);
    }

    #[test]
    fn test_serialize_syncs_length() {
        let mut packet = Packet::default();
        packet.tlvs.push(Tlv::new(tags::SYSUSER_OLD_NAME, "admin").unwrap());
        packet.tlvs.push(Tlv::eot());
        assert_eq!(packet.length as usize, HEADER_SIZE);

        let bytes = packet.serialize().unwrap();
        assert_eq!(packet.length, 46);
        assert_eq!(packet.length as usize, bytes.len());
        assert_eq!(Packet::try_from_bytes(&bytes).unwrap(), packet);
    }

    #[test]
    fn test_finalize_rejects_oversized() {
        let big = Tlv::from_raw(tags::SYSCFG_BACKUP_FILE, vec![0u8; 65_000]).unwrap();
        let mut packet = Packet {
            tlvs: vec![big.clone(), big],
            ..Packet::default()
        };
        assert!(matches!(
            packet.finalize(),
            Err(ProtocolError::OversizedPacket(_))
        ));
        assert_eq!(packet.length as usize, HEADER_SIZE);
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 3);
        assert_eq!(&bytes[2..8], &[0x50, 0xC7, 0xBF, 0x01, 0x02, 0x03]);
        assert_eq!(&bytes[8..14], &[0; 6]);
        assert_eq!(&bytes[14..16], &[0x01, 0x02]);
        assert_eq!(&bytes[16..20], &[0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(&bytes[26..28], &[0xBE, 0xEF]);
        assert_eq!(&bytes[28..32], &[0; 4]);
    }

    #[test]
    fn test_length_field_patched() {
        let packet = Packet {
            length: 0,
            ..sample()
        };
        let bytes = packet.to_bytes().unwrap();
        // 32 + (4 + 6) + (4 + 7) + (4 + 0)
        assert_eq!(bytes.len(), 57);
        assert_eq!(u16::from_be_bytes([bytes[20], bytes[21]]), 57);
    }

    #[test]
    fn test_roundtrip() {
        let packet = sample();
        let parsed = Packet::try_from_bytes(&packet.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, packet);
        assert_eq!(parsed.status(), ErrorCode::Other(-2));
    }

    #[test]
    fn test_short_input_degrades_to_default() {
        assert_eq!(Packet::from_bytes(&[0x01; 31]), Packet::default());
        assert!(matches!(
            Packet::try_from_bytes(&[0x01; 31]),
            Err(ProtocolError::InvalidHeader(31))
        ));
    }

    #[test]
    fn test_header_only() {
        let parsed = Packet::try_from_bytes(&[0u8; 32]).unwrap();
        assert!(parsed.tlvs.is_empty());
        assert_eq!(parsed.version, 0);
    }

    #[test]
    fn test_oversized_packet_rejected() {
        let big = Tlv::from_raw(tags::SYSCFG_BACKUP_FILE, vec![0u8; 65_000]).unwrap();
        let packet = Packet {
            tlvs: vec![big.clone(), big],
            ..Packet::default()
        };
        assert!(matches!(
            packet.to_bytes(),
            Err(ProtocolError::OversizedPacket(_))
        ));
    }

    #[test]
    fn test_find_and_filter() {
        let packet = sample();
        assert_eq!(packet.find(tags::EOT), Some(&Tlv::eot()));
        assert!(packet.find(tags::SYSINFO_IP).is_none());
        assert_eq!(packet.tlvs_with(tags::SYSUSER_OLD_NAME).count(), 1);
    }

    #[test]
    fn test_opcode_mapping() {
        for raw in 0..=255u8 {
            assert_eq!(u8::from(Opcode::from(raw)), raw);
        }
        assert_eq!(Opcode::from(2), Opcode::DiscoveryReply);
    }

    #[test]
    fn test_mac_address_text() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:FF");
        assert_eq!("AA-BB-CC-DD-EE-FF".parse::<MacAddress>().unwrap(), mac);
        assert!("AA:BB:CC".parse::<MacAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:FF:00".parse::<MacAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:GG".parse::<MacAddress>().is_err());
    }
}
