//! Discovery answers and the set of units found so far.

use serde::Serialize;
use std::net::Ipv4Addr;
use tracing::{debug, warn};

use crate::config::PROTOCOL_VERSION;
use crate::core::packet::{MacAddress, Opcode, Packet};
use crate::core::registry::tags;
use crate::core::tlv::UNSET;

/// Number of records a switch puts in a discovery answer.
pub const DISCOVERY_REPLY_TLV_COUNT: usize = 10;

/// Whether `packet` answers the discovery request `request`.
pub fn is_discovery_reply(request: &Packet, packet: &Packet) -> bool {
    packet.tlvs.len() == DISCOVERY_REPLY_TLV_COUNT
        && packet.version == PROTOCOL_VERSION
        && packet.opcode == Opcode::DiscoveryReply
        && packet.sequence_number == request.sequence_number
}

/// A switch that answered discovery.
///
/// Units are told apart by `address`, the rendered SYSINFO_IP record. An
/// answer whose address is malformed or missing still counts as a unit;
/// it just has no `ip` to send requests to. A missing record renders as
/// `"unset"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredUnit {
    pub name: String,
    pub address: String,
    pub ip: Option<Ipv4Addr>,
    pub mac: MacAddress,
    pub model: Option<String>,
    pub firmware: Option<String>,
    #[serde(skip)]
    source: Packet,
}

impl DiscoveredUnit {
    /// Build a unit from a discovery answer.
    pub fn from_packet(packet: &Packet) -> Self {
        let address = packet.find(tags::SYSINFO_IP);
        let mac = packet
            .find(tags::SYSINFO_MAC)
            .and_then(|tlv| MacAddress::try_from(tlv.value()).ok())
            .unwrap_or(MacAddress::ZERO);
        let text = |tag| packet.find(tag).map(|tlv| tlv.render());

        Self {
            name: text(tags::SYSINFO_DESCRIPTION).unwrap_or_default(),
            address: address.map_or_else(|| UNSET.to_string(), |tlv| tlv.render()),
            ip: address.and_then(|tlv| tlv.as_ipv4()),
            mac,
            model: text(tags::SYSINFO_HARD_VERSION),
            firmware: text(tags::SYSINFO_FIRM_VERSION),
            source: packet.clone(),
        }
    }

    /// The discovery answer this unit was built from.
    pub fn source_packet(&self) -> &Packet {
        &self.source
    }
}

/// Units discovered so far, in order of first answer.
///
/// Grows monotonically until [`DiscoveryRegistry::clear`] is called.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryRegistry {
    units: Vec<DiscoveredUnit>,
}

impl DiscoveryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `unit` unless its address is already known. Returns whether it was added.
    pub fn insert(&mut self, unit: DiscoveredUnit) -> bool {
        if self.contains(&unit.address) {
            debug!(address = %unit.address, "Ignoring repeated discovery answer");
            return false;
        }
        if unit.ip.is_none() {
            warn!(address = %unit.address, mac = %unit.mac, "Discovered unit without a usable IPv4 address");
        }
        debug!(address = %unit.address, name = %unit.name, mac = %unit.mac, "Discovered unit");
        self.units.push(unit);
        true
    }

    /// Whether a unit with this rendered address is known.
    pub fn contains(&self, address: &str) -> bool {
        self.units.iter().any(|unit| unit.address == address)
    }

    pub fn get(&self, address: &str) -> Option<&DiscoveredUnit> {
        self.units.iter().find(|unit| unit.address == address)
    }

    pub fn get_by_ip(&self, ip: Ipv4Addr) -> Option<&DiscoveredUnit> {
        self.units.iter().find(|unit| unit.ip == Some(ip))
    }

    /// The only unit, if exactly one has been discovered.
    pub fn unique(&self) -> Option<&DiscoveredUnit> {
        match self.units.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredUnit> + '_ {
        self.units.iter()
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::core::tlv::Tlv;

    fn answer(seq: u16, ip: [u8; 4]) -> Packet {
        let mut tlvs = vec![
            Tlv::new(tags::SYSINFO_PRODUCT_MODEL, "TL-SG108E").unwrap(),
            Tlv::new(tags::SYSINFO_DESCRIPTION, "lab-switch").unwrap(),
            Tlv::from_raw(tags::SYSINFO_MAC, vec![0x50, 0xC7, 0xBF, 1, 2, 3]).unwrap(),
            Tlv::from_raw(tags::SYSINFO_IP, ip.to_vec()).unwrap(),
            Tlv::from_raw(tags::SYSINFO_MASK, vec![255, 255, 255, 0]).unwrap(),
            Tlv::from_raw(tags::SYSINFO_GATEWAY, vec![192, 168, 0, 1]).unwrap(),
            Tlv::new(tags::SYSINFO_FIRM_VERSION, "1.0.0 Build 20160722").unwrap(),
            Tlv::new(tags::SYSINFO_HARD_VERSION, "TL-SG108E 2.0").unwrap(),
            Tlv::from_raw(tags::SYSINFO_DHCP_STATE, vec![1]).unwrap(),
        ];
        tlvs.push(Tlv::eot());
        Packet {
            opcode: Opcode::DiscoveryReply,
            sequence_number: seq,
            tlvs,
            ..Packet::default()
        }
    }

    fn request(seq: u16) -> Packet {
        Packet {
            sequence_number: seq,
            ..Packet::default()
        }
    }

    #[test]
    fn test_reply_predicate() {
        let reply = answer(17, [192, 168, 0, 2]);
        assert!(is_discovery_reply(&request(17), &reply));
        assert!(!is_discovery_reply(&request(18), &reply));

        let mut wrong_opcode = reply.clone();
        wrong_opcode.opcode = Opcode::Get;
        assert!(!is_discovery_reply(&request(17), &wrong_opcode));

        let mut short = reply.clone();
        short.tlvs.pop();
        assert!(!is_discovery_reply(&request(17), &short));

        let mut wrong_version = reply;
        wrong_version.version = 2;
        assert!(!is_discovery_reply(&request(17), &wrong_version));
    }

    #[test]
    fn test_unit_fields() {
        let unit = DiscoveredUnit::from_packet(&answer(1, [192, 168, 0, 2]));
        assert_eq!(unit.name, "lab-switch");
        assert_eq!(unit.address, "192.168.0.2");
        assert_eq!(unit.ip, Some(Ipv4Addr::new(192, 168, 0, 2)));
        assert_eq!(unit.mac.to_string(), "50:C7:BF:01:02:03");
        assert_eq!(unit.model.as_deref(), Some("TL-SG108E 2.0"));
        assert_eq!(unit.firmware.as_deref(), Some("1.0.0 Build 20160722"));
        assert_eq!(unit.source_packet().sequence_number, 1);
    }

    #[test]
    fn test_unit_with_malformed_address() {
        let mut packet = answer(1, [192, 168, 0, 2]);
        for tlv in packet.tlvs.iter_mut() {
            if tlv.tag() == tags::SYSINFO_IP {
                *tlv = Tlv::from_raw(tags::SYSINFO_IP, vec![192, 168, 0]).unwrap();
            }
        }
        let unit = DiscoveredUnit::from_packet(&packet);
        assert_eq!(unit.address, "malformed");
        assert!(unit.ip.is_none());
        assert_eq!(unit.name, "lab-switch");
    }

    #[test]
    fn test_unit_without_address() {
        let mut packet = answer(1, [192, 168, 0, 2]);
        packet.tlvs.retain(|tlv| tlv.tag() != tags::SYSINFO_IP);
        let unit = DiscoveredUnit::from_packet(&packet);
        assert_eq!(unit.address, "unset");
        assert!(unit.ip.is_none());
    }

    #[test]
    fn test_registry_dedups_by_address() {
        let mut registry = DiscoveryRegistry::new();
        let first = DiscoveredUnit::from_packet(&answer(1, [10, 0, 0, 2]));
        let again = DiscoveredUnit::from_packet(&answer(2, [10, 0, 0, 2]));
        let other = DiscoveredUnit::from_packet(&answer(3, [10, 0, 0, 3]));

        assert!(registry.insert(first));
        assert!(!registry.insert(again));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.unique().unwrap().address, "10.0.0.2");

        assert!(registry.insert(other));
        assert_eq!(registry.len(), 2);
        assert!(registry.unique().is_none());
        assert!(registry.get("10.0.0.3").is_some());
        assert!(registry.get_by_ip(Ipv4Addr::new(10, 0, 0, 3)).is_some());

        let order: Vec<&str> = registry.iter().map(|unit| unit.address.as_str()).collect();
        assert_eq!(order, ["10.0.0.2", "10.0.0.3"]);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_dedups_malformed_addresses() {
        let malformed = |seq| {
            let mut packet = answer(seq, [10, 0, 0, 9]);
            packet.tlvs.retain(|tlv| tlv.tag() != tags::SYSINFO_IP);
            packet
                .tlvs
                .insert(3, Tlv::from_raw(tags::SYSINFO_IP, vec![10, 0, 0]).unwrap());
            DiscoveredUnit::from_packet(&packet)
        };

        let mut registry = DiscoveryRegistry::new();
        assert!(registry.insert(malformed(1)));
        assert!(!registry.insert(malformed(2)));
        assert!(registry.contains("malformed"));
        assert!(registry.unique().is_some());

        assert!(registry.insert(DiscoveredUnit::from_packet(&answer(3, [10, 0, 0, 2]))));
        assert_eq!(registry.len(), 2);
        assert!(registry.unique().is_none());
    }
}
