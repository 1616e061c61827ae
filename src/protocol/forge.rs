//! Request builders.
//!
//! Each `forge_*` function returns a ready-to-send [`Packet`] with a fresh
//! sequence number, the operation's records and the end-of-transmission
//! sentinel.

use rand::Rng;

use crate::config::{MAX_SEQUENCE_NUMBER, PROTOCOL_VERSION};
use crate::core::packet::{MacAddress, Opcode, Packet};
use crate::core::registry::tags;
use crate::core::tlv::Tlv;
use crate::error::Result;

/// Draw a sequence number from `0..=MAX_SEQUENCE_NUMBER`.
///
/// Only one request is outstanding at a time, so a small range is enough;
/// it bounds collisions with stray replies but does not rule them out.
pub fn next_sequence_number() -> u16 {
    rand::rng().random_range(0..=MAX_SEQUENCE_NUMBER)
}

fn forge_common(opcode: Opcode, mac_switch: MacAddress, token: u16) -> Packet {
    Packet {
        version: PROTOCOL_VERSION,
        opcode,
        mac_switch,
        mac_computer: MacAddress::ZERO,
        sequence_number: next_sequence_number(),
        token,
        ..Packet::default()
    }
}

fn finish(mut packet: Packet) -> Packet {
    packet.tlvs.push(Tlv::eot());
    packet.length = packet.wire_len() as u16;
    packet
}

fn credentials(user: &str, password: &str) -> Result<[Tlv; 2]> {
    Ok([
        Tlv::new(tags::SYSUSER_OLD_NAME, user)?,
        Tlv::new(tags::SYSUSER_OLD_PASSWORD, password)?,
    ])
}

/// Discovery request, broadcast or unicast.
pub fn forge_discovery() -> Packet {
    finish(forge_common(Opcode::Discover, MacAddress::ZERO, 0))
}

/// Ask a switch for a session token.
pub fn forge_get_token(mac_switch: MacAddress) -> Packet {
    let mut packet = forge_common(Opcode::Get, mac_switch, 0);
    packet.tlvs.push(Tlv::empty(tags::SYS_GET_TOKEN));
    finish(packet)
}

/// Authenticate a token with user credentials.
pub fn forge_login(mac_switch: MacAddress, token: u16, user: &str, password: &str) -> Result<Packet> {
    let mut packet = forge_common(Opcode::Set, mac_switch, token);
    packet.tlvs.extend(credentials(user, password)?);
    Ok(finish(packet))
}

/// Read the per-port counters.
pub fn forge_get_port_statistics(mac_switch: MacAddress, token: u16) -> Packet {
    let mut packet = forge_common(Opcode::Get, mac_switch, token);
    packet.tlvs.push(Tlv::empty(tags::MONITOR_PORT_STATISTICS));
    finish(packet)
}

/// Start cable diagnostics on `port`.
///
/// The device requires the credentials again alongside the token.
pub fn forge_cable_test(
    mac_switch: MacAddress,
    token: u16,
    port: u8,
    user: &str,
    password: &str,
) -> Result<Packet> {
    let mut packet = forge_common(Opcode::Set, mac_switch, token);
    packet.tlvs.extend(credentials(user, password)?);
    // Second byte is always 0x01 in captured requests.
    packet.tlvs.push(Tlv::from_raw(
        tags::MONITOR_CABLE_TEST,
        vec![port, 0x01, 0x00, 0x00, 0x00, 0x00],
    )?);
    Ok(finish(packet))
}

/// Read the per-port QoS priorities.
pub fn forge_get_qos(mac_switch: MacAddress, token: u16) -> Packet {
    let mut packet = forge_common(Opcode::Get, mac_switch, token);
    packet.tlvs.push(Tlv::empty(tags::QOS_BASIC_PRIORITY));
    finish(packet)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MAC: MacAddress = MacAddress([0x50, 0xC7, 0xBF, 0xAA, 0xBB, 0xCC]);

    fn tags_of(packet: &Packet) -> Vec<u16> {
        packet.tlvs.iter().map(Tlv::tag).collect()
    }

    #[test]
    fn test_sequence_numbers_in_range() {
        for _ in 0..2_000 {
            assert!(next_sequence_number() <= MAX_SEQUENCE_NUMBER);
        }
    }

    #[test]
    fn test_discovery_request() {
        let packet = forge_discovery();
        assert_eq!(packet.opcode, Opcode::Discover);
        assert_eq!(packet.version, 1);
        assert_eq!(packet.mac_switch, MacAddress::ZERO);
        assert_eq!(tags_of(&packet), vec![tags::EOT]);
        assert_eq!(packet.length, 36);
    }

    #[test]
    fn test_get_token_request() {
        let packet = forge_get_token(MAC);
        assert_eq!(packet.opcode, Opcode::Get);
        assert_eq!(packet.mac_switch, MAC);
        assert_eq!(packet.token, 0);
        assert_eq!(tags_of(&packet), vec![tags::SYS_GET_TOKEN, tags::EOT]);
    }

    #[test]
    fn test_login_request() {
        let packet = forge_login(MAC, 0x1234, "admin", "pw").unwrap();
        assert_eq!(packet.opcode, Opcode::Set);
        assert_eq!(packet.token, 0x1234);
        assert_eq!(
            tags_of(&packet),
            vec![tags::SYSUSER_OLD_NAME, tags::SYSUSER_OLD_PASSWORD, tags::EOT]
        );
        assert_eq!(packet.tlvs[0].value(), b"admin\0");
        assert_eq!(packet.tlvs[1].value(), b"pw\0");
    }

    #[test]
    fn test_cable_test_request() {
        let packet = forge_cable_test(MAC, 9, 3, "admin", "pw").unwrap();
        assert_eq!(packet.opcode, Opcode::Set);
        assert_eq!(
            tags_of(&packet),
            vec![
                tags::SYSUSER_OLD_NAME,
                tags::SYSUSER_OLD_PASSWORD,
                tags::MONITOR_CABLE_TEST,
                tags::EOT
            ]
        );
        assert_eq!(packet.tlvs[2].value(), &[3, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_statistics_and_qos_requests() {
        let stats = forge_get_port_statistics(MAC, 5);
        assert_eq!(stats.opcode, Opcode::Get);
        assert_eq!(tags_of(&stats), vec![tags::MONITOR_PORT_STATISTICS, tags::EOT]);

        let qos = forge_get_qos(MAC, 5);
        assert_eq!(qos.token, 5);
        assert_eq!(tags_of(&qos), vec![tags::QOS_BASIC_PRIORITY, tags::EOT]);
    }

    #[test]
    fn test_length_is_self_consistent() {
        let packet = forge_login(MAC, 1, "user", "password").unwrap();
        let bytes = packet.to_bytes().unwrap();
        assert_eq!(packet.length as usize, bytes.len());
        assert_eq!(Packet::try_from_bytes(&bytes).unwrap(), packet);
    }
}
