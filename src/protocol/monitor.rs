//! Typed views of monitoring answers.
//!
//! Records whose length does not match the expected layout are skipped.

use serde::Serialize;
use std::fmt;

use crate::core::packet::Packet;
use crate::core::registry::tags;

/// Size of one port-statistics record.
pub const PORT_STATISTICS_LEN: usize = 19;

/// Size of one cable-test record.
pub const CABLE_TEST_LEN: usize = 6;

/// Negotiated link mode of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortMode {
    LinkDown,
    Auto,
    Half10,
    Full10,
    Half100,
    Full100,
    Full1000,
    Unknown(u8),
}

impl From<u8> for PortMode {
    fn from(raw: u8) -> Self {
        match raw {
            0 => PortMode::LinkDown,
            1 => PortMode::Auto,
            2 => PortMode::Half10,
            3 => PortMode::Full10,
            4 => PortMode::Half100,
            5 => PortMode::Full100,
            6 => PortMode::Full1000,
            other => PortMode::Unknown(other),
        }
    }
}

impl fmt::Display for PortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PortMode::LinkDown => "Link Down",
            PortMode::Auto => "Auto",
            PortMode::Half10 => "10Half",
            PortMode::Full10 => "10Full",
            PortMode::Half100 => "100Half",
            PortMode::Full100 => "100Full",
            PortMode::Full1000 => "1000Full",
            PortMode::Unknown(_) => "Unknown",
        })
    }
}

/// Counters of one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortStatistics {
    pub port: u8,
    pub enabled: bool,
    pub mode: PortMode,
    pub tx_good: u32,
    pub tx_bad: u32,
    pub rx_good: u32,
    pub rx_bad: u32,
}

impl PortStatistics {
    /// Decode one 19-byte record.
    pub fn parse(value: &[u8]) -> Option<Self> {
        if value.len() != PORT_STATISTICS_LEN {
            return None;
        }
        let counter = |at: usize| {
            u32::from_be_bytes([value[at], value[at + 1], value[at + 2], value[at + 3]])
        };
        Some(Self {
            port: value[0],
            enabled: value[1] == 1,
            mode: PortMode::from(value[2]),
            tx_good: counter(3),
            tx_bad: counter(7),
            rx_good: counter(11),
            rx_bad: counter(15),
        })
    }

    /// Every well-formed statistics record in `packet`.
    pub fn from_packet(packet: &Packet) -> Vec<Self> {
        packet
            .tlvs_with(tags::MONITOR_PORT_STATISTICS)
            .filter_map(|tlv| Self::parse(tlv.value()))
            .collect()
    }
}

/// Outcome class of a cable diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CableStatus {
    NoCable,
    Normal,
    Open,
    Short,
    OpenShort,
    CrossOver,
    Unknown(u8),
}

impl From<u8> for CableStatus {
    fn from(raw: u8) -> Self {
        match raw {
            0 => CableStatus::NoCable,
            1 => CableStatus::Normal,
            2 => CableStatus::Open,
            3 => CableStatus::Short,
            4 => CableStatus::OpenShort,
            5 => CableStatus::CrossOver,
            other => CableStatus::Unknown(other),
        }
    }
}

impl fmt::Display for CableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CableStatus::NoCable => "no cable",
            CableStatus::Normal => "normal",
            CableStatus::Open => "open",
            CableStatus::Short => "short",
            CableStatus::OpenShort => "open and short",
            CableStatus::CrossOver => "cross-over",
            CableStatus::Unknown(_) => "unknown",
        })
    }
}

/// Result of a cable diagnostic on one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CableTestResult {
    pub port: u8,
    pub status: CableStatus,
    /// Estimated cable length in meters
    pub length_m: u8,
}

impl CableTestResult {
    /// Decode one 6-byte record: port, result, three reserved bytes, length.
    pub fn parse(value: &[u8]) -> Option<Self> {
        match value {
            [port, status, _, _, _, length] => Some(Self {
                port: *port,
                status: CableStatus::from(*status),
                length_m: *length,
            }),
            _ => None,
        }
    }

    pub fn from_packet(packet: &Packet) -> Vec<Self> {
        packet
            .tlvs_with(tags::MONITOR_CABLE_TEST)
            .filter_map(|tlv| Self::parse(tlv.value()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::core::tlv::Tlv;

    fn stats_record(port: u8, counters: [u32; 4]) -> Vec<u8> {
        let mut value = vec![port, 1, 6];
        for counter in counters {
            value.extend_from_slice(&counter.to_be_bytes());
        }
        value
    }

    #[test]
    fn test_port_statistics() {
        let packet = Packet {
            tlvs: vec![
                Tlv::from_raw(tags::MONITOR_PORT_STATISTICS, stats_record(1, [10, 1, 0x0102_0304, 0]))
                    .unwrap(),
                Tlv::from_raw(tags::MONITOR_PORT_STATISTICS, vec![2, 0, 0]).unwrap(),
                Tlv::from_raw(tags::MONITOR_PORT_STATISTICS, stats_record(3, [0; 4])).unwrap(),
                Tlv::eot(),
            ],
            ..Packet::default()
        };

        let stats = PortStatistics::from_packet(&packet);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].port, 1);
        assert!(stats[0].enabled);
        assert_eq!(stats[0].mode, PortMode::Full1000);
        assert_eq!(stats[0].tx_good, 10);
        assert_eq!(stats[0].tx_bad, 1);
        assert_eq!(stats[0].rx_good, 0x0102_0304);
        assert_eq!(stats[1].port, 3);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(PortMode::from(0).to_string(), "Link Down");
        assert_eq!(PortMode::from(5).to_string(), "100Full");
        assert_eq!(PortMode::from(9), PortMode::Unknown(9));
    }

    #[test]
    fn test_cable_test_result() {
        let result = CableTestResult::parse(&[4, 2, 0, 0, 0, 37]).unwrap();
        assert_eq!(result.port, 4);
        assert_eq!(result.status, CableStatus::Open);
        assert_eq!(result.length_m, 37);
        assert_eq!(result.status.to_string(), "open");
        assert!(CableTestResult::parse(&[4, 2, 0]).is_none());
        assert_eq!(CableStatus::from(4).to_string(), "open and short");
    }
}
