//! # Tag Registry
//!
//! Fixed mapping from TLV tag to symbolic name and semantic type. The table is
//! a compatibility artifact of the device firmware; it drives how a value is
//! rendered, never how it is framed on the wire.
//!
//! Unknown tags resolve to name `"?"` and type [`TagKind::Binary`].

use serde::Serialize;

/// Semantic type of a TLV value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagKind {
    /// NUL-terminated UTF-8 text
    String,
    /// IPv4 address, 4 bytes
    Ip,
    /// Hardware address, 6 bytes
    Mac,
    /// Single byte, `1` is true
    Boolean,
    /// Single unsigned byte
    Byte,
    /// Opaque bytes rendered as hex
    Binary,
    /// Marker with no meaningful value
    Null,
}

/// One registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    pub tag: u16,
    pub name: &'static str,
    pub kind: TagKind,
}

/// Well-known tag numbers.
pub mod tags {
    pub const SYSINFO_PRODUCT_MODEL: u16 = 1;
    pub const SYSINFO_DESCRIPTION: u16 = 2;
    pub const SYSINFO_MAC: u16 = 3;
    pub const SYSINFO_IP: u16 = 4;
    pub const SYSINFO_MASK: u16 = 5;
    pub const SYSINFO_GATEWAY: u16 = 6;
    pub const SYSINFO_FIRM_VERSION: u16 = 7;
    pub const SYSINFO_HARD_VERSION: u16 = 8;
    pub const SYSINFO_DHCP_STATE: u16 = 9;
    pub const SYSINFO_PORT_SUPPORT: u16 = 10;
    pub const SYSUSER_OLD_NAME: u16 = 512;
    pub const SYSUSER_NEW_NAME: u16 = 513;
    pub const SYSUSER_OLD_PASSWORD: u16 = 514;
    pub const SYSUSER_NEW_PASSWORD: u16 = 515;
    pub const SYSCFG_BACKUP_FILE: u16 = 768;
    pub const SYSCFG_RESTORE_FILE: u16 = 769;
    pub const SYSREBOOT_REBOOT: u16 = 773;
    pub const SYSRESET_RESET: u16 = 1280;
    pub const SYSUPGRADE_UPGRADE_FILE: u16 = 1536;
    pub const DIS_LOGIN_USERNAME: u16 = 1793;
    pub const DIS_LOGIN_PASSWORD: u16 = 1794;
    pub const DIS_LOGIN_AUTH: u16 = 1795;
    pub const DIS_PORT_NUM: u16 = 1796;
    pub const DIS_SETTING_USERNAME: u16 = 2049;
    pub const DIS_SETTING_PASSWORD: u16 = 2050;
    pub const DIS_SETTING_DESCRIPTION: u16 = 2051;
    pub const DIS_SETTING_MAC_ADDRESS: u16 = 2052;
    pub const DIS_SETTING_FIRM_VER: u16 = 2053;
    pub const DIS_SETTING_HARD_VER: u16 = 2054;
    pub const DIS_SETTING_DHCP_STATE: u16 = 2055;
    pub const DIS_SETTING_IP: u16 = 2056;
    pub const DIS_SETTING_MASK: u16 = 2057;
    pub const DIS_SETTING_GATEWAY: u16 = 2058;
    pub const SYSCFG_SAVE_CONFIG: u16 = 2304;
    pub const SYS_GET_TOKEN: u16 = 2305;
    pub const SWITCH_PORTCONFIG: u16 = 4096;
    pub const SWITCH_IGMP_STATUS: u16 = 4352;
    pub const SWITCH_IGMP_MULTI: u16 = 4353;
    pub const SWITCH_IGMP_REPORT_MSG_SUPPRESION: u16 = 4354;
    pub const SWITCH_TRUNK: u16 = 4608;
    pub const VLANMTU_STATUS_UPLINKPORT: u16 = 8192;
    pub const VLANPORTBASE_STATUS: u16 = 8448;
    pub const VLANPORTBASE_PORT: u16 = 8449;
    pub const VLANPORTBASE_VLAN_SUPPORT: u16 = 8450;
    pub const VLAN8021Q_STATUS: u16 = 8704;
    pub const VLAN8021Q_PORT: u16 = 8705;
    pub const VLAN8021Q_PVID: u16 = 8706;
    pub const VLAN8021Q_VLAN_SUPPORT: u16 = 8707;
    pub const QOS_BASIC_MODE: u16 = 12288;
    pub const QOS_BASIC_PRIORITY: u16 = 12289;
    pub const QOS_BANDWIDTH_INGRESS: u16 = 12544;
    pub const QOS_BANDWIDTH_EGRESS: u16 = 12545;
    pub const QOS_STORM_CONTROL: u16 = 12800;
    pub const MONITOR_PORT_STATISTICS: u16 = 16384;
    pub const MONITOR_PORT_MIRROR: u16 = 16640;
    pub const MONITOR_CABLE_TEST: u16 = 16896;
    pub const MONITOR_LOOP_PREVENTION: u16 = 17152;
    pub const EOT: u16 = 65535;
}

macro_rules! entry {
    ($name:ident, $kind:ident) => {
        TagInfo {
            tag: tags::$name,
            name: stringify!($name),
            kind: TagKind::$kind,
        }
    };
}

// Sorted by tag so lookups can binary search.
static REGISTRY: &[TagInfo] = &[
    entry!(SYSINFO_PRODUCT_MODEL, String),
    entry!(SYSINFO_DESCRIPTION, String),
    entry!(SYSINFO_MAC, Mac),
    entry!(SYSINFO_IP, Ip),
    entry!(SYSINFO_MASK, Ip),
    entry!(SYSINFO_GATEWAY, Ip),
    entry!(SYSINFO_FIRM_VERSION, String),
    entry!(SYSINFO_HARD_VERSION, String),
    entry!(SYSINFO_DHCP_STATE, Boolean),
    entry!(SYSINFO_PORT_SUPPORT, Byte),
    entry!(SYSUSER_OLD_NAME, String),
    entry!(SYSUSER_NEW_NAME, String),
    entry!(SYSUSER_OLD_PASSWORD, String),
    entry!(SYSUSER_NEW_PASSWORD, String),
    entry!(SYSCFG_BACKUP_FILE, Binary),
    entry!(SYSCFG_RESTORE_FILE, Binary),
    entry!(SYSREBOOT_REBOOT, Binary),
    entry!(SYSRESET_RESET, Binary),
    entry!(SYSUPGRADE_UPGRADE_FILE, Binary),
    entry!(DIS_LOGIN_USERNAME, String),
    entry!(DIS_LOGIN_PASSWORD, String),
    entry!(DIS_LOGIN_AUTH, String),
    entry!(DIS_PORT_NUM, Byte),
    entry!(DIS_SETTING_USERNAME, String),
    entry!(DIS_SETTING_PASSWORD, String),
    entry!(DIS_SETTING_DESCRIPTION, String),
    entry!(DIS_SETTING_MAC_ADDRESS, Mac),
    entry!(DIS_SETTING_FIRM_VER, String),
    entry!(DIS_SETTING_HARD_VER, String),
    entry!(DIS_SETTING_DHCP_STATE, Boolean),
    entry!(DIS_SETTING_IP, Ip),
    entry!(DIS_SETTING_MASK, Ip),
    entry!(DIS_SETTING_GATEWAY, Ip),
    entry!(SYSCFG_SAVE_CONFIG, Binary),
    entry!(SYS_GET_TOKEN, Null),
    entry!(SWITCH_PORTCONFIG, Binary),
    entry!(SWITCH_IGMP_STATUS, Binary),
    entry!(SWITCH_IGMP_MULTI, Binary),
    entry!(SWITCH_IGMP_REPORT_MSG_SUPPRESION, Binary),
    entry!(SWITCH_TRUNK, Binary),
    entry!(VLANMTU_STATUS_UPLINKPORT, Binary),
    entry!(VLANPORTBASE_STATUS, Binary),
    entry!(VLANPORTBASE_PORT, Binary),
    entry!(VLANPORTBASE_VLAN_SUPPORT, Binary),
    entry!(VLAN8021Q_STATUS, Binary),
    entry!(VLAN8021Q_PORT, Binary),
    entry!(VLAN8021Q_PVID, Binary),
    entry!(VLAN8021Q_VLAN_SUPPORT, Binary),
    entry!(QOS_BASIC_MODE, Binary),
    entry!(QOS_BASIC_PRIORITY, Binary),
    entry!(QOS_BANDWIDTH_INGRESS, Binary),
    entry!(QOS_BANDWIDTH_EGRESS, Binary),
    entry!(QOS_STORM_CONTROL, Binary),
    entry!(MONITOR_PORT_STATISTICS, Binary),
    entry!(MONITOR_PORT_MIRROR, Binary),
    entry!(MONITOR_CABLE_TEST, Binary),
    entry!(MONITOR_LOOP_PREVENTION, Binary),
    entry!(EOT, Null),
];

/// Name used for tags missing from the registry.
pub const UNKNOWN_TAG_NAME: &str = "?";

/// Look up a registry entry.
#[inline]
pub fn lookup(tag: u16) -> Option<&'static TagInfo> {
    REGISTRY
        .binary_search_by_key(&tag, |info| info.tag)
        .ok()
        .map(|idx| &REGISTRY[idx])
}

/// Symbolic name of `tag`, or `"?"`.
pub fn tag_name(tag: u16) -> &'static str {
    lookup(tag).map_or(UNKNOWN_TAG_NAME, |info| info.name)
}

/// Semantic type of `tag`, defaulting to [`TagKind::Binary`].
pub fn tag_kind(tag: u16) -> TagKind {
    lookup(tag).map_or(TagKind::Binary, |info| info.kind)
}

/// Every registered entry in tag order.
pub fn entries() -> &'static [TagInfo] {
    REGISTRY
}
