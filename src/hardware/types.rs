use serde::Serialize;
use std::collections::BTreeMap;

/// The report for one machine, one subtree per section collector.
///
/// Sections whose collector failed stay `None` and are left out of the JSON.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct InventoryRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<OsInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_boot_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipmi: Option<IpmiInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orchestration: Option<OrchestrationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interfaces: Option<Vec<NetworkInterface>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disks: Option<Vec<Disk>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<Vec<Cpu>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memories: Option<Vec<MemoryModule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raid_controllers: Option<Vec<RaidController>>,
}

pub const RECORD_TYPE: &str = "Server";

impl InventoryRecord {
    pub fn new() -> Self {
        InventoryRecord {
            kind: RECORD_TYPE.to_string(),
            ..Default::default()
        }
    }
}

/// Identity section: host naming, OS and firmware-sourced identifiers.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct BasicInfo {
    pub hostname: Option<String>,
    pub fqdn: Option<String>,
    pub os: OsInfo,
    pub last_boot_at: Option<String>,
    pub product: Option<String>,
    pub vendor: Option<String>,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct OsInfo {
    pub distribution: String,
    pub release: String,
    pub codename: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct IpmiInfo {
    pub address: String,
    pub netmask: String,
    pub mac: String,
    pub gateway: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct OrchestrationInfo {
    pub environment: String,
    pub roles: Vec<String>,
    pub run_list: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct NetworkInterface {
    pub name: String,
    pub status: Option<String>,
    pub addresses: Vec<InterfaceAddress>,
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<u64>, // bits per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplex: Option<String>,
    pub driver: Option<String>,
    pub driver_version: Option<String>,
    pub product: Option<String>,
    pub vendor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbor: Option<Neighbor>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct InterfaceAddress {
    pub address: String,
    pub netmask: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_expires_at: Option<String>,
}

/// Switch-side view of a link, learned over LLDP.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct Neighbor {
    pub chassis_name: Option<String>,
    pub chassis_desc: Option<String>,
    pub chassis_id_type: Option<String>,
    pub chassis_id_value: Option<String>,
    pub port_id_type: Option<String>,
    pub port_id_value: Option<String>,
    pub port_desc: Option<String>,
    pub vlan_id: Option<String>,
    pub vlan_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Disk {
    pub dev: String,
    pub kind: String, // "SCSI device", "ATA device", ...
    pub vendor_name: Option<String>,
    pub product: String,
    pub serial_number: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_uuid: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Cpu {
    pub description: Option<String>,
    pub cores: Option<u32>,
    pub threads: Option<u32>,
    pub speed: Option<String>,
    pub vendor_name: Option<String>,
    pub physid: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MemoryModule {
    pub size: u64,
    pub description: String,
    pub bank: Option<String>,
    pub slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RaidController {
    pub product: String,
    pub firmware_package: Option<String>,
    pub logical_disks: Vec<BTreeMap<String, String>>,
}
