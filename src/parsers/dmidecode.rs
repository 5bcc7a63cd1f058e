//! Parser for verbose `dmidecode` dumps.
//!
//! The dump is a sequence of structures, each introduced by a handle line:
//!
//! ```text
//! Handle 0x0041, DMI type 4, 42 bytes
//! Processor Information
//!         Socket Designation: SOCKET 0
//!         Type: Central Processor
//! ```
//!
//! Each handle line opens a record under the section named after its type;
//! `key: value` lines fill the most recently opened record.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

static HANDLE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Handle\s+0x([0-9A-Fa-f]+),\s*DMI\s+type\s+(\d+)\s*,").unwrap()
});

const END_OF_TABLE: u8 = 127;

/// Section title for an SMBIOS structure type.
pub fn section_title(type_id: u8) -> String {
    let title = match type_id {
        0 => "bios",
        1 => "system",
        2 => "base_board",
        3 => "chassis",
        4 => "processor",
        5 => "memory_controller",
        6 => "memory_module",
        7 => "cache",
        8 => "port_connector",
        9 => "system_slots",
        10 => "on_board_devices",
        11 => "oem_strings",
        12 => "system_configuration_options",
        13 => "bios_language",
        14 => "group_associations",
        15 => "system_event_log",
        16 => "physical_memory_array",
        17 => "memory_device",
        18 => "32_bit_memory_error",
        19 => "memory_array_mapped_address",
        20 => "memory_device_mapped_address",
        21 => "builtin_pointing_device",
        22 => "portable_battery",
        23 => "system_reset",
        24 => "hardware_security",
        25 => "system_power_controls",
        26 => "voltage_sensor",
        27 => "cooling_device",
        28 => "temperature_sensor",
        29 => "electrical_current_sensor",
        30 => "out_of_band_remote_access",
        31 => "boot_integrity_services",
        32 => "system_boot",
        33 => "64_bit_memory_error",
        34 => "management_device",
        35 => "management_device_component",
        36 => "management_device_threshold_data",
        37 => "memory_channel",
        38 => "ipmi_device",
        39 => "power_supply",
        40 => "additional_information",
        41 => "onboard_device",
        END_OF_TABLE => "end_of_table",
        other => return format!("type_{}", other),
    };
    title.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DmiRecord {
    pub handle: u32,
    pub fields: BTreeMap<String, String>,
}

impl DmiRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|s| s.as_str())
    }
}

/// Parsed dump: section title -> records in dump order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DmiTables {
    sections: BTreeMap<String, Vec<DmiRecord>>,
}

impl DmiTables {
    pub fn parse(text: &str) -> Self {
        let mut sections: BTreeMap<String, Vec<DmiRecord>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            if is_banner(line) {
                continue;
            }

            if let Some(caps) = HANDLE_LINE.captures(line) {
                let type_id = caps[2].parse::<u8>().ok();
                if type_id == Some(END_OF_TABLE) {
                    current = None;
                    continue;
                }
                let handle = u32::from_str_radix(&caps[1], 16).unwrap_or(0);
                let title = type_id
                    .map(section_title)
                    .unwrap_or_else(|| format!("type_{}", &caps[2]));
                sections.entry(title.clone()).or_default().push(DmiRecord {
                    handle,
                    fields: BTreeMap::new(),
                });
                current = Some(title);
                continue;
            }

            let Some((key, value)) = line.trim().split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let record = current
                .as_ref()
                .and_then(|title| sections.get_mut(title))
                .and_then(|records| records.last_mut());
            if let Some(record) = record {
                record.fields.insert(normalize_key(key), value.to_string());
            }
        }

        DmiTables { sections }
    }

    pub fn section(&self, title: &str) -> &[DmiRecord] {
        self.sections.get(title).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

fn is_banner(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with("End Of Table")
        || line.starts_with("# dmidecode")
        || line.starts_with("SMBIOS")
        || line.starts_with("Table at")
        || line.contains("structures occupying")
}

/// `Socket Designation` -> `socket_designation`.
fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
