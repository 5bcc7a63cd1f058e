//! Parser for `lldpctl -f keyvalue` neighbor listings.
//!
//! Lines look like `lldp.<iface>.<path>=<value>`; paths we do not map are
//! ignored, as are continuation lines without `=`.

use std::collections::HashMap;

use crate::hardware::types::Neighbor;

/// Neighbors keyed by local interface name.
pub fn parse_neighbors(text: &str) -> HashMap<String, Neighbor> {
    let mut neighbors: HashMap<String, Neighbor> = HashMap::new();

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let mut parts = key.splitn(3, '.');
        if parts.next() != Some("lldp") {
            continue;
        }
        let (Some(iface), Some(path)) = (parts.next(), parts.next()) else {
            continue;
        };

        let entry = neighbors.entry(iface.to_string()).or_default();
        let value = Some(value.trim().to_string());
        match path {
            "chassis.name" => entry.chassis_name = value,
            "chassis.descr" => entry.chassis_desc = value,
            "chassis.mac" => {
                entry.chassis_id_type = Some("mac".to_string());
                entry.chassis_id_value = value;
            }
            "port.ifname" => {
                entry.port_id_type = Some("ifname".to_string());
                entry.port_id_value = value;
            }
            "port.descr" => entry.port_desc = value,
            "vlan.vlan-id" => entry.vlan_id = value,
            "vlan" => entry.vlan_name = value,
            _ => {}
        }
    }

    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    const LLDP: &str = include_str!("../../tests/fixtures/lldpctl_keyvalue.txt");

    #[test]
    fn groups_by_interface() {
        let n = parse_neighbors(LLDP);
        assert_eq!(n.len(), 2);
        assert_eq!(n["eth0"].chassis_name.as_deref(), Some("lax-leaf-0601"));
        assert_eq!(n["eth1"].chassis_name.as_deref(), Some("lax-leaf-0602"));
    }

    #[test]
    fn maps_identifier_types() {
        let n = parse_neighbors(LLDP);
        let eth0 = &n["eth0"];
        assert_eq!(eth0.chassis_id_type.as_deref(), Some("mac"));
        assert_eq!(eth0.chassis_id_value.as_deref(), Some("00:1c:71:76:52:e5"));
        assert_eq!(eth0.port_id_type.as_deref(), Some("ifname"));
        assert_eq!(eth0.port_id_value.as_deref(), Some("Ethernet9"));
        assert_eq!(eth0.port_desc.as_deref(), Some("Not received"));
        assert_eq!(eth0.vlan_id.as_deref(), Some("601"));
        assert_eq!(eth0.vlan_name, None);
    }

    #[test]
    fn values_keep_embedded_equals_signs() {
        let n = parse_neighbors("lldp.eth2.vlan=prod=blue\n");
        assert_eq!(n["eth2"].vlan_name.as_deref(), Some("prod=blue"));
    }

    #[test]
    fn empty_output_has_no_neighbors() {
        assert!(parse_neighbors("").is_empty());
    }
}
