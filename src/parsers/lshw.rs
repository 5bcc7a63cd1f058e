//! Parser for `lshw -xml` hardware topology dumps.

use roxmltree::{Document, Node};

use crate::error::CollectionError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LshwCpu {
    pub description: Option<String>,
    pub cores: Option<u32>,
    pub threads: Option<u32>,
    pub speed: Option<u64>,
    pub vendor_name: Option<String>,
    pub physid: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LshwMemory {
    pub size: u64,
    pub description: Option<String>,
    pub bank: Option<u32>,
    pub slot: Option<String>,
    pub product: Option<String>,
    pub vendor_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LshwNetwork {
    pub name: Option<String>,
    pub description: Option<String>,
    pub mac_address: Option<String>,
    pub product: Option<String>,
    pub vendor_name: Option<String>,
    pub driver: Option<String>,
    pub driver_version: Option<String>,
    pub duplex: Option<String>,
    pub link_type: Option<String>,
}

/// Everything we read out of one topology dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LshwReport {
    pub cpus: Vec<LshwCpu>,
    pub memories: Vec<LshwMemory>,
    pub network_interfaces: Vec<LshwNetwork>,
}

impl LshwReport {
    pub fn parse(xml: &str) -> Result<Self, CollectionError> {
        let doc = Document::parse(xml).map_err(|e| CollectionError::Malformed {
            tool: "lshw",
            reason: e.to_string(),
        })?;

        let nodes_of = |class: &'static str| {
            doc.descendants()
                .filter(move |n| n.has_tag_name("node") && n.attribute("class") == Some(class))
        };

        let cpus = nodes_of("processor").map(parse_cpu).collect();
        // Banks are the children of a memory node; caches nested under a
        // processor have no such children.
        let memories = nodes_of("memory")
            .flat_map(|mem| {
                mem.children()
                    .filter(|c| c.is_element() && c.attribute("id").is_some())
            })
            .map(parse_memory)
            .collect();
        let network_interfaces = nodes_of("network").map(parse_network).collect();

        Ok(LshwReport {
            cpus,
            memories,
            network_interfaces,
        })
    }

    pub fn network_interface(&self, name: &str) -> Option<&LshwNetwork> {
        self.network_interfaces
            .iter()
            .find(|n| n.name.as_deref() == Some(name))
    }
}

fn parse_cpu(node: Node) -> LshwCpu {
    LshwCpu {
        description: text_of(node, "product").or_else(|| text_of(node, "description")),
        cores: setting(node, "cores").and_then(|v| v.parse().ok()),
        threads: setting(node, "threads").and_then(|v| v.parse().ok()),
        speed: text_of(node, "size").and_then(|v| v.parse().ok()),
        vendor_name: text_of(node, "vendor"),
        physid: text_of(node, "physid").and_then(|v| v.parse().ok()),
    }
}

fn parse_memory(node: Node) -> LshwMemory {
    LshwMemory {
        size: text_of(node, "size").and_then(|s| s.parse().ok()).unwrap_or(0),
        description: text_of(node, "description"),
        bank: text_of(node, "physid").and_then(|v| v.parse().ok()),
        slot: text_of(node, "slot"),
        product: text_of(node, "product"),
        vendor_name: text_of(node, "vendor"),
    }
}

fn parse_network(node: Node) -> LshwNetwork {
    LshwNetwork {
        name: text_of(node, "logicalname"),
        description: text_of(node, "description"),
        mac_address: text_of(node, "serial"),
        product: text_of(node, "product"),
        vendor_name: text_of(node, "vendor"),
        driver: setting(node, "driver"),
        driver_version: setting(node, "driverversion"),
        duplex: setting(node, "duplex"),
        link_type: setting(node, "port"),
    }
}

/// Text of the first descendant element named `tag`, in document order.
fn text_of(node: Node, tag: &str) -> Option<String> {
    node.descendants()
        .skip(1)
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `<configuration><setting id="..." value="..."/></configuration>`
fn setting(node: Node, id: &str) -> Option<String> {
    node.descendants()
        .find(|n| {
            n.has_tag_name("setting")
                && n.attribute("id") == Some(id)
                && n.parent().map(|p| p.has_tag_name("configuration")).unwrap_or(false)
        })
        .and_then(|n| n.attribute("value"))
        .map(|v| v.to_string())
}
