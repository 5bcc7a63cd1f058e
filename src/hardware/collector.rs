//! Aggregation engine: derives the identity key, then runs every section
//! collector in a fixed order, each isolated from the others' failures.

use std::fmt;

use tracing::{error, info, warn};

use crate::error::{CollectError, CollectionError};
use crate::hardware::collect_basic::collect_basic_info;
use crate::hardware::collect_cpu::collect_cpus;
use crate::hardware::collect_ipmi::collect_ipmi_info;
use crate::hardware::collect_memory::collect_memories;
use crate::hardware::collect_network::collect_network_interfaces;
use crate::hardware::collect_orchestration::{collect_orchestration_info, OrchestrationContext};
use crate::hardware::collect_raid::collect_raid_controllers;
use crate::hardware::collect_storage::collect_disks;
use crate::hardware::context::RunContext;
use crate::hardware::identity::derive_sku;
use crate::hardware::types::{
    BasicInfo, Cpu, Disk, InventoryRecord, IpmiInfo, MemoryModule, NetworkInterface,
    OrchestrationInfo, RaidController,
};
use crate::host::Host;

/// Callback invoked once per failed section.
pub type ErrorHandler = Box<dyn Fn(Section, &CollectionError)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Basic,
    Ipmi,
    Orchestration,
    NetworkInterfaces,
    Disks,
    Cpus,
    Memories,
    RaidControllers,
}

impl Section {
    /// Collection order.
    pub const ALL: [Section; 8] = [
        Section::Basic,
        Section::Ipmi,
        Section::Orchestration,
        Section::NetworkInterfaces,
        Section::Disks,
        Section::Cpus,
        Section::Memories,
        Section::RaidControllers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::Basic => "basic",
            Section::Ipmi => "ipmi",
            Section::Orchestration => "orchestration",
            Section::NetworkInterfaces => "network_interfaces",
            Section::Disks => "disks",
            Section::Cpus => "cpus",
            Section::Memories => "memories",
            Section::RaidControllers => "raid_controllers",
        }
    }

    fn collect(self, ctx: &mut RunContext) -> Result<Subtree, CollectionError> {
        Ok(match self {
            Section::Basic => Subtree::Basic(collect_basic_info(ctx)?),
            Section::Ipmi => Subtree::Ipmi(collect_ipmi_info(ctx)?),
            Section::Orchestration => Subtree::Orchestration(collect_orchestration_info(ctx)?),
            Section::NetworkInterfaces => {
                Subtree::NetworkInterfaces(collect_network_interfaces(ctx)?)
            }
            Section::Disks => Subtree::Disks(collect_disks(ctx)?),
            Section::Cpus => Subtree::Cpus(collect_cpus(ctx)?),
            Section::Memories => Subtree::Memories(collect_memories(ctx)?),
            Section::RaidControllers => Subtree::RaidControllers(collect_raid_controllers(ctx)?),
        })
    }

    /// Drop whatever this section owns in the record.
    fn clear(self, record: &mut InventoryRecord) {
        match self {
            Section::Basic => {
                record.hostname = None;
                record.fqdn = None;
                record.os = None;
                record.last_boot_at = None;
                record.product = None;
                record.vendor = None;
                record.properties = None;
            }
            Section::Ipmi => record.ipmi = None,
            Section::Orchestration => record.orchestration = None,
            Section::NetworkInterfaces => record.network_interfaces = None,
            Section::Disks => record.disks = None,
            Section::Cpus => record.cpus = None,
            Section::Memories => record.memories = None,
            Section::RaidControllers => record.raid_controllers = None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A finished section, ready to replace its part of the record wholesale.
#[derive(Debug)]
enum Subtree {
    Basic(BasicInfo),
    Ipmi(IpmiInfo),
    Orchestration(Option<OrchestrationInfo>),
    NetworkInterfaces(Vec<NetworkInterface>),
    Disks(Vec<Disk>),
    Cpus(Vec<Cpu>),
    Memories(Vec<MemoryModule>),
    RaidControllers(Option<Vec<RaidController>>),
}

impl Subtree {
    fn apply(self, record: &mut InventoryRecord) {
        match self {
            Subtree::Basic(basic) => {
                record.hostname = basic.hostname;
                record.fqdn = basic.fqdn;
                record.os = Some(basic.os);
                record.last_boot_at = basic.last_boot_at;
                record.product = basic.product;
                record.vendor = basic.vendor;
                record.properties = Some(basic.properties);
            }
            Subtree::Ipmi(ipmi) => record.ipmi = Some(ipmi),
            Subtree::Orchestration(info) => record.orchestration = info,
            Subtree::NetworkInterfaces(ifaces) => record.network_interfaces = Some(ifaces),
            Subtree::Disks(disks) => record.disks = Some(disks),
            Subtree::Cpus(cpus) => record.cpus = Some(cpus),
            Subtree::Memories(memories) => record.memories = Some(memories),
            Subtree::RaidControllers(controllers) => record.raid_controllers = controllers,
        }
    }
}

#[derive(Debug)]
pub struct SectionFailure {
    pub section: Section,
    pub error: CollectionError,
}

/// Outcome of one run.
#[derive(Debug)]
pub struct Inventory {
    pub sku: String,
    pub record: InventoryRecord,
    pub failures: Vec<SectionFailure>,
}

pub struct Collector {
    host: Box<dyn Host>,
    orchestration: OrchestrationContext,
    error_handler: Option<ErrorHandler>,
}

impl Collector {
    pub fn new(host: Box<dyn Host>, orchestration: OrchestrationContext) -> Self {
        Collector {
            host,
            orchestration,
            error_handler: None,
        }
    }

    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Section, &CollectionError) + 'static,
    {
        self.error_handler = Some(Box::new(handler));
        self
    }

    /// One collection run. Every run starts from an empty record and an empty
    /// tool-output cache.
    pub fn collect(&self) -> Result<Inventory, CollectError> {
        let mut ctx = RunContext::new(self.host.as_ref(), &self.orchestration);

        let sku = derive_sku(&mut ctx).map_err(|e| {
            error!(error = %e, "cannot identify this machine, aborting run");
            CollectError::from(e)
        })?;

        let mut record = InventoryRecord::new();
        let mut failures = Vec::new();

        for section in Section::ALL {
            match section.collect(&mut ctx) {
                Ok(subtree) => subtree.apply(&mut record),
                Err(e) => {
                    warn!(%section, error = %e, "section collection failed");
                    section.clear(&mut record);
                    if let Some(handler) = &self.error_handler {
                        handler(section, &e);
                    }
                    failures.push(SectionFailure { section, error: e });
                }
            }
        }

        info!(%sku, failed_sections = failures.len(), "inventory collected");
        Ok(Inventory {
            sku,
            record,
            failures,
        })
    }
}
