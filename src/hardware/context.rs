use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::hardware::collect_orchestration::OrchestrationContext;
use crate::hardware::types::Neighbor;
use crate::host::{Host, DEFAULT_TIMEOUT};
use crate::parsers::dhcp::{self, Lease};
use crate::parsers::{lldp, DmiTables, LshwReport};

pub const IPMI_LAN_TIMEOUT: Duration = Duration::from_secs(10);
pub const LSHW_TIMEOUT: Duration = Duration::from_secs(40);
pub const LEASE_TIMEOUT: Duration = Duration::from_secs(5);
pub const BLKID_TIMEOUT: Duration = Duration::from_secs(5);

pub const LEASE_GLOB: &str = "/var/lib/dhcp/dhclient*.leases";

/// Tool output shared between collectors within one run.
///
/// A fresh cache is built for every run, so nothing survives into the next one.
#[derive(Debug, Default)]
struct RunCache {
    dmi: Option<DmiTables>,
    neighbors: Option<HashMap<String, Neighbor>>,
    leases: Option<HashMap<String, Lease>>,
    ipmi_lan: Option<String>,
    ipmi_fru: Option<String>,
    lshw: Option<Option<LshwReport>>,
    blkid: Option<String>,
}

/// Per-run state handed to every section collector.
pub struct RunContext<'a> {
    pub host: &'a dyn Host,
    pub orchestration: &'a OrchestrationContext,
    cache: RunCache,
}

impl<'a> RunContext<'a> {
    pub fn new(host: &'a dyn Host, orchestration: &'a OrchestrationContext) -> Self {
        RunContext {
            host,
            orchestration,
            cache: RunCache::default(),
        }
    }

    /// Run a command and return its stdout; a timeout yields "".
    pub fn run(&self, command: &str, timeout: Duration) -> String {
        self.host.run(command, timeout).into_stdout()
    }

    pub fn run_default(&self, command: &str) -> String {
        self.run(command, DEFAULT_TIMEOUT)
    }

    /// A single firmware string via `dmidecode -s`.
    ///
    /// Old dmidecode builds prepend `#` warnings on newer SMBIOS; those lines
    /// are dropped.
    pub fn read_dmi(&self, key: &str) -> Option<String> {
        let raw = self.run_default(&format!("dmidecode -s {}", key));
        let value = raw
            .lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!value.is_empty()).then_some(value)
    }

    pub fn dmi_tables(&mut self) -> &DmiTables {
        let host = self.host;
        self.cache.dmi.get_or_insert_with(|| {
            let raw = host
                .run("dmidecode --type processor --type memory", DEFAULT_TIMEOUT)
                .into_stdout();
            DmiTables::parse(&raw)
        })
    }

    pub fn ipmi_lan(&mut self) -> &str {
        let host = self.host;
        self.cache
            .ipmi_lan
            .get_or_insert_with(|| host.run("ipmitool lan print", IPMI_LAN_TIMEOUT).into_stdout())
    }

    pub fn ipmi_fru(&mut self) -> &str {
        let host = self.host;
        self.cache
            .ipmi_fru
            .get_or_insert_with(|| host.run("ipmitool fru", DEFAULT_TIMEOUT).into_stdout())
    }

    fn neighbors(&mut self) -> &HashMap<String, Neighbor> {
        let host = self.host;
        self.cache.neighbors.get_or_insert_with(|| {
            let raw = host.run("lldpctl -f keyvalue", DEFAULT_TIMEOUT).into_stdout();
            lldp::parse_neighbors(&raw)
        })
    }

    /// LLDP neighbor of a local interface. One `lldpctl` call serves the run.
    pub fn neighbor(&mut self, iface: &str) -> Option<Neighbor> {
        self.neighbors().get(iface).cloned()
    }

    /// Most recent lease per interface across every dhclient lease file.
    pub fn leases(&mut self) -> &HashMap<String, Lease> {
        let host = self.host;
        self.cache.leases.get_or_insert_with(|| {
            let mut all = Vec::new();
            for path in host.glob(LEASE_GLOB) {
                let command = format!("cat {}", path.display());
                let raw = host.run(&command, LEASE_TIMEOUT).into_stdout();
                all.extend(dhcp::parse_leases(&raw));
            }
            dhcp::latest_by_interface(all)
        })
    }

    /// Parsed `lshw -xml`, or `None` when the tool is missing or its output
    /// does not parse.
    pub fn lshw(&mut self) -> Option<&LshwReport> {
        let host = self.host;
        self.cache
            .lshw
            .get_or_insert_with(|| {
                let raw = host.run("lshw -xml", LSHW_TIMEOUT).into_stdout();
                if raw.trim().is_empty() {
                    debug!("lshw produced no output");
                    return None;
                }
                match LshwReport::parse(raw.trim()) {
                    Ok(report) => Some(report),
                    Err(e) => {
                        warn!(error = %e, "ignoring unparseable lshw output");
                        None
                    }
                }
            })
            .as_ref()
    }

    pub fn blkid(&mut self) -> &str {
        let host = self.host;
        self.cache
            .blkid
            .get_or_insert_with(|| host.run("blkid", BLKID_TIMEOUT).into_stdout())
    }

    pub fn read_trimmed(&self, path: &Path) -> Option<String> {
        crate::host::read_trimmed(self.host, path)
    }
}
