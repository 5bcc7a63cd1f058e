//! Canned machine for driving collectors against captured tool output.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use inventory_agent::{CommandOutcome, Host};

pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing fixture {}: {}", path.display(), e))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub command: String,
    pub timeout: Duration,
}

/// Commands not registered print nothing, like a missing tool.
#[derive(Debug, Default)]
pub struct FakeHost {
    commands: HashMap<String, CommandOutcome>,
    files: HashMap<PathBuf, String>,
    links: HashMap<PathBuf, PathBuf>,
    globs: HashMap<String, Vec<PathBuf>>,
    hostname: Option<String>,
    tools: HashSet<String>,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(mut self, command: &str, stdout: impl Into<String>) -> Self {
        self.commands
            .insert(command.to_string(), CommandOutcome::Completed(stdout.into()));
        self
    }

    pub fn timing_out(mut self, command: &str) -> Self {
        self.commands
            .insert(command.to_string(), CommandOutcome::TimedOut);
        self
    }

    pub fn file(mut self, path: &str, content: impl Into<String>) -> Self {
        self.files.insert(PathBuf::from(path), content.into());
        self
    }

    pub fn link(mut self, path: &str, target: &str) -> Self {
        self.links.insert(PathBuf::from(path), PathBuf::from(target));
        self
    }

    pub fn glob_result(mut self, pattern: &str, paths: &[&str]) -> Self {
        self.globs
            .insert(pattern.to_string(), paths.iter().map(PathBuf::from).collect());
        self
    }

    pub fn hostname(mut self, name: &str) -> Self {
        self.hostname = Some(name.to_string());
        self
    }

    pub fn tool(mut self, name: &str) -> Self {
        self.tools.insert(name.to_string());
        self
    }

    pub fn without_tool(mut self, name: &str) -> Self {
        self.tools.remove(name);
        self
    }

    /// Shared handle on the call log; stays valid after the host is boxed.
    pub fn call_log(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.calls)
    }
}

pub fn count_calls(log: &Rc<RefCell<Vec<Call>>>, command: &str) -> usize {
    log.borrow().iter().filter(|c| c.command == command).count()
}

impl Host for FakeHost {
    fn run(&self, command: &str, timeout: Duration) -> CommandOutcome {
        self.calls.borrow_mut().push(Call {
            command: command.to_string(),
            timeout,
        });
        self.commands
            .get(command)
            .cloned()
            .unwrap_or_else(|| CommandOutcome::Completed(String::new()))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.links.contains_key(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.links
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        self.globs.get(pattern).cloned().unwrap_or_default()
    }

    fn hostname(&self) -> Option<String> {
        self.hostname.clone()
    }

    fn has_command(&self, name: &str) -> bool {
        self.tools.contains(name)
    }
}

/// A two-port Supermicro server with SAS, SATA and MegaRAID disks.
pub fn supermicro_host() -> FakeHost {
    use inventory_agent::hardware::collect_basic::{BOOT_TIME_COMMAND, NODE_POSITION_COMMAND};
    use inventory_agent::hardware::collect_orchestration::NODE_QUERY_COMMAND;
    use inventory_agent::hardware::collect_raid::{ADAPTER_INFO_COMMAND, LOGICAL_DISK_COMMAND};

    FakeHost::new()
        .hostname("node01")
        .command("hostname -f", "node01.lax.example.com\n")
        .command("dmidecode -s baseboard-manufacturer", "Supermicro\n")
        .command("dmidecode -s system-manufacturer", "Supermicro\n")
        .command("dmidecode -s chassis-manufacturer", "Supermicro\n")
        .command("dmidecode -s baseboard-serial-number", "34524623454\n")
        .command("dmidecode -s system-serial-number", "S212301X5A00123\n")
        .command("dmidecode -s system-product-name", "SYS-6018R-TDW\n")
        .command("dmidecode -s baseboard-product-name", "X10DDW-i\n")
        .command("dmidecode -s chassis-serial-number", "C8150LF44A10123\n")
        .command(
            "dmidecode --type processor --type memory",
            fixture("dmidecode.txt"),
        )
        .command(BOOT_TIME_COMMAND, "Mon Aug 31 09:56:15 UTC 2015\n")
        .command(NODE_POSITION_COMMAND, "B\n")
        .file("/etc/lsb-release", fixture("lsb-release"))
        .command("ipmitool lan print", fixture("ipmitool_lan_print.txt"))
        .command("ipmitool fru", fixture("ipmitool_fru.txt"))
        .command(NODE_QUERY_COMMAND, fixture("knife_node_show.json"))
        // network
        .command("ip -j addr show", fixture("ip_addr.json"))
        .command("lldpctl -f keyvalue", fixture("lldpctl_keyvalue.txt"))
        .command("lshw -xml", fixture("lshw.xml"))
        .glob_result(
            "/var/lib/dhcp/dhclient*.leases",
            &["/var/lib/dhcp/dhclient.eth0.leases"],
        )
        .command(
            "cat /var/lib/dhcp/dhclient.eth0.leases",
            fixture("dhclient.eth0.leases"),
        )
        .file("/sys/class/net/eth0/operstate", "up\n")
        .file("/sys/class/net/eth0/carrier", "1\n")
        .file("/sys/class/net/eth0/speed", "10000\n")
        .file("/sys/class/net/eth0/duplex", "full\n")
        .file("/sys/class/net/eth0/address", "0c:ca:ca:03:12:34\n")
        .link(
            "/sys/class/net/eth0/device",
            "../../../0000:06:00.0",
        )
        .command("ethtool --driver eth0", fixture("ethtool_driver_ixgbe.txt"))
        .command("lspci -v -mm -s 0000:06:00.0", fixture("lspci.txt"))
        .file("/sys/class/net/eth1/operstate", "down\n")
        .file("/sys/class/net/eth1/carrier", "0\n")
        .file("/sys/class/net/eth1/address", "0c:ca:ca:03:12:35\n")
        .command("ethtool --driver eth1", fixture("ethtool_driver_igb.txt"))
        // disks
        .tool("smartctl")
        .command("smartctl --scan", fixture("smartctl/scan.txt"))
        .command("smartctl -i /dev/sda", fixture("smartctl/sda.txt"))
        .command("smartctl -i /dev/sdb", fixture("smartctl/sdb.txt"))
        .command("smartctl -i /dev/sdc", fixture("smartctl/sdc.txt"))
        .command("smartctl -i /dev/sdd", fixture("smartctl/sdd.txt"))
        .command("smartctl -i /dev/sde -d sat", fixture("smartctl/sde.txt"))
        .command(
            "smartctl -i /dev/bus/0 -d megaraid,0",
            fixture("smartctl/megaraid0.txt"),
        )
        .command(
            "smartctl -i /dev/bus/0 -d megaraid,1",
            fixture("smartctl/megaraid1.txt"),
        )
        .link("/sys/class/block/sda/device", "../../../5:0:0:0")
        .link("/sys/class/block/sdb/device", "../../../5:0:1:0")
        .link("/sys/class/block/sdc/device", "../../../5:0:2:0")
        .link("/sys/class/block/sdd/device", "../../../5:0:3:0")
        .command("blkid", fixture("blkid.txt"))
        .command(ADAPTER_INFO_COMMAND, fixture("megacli/adp_all_info.txt"))
        .command(LOGICAL_DISK_COMMAND, fixture("megacli/ld_info.txt"))
}
