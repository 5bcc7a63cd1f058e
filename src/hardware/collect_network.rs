use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::CollectionError;
use crate::hardware::context::RunContext;
use crate::hardware::types::{InterfaceAddress, NetworkInterface};
use crate::host::link_basename;
use crate::parsers::fields;

const SYS_CLASS_NET: &str = "/sys/class/net";

/// Interface name prefixes that never describe a physical port.
const VIRTUAL_PREFIXES: &[&str] = &[
    "lo",      // loopback
    "veth",    // virtual ethernet (Docker, etc.)
    "docker",  // Docker bridge
    "br-",     // bridge interfaces
    "virbr",   // libvirt bridge
    "vnet",    // libvirt guest taps
    "cni",     // Container Network Interface
    "flannel", // Kubernetes flannel
    "cali",    // Calico
    "kube",    // Kubernetes interfaces
    "tun",     // tunnel interfaces
    "tap",     // tap interfaces
    "vmnet",   // VMware interfaces
];

/// Entry point: one record per non-virtual interface, in kernel order.
pub fn collect_network_interfaces(
    ctx: &mut RunContext,
) -> Result<Vec<NetworkInterface>, CollectionError> {
    let links = parse_ip_addr(&ctx.run_default("ip -j addr show"))?;

    let mut interfaces = Vec::new();
    for link in links {
        if is_virtual_interface(&link.ifname) {
            continue;
        }
        let iface = build_interface(ctx, link);
        debug!(iface = %iface.name, status = ?iface.status, "collected interface");
        interfaces.push(iface);
    }

    Ok(interfaces)
}

fn build_interface(ctx: &mut RunContext, link: IpLink) -> NetworkInterface {
    let name = link.ifname;
    let sys = Path::new(SYS_CLASS_NET).join(&name);

    let mut addresses: Vec<InterfaceAddress> = link
        .addr_info
        .iter()
        .filter_map(AddrInfo::to_address)
        .collect();
    attach_lease_expiry(ctx, &name, &mut addresses);

    let status = ctx.read_trimmed(&sys.join("operstate"));
    let (speed, duplex) = if status.as_deref() == Some("up") {
        (read_speed(ctx, &sys), ctx.read_trimmed(&sys.join("duplex")))
    } else {
        (None, None)
    };

    let (driver, driver_version) = read_driver(ctx, &name);

    let (mut product, mut vendor_name) = read_pci_identity(ctx, &sys);
    let lshw = ctx.lshw().and_then(|r| r.network_interface(&name)).cloned();
    if product.is_none() && vendor_name.is_none() {
        if let Some(l) = &lshw {
            product = l.product.clone();
            vendor_name = l.vendor_name.clone();
        }
    }
    let link_type = lshw.and_then(|l| l.link_type);

    NetworkInterface {
        mac_address: read_mac_address(ctx, &name, &sys),
        neighbor: ctx.neighbor(&name),
        name,
        status,
        addresses,
        speed,
        duplex,
        driver,
        driver_version,
        product,
        vendor_name,
        link_type,
    }
}

pub fn is_virtual_interface(name: &str) -> bool {
    VIRTUAL_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Bond slaves all report the bond's MAC in `address`; the card's own MAC is
/// kept in `bonding_slave/perm_hwaddr`.
fn read_mac_address(ctx: &RunContext, name: &str, sys: &Path) -> Option<String> {
    let perm = sys.join("bonding_slave/perm_hwaddr");
    if !name.starts_with("bond") && ctx.host.exists(&perm) {
        if let Some(mac) = ctx.read_trimmed(&perm) {
            return Some(mac);
        }
    }
    ctx.read_trimmed(&sys.join("address"))
}

/// Link speed in bits per second. No carrier means 0.
fn read_speed(ctx: &RunContext, sys: &Path) -> Option<u64> {
    if ctx.read_trimmed(&sys.join("carrier")).as_deref() == Some("0") {
        return Some(0);
    }
    let mbps = ctx.read_trimmed(&sys.join("speed"))?.parse::<i64>().ok()?;
    // Drivers report -1 when the speed is unknown.
    u64::try_from(mbps).ok().map(|m| m * 1_000_000)
}

fn read_driver(ctx: &RunContext, name: &str) -> (Option<String>, Option<String>) {
    let out = ctx.run_default(&format!("ethtool --driver {}", name));
    (fields::field(&out, "driver"), fields::field(&out, "version"))
}

/// `(product, vendor)` from lspci, when the interface is backed by a PCI device.
fn read_pci_identity(ctx: &RunContext, sys: &Path) -> (Option<String>, Option<String>) {
    let device: PathBuf = sys.join("device");
    if !ctx.host.exists(&device) {
        return (None, None);
    }
    let Some(bus_address) = link_basename(ctx.host, &device) else {
        return (None, None);
    };
    let out = ctx.run_default(&format!("lspci -v -mm -s {}", bus_address));
    (fields::field(&out, "Device"), fields::field(&out, "Vendor"))
}

fn attach_lease_expiry(ctx: &mut RunContext, name: &str, addresses: &mut [InterfaceAddress]) {
    let Some(lease) = ctx.leases().get(name) else {
        return;
    };
    let (Some(fixed), Some(expire)) = (&lease.fixed_address, lease.expire) else {
        return;
    };
    for addr in addresses.iter_mut().filter(|a| &a.address == fixed) {
        addr.lease_expires_at = Some(expire.format("%Y-%m-%dT%H:%M:%SZ").to_string());
    }
}

//
// IP addresses via `ip -j addr show`
//

#[derive(Debug, Deserialize)]
pub struct IpLink {
    pub ifname: String,
    #[serde(default)]
    pub addr_info: Vec<AddrInfo>,
}

#[derive(Debug, Deserialize)]
pub struct AddrInfo {
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub local: Option<String>,
    #[serde(default)]
    pub prefixlen: u8,
}

impl AddrInfo {
    fn to_address(&self) -> Option<InterfaceAddress> {
        let local = self.local.as_deref()?;
        let address = local.split('%').next().unwrap_or(local).to_string();
        let netmask = prefix_to_netmask(&self.family, self.prefixlen)?;
        Some(InterfaceAddress {
            address,
            netmask,
            lease_expires_at: None,
        })
    }
}

pub fn parse_ip_addr(json: &str) -> Result<Vec<IpLink>, CollectionError> {
    if json.trim().is_empty() {
        return Err(CollectionError::Malformed {
            tool: "ip",
            reason: "no output".to_string(),
        });
    }
    serde_json::from_str(json).map_err(|e| CollectionError::Malformed {
        tool: "ip",
        reason: e.to_string(),
    })
}

/// `inet`/24 -> `255.255.255.0`, `inet6`/64 -> `ffff:ffff:ffff:ffff::`.
pub fn prefix_to_netmask(family: &str, prefix: u8) -> Option<String> {
    match family {
        "inet" if prefix <= 32 => {
            let bits = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            Some(Ipv4Addr::from(bits).to_string())
        }
        "inet6" if prefix <= 128 => {
            let bits = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            Some(Ipv6Addr::from(bits).to_string())
        }
        _ => None,
    }
}
