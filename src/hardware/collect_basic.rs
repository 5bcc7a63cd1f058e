use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::error::CollectionError;
use crate::hardware::context::RunContext;
use crate::hardware::identity::{vendor_code, BROKEN_SERIAL};
use crate::hardware::types::{BasicInfo, OsInfo};
use crate::parsers::fields;

const LSB_RELEASE: &str = "/etc/lsb-release";
const OS_RELEASE: &str = "/etc/os-release";
const UNKNOWN: &str = "unknown";

pub const BOOT_TIME_COMMAND: &str = "date -d \"`cut -f1 -d. /proc/uptime` seconds ago\" -u";
pub const NODE_POSITION_COMMAND: &str = "sudo ipmicfg -tp nodeid";

/// Entry point: host naming, OS release and firmware identifiers.
pub fn collect_basic_info(ctx: &mut RunContext) -> Result<BasicInfo, CollectionError> {
    let hostname = ctx.host.hostname();
    let fqdn = get_fqdn(ctx, hostname.as_deref());
    let os = get_os_info(ctx);
    let last_boot_at = get_last_boot_time(ctx);

    let vendor = ctx.read_dmi("system-manufacturer");
    let mut product = ctx.read_dmi("system-product-name");

    let mut properties = BTreeMap::new();
    let mut set = |key: &str, value: Option<String>| {
        if let Some(v) = value {
            properties.insert(key.to_string(), v);
        }
    };

    let system_serial = ctx
        .read_dmi("system-serial-number")
        .filter(|s| s != BROKEN_SERIAL);

    set("BASEBOARD_VENDOR", ctx.read_dmi("baseboard-manufacturer"));
    set("CHASSIS_VENDOR", ctx.read_dmi("chassis-manufacturer"));

    if system_serial.is_some() {
        set("SYSTEM_SERIAL_NUMBER", system_serial);
        set("BASEBOARD_PRODUCT_NAME", ctx.read_dmi("baseboard-product-name"));
        set("BASEBOARD_SERIAL_NUMBER", ctx.read_dmi("baseboard-serial-number"));
        set("CHASSIS_SERIAL_NUMBER", ctx.read_dmi("chassis-serial-number"));
    } else {
        // Firmware tables are unreliable on this board; take the whole
        // identity bundle from the BMC so the fields stay consistent.
        debug!("system serial unavailable, using IPMI FRU identifiers");
        let fru = ctx.ipmi_fru().to_string();
        product = fields::field(&fru, "Product Name");
        set("SYSTEM_SERIAL_NUMBER", fields::field(&fru, "Product Serial"));
        set("BASEBOARD_PRODUCT_NAME", fields::field(&fru, "Board Product"));
        set("BASEBOARD_SERIAL_NUMBER", fields::field(&fru, "Board Serial"));
        set("CHASSIS_SERIAL_NUMBER", fields::field(&fru, "Chassis Serial"));
    }

    if vendor.as_deref().map(vendor_code) == Some("SPM") {
        set("NODE_POSITION_IN_CHASSIS", read_node_position(ctx));
    }

    Ok(BasicInfo {
        hostname,
        fqdn,
        os,
        last_boot_at,
        product,
        vendor,
        properties,
    })
}

fn get_fqdn(ctx: &RunContext, hostname: Option<&str>) -> Option<String> {
    let resolved = ctx.run_default("hostname -f").trim().to_string();
    if !resolved.is_empty() {
        return Some(resolved);
    }
    hostname.filter(|h| h.contains('.')).map(|h| h.to_string())
}

/// Position of a blade in a multi-node chassis (e.g. `B`).
pub fn read_node_position(ctx: &RunContext) -> Option<String> {
    let out = ctx.run_default(NODE_POSITION_COMMAND);
    let value = out.trim();
    if value.is_empty() || value.contains("Not TwinPro") {
        None
    } else {
        Some(value.to_string())
    }
}

/// Boot time as UTC ISO-8601, from `date` output such as
/// `Mon Aug 31 09:56:15 UTC 2015`.
pub fn get_last_boot_time(ctx: &RunContext) -> Option<String> {
    let out = ctx.run_default(BOOT_TIME_COMMAND);
    let parsed = parse_date_output(&out);
    if parsed.is_none() && !out.trim().is_empty() {
        warn!(output = out.trim(), "could not parse boot time");
    }
    parsed
}

pub fn parse_date_output(out: &str) -> Option<String> {
    let normalized = out.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, "%a %b %d %H:%M:%S UTC %Y")
        .ok()
        .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn get_os_info(ctx: &RunContext) -> OsInfo {
    if let Some(text) = ctx.read_trimmed(Path::new(LSB_RELEASE)) {
        let kv = parse_release_file(&text);
        return OsInfo {
            distribution: lookup(&kv, "DISTRIB_ID"),
            release: lookup(&kv, "DISTRIB_RELEASE"),
            codename: lookup(&kv, "DISTRIB_CODENAME"),
            description: lookup(&kv, "DISTRIB_DESCRIPTION"),
        };
    }

    let kv = ctx
        .read_trimmed(Path::new(OS_RELEASE))
        .map(|t| parse_release_file(&t))
        .unwrap_or_default();
    OsInfo {
        distribution: lookup(&kv, "ID"),
        release: lookup(&kv, "VERSION_ID"),
        codename: lookup(&kv, "VERSION_CODENAME"),
        description: lookup(&kv, "PRETTY_NAME"),
    }
}

fn lookup(kv: &HashMap<String, String>, key: &str) -> String {
    kv.get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// `KEY=value` lines; values may be single- or double-quoted.
pub fn parse_release_file(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once('=')?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}
