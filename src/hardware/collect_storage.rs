use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::CollectionError;
use crate::hardware::context::RunContext;
use crate::hardware::types::Disk;
use crate::host::link_basename;
use crate::parsers::fields;

const SMARTCTL_INFO_TIMEOUT: Duration = Duration::from_secs(5);

static MODEL_VENDOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Device Model:\s+([A-Za-z0-9]+)[_ ]").unwrap());
static BLKID_UUID: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bUUID="([^"]+)""#).unwrap());

/// One line of `smartctl --scan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDevice {
    /// Arguments for `smartctl -i`, e.g. `/dev/bus/0 -d megaraid,1`.
    pub query: String,
    pub dev: String,
    pub kind: String,
}

/// Entry point: every disk smartctl can identify.
///
/// Disks without a serial number are dropped; anything else that cannot be
/// read fails the whole section so no half-filled list is reported.
pub fn collect_disks(ctx: &mut RunContext) -> Result<Vec<Disk>, CollectionError> {
    if !ctx.host.has_command("smartctl") {
        return Err(CollectionError::MissingTool("smartctl"));
    }

    let devices = parse_scan(&ctx.run_default("smartctl --scan"))?;

    let mut disks = Vec::new();
    for device in devices {
        let info = ctx.run(&format!("smartctl -i {}", device.query), SMARTCTL_INFO_TIMEOUT);
        let Some(disk) = parse_disk_info(&device, &info)? else {
            debug!(device = %device.dev, query = %device.query, "dropping disk without serial number");
            continue;
        };
        let slot = read_scsi_slot(ctx, &disk.dev);
        let fs_uuid = find_fs_uuid(ctx.blkid(), &disk.dev);
        disks.push(Disk {
            slot,
            fs_uuid,
            ..disk
        });
    }

    Ok(disks)
}

/// `/dev/bus/0 -d megaraid,0 # /dev/bus/0 [megaraid_disk_00], SCSI device`
pub fn parse_scan(text: &str) -> Result<Vec<ScannedDevice>, CollectionError> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            let malformed = || CollectionError::Malformed {
                tool: "smartctl --scan",
                reason: format!("unexpected line `{}`", line),
            };
            let (args, comment) = line.split_once('#').ok_or_else(malformed)?;
            let mut described = comment.split(',');
            let dev = described
                .next()
                .and_then(|d| d.split_whitespace().next())
                .ok_or_else(malformed)?;
            let kind = described.next().map(str::trim).ok_or_else(malformed)?;
            Ok(ScannedDevice {
                query: args.replace("-d scsi", "").trim().to_string(),
                dev: dev.to_string(),
                kind: kind.to_string(),
            })
        })
        .collect()
}

/// Fields from `smartctl -i`. `Ok(None)` when the device has no serial.
pub fn parse_disk_info(device: &ScannedDevice, info: &str) -> Result<Option<Disk>, CollectionError> {
    let Some(serial_number) = fields::first_field(info, &["Serial Number", "Serial number"]) else {
        return Ok(None);
    };

    let product = fields::first_field(info, &["Device Model", "Product"]).ok_or(
        CollectionError::MissingField {
            tool: "smartctl",
            field: "Product",
        },
    )?;

    let capacity = fields::field(info, "User Capacity").ok_or(CollectionError::MissingField {
        tool: "smartctl",
        field: "User Capacity",
    })?;
    let size = parse_capacity(&capacity)?;

    let vendor_name = fields::field(info, "Vendor").or_else(|| {
        MODEL_VENDOR
            .captures(info)
            .map(|c| c[1].to_string())
    });

    Ok(Some(Disk {
        dev: device.dev.clone(),
        kind: device.kind.clone(),
        vendor_name,
        product,
        serial_number,
        size,
        slot: None,
        fs_uuid: None,
    }))
}

/// `959,656,755,200 bytes [959 GB]` -> 959656755200
pub fn parse_capacity(value: &str) -> Result<u64, CollectionError> {
    let digits: String = value
        .split("bytes")
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '.' && *c != '\u{a0}')
        .collect();
    digits.parse().map_err(|_| CollectionError::Unparseable {
        what: "disk capacity",
        value: value.to_string(),
    })
}

/// SCSI address (`5:0:0:0`) of a conventional block device.
fn read_scsi_slot(ctx: &RunContext, dev: &str) -> Option<String> {
    if !dev.starts_with("/dev/sd") {
        return None;
    }
    let name = Path::new(dev).file_name()?.to_str()?;
    link_basename(ctx.host, &Path::new("/sys/class/block").join(name).join("device"))
}

pub fn find_fs_uuid(blkid: &str, dev: &str) -> Option<String> {
    blkid
        .lines()
        .find(|line| line.contains(dev))
        .and_then(|line| BLKID_UUID.captures(line))
        .map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN: &str = include_str!("../../tests/fixtures/smartctl/scan.txt");

    #[test]
    fn scan_lines_yield_query_dev_and_kind() {
        let devices = parse_scan(SCAN).unwrap();
        assert_eq!(devices.len(), 7);
        assert_eq!(devices[0].query, "/dev/sda");
        assert_eq!(devices[0].dev, "/dev/sda");
        assert_eq!(devices[0].kind, "SCSI device");
        assert_eq!(devices[4].query, "/dev/sde -d sat");
        assert_eq!(devices[4].kind, "ATA device");
        assert_eq!(devices[5].query, "/dev/bus/0 -d megaraid,0");
        assert_eq!(devices[5].dev, "/dev/bus/0");
    }

    #[test]
    fn malformed_scan_line_is_an_error() {
        assert!(parse_scan("garbage without a comment\n").is_err());
    }

    #[test]
    fn vendor_falls_back_to_model_prefix() {
        let device = ScannedDevice {
            query: "/dev/bus/0 -d megaraid,0".into(),
            dev: "/dev/bus/0".into(),
            kind: "SCSI device".into(),
        };
        let info = include_str!("../../tests/fixtures/smartctl/megaraid0.txt");
        let disk = parse_disk_info(&device, info).unwrap().unwrap();
        assert_eq!(disk.vendor_name.as_deref(), Some("Crucial"));
        assert_eq!(disk.product, "Crucial_CT960M500SSD1");
        assert_eq!(disk.size, 960197124096);
    }

    #[test]
    fn sas_vendor_field_is_preferred() {
        let device = ScannedDevice {
            query: "/dev/sda".into(),
            dev: "/dev/sda".into(),
            kind: "SCSI device".into(),
        };
        let info = include_str!("../../tests/fixtures/smartctl/sda.txt");
        let disk = parse_disk_info(&device, info).unwrap().unwrap();
        assert_eq!(disk.vendor_name.as_deref(), Some("DELL"));
        assert_eq!(disk.product, "PERC H710P");
        assert_eq!(disk.serial_number, "004db85d065c635f1d00e33c2320344a");
    }

    #[test]
    fn disk_without_serial_is_none() {
        let device = ScannedDevice {
            query: "/dev/sde -d sat".into(),
            dev: "/dev/sde".into(),
            kind: "ATA device".into(),
        };
        let info = include_str!("../../tests/fixtures/smartctl/sde.txt");
        assert_eq!(parse_disk_info(&device, info).unwrap(), None);
    }

    #[test]
    fn capacity_strips_separators_and_unit() {
        assert_eq!(parse_capacity("4,000,787,030,016 bytes [4.00 TB]").unwrap(), 4000787030016);
        assert!(parse_capacity("unknown").is_err());
    }

    #[test]
    fn uuid_comes_from_first_matching_blkid_line() {
        let blkid = include_str!("../../tests/fixtures/blkid.txt");
        assert_eq!(
            find_fs_uuid(blkid, "/dev/sdb").as_deref(),
            Some("3f6e2a10-77c4-4b1e-8f0a-5d2c9b8e7a61")
        );
        assert_eq!(
            find_fs_uuid(blkid, "/dev/sda").as_deref(),
            Some("8d9c3f4b-1a2b-4c5d-9e8f-0a1b2c3d4e5f")
        );
        assert_eq!(find_fs_uuid(blkid, "/dev/bus/0"), None);
    }
}
