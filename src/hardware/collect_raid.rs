use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::CollectionError;
use crate::hardware::context::RunContext;
use crate::hardware::types::RaidController;
use crate::parsers::fields;

const MEGACLI_TIMEOUT: Duration = Duration::from_secs(10);
pub const ADAPTER_INFO_COMMAND: &str = "megacli -AdpAllInfo -aAll";
pub const LOGICAL_DISK_COMMAND: &str = "megacli -LDInfo -Lall -aAll";

/// Shorter blocks are banners or the trailing exit code.
const MIN_LOGICAL_DISK_LINES: usize = 5;

/// Entry point. `Ok(None)` when no RAID adapter is reported.
pub fn collect_raid_controllers(
    ctx: &mut RunContext,
) -> Result<Option<Vec<RaidController>>, CollectionError> {
    let adapters = ctx.run(ADAPTER_INFO_COMMAND, MEGACLI_TIMEOUT);
    let adapters = split_adapters(&adapters, |l| l.starts_with("Adapter #"));
    if adapters.is_empty() {
        return Ok(None);
    }

    let logical = ctx.run(LOGICAL_DISK_COMMAND, MEGACLI_TIMEOUT);
    let mut logical = split_adapters(&logical, |l| l.contains("Virtual Drive Information"))
        .into_iter()
        .map(|chunk| parse_logical_disks(&chunk));

    let mut controllers = Vec::new();
    for adapter in adapters {
        let product = fields::field(&adapter, "Product Name").ok_or(
            CollectionError::MissingField {
                tool: "megacli",
                field: "Product Name",
            },
        )?;
        controllers.push(RaidController {
            product,
            firmware_package: fields::field(&adapter, "FW Package Build"),
            logical_disks: logical.next().unwrap_or_default(),
        });
    }
    Ok(Some(controllers))
}

/// Text following each adapter header line, one chunk per adapter.
fn split_adapters(text: &str, is_header: impl Fn(&str) -> bool) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    for line in text.lines() {
        if is_header(line.trim()) {
            chunks.push(String::new());
            continue;
        }
        if let Some(chunk) = chunks.last_mut() {
            chunk.push_str(line);
            chunk.push('\n');
        }
    }
    chunks
}

/// Blank-line separated `key : value` blocks, keys normalized like
/// `Number Of Drives` -> `number_of_drives`.
pub fn parse_logical_disks(text: &str) -> Vec<BTreeMap<String, String>> {
    text.split("\n\n")
        .map(|block| block.lines().filter(|l| !l.trim().is_empty()).collect::<Vec<_>>())
        .filter(|lines| lines.len() >= MIN_LOGICAL_DISK_LINES)
        .map(|lines| {
            lines
                .into_iter()
                .filter_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    let value = value.trim();
                    if value.is_empty() {
                        return None;
                    }
                    let key = key.split_whitespace().collect::<Vec<_>>().join("_");
                    Some((key.to_lowercase(), value.to_string()))
                })
                .collect()
        })
        .collect()
}
