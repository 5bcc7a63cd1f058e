use tracing::{debug, warn};

use crate::error::CollectionError;
use crate::hardware::context::RunContext;
use crate::hardware::types::MemoryModule;
use crate::parsers::dmidecode::DmiRecord;
use crate::parsers::lshw::LshwMemory;

const EMPTY_SLOT: &str = "No Module Installed";

/// Entry point: DIMM slots from the firmware tables, populated or not.
///
/// Flash devices (the BIOS ROM) also show up as memory devices and are
/// skipped. Without any memory device structure the banks come from `lshw`.
pub fn collect_memories(ctx: &mut RunContext) -> Result<Vec<MemoryModule>, CollectionError> {
    let records = ctx.dmi_tables().section("memory_device");
    if !records.is_empty() {
        return Ok(modules_from_records(records));
    }
    debug!("no memory devices in firmware tables, using lshw");
    Ok(ctx
        .lshw()
        .map(|report| report.memories.iter().map(module_from_lshw).collect())
        .unwrap_or_default())
}

/// A device whose size cannot be read is left out; the rest are kept.
fn modules_from_records(records: &[DmiRecord]) -> Vec<MemoryModule> {
    records
        .iter()
        .filter(|r| !r.get("type").is_some_and(|t| t.eq_ignore_ascii_case("flash")))
        .filter_map(|record| match module_from_record(record) {
            Ok(module) => Some(module),
            Err(e) => {
                warn!(handle = record.handle, error = %e, "skipping memory device");
                None
            }
        })
        .collect()
}

fn module_from_record(record: &DmiRecord) -> Result<MemoryModule, CollectionError> {
    let size = record.get("size").ok_or(CollectionError::MissingField {
        tool: "dmidecode",
        field: "Size",
    })?;
    let form_factor = record.get("form_factor").unwrap_or("Unknown");
    let bank = record.get("bank_locator").map(str::to_string);
    let slot = record.get("locator").map(str::to_string);

    if size == EMPTY_SLOT {
        return Ok(MemoryModule {
            size: 0,
            description: format!("Empty {}", form_factor),
            bank,
            slot,
            product: None,
            vendor_name: None,
            serial_number: None,
        });
    }

    let description = [Some(form_factor), record.get("type_detail"), record.get("speed")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    Ok(MemoryModule {
        size: parse_size(size)?,
        description,
        bank,
        slot,
        product: record.get("part_number").map(str::to_string),
        vendor_name: record.get("manufacturer").map(str::to_string),
        serial_number: record.get("serial_number").map(str::to_string),
    })
}

fn module_from_lshw(bank: &LshwMemory) -> MemoryModule {
    MemoryModule {
        size: bank.size,
        description: bank.description.clone().unwrap_or_default(),
        bank: bank.bank.map(|b| b.to_string()),
        slot: bank.slot.clone(),
        product: bank.product.clone(),
        vendor_name: bank.vendor_name.clone(),
        serial_number: None,
    }
}

/// `16384 MB` or `32 GB` to bytes.
pub fn parse_size(value: &str) -> Result<u64, CollectionError> {
    let unparseable = || CollectionError::Unparseable {
        what: "memory size",
        value: value.to_string(),
    };
    let mut parts = value.split_whitespace();
    let amount: u64 = parts
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(unparseable)?;
    let scale = match parts.next() {
        Some("MB") => 1_000_000,
        Some("GB") => 1_000_000_000,
        _ => return Err(unparseable()),
    };
    Ok(amount * scale)
}
