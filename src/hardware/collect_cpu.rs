use tracing::{debug, warn};

use crate::error::CollectionError;
use crate::hardware::context::RunContext;
use crate::hardware::types::Cpu;
use crate::parsers::dmidecode::DmiRecord;
use crate::parsers::lshw::LshwCpu;

/// Processor type reported by some boards for unpopulated or bogus sockets.
const OUT_OF_SPEC: &str = "OUT OF SPEC";

/// Entry point: one entry per processor structure in the firmware tables,
/// or per `lshw` processor node when the tables list none.
pub fn collect_cpus(ctx: &mut RunContext) -> Result<Vec<Cpu>, CollectionError> {
    let records = ctx.dmi_tables().section("processor");
    if !records.is_empty() {
        return Ok(cpus_from_records(records));
    }
    debug!("no processor structures in firmware tables, using lshw");
    Ok(ctx
        .lshw()
        .map(|report| report.cpus.iter().map(cpu_from_lshw).collect())
        .unwrap_or_default())
}

fn cpus_from_records(records: &[DmiRecord]) -> Vec<Cpu> {
    records
        .iter()
        .filter(|r| !is_out_of_spec(r))
        .filter_map(|record| match cpu_from_record(record) {
            Ok(cpu) => Some(cpu),
            Err(e) => {
                warn!(handle = record.handle, error = %e, "skipping processor");
                None
            }
        })
        .collect()
}

fn is_out_of_spec(record: &DmiRecord) -> bool {
    record
        .get("type")
        .is_some_and(|t| t.to_ascii_uppercase().contains(OUT_OF_SPEC))
}

fn cpu_from_record(record: &DmiRecord) -> Result<Cpu, CollectionError> {
    Ok(Cpu {
        description: record.get("version").map(str::to_string),
        cores: parse_count(record, "core_count")?,
        threads: parse_count(record, "thread_count")?,
        speed: record.get("current_speed").map(str::to_string),
        vendor_name: record.get("manufacturer").map(str::to_string),
        physid: record.get("socket_designation").map(str::to_string),
    })
}

fn cpu_from_lshw(cpu: &LshwCpu) -> Cpu {
    Cpu {
        description: cpu.description.clone(),
        cores: cpu.cores,
        threads: cpu.threads,
        speed: cpu.speed.map(|hz| format!("{} MHz", hz / 1_000_000)),
        vendor_name: cpu.vendor_name.clone(),
        physid: cpu.physid.map(|id| id.to_string()),
    }
}

fn parse_count(record: &DmiRecord, key: &'static str) -> Result<Option<u32>, CollectionError> {
    match record.get(key) {
        None => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| CollectionError::Unparseable {
            what: key,
            value: v.to_string(),
        }),
    }
}
