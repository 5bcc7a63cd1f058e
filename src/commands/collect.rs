use std::path::Path;

use inventory_agent::config;
use inventory_agent::hardware::{Collector, InventoryRecord, OrchestrationContext};
use inventory_agent::LinuxHost;
use serde::Serialize;

use crate::output::{output_data, print_warning};

#[derive(Serialize)]
struct Report<'a> {
    sku: &'a str,
    record: &'a InventoryRecord,
}

pub fn handle_collect_command(format: &str, node_context: Option<&Path>) -> anyhow::Result<()> {
    let orchestration = match node_context {
        Some(path) => config::load_node_context(path)?,
        None => OrchestrationContext::Unavailable,
    };

    let collector = Collector::new(Box::new(LinuxHost), orchestration).with_error_handler(
        |section, e| print_warning(&format!("{} section skipped: {}", section, e)),
    );
    let inventory = collector.collect()?;

    output_data(
        &Report {
            sku: &inventory.sku,
            record: &inventory.record,
        },
        format,
    )
}
