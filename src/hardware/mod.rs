// Hardware inventory collection modules
pub mod collect_basic;
pub mod collect_cpu;
pub mod collect_ipmi;
pub mod collect_memory;
pub mod collect_network;
pub mod collect_orchestration;
pub mod collect_raid;
pub mod collect_storage;
pub mod collector;
pub mod context;
pub mod identity;
pub mod types;

// Re-export the engine surface
pub use collect_orchestration::{NodeAttributes, OrchestrationContext};
pub use collector::{Collector, Inventory, Section, SectionFailure};
pub use context::RunContext;
pub use types::InventoryRecord;
