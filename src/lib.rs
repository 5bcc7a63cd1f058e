//! Server inventory agent: collects a normalized description of the machine
//! from firmware, kernel and bus tools and upserts it into the inventory API.

pub mod config;
pub mod error;
pub mod hardware;
pub mod host;
pub mod parsers;
pub mod submit;

pub use error::{CollectError, CollectionError, ConfigError, IdentityError, SubmitError};
pub use hardware::{Collector, Inventory, InventoryRecord, OrchestrationContext, Section};
pub use host::{CommandOutcome, Host, LinuxHost};
pub use submit::{HttpTransport, SubmissionClient, Transport};
