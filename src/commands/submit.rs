use std::path::PathBuf;

use anyhow::Context;
use inventory_agent::config::AgentConfig;
use inventory_agent::hardware::Collector;
use inventory_agent::{HttpTransport, LinuxHost, SubmissionClient, SubmitError};
use tracing::error;

use crate::output::{print_info, print_success, print_warning};

pub struct SubmitArgs {
    pub config: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub api_token: Option<String>,
    pub node_context: Option<PathBuf>,
}

pub fn handle_submit_command(args: SubmitArgs) -> anyhow::Result<()> {
    let config = AgentConfig::resolve(args.config.as_deref())?.override_with(
        args.endpoint,
        args.api_token,
        args.node_context,
    );
    let endpoint = config.endpoint()?;
    let api_token = config.api_token()?;
    let orchestration = config.orchestration_context()?;

    print_info("Collecting hardware inventory...");
    let collector = Collector::new(Box::new(LinuxHost), orchestration).with_error_handler(
        |section, e| print_warning(&format!("{} section skipped: {}", section, e)),
    );
    let inventory = collector
        .collect()
        .context("inventory collection aborted")?;

    print_info(&format!("Submitting {} to {}", inventory.sku, endpoint));
    let result = HttpTransport::new(endpoint, api_token, config.http_timeout())
        .and_then(|transport| {
            SubmissionClient::new(transport).submit(&inventory.sku, &inventory.record)
        });

    match result {
        Ok(()) => {
            print_success(&format!("Inventory for {} submitted", inventory.sku));
            Ok(())
        }
        // Reporting is best effort; an unreachable API is not a failed run.
        Err(SubmitError::Transport(reason)) => {
            error!(%reason, "could not reach inventory API");
            print_warning(&format!("inventory API unreachable: {}", reason));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
