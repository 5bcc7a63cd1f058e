use std::path::Path;
use std::time::Duration;

use chrono::DateTime;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::CollectionError;
use crate::hardware::context::RunContext;
use crate::hardware::types::OrchestrationInfo;

pub const NODE_QUERY_COMMAND: &str = "knife node show `hostname` -c /etc/chef/client.rb \
     -a ohai_time -a run_list -a tags -a environment -a roles --format json";
const NODE_QUERY_TIMEOUT: Duration = Duration::from_secs(10);
const CURRENT_ENVIRONMENT: &str = "/etc/chef/current_environment";

/// Node attributes as published by the configuration-management agent.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct NodeAttributes {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "run_list_string")]
    pub run_list: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "environment")]
    pub chef_environment: Option<String>,
    #[serde(default)]
    pub ohai_time: Option<f64>,
}

/// Node context handed over by the invoking agent, decided once up front.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OrchestrationContext {
    Supplied(NodeAttributes),
    #[default]
    Unavailable,
}

/// Entry point. `Ok(None)` means no orchestration data exists on this host.
pub fn collect_orchestration_info(
    ctx: &mut RunContext,
) -> Result<Option<OrchestrationInfo>, CollectionError> {
    let attrs = match ctx.orchestration {
        OrchestrationContext::Supplied(attrs) => attrs.clone(),
        OrchestrationContext::Unavailable => match query_node(ctx)? {
            Some(attrs) => attrs,
            None => return Ok(None),
        },
    };

    let environment = attrs
        .chef_environment
        .clone()
        .or_else(|| {
            ctx.read_trimmed(Path::new(CURRENT_ENVIRONMENT))
                .map(|e| e.split_whitespace().collect::<String>())
        })
        .unwrap_or_else(|| "unknown".to_string());

    Ok(Some(OrchestrationInfo {
        environment,
        roles: attrs.roles,
        run_list: attrs.run_list,
        tags: attrs.tags,
        last_run: attrs.ohai_time.and_then(format_epoch),
    }))
}

fn query_node(ctx: &RunContext) -> Result<Option<NodeAttributes>, CollectionError> {
    let out = ctx.run(NODE_QUERY_COMMAND, NODE_QUERY_TIMEOUT);
    if out.trim().is_empty() {
        debug!("node query returned nothing, omitting orchestration data");
        return Ok(None);
    }
    parse_node_show(&out).map(Some)
}

/// `knife node show --format json` prints `{ "<node name>": { ...attrs } }`.
pub fn parse_node_show(json: &str) -> Result<NodeAttributes, CollectionError> {
    let malformed = |reason: String| CollectionError::Malformed {
        tool: "knife",
        reason,
    };
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
    let node = value
        .as_object()
        .and_then(|o| o.values().next())
        .ok_or_else(|| malformed("expected an object keyed by node name".to_string()))?;
    NodeAttributes::deserialize(node).map_err(|e| malformed(e.to_string()))
}

/// Epoch seconds to `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_epoch(secs: f64) -> Option<String> {
    DateTime::from_timestamp(secs.trunc() as i64, 0)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn run_list_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RunList {
        Joined(String),
        Items(Vec<String>),
    }

    Ok(match Option::<RunList>::deserialize(deserializer)? {
        Some(RunList::Joined(s)) => s,
        Some(RunList::Items(items)) => items.join(", "),
        None => String::new(),
    })
}
