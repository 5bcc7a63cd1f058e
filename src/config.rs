use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::hardware::{NodeAttributes, OrchestrationContext};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// `config.yaml` for the agent.
///
/// ```yaml
/// endpoint: https://inventory.example.com
/// api_token: s3cret
/// node_context: /var/chef/cache/node.json
/// http_timeout_secs: 10
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub endpoint: Option<String>,
    pub api_token: Option<String>,
    /// JSON node attributes written by the orchestration agent.
    pub node_context: Option<PathBuf>,
    pub http_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            endpoint: None,
            api_token: None,
            node_context: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// `~/.config/inventory-agent/config.yaml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("inventory-agent").join("config.yaml"))
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An explicit path must exist; a missing default file means defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Command-line values win over the file.
    pub fn override_with(
        mut self,
        endpoint: Option<String>,
        api_token: Option<String>,
        node_context: Option<PathBuf>,
    ) -> Self {
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        if api_token.is_some() {
            self.api_token = api_token;
        }
        if node_context.is_some() {
            self.node_context = node_context;
        }
        self
    }

    pub fn endpoint(&self) -> Result<&str, ConfigError> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or(ConfigError::Missing("endpoint"))
    }

    pub fn api_token(&self) -> Result<&str, ConfigError> {
        self.api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("api_token"))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn orchestration_context(&self) -> Result<OrchestrationContext, ConfigError> {
        match &self.node_context {
            Some(path) => load_node_context(path),
            None => Ok(OrchestrationContext::Unavailable),
        }
    }
}

pub fn load_node_context(path: &Path) -> Result<OrchestrationContext, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let attrs: NodeAttributes =
        serde_json::from_str(&text).map_err(|e| ConfigError::NodeContext {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(OrchestrationContext::Supplied(attrs))
}
