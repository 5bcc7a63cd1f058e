use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single section collector. Never fatal to the run.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("required tool `{0}` is not installed")]
    MissingTool(&'static str),

    #[error("{tool} output is missing required field `{field}`")]
    MissingField { tool: &'static str, field: &'static str },

    #[error("could not parse {what} from `{value}`")]
    Unparseable { what: &'static str, value: String },

    #[error("malformed {tool} output: {reason}")]
    Malformed { tool: &'static str, reason: String },
}

/// The hardware identity key could not be derived.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no usable serial number from baseboard, system or IPMI FRU")]
    NoSerial,
}

/// Fatal outcome of a collection run.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("unable to derive hardware identity key: {0}")]
    Identity(#[from] IdentityError),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("could not reach inventory API: {0}")]
    Transport(String),

    #[error("API token cannot be sent as a header: {0}")]
    InvalidToken(String),

    #[error("inventory API rejected {method} {path} with HTTP {status}")]
    Rejected {
        method: &'static str,
        path: String,
        status: u16,
    },

    #[error("failed to serialize inventory record: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid node context {path}: {reason}")]
    NodeContext { path: PathBuf, reason: String },

    #[error("no {0} configured")]
    Missing(&'static str),
}
