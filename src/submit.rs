//! Delivery of a finished record to the inventory API.
//!
//! The record is upserted by identity key: `PATCH /api/devices/{sku}`, and when
//! the API does not know the device yet (404 or 422) a bare device is created
//! with `POST /api/devices` before the PATCH is repeated once, whatever the
//! POST answered.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::SubmitError;
use crate::hardware::types::{InventoryRecord, RECORD_TYPE};

pub const USER_AGENT: &str = concat!("inventory-agent/", env!("CARGO_PKG_VERSION"));
pub const DEVICES_PATH: &str = "/api/devices";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Patch,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Patch => "PATCH",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authenticated JSON request; returns the HTTP status.
pub trait Transport {
    fn send(&self, method: Method, path: &str, body: &Value) -> Result<u16, SubmitError>;
}

pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, api_token: &str, timeout: Duration) -> Result<Self, SubmitError> {
        let mut auth = HeaderValue::from_str(&format!("Token token=\"{}\"", api_token))
            .map_err(|e| SubmitError::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, method: Method, path: &str, body: &Value) -> Result<u16, SubmitError> {
        let url = format!("{}{}", self.endpoint, path);
        let request = match method {
            Method::Patch => self.client.patch(&url),
            Method::Post => self.client.post(&url),
        };
        debug!(%method, %url, "sending request");
        let response = request
            .json(body)
            .send()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}

pub struct SubmissionClient<T: Transport> {
    transport: T,
}

impl<T: Transport> SubmissionClient<T> {
    pub fn new(transport: T) -> Self {
        SubmissionClient { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn submit(&self, sku: &str, record: &InventoryRecord) -> Result<(), SubmitError> {
        let body = serde_json::to_value(record)?;
        let device_path = format!("{}/{}", DEVICES_PATH, sku);

        let status = self.transport.send(Method::Patch, &device_path, &body)?;
        if is_success(status) {
            info!(%sku, "inventory updated");
            return Ok(());
        }
        if status != 404 && status != 422 {
            return Err(rejected(Method::Patch, &device_path, status));
        }

        info!(%sku, status, "device unknown to the API, creating it");
        let placeholder = json!({ "sku": sku, "type": RECORD_TYPE });
        let status = self.transport.send(Method::Post, DEVICES_PATH, &placeholder)?;
        if !is_success(status) {
            warn!(%sku, status, "device creation refused, retrying update anyway");
        }

        let status = self.transport.send(Method::Patch, &device_path, &body)?;
        if !is_success(status) {
            return Err(rejected(Method::Patch, &device_path, status));
        }
        info!(%sku, "inventory created");
        Ok(())
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn rejected(method: Method, path: &str, status: u16) -> SubmitError {
    SubmitError::Rejected {
        method: method.as_str(),
        path: path.to_string(),
        status,
    }
}
