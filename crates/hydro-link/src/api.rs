//! Blocking HTTP client for the telemetry sink and node registry.
//!
//! The sink and registry share one API base (`{base}/telemetry`,
//! `{base}/events`, `{base}/nodes`). Success is any 2xx status; everything
//! else — transport errors, timeouts, non-2xx — is a delivery failure.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LinkError, LinkResult};
use crate::records::{EventRecord, TelemetryRecord};

/// Connection parameters for the hydroponics server API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL including scheme and port, e.g. `http://localhost:3000/api`.
    pub base_url: String,
    /// Per-request timeout. The control loop blocks at most this long per
    /// emission.
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// One node as the registry reports it.
///
/// The registry's own `online` flag is informational only; consumers
/// recompute liveness from `last_seen_at` (see [`crate::liveness`]) and
/// treat the recomputed value as authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub node_id: String,
    #[serde(default)]
    pub node_type: String,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub online: bool,
}

/// Blocking client over the server API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> LinkResult<Self> {
        if config.base_url.is_empty() {
            return Err(LinkError::Config {
                what: "base URL must not be empty",
            });
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Deliver one telemetry record to the sink.
    pub fn post_telemetry(&self, record: &TelemetryRecord) -> LinkResult<()> {
        self.post_json("/telemetry", record)
    }

    /// Deliver one event record to the sink.
    pub fn post_event(&self, record: &EventRecord) -> LinkResult<()> {
        self.post_json("/events", record)
    }

    /// Fetch the current node registry snapshot.
    pub fn fetch_nodes(&self) -> LinkResult<Vec<NodeDescriptor>> {
        let path = "/nodes";
        let response = self.http.get(self.url(path)).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::Status {
                path,
                status: status.as_u16(),
            });
        }
        Ok(response.json()?)
    }

    /// Cheap reachability probe against the registry endpoint.
    pub fn ping(&self) -> LinkResult<()> {
        let path = "/nodes";
        let response = self.http.get(self.url(path)).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::Status {
                path,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn post_json<T: Serialize>(&self, path: &'static str, body: &T) -> LinkResult<()> {
        let response = self.http.post(self.url(path)).json(body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::Status {
                path,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_base_url_rejected() {
        let err = ApiClient::new(&ApiConfig::new("")).unwrap_err();
        assert!(matches!(err, LinkError::Config { .. }));
    }

    #[test]
    fn trailing_slash_normalized() {
        let client = ApiClient::new(&ApiConfig::new("http://localhost:3000/api/")).unwrap();
        assert_eq!(client.url("/nodes"), "http://localhost:3000/api/nodes");
    }

    #[test]
    fn node_descriptor_tolerates_missing_fields() {
        let node: NodeDescriptor =
            serde_json::from_str(r#"{"node_id": "ph_3f0c00"}"#).unwrap();
        assert_eq!(node.node_id, "ph_3f0c00");
        assert_eq!(node.last_seen_at, None);
        assert!(!node.online);
    }

    #[test]
    fn node_descriptor_parses_timestamps() {
        let node: NodeDescriptor = serde_json::from_str(
            r#"{"node_id": "ph_3f0c00", "node_type": "ph",
                "last_seen_at": "2024-10-20T12:00:00Z", "online": true}"#,
        )
        .unwrap();
        assert!(node.last_seen_at.is_some());
        assert!(node.online);
    }
}
