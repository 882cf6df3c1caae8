//! Freshness-based node liveness classification.
//!
//! The same three thresholds gate every consumer of node status: the CLI
//! status view, the server dashboards, and the firmware-side connection
//! monitors all must agree on when a node stops being "online". This module
//! is the single implementation they share; the thresholds appear nowhere
//! else in the codebase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connectivity freshness of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Liveness {
    /// Heard from within the online window.
    Online,
    /// Contact is stale but not yet lost.
    Warning,
    /// No contact for at least the offline threshold.
    Offline,
    /// The registry has no last-contact timestamp at all.
    NeverSeen,
}

impl Liveness {
    /// Human-readable label for operator output.
    pub fn label(self) -> &'static str {
        match self {
            Liveness::Online => "ONLINE",
            Liveness::Warning => "WARNING",
            Liveness::Offline => "OFFLINE",
            Liveness::NeverSeen => "NEVER SEEN",
        }
    }
}

/// Elapsed-seconds thresholds separating the liveness states.
///
/// Lower bounds are inclusive: elapsed exactly `online_s` is already
/// `Warning`, exactly `offline_s` is already `Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LivenessThresholds {
    /// Below this many seconds the node is online.
    pub online_s: f64,
    /// At or beyond this many seconds the node is offline.
    pub offline_s: f64,
}

impl Default for LivenessThresholds {
    fn default() -> Self {
        Self {
            online_s: 20.0,
            offline_s: 40.0,
        }
    }
}

/// Classify elapsed seconds since last contact.
pub fn classify_elapsed(elapsed_s: f64, thresholds: &LivenessThresholds) -> Liveness {
    if elapsed_s < thresholds.online_s {
        Liveness::Online
    } else if elapsed_s < thresholds.offline_s {
        Liveness::Warning
    } else {
        Liveness::Offline
    }
}

/// Classify a node given its optional last-contact timestamp.
pub fn classify_last_seen(
    last_seen_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    thresholds: &LivenessThresholds,
) -> Liveness {
    match last_seen_at {
        None => Liveness::NeverSeen,
        Some(seen) => {
            let elapsed_s = (now - seen).num_milliseconds() as f64 / 1000.0;
            classify_elapsed(elapsed_s, thresholds)
        }
    }
}

/// Read-only liveness view over one registry descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLivenessSnapshot {
    pub node_id: String,
    pub last_seen_at: Option<DateTime<Utc>>,
    /// Seconds since last contact at snapshot time; `None` if never seen.
    pub elapsed_s: Option<f64>,
    pub liveness: Liveness,
}

impl NodeLivenessSnapshot {
    pub fn new(
        node_id: &str,
        last_seen_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        thresholds: &LivenessThresholds,
    ) -> Self {
        let elapsed_s = last_seen_at.map(|seen| (now - seen).num_milliseconds() as f64 / 1000.0);
        Self {
            node_id: node_id.to_owned(),
            last_seen_at,
            elapsed_s,
            liveness: classify_last_seen(last_seen_at, now, thresholds),
        }
    }
}
