//! Server boundary for hydroflow nodes.
//!
//! This crate owns everything that crosses the wire to the hydroponics
//! server: telemetry and event records, the blocking HTTP client for the
//! sink and registry endpoints, the fire-and-forget emitter the control
//! loop talks to, and the liveness classification applied to registry
//! snapshots.
//!
//! Liveness thresholds live here and only here. Every consumer that wants
//! a node's online status calls [`classify_last_seen`]; re-deriving the
//! thresholds elsewhere is a correctness bug.

pub mod api;
pub mod emit;
pub mod error;
pub mod liveness;
pub mod records;

pub use api::{ApiClient, ApiConfig, NodeDescriptor};
pub use emit::Emitter;
pub use error::{LinkError, LinkResult};
pub use liveness::{
    classify_elapsed, classify_last_seen, Liveness, LivenessThresholds, NodeLivenessSnapshot,
};
pub use records::{EventPayload, EventRecord, ReadingPayload, Severity, TelemetryRecord};
