//! Fire-and-forget emission boundary.
//!
//! The control loop must survive indefinite sink unavailability: delivery
//! failures are logged for the operator and the record is dropped. There is
//! no retry and no local buffering.

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::records::{EventRecord, TelemetryRecord};

/// Best-effort wrapper around [`ApiClient`] for the control loop.
#[derive(Debug, Clone)]
pub struct Emitter {
    client: ApiClient,
}

impl Emitter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Deliver a telemetry record, dropping it on failure.
    pub fn emit_telemetry(&self, record: &TelemetryRecord) {
        match self.client.post_telemetry(record) {
            Ok(()) => debug!(node_id = %record.node_id, ph = record.data.ph, "telemetry delivered"),
            Err(err) => warn!(node_id = %record.node_id, %err, "telemetry delivery failed, record dropped"),
        }
    }

    /// Deliver an event record, dropping it on failure.
    pub fn emit_event(&self, record: &EventRecord) {
        match self.client.post_event(record) {
            Ok(()) => debug!(node_id = %record.node_id, level = ?record.level, "event delivered"),
            Err(err) => warn!(node_id = %record.node_id, %err, "event delivery failed, record dropped"),
        }
    }
}
