//! Wire records handed to the telemetry and event sinks.
//!
//! Field names and nesting match what the server-side consumers already
//! ingest; changing a key here is a wire-format change.

use chrono::{DateTime, Utc};
use hydro_core::{DoseAction, Real};
use hydro_controls::{AlarmBand, ZoneGains};
use serde::{Deserialize, Serialize};

/// Event severity as the sink expects it (lowercase on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Nested reading payload of a telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingPayload {
    pub ph: Real,
    pub ph_target: Real,
    pub ph_min: Real,
    pub ph_max: Real,
    pub temperature: Real,
    pub voltage: Real,
    pub uptime: u64,
    pub heap_free: i64,
}

/// One telemetry sample, keyed by node identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub node_id: String,
    pub node_type: String,
    pub data: ReadingPayload,
    pub received_at: DateTime<Utc>,
}

impl TelemetryRecord {
    pub fn new(node_id: &str, data: ReadingPayload) -> Self {
        Self {
            node_id: node_id.to_owned(),
            node_type: "ph".to_owned(),
            data,
            received_at: Utc::now(),
        }
    }
}

/// Metadata payload of an event record.
///
/// `kp`/`ki`/`kd` are present on correction events for consumers that
/// expect those keys; only `kp` ever influenced the dose. Critical events
/// carry no pump or gain fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub ph: Real,
    pub ph_target: Real,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kp: Option<Real>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ki: Option<Real>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kd: Option<Real>,
    pub current_value: Real,
    pub target_value: Real,
}

/// One operator-visible event, keyed by node identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub node_id: String,
    pub level: Severity,
    pub message: String,
    pub data: EventPayload,
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    /// Correction event for an accepted dose. Severity tracks how far the
    /// reading was from target: aggressive (far-zone) corrections warn,
    /// gentle ones inform. The pump identifier comes from the dose
    /// direction itself, not from the message text.
    pub fn correction(
        node_id: &str,
        value: Real,
        target: Real,
        action: &DoseAction,
        gains: &ZoneGains,
        aggressive: bool,
    ) -> Self {
        let (level, message) = if aggressive {
            (
                Severity::Warning,
                "pH far from target, aggressive correction".to_owned(),
            )
        } else {
            (Severity::Info, "pH correction in progress".to_owned())
        };
        Self {
            node_id: node_id.to_owned(),
            level,
            message,
            data: EventPayload {
                ph: value,
                ph_target: target,
                pump_id: Some(action.direction.pump_id().to_owned()),
                kp: Some(gains.kp),
                ki: Some(gains.ki),
                kd: Some(gains.kd),
                current_value: value,
                target_value: target,
            },
            created_at: Utc::now(),
        }
    }

    /// Critical event for a reading outside the alarm band.
    pub fn out_of_range(node_id: &str, value: Real, target: Real, band: &AlarmBand) -> Self {
        Self {
            node_id: node_id.to_owned(),
            level: Severity::Critical,
            message: format!("pH out of range: {value:.2} (band {}..{})", band.min, band.max),
            data: EventPayload {
                ph: value,
                ph_target: target,
                pump_id: None,
                kp: None,
                ki: None,
                kd: None,
                current_value: value,
                target_value: target,
            },
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydro_core::PumpDirection;
    use hydro_controls::Zone;

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Info).unwrap(), "\"info\"");
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
    }

    #[test]
    fn correction_event_derives_pump_from_direction() {
        let action = DoseAction {
            direction: PumpDirection::Lower,
            volume_ml: 1.4,
        };
        let gains = ZoneGains::for_zone(Zone::Far).unwrap();
        let event = EventRecord::correction("ph_3f0c00", 7.2, 6.5, &action, &gains, true);
        assert_eq!(event.level, Severity::Warning);
        assert_eq!(event.data.pump_id.as_deref(), Some("ph_down"));
        assert_eq!(event.data.kp, Some(1.0));
    }

    #[test]
    fn gentle_correction_is_informational() {
        let action = DoseAction {
            direction: PumpDirection::Raise,
            volume_ml: 0.3,
        };
        let gains = ZoneGains::for_zone(Zone::Close).unwrap();
        let event = EventRecord::correction("ph_3f0c00", 6.3, 6.5, &action, &gains, false);
        assert_eq!(event.level, Severity::Info);
        assert_eq!(event.data.pump_id.as_deref(), Some("ph_up"));
    }

    #[test]
    fn critical_event_omits_pump_and_gains() {
        let band = AlarmBand::default();
        let event = EventRecord::out_of_range("ph_3f0c00", 5.2, 6.5, &band);
        assert_eq!(event.level, Severity::Critical);
        assert!(event.message.contains("5.20"));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["level"], "critical");
        assert!(json["data"].get("pump_id").is_none());
        assert!(json["data"].get("kp").is_none());
    }

    #[test]
    fn telemetry_record_wire_shape() {
        let record = TelemetryRecord::new(
            "ph_3f0c00",
            ReadingPayload {
                ph: 6.51,
                ph_target: 6.5,
                ph_min: 5.5,
                ph_max: 7.5,
                temperature: 24.8,
                voltage: 3.31,
                uptime: 120,
                heap_free: 48_000,
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["node_id"], "ph_3f0c00");
        assert_eq!(json["node_type"], "ph");
        assert_eq!(json["data"]["ph"], 6.51);
        assert_eq!(json["data"]["ph_min"], 5.5);
        assert!(json["received_at"].is_string());
    }
}
