use serde::Deserialize;

use crate::error::Result;
use crate::model::{Severity, Telemetry};

/// A server-to-client message on the push channel.
///
/// Events are tagged by their `type` field. Types this client does not
/// know decode to [`PushEvent::Unknown`] and are dropped by the caller,
/// so newer servers can add event types without breaking older clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// A fresh telemetry reading for one heat exchanger. Replaces the
    /// held reading wholesale; fields are never merged across events.
    MonitoringUpdate {
        heat_exchanger_id: i64,
        data: Telemetry,
    },

    /// A new alert was raised. Carries metadata only; consumers re-fetch
    /// counts and lists from the REST API.
    NewAlert {
        #[serde(default)]
        alert_id: Option<i64>,
        #[serde(default)]
        heat_exchanger_id: Option<i64>,
        #[serde(default)]
        heat_exchanger_name: Option<String>,
        #[serde(default)]
        severity: Option<Severity>,
        #[serde(default)]
        title: Option<String>,
    },

    #[serde(other)]
    Unknown,
}

impl PushEvent {
    /// Decode a push-channel text frame.
    pub fn decode(raw: &str) -> Result<PushEvent> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    #[test]
    fn test_decode_monitoring_update() {
        let raw = r#"{
            "type": "monitoring_update",
            "heat_exchanger_id": 7,
            "data": {
                "timestamp": "2024-03-02T10:15:30",
                "temperature": 22.5,
                "fan_speed": 1100,
                "power_consumption": 2.8,
                "status": "normal"
            }
        }"#;

        match PushEvent::decode(raw).unwrap() {
            PushEvent::MonitoringUpdate {
                heat_exchanger_id,
                data,
            } => {
                assert_eq!(heat_exchanger_id, 7);
                assert_eq!(data.temperature, 22.5);
                assert_eq!(data.status, Status::Normal);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_new_alert() {
        let raw = r#"{
            "type": "new_alert",
            "alert_id": 42,
            "heat_exchanger_id": 7,
            "heat_exchanger_name": "HX-07",
            "severity": "critical",
            "title": "Critical Low Flow - Pump 1",
            "pump_name": "Pump 1",
            "flow_rate": 0.4,
            "threshold": 2.0
        }"#;

        match PushEvent::decode(raw).unwrap() {
            PushEvent::NewAlert {
                alert_id,
                heat_exchanger_name,
                severity,
                ..
            } => {
                assert_eq!(alert_id, Some(42));
                assert_eq!(heat_exchanger_name.as_deref(), Some("HX-07"));
                assert_eq!(severity, Some(Severity::Critical));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let raw = r#"{"type": "maintenance_window", "until": "2024-04-01T00:00:00"}"#;
        assert!(matches!(
            PushEvent::decode(raw).unwrap(),
            PushEvent::Unknown
        ));
    }

    #[test]
    fn test_malformed_frame_is_an_error() {
        assert!(PushEvent::decode("not json").is_err());
        assert!(PushEvent::decode(r#"{"type":"monitoring_update"}"#).is_err());
    }
}
