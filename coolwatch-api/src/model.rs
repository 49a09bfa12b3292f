use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Physical placement of a heat exchanger inside the facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub building: String,
    pub room: String,
    pub tile: String,
}

/// A monitored heat exchanger as returned by `GET /api/heat-exchangers/`.
///
/// The `pump_status`, `fan_status` and `urgent_alarms` fields arrive as
/// JSON-encoded strings (the backend stores them opaquely); the accessor
/// methods parse them on demand and treat malformed content as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatExchanger {
    pub id: i64,
    pub name: String,
    /// Equipment type ("Callan" or "Atlas").
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub rscm_ip: String,
    pub location: Location,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub program_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,

    // Manager information reported by the R-SCM controller.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub status_state: Option<String>,
    #[serde(default)]
    pub status_health: Option<String>,
    #[serde(default)]
    pub time_since_boot: Option<String>,

    // Nested controller status, JSON-encoded by the backend.
    #[serde(default)]
    pub pump_status: Option<String>,
    #[serde(default)]
    pub fan_status: Option<String>,
    #[serde(default)]
    pub urgent_alarms: Option<String>,
}

fn default_true() -> bool {
    true
}

impl HeatExchanger {
    /// Parsed pump readings, empty when absent or malformed.
    pub fn pumps(&self) -> Vec<PumpReading> {
        parse_blob(self.pump_status.as_deref(), "pump_status")
    }

    /// Parsed fan readings, empty when absent or malformed.
    pub fn fans(&self) -> Vec<FanReading> {
        parse_blob(self.fan_status.as_deref(), "fan_status")
    }

    /// Active urgent (critical low flow) alarms.
    pub fn urgent_alarms(&self) -> Vec<String> {
        parse_blob(self.urgent_alarms.as_deref(), "urgent_alarms")
    }

    /// Whether any fan reports a fault.
    pub fn has_fan_fault(&self) -> bool {
        self.fans().iter().any(FanReading::is_faulted)
    }

    /// Average flow over pumps that report one, in L/min.
    pub fn avg_flow(&self) -> Option<f64> {
        average(self.pumps().iter().filter_map(|p| p.flow_liquid))
    }

    /// Average supply pressure over pumps that report one, in kPa.
    pub fn avg_supply_pressure(&self) -> Option<f64> {
        average(self.pumps().iter().filter_map(|p| p.pressure_supply))
    }

    /// Average return pressure over pumps that report one, in kPa.
    pub fn avg_return_pressure(&self) -> Option<f64> {
        average(self.pumps().iter().filter_map(|p| p.pressure_return))
    }
}

/// Parse a JSON-encoded status blob; malformed content renders as absent.
fn parse_blob<T: serde::de::DeserializeOwned>(blob: Option<&str>, field: &str) -> Vec<T> {
    match blob {
        None => Vec::new(),
        Some(raw) => match serde_json::from_str(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(field, error = %e, "Skipping malformed status blob");
                Vec::new()
            }
        },
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// One pump inside a heat exchanger's CDU.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PumpReading {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Current speed in percent.
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub requested_speed: Option<f64>,
    /// Liquid flow in L/min.
    #[serde(default)]
    pub flow_liquid: Option<f64>,
    /// Supply pressure in kPa.
    #[serde(default)]
    pub pressure_supply: Option<f64>,
    /// Return pressure in kPa.
    #[serde(default)]
    pub pressure_return: Option<f64>,
    #[serde(default)]
    pub pressure_diff: Option<f64>,
    #[serde(default)]
    pub liquid_ph: Option<f64>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl PumpReading {
    /// Display label: name, falling back to id.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("pump")
    }
}

/// One fan inside a heat exchanger's CDU.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanReading {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub health: Option<String>,
    #[serde(default)]
    pub speed_percent: Option<f64>,
}

impl FanReading {
    /// Display label: name, falling back to id.
    pub fn label(&self) -> &str {
        self.name.as_deref().or(self.id.as_deref()).unwrap_or("fan")
    }

    /// Whether the controller reports this fan as faulted.
    pub fn is_faulted(&self) -> bool {
        self.health.as_deref() == Some("Fault")
    }
}

/// Overall condition reported with each telemetry reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Warning => "warning",
            Status::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A point-in-time telemetry reading for one heat exchanger.
///
/// Returned by `GET /api/monitoring/latest` (with `heat_exchanger_id` set)
/// and carried inside `monitoring_update` push events (where the id lives
/// on the event envelope instead, hence the default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    #[serde(default)]
    pub heat_exchanger_id: i64,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub fan_speed: i64,
    pub power_consumption: f64,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub ambient_temperature: Option<f64>,
    #[serde(default)]
    pub ambient_humidity: Option<f64>,
}

/// Alert severity as assigned by the monitoring service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// All severities, for filter pick-lists.
    pub const ALL: &'static [Severity] = &[Severity::Critical, Severity::Warning, Severity::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An alert record for a heat exchanger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub heat_exchanger_id: i64,
    #[serde(default)]
    pub heat_exchanger_name: Option<String>,
    /// Alert kind, e.g. "CRITICAL_LOW_FLOW" or "FAN_FAULT".
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pump_id: Option<String>,
    #[serde(default)]
    pub pump_name: Option<String>,
    #[serde(default)]
    pub flow_rate: Option<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    pub acknowledged: bool,
    pub resolved: bool,
    #[serde(default)]
    pub acknowledged_by: Option<String>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub acknowledged_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub resolved_at: Option<NaiveDateTime>,
}

impl Alert {
    /// An alert is active while it is neither acknowledged nor resolved.
    pub fn is_active(&self) -> bool {
        !self.acknowledged && !self.resolved
    }
}

/// Response of `GET /api/alerts/count`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertCount {
    pub count: u64,
}

/// A dashboard user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Monitoring-service control settings (`/api/settings/monitoring`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonitoringSettings {
    pub monitoring_enabled: bool,
    #[serde(default = "default_polling_interval")]
    pub polling_interval_seconds: u32,
}

fn default_polling_interval() -> u32 {
    30
}

/// A program grouping heat exchangers (`/api/programs/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Aggregated statistics for one heat exchanger
/// (`GET /api/monitoring/{id}/statistics`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    pub avg_temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub avg_fan_speed: f64,
    pub avg_power_consumption: f64,
    pub total_data_points: u64,
}

/// Payload for creating or updating a heat exchanger.
#[derive(Debug, Clone, Serialize)]
pub struct HeatExchangerUpsert {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub rscm_ip: String,
    pub location: Location,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<i64>,
}

/// Payload for creating or updating a user account.
#[derive(Debug, Clone, Serialize)]
pub struct UserUpsert {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_admin: bool,
    /// Omitted on update when the password is left unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchanger_json() -> &'static str {
        r#"{
            "id": 7,
            "name": "HX-07",
            "type": "Callan",
            "rscm_ip": "10.1.2.3",
            "location": {"city": "Dublin", "building": "B2", "room": "104", "tile": "A7"},
            "is_active": true,
            "created_at": "2024-03-01T08:30:00",
            "updated_at": "2024-03-02T09:00:00",
            "pump_status": "[{\"id\":\"p1\",\"name\":\"Pump 1\",\"flow_liquid\":10.0,\"pressure_supply\":200.0},{\"id\":\"p2\",\"flow_liquid\":20.0,\"pressure_return\":150.0}]",
            "fan_status": "[{\"id\":\"f1\",\"health\":\"OK\"},{\"id\":\"f2\",\"health\":\"Fault\"}]",
            "urgent_alarms": "[\"Pump 1 flow critically low\"]"
        }"#
    }

    #[test]
    fn test_exchanger_decodes_and_parses_blobs() {
        let he: HeatExchanger = serde_json::from_str(exchanger_json()).unwrap();

        assert_eq!(he.id, 7);
        assert_eq!(he.kind.as_deref(), Some("Callan"));
        assert_eq!(he.location.city, "Dublin");
        assert_eq!(he.pumps().len(), 2);
        assert_eq!(he.fans().len(), 2);
        assert!(he.has_fan_fault());
        assert_eq!(he.urgent_alarms(), vec!["Pump 1 flow critically low"]);
    }

    #[test]
    fn test_pump_averages_skip_missing_readings() {
        let he: HeatExchanger = serde_json::from_str(exchanger_json()).unwrap();

        assert_eq!(he.avg_flow(), Some(15.0));
        // Only one pump reports each pressure.
        assert_eq!(he.avg_supply_pressure(), Some(200.0));
        assert_eq!(he.avg_return_pressure(), Some(150.0));
    }

    #[test]
    fn test_malformed_blob_renders_as_absent() {
        let mut he: HeatExchanger = serde_json::from_str(exchanger_json()).unwrap();
        he.pump_status = Some("not json".to_string());
        he.fan_status = None;

        assert!(he.pumps().is_empty());
        assert!(he.fans().is_empty());
        assert!(!he.has_fan_fault());
        assert_eq!(he.avg_flow(), None);
    }

    #[test]
    fn test_telemetry_decodes_without_entity_id() {
        // The push envelope carries the id; the payload itself may not.
        let data = r#"{
            "timestamp": "2024-03-02T10:15:30.250000",
            "temperature": 22.5,
            "fan_speed": 1200,
            "power_consumption": 3.4,
            "status": "warning"
        }"#;

        let t: Telemetry = serde_json::from_str(data).unwrap();
        assert_eq!(t.heat_exchanger_id, 0);
        assert_eq!(t.temperature, 22.5);
        assert_eq!(t.status, Status::Warning);
        assert_eq!(t.humidity, None);
    }

    #[test]
    fn test_alert_activity() {
        let raw = r#"{
            "id": 1,
            "heat_exchanger_id": 7,
            "type": "CRITICAL_LOW_FLOW",
            "severity": "critical",
            "title": "Critical Low Flow - Pump 1",
            "acknowledged": false,
            "resolved": false,
            "created_at": "2024-03-02T10:15:30"
        }"#;

        let mut alert: Alert = serde_json::from_str(raw).unwrap();
        assert!(alert.is_active());

        alert.acknowledged = true;
        assert!(!alert.is_active());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Normal.as_str(), "normal");
        assert_eq!(Status::Critical.to_string(), "critical");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
