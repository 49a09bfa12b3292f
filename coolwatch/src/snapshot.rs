//! In-memory snapshot of the monitored equipment.
//!
//! The snapshot is fed from two sources: incremental `monitoring_update`
//! push events and the periodic authoritative full refresh. The full
//! refresh always wins: it replaces the entity set wholesale, and push
//! events referencing entities it removed are ignored.

use std::collections::{HashMap, HashSet};

use coolwatch_api::model::{Alert, HeatExchanger, Telemetry};

/// Outcome of applying a push-sourced telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The record replaced the held one.
    Updated,
    /// The record's timestamp was older than the held one; dropped.
    Stale,
    /// The entity is not part of the snapshot (deleted or never fetched);
    /// dropped so refresh deletions stay authoritative.
    UnknownEntity,
}

/// Current view of all heat exchangers and their latest telemetry.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// All known heat exchangers, in server order.
    exchangers: Vec<HeatExchanger>,
    /// Latest telemetry per heat exchanger id.
    telemetry: HashMap<i64, Telemetry>,
    /// Count of active (unacknowledged, unresolved) alerts.
    alert_count: u64,
    /// Ids of heat exchangers with at least one active alert.
    alerting_ids: HashSet<i64>,
}

impl Snapshot {
    /// Replace the snapshot wholesale from a full refresh.
    ///
    /// The resulting entity set equals `exchangers` exactly; telemetry
    /// for ids absent from it is dropped.
    pub fn apply_full_refresh(
        &mut self,
        exchangers: Vec<HeatExchanger>,
        telemetry: Vec<Telemetry>,
    ) {
        let known: HashSet<i64> = exchangers.iter().map(|he| he.id).collect();

        self.telemetry = telemetry
            .into_iter()
            .filter(|t| known.contains(&t.heat_exchanger_id))
            .map(|t| (t.heat_exchanger_id, t))
            .collect();
        self.exchangers = exchangers;
    }

    /// Apply one push-sourced telemetry record for `id`.
    ///
    /// The record replaces the held one wholesale; fields are never
    /// merged across records. Records older than the held one and
    /// records for unknown entities are rejected.
    pub fn apply_telemetry(&mut self, id: i64, mut record: Telemetry) -> Applied {
        if !self.exchangers.iter().any(|he| he.id == id) {
            return Applied::UnknownEntity;
        }

        if let Some(held) = self.telemetry.get(&id) {
            if record.timestamp < held.timestamp {
                return Applied::Stale;
            }
        }

        // The push envelope carries the id; the payload may not.
        record.heat_exchanger_id = id;
        self.telemetry.insert(id, record);
        Applied::Updated
    }

    /// Update the active-alert count and per-entity indicators.
    pub fn set_alert_status(&mut self, count: u64, active: &[Alert]) {
        self.alert_count = count;
        self.alerting_ids = active.iter().map(|a| a.heat_exchanger_id).collect();
    }

    /// All heat exchangers, in server order.
    pub fn exchangers(&self) -> &[HeatExchanger] {
        &self.exchangers
    }

    pub fn get(&self, id: i64) -> Option<&HeatExchanger> {
        self.exchangers.iter().find(|he| he.id == id)
    }

    pub fn telemetry(&self, id: i64) -> Option<&Telemetry> {
        self.telemetry.get(&id)
    }

    pub fn alert_count(&self) -> u64 {
        self.alert_count
    }

    /// Whether this heat exchanger has at least one active alert.
    pub fn has_active_alert(&self, id: i64) -> bool {
        self.alerting_ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.exchangers.is_empty()
    }

    /// Sorted unique cities across all heat exchangers, for the
    /// location filter.
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self
            .exchangers
            .iter()
            .map(|he| he.location.city.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        cities.sort();
        cities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use coolwatch_api::model::{Location, Severity, Status};

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn exchanger(id: i64, name: &str, city: &str) -> HeatExchanger {
        HeatExchanger {
            id,
            name: name.to_string(),
            kind: Some("Callan".to_string()),
            rscm_ip: format!("10.0.0.{}", id),
            location: Location {
                city: city.to_string(),
                building: "B1".to_string(),
                room: "101".to_string(),
                tile: "A1".to_string(),
            },
            is_active: true,
            program_id: None,
            program_name: None,
            created_at: ts("2024-01-01T00:00:00"),
            updated_at: ts("2024-01-01T00:00:00"),
            model: None,
            firmware_version: None,
            hostname: None,
            status_state: None,
            status_health: None,
            time_since_boot: None,
            pump_status: None,
            fan_status: None,
            urgent_alarms: None,
        }
    }

    fn telemetry(id: i64, when: &str, temperature: f64) -> Telemetry {
        Telemetry {
            heat_exchanger_id: id,
            timestamp: ts(when),
            temperature,
            fan_speed: 1000,
            power_consumption: 2.0,
            humidity: None,
            status: Status::Normal,
            ambient_temperature: None,
            ambient_humidity: None,
        }
    }

    fn alert(id: i64, heat_exchanger_id: i64) -> Alert {
        Alert {
            id,
            heat_exchanger_id,
            heat_exchanger_name: None,
            kind: "CRITICAL_LOW_FLOW".to_string(),
            severity: Severity::Critical,
            title: "Critical Low Flow".to_string(),
            description: None,
            pump_id: None,
            pump_name: None,
            flow_rate: None,
            threshold: None,
            acknowledged: false,
            resolved: false,
            acknowledged_by: None,
            resolved_by: None,
            comments: None,
            created_at: ts("2024-01-01T00:00:00"),
            acknowledged_at: None,
            resolved_at: None,
        }
    }

    #[test]
    fn test_full_refresh_replaces_entity_set_exactly() {
        let mut snapshot = Snapshot::default();
        snapshot.apply_full_refresh(
            vec![exchanger(1, "HX-01", "Dublin"), exchanger(2, "HX-02", "Cork")],
            vec![telemetry(1, "2024-01-01T10:00:00", 20.0)],
        );
        assert_eq!(snapshot.exchangers().len(), 2);

        // A second refresh with a disjoint set leaves nothing of the first.
        snapshot.apply_full_refresh(
            vec![exchanger(3, "HX-03", "Dublin")],
            vec![telemetry(3, "2024-01-01T11:00:00", 21.0)],
        );
        let ids: Vec<i64> = snapshot.exchangers().iter().map(|he| he.id).collect();
        assert_eq!(ids, vec![3]);
        assert!(snapshot.telemetry(1).is_none());
        assert!(snapshot.telemetry(3).is_some());
    }

    #[test]
    fn test_refresh_drops_telemetry_for_unknown_entities() {
        let mut snapshot = Snapshot::default();
        snapshot.apply_full_refresh(
            vec![exchanger(1, "HX-01", "Dublin")],
            vec![
                telemetry(1, "2024-01-01T10:00:00", 20.0),
                telemetry(9, "2024-01-01T10:00:00", 25.0),
            ],
        );
        assert!(snapshot.telemetry(1).is_some());
        assert!(snapshot.telemetry(9).is_none());
    }

    #[test]
    fn test_last_push_event_wins_without_merging() {
        let mut snapshot = Snapshot::default();
        snapshot.apply_full_refresh(vec![exchanger(7, "HX-07", "Dublin")], vec![]);

        let mut first = telemetry(7, "2024-01-01T10:00:00", 20.0);
        first.humidity = Some(40.0);
        assert_eq!(snapshot.apply_telemetry(7, first), Applied::Updated);

        // The second record has no humidity; the field must not survive
        // from the first one.
        let second = telemetry(7, "2024-01-01T10:00:05", 22.5);
        assert_eq!(snapshot.apply_telemetry(7, second), Applied::Updated);

        let held = snapshot.telemetry(7).unwrap();
        assert_eq!(held.temperature, 22.5);
        assert_eq!(held.humidity, None);
    }

    #[test]
    fn test_stale_push_event_is_rejected() {
        let mut snapshot = Snapshot::default();
        snapshot.apply_full_refresh(
            vec![exchanger(7, "HX-07", "Dublin")],
            vec![telemetry(7, "2024-01-01T10:00:00", 20.0)],
        );

        let stale = telemetry(7, "2024-01-01T09:59:00", 99.0);
        assert_eq!(snapshot.apply_telemetry(7, stale), Applied::Stale);
        assert_eq!(snapshot.telemetry(7).unwrap().temperature, 20.0);

        // Same-timestamp records replace (last write wins on a tie).
        let tie = telemetry(7, "2024-01-01T10:00:00", 21.0);
        assert_eq!(snapshot.apply_telemetry(7, tie), Applied::Updated);
        assert_eq!(snapshot.telemetry(7).unwrap().temperature, 21.0);
    }

    #[test]
    fn test_push_event_for_deleted_entity_is_ignored() {
        let mut snapshot = Snapshot::default();
        snapshot.apply_full_refresh(
            vec![exchanger(7, "HX-07", "Dublin")],
            vec![telemetry(7, "2024-01-01T10:00:00", 20.0)],
        );

        // Refresh without id 7: it was deleted server-side.
        snapshot.apply_full_refresh(vec![exchanger(8, "HX-08", "Cork")], vec![]);
        assert!(snapshot.get(7).is_none());

        // A straggler push event for id 7 must not resurrect it.
        let late = telemetry(7, "2024-01-01T10:05:00", 23.0);
        assert_eq!(snapshot.apply_telemetry(7, late), Applied::UnknownEntity);
        assert!(snapshot.telemetry(7).is_none());
    }

    #[test]
    fn test_push_event_touches_only_its_entity() {
        let mut snapshot = Snapshot::default();
        snapshot.apply_full_refresh(
            vec![exchanger(7, "HX-07", "Dublin"), exchanger(8, "HX-08", "Cork")],
            vec![
                telemetry(7, "2024-01-01T10:00:00", 20.0),
                telemetry(8, "2024-01-01T10:00:00", 18.0),
            ],
        );

        let update = telemetry(7, "2024-01-01T10:00:10", 22.5);
        assert_eq!(snapshot.apply_telemetry(7, update), Applied::Updated);

        assert_eq!(snapshot.telemetry(7).unwrap().temperature, 22.5);
        assert_eq!(snapshot.telemetry(8).unwrap().temperature, 18.0);
    }

    #[test]
    fn test_alert_status_indicators() {
        let mut snapshot = Snapshot::default();
        snapshot.apply_full_refresh(
            vec![exchanger(1, "HX-01", "Dublin"), exchanger(2, "HX-02", "Cork")],
            vec![],
        );

        snapshot.set_alert_status(2, &[alert(10, 1), alert(11, 1)]);
        assert_eq!(snapshot.alert_count(), 2);
        assert!(snapshot.has_active_alert(1));
        assert!(!snapshot.has_active_alert(2));
    }

    #[test]
    fn test_cities_are_sorted_and_unique() {
        let mut snapshot = Snapshot::default();
        snapshot.apply_full_refresh(
            vec![
                exchanger(1, "HX-01", "Dublin"),
                exchanger(2, "HX-02", "Cork"),
                exchanger(3, "HX-03", "Dublin"),
            ],
            vec![],
        );
        assert_eq!(snapshot.cities(), vec!["Cork", "Dublin"]);
    }
}
