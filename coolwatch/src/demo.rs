//! Demo-mode data generator.
//!
//! Feeds the same message pipeline as the live backend, so every view
//! can be exercised without a server (`coolwatch --demo`).

use chrono::Utc;
use iced::Subscription;
use serde_json::json;

use coolwatch_api::model::{HeatExchanger, Location, Status, Telemetry};

use crate::message::Message;
use crate::subscription::ConnectionState;

/// The demo fleet.
pub fn demo_exchangers() -> Vec<HeatExchanger> {
    vec![
        demo_exchanger(1, "HX-DUB-01", "Callan", "Dublin", "B2"),
        demo_exchanger(2, "HX-DUB-02", "Callan", "Dublin", "B2"),
        demo_exchanger(3, "HX-CRK-01", "Atlas", "Cork", "B7"),
        demo_exchanger(4, "HX-CRK-02", "Atlas", "Cork", "B7"),
    ]
}

fn demo_exchanger(id: i64, name: &str, kind: &str, city: &str, building: &str) -> HeatExchanger {
    let now = Utc::now().naive_utc();

    let pump_status = json!([
        {
            "id": format!("pump-{}-1", id),
            "name": "Pump 1",
            "status": "Running",
            "speed": 62.0,
            "requested_speed": 60.0,
            "flow_liquid": 14.2,
            "pressure_supply": 210.5,
            "pressure_return": 150.3,
            "pressure_diff": 60.2,
            "liquid_ph": 7.1
        },
        {
            "id": format!("pump-{}-2", id),
            "name": "Pump 2",
            "status": "Running",
            "speed": 58.0,
            "requested_speed": 60.0,
            "flow_liquid": 13.8,
            "pressure_supply": 208.9,
            "pressure_return": 149.7
        }
    ]);

    let fan_status = json!([
        { "id": format!("fan-{}-1", id), "name": "Fan 1", "state": "Enabled", "health": "OK", "speed_percent": 45.0 },
        { "id": format!("fan-{}-2", id), "name": "Fan 2", "state": "Enabled", "health": "OK", "speed_percent": 47.0 }
    ]);

    HeatExchanger {
        id,
        name: name.to_string(),
        kind: Some(kind.to_string()),
        rscm_ip: format!("10.20.0.{}", id),
        location: Location {
            city: city.to_string(),
            building: building.to_string(),
            room: format!("10{}", id),
            tile: format!("A{}", id),
        },
        is_active: true,
        program_id: None,
        program_name: None,
        created_at: now,
        updated_at: now,
        model: Some("CDU-800".to_string()),
        firmware_version: Some("2.4.1".to_string()),
        hostname: Some(name.to_lowercase()),
        status_state: Some("Enabled".to_string()),
        status_health: Some("OK".to_string()),
        time_since_boot: Some("14 days".to_string()),
        pump_status: Some(pump_status.to_string()),
        fan_status: Some(fan_status.to_string()),
        urgent_alarms: None,
    }
}

/// A telemetry reading for the demo fleet; status derives from the
/// temperature so warnings appear organically.
pub fn demo_telemetry(id: i64, temperature: f64) -> Telemetry {
    let status = if temperature > 35.0 {
        Status::Critical
    } else if temperature > 30.0 {
        Status::Warning
    } else {
        Status::Normal
    };

    Telemetry {
        heat_exchanger_id: id,
        timestamp: Utc::now().naive_utc(),
        temperature,
        fan_speed: 1100 + (temperature * 10.0) as i64,
        power_consumption: 2.0 + temperature / 20.0,
        humidity: Some(40.0),
        status,
        ambient_temperature: Some(temperature - 2.0),
        ambient_humidity: Some(38.0),
    }
}

/// Create a subscription that simulates live data.
pub fn demo_subscription() -> Subscription<Message> {
    Subscription::run(|| {
        async_stream::stream! {
            use coolwatch_api::PushEvent;
            use rand::{Rng, SeedableRng};

            yield Message::ConnectionChanged(ConnectionState::Open);

            let exchangers = demo_exchangers();
            let ids: Vec<i64> = exchangers.iter().map(|he| he.id).collect();

            let initial: Vec<Telemetry> = ids
                .iter()
                .map(|&id| demo_telemetry(id, 22.0 + id as f64))
                .collect();

            // Generation 0: demo mode never issues real refreshes, so
            // the app accepts this as the authoritative snapshot.
            yield Message::RefreshLoaded {
                generation: 0,
                result: Ok((exchangers, initial)),
            };

            // Use a Send-compatible RNG (seeded from system entropy)
            let mut rng = rand::rngs::SmallRng::from_os_rng();
            let mut alert_count: u64 = 0;

            loop {
                let delay = 500 + rng.random_range(0u64..1000u64);
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;

                let id = ids[rng.random_range(0..ids.len())];
                let temperature = 20.0 + rng.random_range(0.0..18.0);

                yield Message::PushEventReceived(PushEvent::MonitoringUpdate {
                    heat_exchanger_id: id,
                    data: demo_telemetry(id, temperature),
                });

                // Occasionally bump the alert badge like a new_alert would.
                if rng.random_bool(0.05) {
                    alert_count += 1;
                    yield Message::AlertStatusLoaded(Ok((alert_count, Vec::new())));
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_fleet_parses_its_own_blobs() {
        for he in demo_exchangers() {
            assert_eq!(he.pumps().len(), 2);
            assert_eq!(he.fans().len(), 2);
            assert!(!he.has_fan_fault());
            assert!(he.avg_flow().is_some());
        }
    }

    #[test]
    fn test_demo_status_tracks_temperature() {
        assert_eq!(demo_telemetry(1, 22.0).status, Status::Normal);
        assert_eq!(demo_telemetry(1, 32.0).status, Status::Warning);
        assert_eq!(demo_telemetry(1, 36.0).status, Status::Critical);
    }
}
