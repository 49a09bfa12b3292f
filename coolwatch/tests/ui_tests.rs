//! UI tests using the iced_test Simulator.
//!
//! These verify view behavior without a backend or a live push channel.

use iced_test::simulator;

use coolwatch::demo;
use coolwatch::message::Message;
use coolwatch::snapshot::Snapshot;
use coolwatch::subscription::ConnectionState;
use coolwatch::view::dashboard::{DashboardState, dashboard_view};
use coolwatch::view::login::{LoginState, login_view};
use coolwatch::view::settings::{SettingsState, settings_view};

use coolwatch_api::model::User;

fn populated_snapshot() -> Snapshot {
    let mut snapshot = Snapshot::default();
    let exchangers = demo::demo_exchangers();
    let telemetry = exchangers
        .iter()
        .map(|he| demo::demo_telemetry(he.id, 22.0))
        .collect();
    snapshot.apply_full_refresh(exchangers, telemetry);
    snapshot
}

fn admin() -> User {
    User {
        id: 1,
        username: "admin".to_string(),
        email: None,
        is_admin: true,
        is_active: true,
    }
}

/// The empty dashboard shows the waiting message.
#[test]
fn test_dashboard_empty() {
    let state = DashboardState::default();
    let snapshot = Snapshot::default();
    let mut ui = simulator(dashboard_view(
        &state,
        &snapshot,
        ConnectionState::Connecting,
        None,
    ));

    assert!(ui.find("Waiting for equipment data...").is_ok());
}

/// A populated dashboard shows exchanger cards and the live indicator.
#[test]
fn test_dashboard_with_exchangers() {
    let state = DashboardState::default();
    let snapshot = populated_snapshot();
    let mut ui = simulator(dashboard_view(
        &state,
        &snapshot,
        ConnectionState::Open,
        None,
    ));

    assert!(ui.find("HX-DUB-01").is_ok());
    assert!(ui.find("Live").is_ok());
    assert!(ui.find("4 exchangers").is_ok());
}

/// The reconnecting indicator appears while a retry is pending.
#[test]
fn test_dashboard_shows_reconnecting() {
    let state = DashboardState::default();
    let snapshot = populated_snapshot();
    let mut ui = simulator(dashboard_view(
        &state,
        &snapshot,
        ConnectionState::ClosedPendingRetry,
        None,
    ));

    assert!(ui.find("Reconnecting...").is_ok());
}

/// Clicking the Alerts button navigates to the alerts page.
#[test]
fn test_dashboard_alerts_button() {
    let state = DashboardState::default();
    let snapshot = populated_snapshot();
    let mut ui = simulator(dashboard_view(
        &state,
        &snapshot,
        ConnectionState::Open,
        None,
    ));

    let _ = ui.click("Alerts");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages.iter().any(|m| matches!(m, Message::OpenAlerts)));
}

/// Admin navigation is hidden without an admin session.
#[test]
fn test_dashboard_admin_gating() {
    let state = DashboardState::default();
    let snapshot = populated_snapshot();

    let mut anonymous = simulator(dashboard_view(
        &state,
        &snapshot,
        ConnectionState::Open,
        None,
    ));
    assert!(anonymous.find("Users").is_err());
    assert!(anonymous.find("Login").is_ok());

    let user = admin();
    let mut admin_ui = simulator(dashboard_view(
        &state,
        &snapshot,
        ConnectionState::Open,
        Some(&user),
    ));
    assert!(admin_ui.find("Users").is_ok());
    assert!(admin_ui.find("Settings").is_ok());
    assert!(admin_ui.find("Logout").is_ok());
}

/// The type filter buttons produce filter messages.
#[test]
fn test_dashboard_type_filter_click() {
    let state = DashboardState::default();
    // Empty snapshot: the only "Callan" text on screen is the button.
    let snapshot = Snapshot::default();
    let mut ui = simulator(dashboard_view(
        &state,
        &snapshot,
        ConnectionState::Open,
        None,
    ));

    let _ = ui.click("Callan");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages
        .iter()
        .any(|m| matches!(m, Message::SetTypeFilter(_))));
}

/// The login form shows an inline error after a failed attempt.
#[test]
fn test_login_shows_error() {
    let state = LoginState {
        username: "admin".to_string(),
        password: "wrong".to_string(),
        error: Some("Invalid credentials".to_string()),
        pending: false,
    };
    let mut ui = simulator(login_view(&state));

    assert!(ui.find("Invalid credentials").is_ok());
    assert!(ui.find("Sign In").is_ok());
}

/// The settings view flags unsaved changes.
#[test]
fn test_settings_modified_indicator() {
    let mut state = SettingsState::default();
    state.set_polling_interval("45".to_string());

    let mut ui = simulator(settings_view(&state));
    assert!(ui.find("(unsaved changes)").is_ok());
}

/// Clicking Save on the settings view produces the save message.
#[test]
fn test_settings_save_button() {
    let state = SettingsState::default();
    let mut ui = simulator(settings_view(&state));

    let _ = ui.click("Save Settings");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages
        .iter()
        .any(|m| matches!(m, Message::SaveMonitoringSettings)));
}
