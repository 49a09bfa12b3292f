//! Dashboard view showing all monitored heat exchangers.

use iced::widget::{Column, button, column, container, pick_list, row, rule, scrollable, text};
use iced::{Alignment, Element, Length, Theme};

use coolwatch_api::model::{HeatExchanger, User};

use crate::message::Message;
use crate::snapshot::Snapshot;
use crate::subscription::ConnectionState;
use crate::view::components::{StatusLed, StatusLedState};
use crate::view::formatting::{format_relative, format_temperature};

/// Equipment-type filter, applied at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Callan,
    Atlas,
}

impl TypeFilter {
    pub const ALL: &'static [TypeFilter] =
        &[TypeFilter::All, TypeFilter::Callan, TypeFilter::Atlas];

    pub fn label(&self) -> &'static str {
        match self {
            TypeFilter::All => "All",
            TypeFilter::Callan => "Callan",
            TypeFilter::Atlas => "Atlas",
        }
    }

    pub fn matches(&self, kind: Option<&str>) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Callan => kind == Some("Callan"),
            TypeFilter::Atlas => kind == Some("Atlas"),
        }
    }
}

/// Location (city) filter, applied at render time. The selection is
/// persisted across sessions in the preferences file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationFilter {
    #[default]
    All,
    City(String),
}

impl LocationFilter {
    pub fn matches(&self, city: &str) -> bool {
        match self {
            LocationFilter::All => true,
            LocationFilter::City(selected) => selected == city,
        }
    }

    pub fn city(&self) -> Option<&str> {
        match self {
            LocationFilter::All => None,
            LocationFilter::City(city) => Some(city),
        }
    }
}

impl std::fmt::Display for LocationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationFilter::All => write!(f, "All locations"),
            LocationFilter::City(city) => write!(f, "{}", city),
        }
    }
}

/// Dashboard view state: the render-time filters.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub type_filter: TypeFilter,
    pub location_filter: LocationFilter,
}

impl DashboardState {
    /// Heat exchangers passing both filters, sorted by name.
    pub fn filtered<'a>(&self, snapshot: &'a Snapshot) -> Vec<&'a HeatExchanger> {
        let mut exchangers: Vec<&HeatExchanger> = snapshot
            .exchangers()
            .iter()
            .filter(|he| self.type_filter.matches(he.kind.as_deref()))
            .filter(|he| self.location_filter.matches(&he.location.city))
            .collect();

        exchangers.sort_by(|a, b| a.name.cmp(&b.name));
        exchangers
    }

    /// Options for the location pick-list.
    pub fn location_options(&self, snapshot: &Snapshot) -> Vec<LocationFilter> {
        std::iter::once(LocationFilter::All)
            .chain(snapshot.cities().into_iter().map(LocationFilter::City))
            .collect()
    }

    /// Restore a persisted location selection, keeping it only if the
    /// city is still known; an unknown city is silently dropped.
    pub fn restore_location(&mut self, saved: Option<&str>, cities: &[String]) {
        match saved {
            Some(city) if cities.iter().any(|c| c == city) => {
                self.location_filter = LocationFilter::City(city.to_string());
            }
            _ => {}
        }
    }

    /// Reset the location filter when the selected city disappeared
    /// from the entity set.
    pub fn validate_location(&mut self, cities: &[String]) {
        if let LocationFilter::City(city) = &self.location_filter {
            if !cities.iter().any(|c| c == city) {
                self.location_filter = LocationFilter::All;
            }
        }
    }
}

/// Render the dashboard view.
pub fn dashboard_view<'a>(
    state: &'a DashboardState,
    snapshot: &'a Snapshot,
    connection: ConnectionState,
    user: Option<&'a User>,
) -> Element<'a, Message> {
    let header = render_header(snapshot, connection, user);
    let filters = render_filters(state, snapshot);
    let grid = render_card_grid(state, snapshot, user);

    let content = column![header, filters, rule::horizontal(1), grid]
        .spacing(10)
        .padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Render the header with connection status, alert badge and navigation.
fn render_header<'a>(
    snapshot: &'a Snapshot,
    connection: ConnectionState,
    user: Option<&'a User>,
) -> Element<'a, Message> {
    let title = text("CoolWatch").size(24);

    let status = StatusLed::new(StatusLedState::from(connection))
        .with_label(connection.label())
        .view();

    let count = text(format!("{} exchangers", snapshot.exchangers().len())).size(14);

    let alerts_label = if snapshot.alert_count() > 0 {
        format!("Alerts ({})", snapshot.alert_count())
    } else {
        "Alerts".to_string()
    };
    let alerts_button = button(text(alerts_label).size(14))
        .on_press(Message::OpenAlerts)
        .style(if snapshot.alert_count() > 0 {
            iced::widget::button::danger
        } else {
            iced::widget::button::secondary
        });

    let mut nav = row![alerts_button].spacing(8).align_y(Alignment::Center);

    if user.is_some_and(|u| u.is_admin) {
        nav = nav.push(
            button(text("Add Exchanger").size(14))
                .on_press(Message::OpenExchangerForm(None))
                .style(iced::widget::button::secondary),
        );
        nav = nav.push(
            button(text("Users").size(14))
                .on_press(Message::OpenUsers)
                .style(iced::widget::button::secondary),
        );
        nav = nav.push(
            button(text("Programs").size(14))
                .on_press(Message::OpenPrograms)
                .style(iced::widget::button::secondary),
        );
        nav = nav.push(
            button(text("Settings").size(14))
                .on_press(Message::OpenSettings)
                .style(iced::widget::button::secondary),
        );
    }

    match user {
        Some(user) => {
            nav = nav.push(text(user.username.clone()).size(14));
            nav = nav.push(
                button(text("Logout").size(14))
                    .on_press(Message::Logout)
                    .style(iced::widget::button::secondary),
            );
        }
        None => {
            nav = nav.push(
                button(text("Login").size(14))
                    .on_press(Message::OpenLogin)
                    .style(iced::widget::button::secondary),
            );
        }
    }

    row![title, count, status, nav]
        .spacing(20)
        .align_y(Alignment::Center)
        .into()
}

/// Render the type filter buttons and the location pick-list.
fn render_filters<'a>(state: &'a DashboardState, snapshot: &'a Snapshot) -> Element<'a, Message> {
    let label = text("Filter:").size(14);

    let mut filter_row = row![label].spacing(10).align_y(Alignment::Center);

    for filter in TypeFilter::ALL {
        let btn = button(text(filter.label()).size(12)).on_press(Message::SetTypeFilter(*filter));

        let btn = if state.type_filter == *filter {
            btn.style(iced::widget::button::primary)
        } else {
            btn.style(iced::widget::button::secondary)
        };

        filter_row = filter_row.push(btn);
    }

    let locations = pick_list(
        state.location_options(snapshot),
        Some(state.location_filter.clone()),
        Message::SetLocationFilter,
    )
    .placeholder("All locations");

    filter_row = filter_row.push(locations);

    filter_row.into()
}

/// Render the card grid.
fn render_card_grid<'a>(
    state: &'a DashboardState,
    snapshot: &'a Snapshot,
    user: Option<&'a User>,
) -> Element<'a, Message> {
    let exchangers = state.filtered(snapshot);

    if exchangers.is_empty() {
        let message = if snapshot.is_empty() {
            "Waiting for equipment data..."
        } else {
            "No heat exchangers match the current filters"
        };
        return container(text(message).size(16))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    }

    let is_admin = user.is_some_and(|u| u.is_admin);
    let mut cards = Column::new().spacing(10);

    for he in exchangers {
        cards = cards.push(render_card(he, snapshot, is_admin));
    }

    scrollable(cards)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Render a single heat-exchanger card.
fn render_card<'a>(
    he: &'a HeatExchanger,
    snapshot: &'a Snapshot,
    is_admin: bool,
) -> Element<'a, Message> {
    let name = text(&he.name).size(16);

    let mut title_row = row![name].spacing(10).align_y(Alignment::Center);
    if let Some(kind) = &he.kind {
        title_row = title_row.push(text(kind.clone()).size(12));
    }
    if snapshot.has_active_alert(he.id) {
        title_row = title_row.push(text("\u{26A0} active alerts").size(12).style(
            |_theme: &Theme| text::Style {
                color: Some(iced::Color::from_rgb(1.0, 0.5, 0.0)),
            },
        ));
    }

    let location = text(format!(
        "{}, {} - Room {}, Tile {}",
        he.location.city, he.location.building, he.location.room, he.location.tile
    ))
    .size(12);
    let address = text(he.rscm_ip.clone()).size(12);

    let mut card = Column::new()
        .push(title_row)
        .push(location)
        .push(address)
        .spacing(4);

    let urgent = he.urgent_alarms();
    if !urgent.is_empty() {
        let banner = text(format!(
            "\u{1F6A8} {} CRITICAL LOW FLOW ALARM{}",
            urgent.len(),
            if urgent.len() > 1 { "S" } else { "" }
        ))
        .size(14)
        .style(|_theme: &Theme| text::Style {
            color: Some(iced::Color::from_rgb(0.9, 0.2, 0.2)),
        });
        card = card.push(banner);
    }

    card = card.push(render_telemetry_panel(he, snapshot));

    let mut actions = row![
        button(text("View Details").size(12)).on_press(Message::OpenDetail(he.id))
    ]
    .spacing(8);

    if is_admin {
        actions = actions.push(
            button(text("Edit").size(12))
                .on_press(Message::OpenExchangerForm(Some(he.id)))
                .style(iced::widget::button::secondary),
        );
        actions = actions.push(
            button(text("Delete").size(12))
                .on_press(Message::DeleteExchanger(he.id))
                .style(iced::widget::button::danger),
        );
    }

    card = card.push(actions);

    container(card)
        .padding(12)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

/// Render the latest-telemetry section of a card.
fn render_telemetry_panel<'a>(he: &'a HeatExchanger, snapshot: &'a Snapshot) -> Element<'a, Message> {
    let Some(telemetry) = snapshot.telemetry(he.id) else {
        return column![
            text("Waiting on initial polling...").size(13),
            text("Data will be available shortly").size(11),
        ]
        .spacing(2)
        .into();
    };

    let status = StatusLed::new(StatusLedState::from(telemetry.status))
        .with_state_text()
        .view();

    let mut panel = Column::new()
        .push(
            row![text("Status:").size(13), status]
                .spacing(8)
                .align_y(Alignment::Center),
        )
        .push(
            text(format!(
                "Temperature: {}",
                format_temperature(telemetry.temperature)
            ))
            .size(13),
        )
        .spacing(3);

    if let Some(flow) = he.avg_flow() {
        panel = panel.push(text(format!("Avg Flow: {:.1} L/min", flow)).size(13));
    }
    if let Some(supply) = he.avg_supply_pressure() {
        panel = panel.push(text(format!("Avg Supply Pressure: {:.2} kPa", supply)).size(13));
    }
    if let Some(ret) = he.avg_return_pressure() {
        panel = panel.push(text(format!("Avg Return Pressure: {:.2} kPa", ret)).size(13));
    }

    if he.urgent_alarms().is_empty() && he.has_fan_fault() {
        panel = panel.push(text("\u{26A0} Fan Faults Detected").size(13).style(
            |_theme: &Theme| text::Style {
                color: Some(iced::Color::from_rgb(0.9, 0.7, 0.2)),
            },
        ));
    }

    panel = panel.push(
        text(format!("Updated {}", format_relative(telemetry.timestamp))).size(11),
    );

    panel.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_filter_matching() {
        assert!(TypeFilter::All.matches(Some("Callan")));
        assert!(TypeFilter::All.matches(None));
        assert!(TypeFilter::Callan.matches(Some("Callan")));
        assert!(!TypeFilter::Callan.matches(Some("Atlas")));
        assert!(!TypeFilter::Atlas.matches(None));
    }

    #[test]
    fn test_location_filter_matching() {
        assert!(LocationFilter::All.matches("Dublin"));
        assert!(LocationFilter::City("Dublin".to_string()).matches("Dublin"));
        assert!(!LocationFilter::City("Cork".to_string()).matches("Dublin"));
    }

    #[test]
    fn test_restore_location_keeps_known_city() {
        let mut state = DashboardState::default();
        let cities = vec!["Cork".to_string(), "Dublin".to_string()];

        state.restore_location(Some("Dublin"), &cities);
        assert_eq!(state.location_filter.city(), Some("Dublin"));
    }

    #[test]
    fn test_restore_location_drops_unknown_city() {
        let mut state = DashboardState::default();
        let cities = vec!["Cork".to_string()];

        state.restore_location(Some("Atlantis"), &cities);
        assert_eq!(state.location_filter, LocationFilter::All);

        state.restore_location(None, &cities);
        assert_eq!(state.location_filter, LocationFilter::All);
    }

    #[test]
    fn test_validate_location_resets_on_deleted_city() {
        let mut state = DashboardState {
            location_filter: LocationFilter::City("Dublin".to_string()),
            ..DashboardState::default()
        };

        state.validate_location(&["Dublin".to_string()]);
        assert_eq!(state.location_filter.city(), Some("Dublin"));

        state.validate_location(&["Cork".to_string()]);
        assert_eq!(state.location_filter, LocationFilter::All);
    }
}
