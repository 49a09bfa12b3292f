//! Detail view for a single heat exchanger.

use iced::widget::{Column, button, column, container, row, rule, scrollable, text};
use iced::{Alignment, Element, Length, Theme};

use coolwatch_api::model::{FanReading, HeatExchanger, PumpReading, Stats, Telemetry};

use crate::message::Message;
use crate::snapshot::Snapshot;
use crate::view::components::{Sparkline, StatusLed, StatusLedState};
use crate::view::formatting::{format_datetime, format_relative, format_temperature};

/// How many history points the sparkline shows.
const HISTORY_LIMIT: u32 = 50;

/// Hours of data the statistics cover.
const STATS_HOURS: u32 = 24;

/// State for the detail view.
#[derive(Debug)]
pub struct DetailState {
    /// The heat exchanger being viewed.
    pub id: i64,
    /// Aggregated statistics, fetched on entry.
    pub stats: Option<Stats>,
    /// Temperature history, oldest first.
    pub history: Vec<Telemetry>,
}

impl DetailState {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            stats: None,
            history: Vec::new(),
        }
    }

    pub fn history_limit() -> u32 {
        HISTORY_LIMIT
    }

    pub fn stats_hours() -> u32 {
        STATS_HOURS
    }

    /// Store history fetched from the API (newest first) oldest-first.
    pub fn set_history(&mut self, mut history: Vec<Telemetry>) {
        history.reverse();
        self.history = history;
    }

    /// Append a live reading to the history tail.
    pub fn push_reading(&mut self, telemetry: Telemetry) {
        self.history.push(telemetry);
        while self.history.len() > HISTORY_LIMIT as usize {
            self.history.remove(0);
        }
    }

    fn temperatures(&self) -> Vec<f64> {
        self.history.iter().map(|t| t.temperature).collect()
    }
}

/// Render the detail view.
pub fn detail_view<'a>(state: &'a DetailState, snapshot: &'a Snapshot) -> Element<'a, Message> {
    let back = button(text("<- Back").size(14))
        .on_press(Message::OpenDashboard)
        .style(iced::widget::button::secondary);

    let Some(he) = snapshot.get(state.id) else {
        // Deleted server-side while we were looking at it.
        let content = column![
            back,
            text("This heat exchanger no longer exists").size(16),
        ]
        .spacing(15)
        .padding(20);
        return container(content).width(Length::Fill).into();
    };

    let mut title_row = row![back, text(&he.name).size(24)]
        .spacing(15)
        .align_y(Alignment::Center);
    if let Some(kind) = &he.kind {
        title_row = title_row.push(text(kind.clone()).size(14));
    }

    let content = column![
        title_row,
        rule::horizontal(1),
        render_info_section(he),
        rule::horizontal(1),
        render_telemetry_section(state, snapshot),
        rule::horizontal(1),
        render_pumps_section(he),
        rule::horizontal(1),
        render_fans_section(he),
    ]
    .spacing(15)
    .padding(20);

    container(scrollable(content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Render static attributes and manager information.
fn render_info_section(he: &HeatExchanger) -> Element<'_, Message> {
    let mut info = Column::new()
        .push(
            text(format!(
                "{}, {} - Room {}, Tile {}",
                he.location.city, he.location.building, he.location.room, he.location.tile
            ))
            .size(13),
        )
        .push(text(format!("R-SCM: {}", he.rscm_ip)).size(13))
        .spacing(3);

    if let Some(model) = &he.model {
        info = info.push(text(format!("Model: {}", model)).size(13));
    }
    if let Some(firmware) = &he.firmware_version {
        info = info.push(text(format!("Firmware: {}", firmware)).size(13));
    }
    if let Some(hostname) = &he.hostname {
        info = info.push(text(format!("Hostname: {}", hostname)).size(13));
    }
    if let (Some(state), Some(health)) = (&he.status_state, &he.status_health) {
        info = info.push(text(format!("Controller: {} / {}", state, health)).size(13));
    }
    if let Some(uptime) = &he.time_since_boot {
        info = info.push(text(format!("Up since boot: {}", uptime)).size(13));
    }
    if let Some(program) = &he.program_name {
        info = info.push(text(format!("Program: {}", program)).size(13));
    }

    info.into()
}

/// Render the live telemetry panel, statistics and history sparkline.
fn render_telemetry_section<'a>(
    state: &'a DetailState,
    snapshot: &'a Snapshot,
) -> Element<'a, Message> {
    let section_title = text("Telemetry").size(18);

    let Some(telemetry) = snapshot.telemetry(state.id) else {
        return column![section_title, text("Waiting on initial polling...").size(14)]
            .spacing(10)
            .into();
    };

    let status = StatusLed::new(StatusLedState::from(telemetry.status))
        .with_state_text()
        .view();

    let mut readings = Column::new()
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
        .push(text(format!("Fan speed: {} RPM", telemetry.fan_speed)).size(13))
        .push(text(format!("Power: {:.2} kW", telemetry.power_consumption)).size(13))
        .spacing(3);

    if let Some(humidity) = telemetry.humidity {
        readings = readings.push(text(format!("Humidity: {:.1}%", humidity)).size(13));
    }
    if let Some(ambient) = telemetry.ambient_temperature {
        readings = readings.push(text(format!("Ambient: {}", format_temperature(ambient))).size(13));
    }

    readings = readings.push(
        text(format!(
            "Updated {} ({})",
            format_relative(telemetry.timestamp),
            format_datetime(telemetry.timestamp)
        ))
        .size(11),
    );

    let mut section = column![section_title, readings].spacing(10);

    if !state.history.is_empty() {
        let sparkline = Sparkline::new(state.temperatures())
            .with_size(320.0, 60.0)
            .view();
        section = section.push(
            column![text("Temperature history").size(13), sparkline].spacing(4),
        );
    }

    if let Some(stats) = &state.stats {
        section = section.push(render_stats(stats));
    }

    section.into()
}

fn render_stats(stats: &Stats) -> Element<'_, Message> {
    column![
        text(format!("Statistics (last {}h)", STATS_HOURS)).size(13),
        text(format!(
            "Temperature: avg {} / min {} / max {}",
            format_temperature(stats.avg_temperature),
            format_temperature(stats.min_temperature),
            format_temperature(stats.max_temperature)
        ))
        .size(12),
        text(format!(
            "Avg fan speed: {:.0} RPM, avg power: {:.2} kW, {} data points",
            stats.avg_fan_speed, stats.avg_power_consumption, stats.total_data_points
        ))
        .size(12),
    ]
    .spacing(3)
    .into()
}

/// Render the pump readings table.
fn render_pumps_section(he: &HeatExchanger) -> Element<'_, Message> {
    let pumps = he.pumps();
    let section_title = text(format!("Pumps ({})", pumps.len())).size(18);

    if pumps.is_empty() {
        return column![section_title, text("No pump data reported").size(14)]
            .spacing(10)
            .into();
    }

    let header = row![
        cell("Pump", 120.0),
        cell("Status", 90.0),
        cell("Speed", 70.0),
        cell("Flow (L/min)", 100.0),
        cell("Supply (kPa)", 100.0),
        cell("Return (kPa)", 100.0),
        cell("pH", 60.0),
    ]
    .spacing(8);

    let mut table = Column::new().push(header).spacing(4);

    for pump in &pumps {
        table = table.push(render_pump_row(pump));
    }

    column![section_title, table].spacing(10).into()
}

fn render_pump_row(pump: &PumpReading) -> Element<'static, Message> {
    let row_el = row![
        cell_owned(pump.label().to_string(), 120.0),
        cell_owned(pump.status.clone().unwrap_or_else(|| "N/A".into()), 90.0),
        cell_owned(fmt_pct(pump.speed), 70.0),
        cell_owned(fmt_f1(pump.flow_liquid), 100.0),
        cell_owned(fmt_f1(pump.pressure_supply), 100.0),
        cell_owned(fmt_f1(pump.pressure_return), 100.0),
        cell_owned(fmt_f2(pump.liquid_ph), 60.0),
    ]
    .spacing(8);

    if pump.error_code.is_some() {
        let flagged = row![
            row_el,
            text("\u{26A0}").style(|_theme: &Theme| text::Style {
                color: Some(iced::Color::from_rgb(0.9, 0.2, 0.2)),
            })
        ]
        .spacing(8);
        flagged.into()
    } else {
        row_el.into()
    }
}

/// Render the fan readings table.
fn render_fans_section(he: &HeatExchanger) -> Element<'_, Message> {
    let fans = he.fans();
    let section_title = text(format!("Fans ({})", fans.len())).size(18);

    if fans.is_empty() {
        return column![section_title, text("No fan data reported").size(14)]
            .spacing(10)
            .into();
    }

    let header = row![
        cell("Fan", 120.0),
        cell("State", 90.0),
        cell("Health", 90.0),
        cell("Speed", 70.0),
    ]
    .spacing(8);

    let mut table = Column::new().push(header).spacing(4);

    for fan in &fans {
        table = table.push(render_fan_row(fan));
    }

    column![section_title, table].spacing(10).into()
}

fn render_fan_row(fan: &FanReading) -> Element<'static, Message> {
    let health = fan.health.clone().unwrap_or_else(|| "N/A".into());
    let health_cell: Element<'static, Message> = if fan.is_faulted() {
        text(health)
            .size(12)
            .width(Length::Fixed(90.0))
            .style(|_theme: &Theme| text::Style {
                color: Some(iced::Color::from_rgb(0.9, 0.2, 0.2)),
            })
            .into()
    } else {
        cell_owned(health, 90.0)
    };

    row![
        cell_owned(fan.label().to_string(), 120.0),
        cell_owned(fan.state.clone().unwrap_or_else(|| "N/A".into()), 90.0),
        health_cell,
        cell_owned(fmt_pct(fan.speed_percent), 70.0),
    ]
    .spacing(8)
    .into()
}

fn cell(label: &str, width: f32) -> Element<'_, Message> {
    text(label).size(12).width(Length::Fixed(width)).into()
}

fn cell_owned<'a>(label: String, width: f32) -> Element<'a, Message> {
    text(label).size(12).width(Length::Fixed(width)).into()
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.0}%", v))
}

fn fmt_f1(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.1}", v))
}

fn fmt_f2(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v))
}
