//! Alerts view: stat tiles, filters and the alert list.

use iced::widget::{Column, Row, button, column, container, pick_list, row, rule, scrollable, text, text_input};
use iced::{Alignment, Element, Length, Theme};

use coolwatch_api::model::{Alert, Severity};
use coolwatch_api::{AlertQuery, AlertStatusFilter};

use crate::message::{AlertTiles, ExchangerFilter, Message, SeverityFilter};
use crate::snapshot::Snapshot;
use crate::view::formatting::format_datetime;

/// Comment form opened under one alert card.
#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    pub alert_id: i64,
    pub text: String,
}

/// State for the alerts page.
#[derive(Debug, Default)]
pub struct AlertsState {
    pub status_filter: AlertStatusFilter,
    pub severity_filter: SeverityFilter,
    pub exchanger_filter: ExchangerFilter,
    /// Alerts matching the current filters, as fetched.
    pub alerts: Vec<Alert>,
    /// Counts for the stat tiles.
    pub tiles: AlertTiles,
    /// Open comment form, if any.
    pub comment_form: Option<CommentForm>,
}

impl AlertsState {
    /// The query matching the current filter selection.
    pub fn query(&self) -> AlertQuery {
        AlertQuery {
            status: self.status_filter,
            severity: self.severity_filter.severity(),
            heat_exchanger_id: self.exchanger_filter.id(),
        }
    }

    /// Options for the exchanger filter pick-list.
    pub fn exchanger_options(&self, snapshot: &Snapshot) -> Vec<ExchangerFilter> {
        std::iter::once(ExchangerFilter::All)
            .chain(snapshot.exchangers().iter().map(|he| {
                ExchangerFilter::Exchanger {
                    id: he.id,
                    name: he.name.clone(),
                }
            }))
            .collect()
    }

    /// Toggle the comment form for an alert.
    pub fn toggle_comment_form(&mut self, alert_id: i64) {
        match &self.comment_form {
            Some(form) if form.alert_id == alert_id => self.comment_form = None,
            _ => {
                self.comment_form = Some(CommentForm {
                    alert_id,
                    ..CommentForm::default()
                })
            }
        }
    }
}

/// Render the alerts view.
pub fn alerts_view<'a>(state: &'a AlertsState, snapshot: &'a Snapshot) -> Element<'a, Message> {
    let header = render_header();
    let tiles = render_tiles(&state.tiles);
    let filters = render_filters(state, snapshot);
    let alert_list = render_alert_list(state);

    let content = column![header, tiles, filters, rule::horizontal(1), alert_list]
        .spacing(15)
        .padding(20);

    container(scrollable(content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn render_header<'a>() -> Element<'a, Message> {
    let back_button = button(text("<- Back").size(14))
        .on_press(Message::OpenDashboard)
        .style(iced::widget::button::secondary);

    let title = text("Alerts").size(24);

    row![back_button, title]
        .spacing(15)
        .align_y(Alignment::Center)
        .into()
}

fn render_tiles(tiles: &AlertTiles) -> Element<'_, Message> {
    row![
        render_tile("Total", tiles.total),
        render_tile("Active", tiles.active),
        render_tile("Acknowledged", tiles.acknowledged),
        render_tile("Resolved", tiles.resolved),
    ]
    .spacing(15)
    .into()
}

fn render_tile(label: &'static str, value: u64) -> Element<'static, Message> {
    container(
        column![text(format!("{}", value)).size(22), text(label).size(12)]
            .spacing(2)
            .align_x(Alignment::Center),
    )
    .padding(10)
    .style(container::rounded_box)
    .into()
}

fn render_filters<'a>(state: &'a AlertsState, snapshot: &'a Snapshot) -> Element<'a, Message> {
    let status = pick_list(
        AlertStatusFilter::ALL,
        Some(state.status_filter),
        Message::SetAlertStatusFilter,
    );

    let severity = pick_list(
        SeverityFilter::ALL,
        Some(state.severity_filter),
        Message::SetAlertSeverityFilter,
    );

    let exchanger = pick_list(
        state.exchanger_options(snapshot),
        Some(state.exchanger_filter.clone()),
        Message::SetAlertExchangerFilter,
    );

    row![text("Filter:").size(14), status, severity, exchanger]
        .spacing(10)
        .align_y(Alignment::Center)
        .into()
}

fn render_alert_list(state: &AlertsState) -> Element<'_, Message> {
    if state.alerts.is_empty() {
        return text("No alerts match the current filters").size(14).into();
    }

    let mut list = Column::new().spacing(10);

    for alert in &state.alerts {
        list = list.push(render_alert_card(alert, state.comment_form.as_ref()));
    }

    list.into()
}

fn severity_color(severity: Severity) -> iced::Color {
    match severity {
        Severity::Critical => iced::Color::from_rgb(0.9, 0.2, 0.2),
        Severity::Warning => iced::Color::from_rgb(0.9, 0.7, 0.2),
        Severity::Info => iced::Color::from_rgb(0.3, 0.6, 0.9),
    }
}

fn render_alert_card<'a>(
    alert: &'a Alert,
    comment_form: Option<&'a CommentForm>,
) -> Element<'a, Message> {
    let severity = alert.severity;
    let severity_badge = text(alert.severity.to_string())
        .size(12)
        .style(move |_theme: &Theme| text::Style {
            color: Some(severity_color(severity)),
        });

    let mut badges = Row::new().push(severity_badge).spacing(8);
    if alert.acknowledged {
        badges = badges.push(text("Acknowledged").size(12));
    }
    if alert.resolved {
        badges = badges.push(text("Resolved").size(12));
    }

    let title_row = row![text(&alert.title).size(16), badges]
        .spacing(12)
        .align_y(Alignment::Center);

    let meta = text(format!(
        "{} \u{2022} {}",
        alert
            .heat_exchanger_name
            .as_deref()
            .unwrap_or("(unknown exchanger)"),
        format_datetime(alert.created_at)
    ))
    .size(12);

    let mut card = Column::new().push(title_row).push(meta).spacing(5);

    if let Some(description) = &alert.description {
        card = card.push(text(description.clone()).size(13));
    }

    let mut details = Row::new().spacing(15);
    if let Some(pump) = &alert.pump_name {
        details = details.push(text(format!("Pump: {}", pump)).size(12));
    }
    if let Some(flow) = alert.flow_rate {
        details = details.push(text(format!("Flow: {:.2} L/min", flow)).size(12));
    }
    if let Some(threshold) = alert.threshold {
        details = details.push(text(format!("Threshold: {:.2} L/min", threshold)).size(12));
    }
    card = card.push(details);

    if let Some(by) = &alert.acknowledged_by {
        if let Some(at) = alert.acknowledged_at {
            card = card.push(
                text(format!("Acknowledged by {} on {}", by, format_datetime(at))).size(11),
            );
        }
    }
    if let Some(by) = &alert.resolved_by {
        if let Some(at) = alert.resolved_at {
            card = card
                .push(text(format!("Resolved by {} on {}", by, format_datetime(at))).size(11));
        }
    }

    if let Some(comments) = &alert.comments {
        card = card.push(text(format!("Comments: {}", comments)).size(12));
    }

    if !alert.resolved {
        let mut actions = Row::new().spacing(8);

        if !alert.acknowledged {
            actions = actions.push(
                button(text("Acknowledge").size(12))
                    .on_press(Message::AcknowledgeAlert(alert.id))
                    .style(iced::widget::button::secondary),
            );
        }
        actions = actions.push(
            button(text("Resolve").size(12))
                .on_press(Message::ResolveAlert(alert.id))
                .style(iced::widget::button::secondary),
        );
        actions = actions.push(
            button(text("Add Comment").size(12))
                .on_press(Message::ToggleCommentForm(alert.id))
                .style(iced::widget::button::secondary),
        );

        card = card.push(actions);
    }

    if let Some(form) = comment_form {
        if form.alert_id == alert.id {
            let input = text_input("Add a comment...", &form.text)
                .on_input(Message::SetCommentText)
                .on_submit(Message::SubmitComment(alert.id))
                .padding(8)
                .width(Length::Fixed(300.0));

            let post = button(text("Post").size(12))
                .on_press(Message::SubmitComment(alert.id))
                .style(iced::widget::button::primary);

            let cancel = button(text("Cancel").size(12))
                .on_press(Message::ToggleCommentForm(alert.id))
                .style(iced::widget::button::secondary);

            card = card.push(
                row![input, post, cancel]
                    .spacing(8)
                    .align_y(Alignment::Center),
            );
        }
    }

    container(card)
        .padding(12)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_follows_filters() {
        let state = AlertsState {
            status_filter: AlertStatusFilter::Active,
            severity_filter: SeverityFilter::Severity(Severity::Critical),
            exchanger_filter: ExchangerFilter::Exchanger {
                id: 7,
                name: "HX-07".to_string(),
            },
            ..AlertsState::default()
        };

        let query = state.query();
        assert_eq!(query.status, AlertStatusFilter::Active);
        assert_eq!(query.severity, Some(Severity::Critical));
        assert_eq!(query.heat_exchanger_id, Some(7));
    }

    #[test]
    fn test_default_filters_query_active_alerts() {
        let state = AlertsState::default();
        let query = state.query();

        assert_eq!(query.status, AlertStatusFilter::Active);
        assert_eq!(query.severity, None);
        assert_eq!(query.heat_exchanger_id, None);
    }

    #[test]
    fn test_comment_form_toggles() {
        let mut state = AlertsState::default();

        state.toggle_comment_form(3);
        assert_eq!(state.comment_form.as_ref().unwrap().alert_id, 3);

        // Toggling another alert moves the form there.
        state.toggle_comment_form(4);
        assert_eq!(state.comment_form.as_ref().unwrap().alert_id, 4);

        // Toggling the same alert closes it.
        state.toggle_comment_form(4);
        assert!(state.comment_form.is_none());
    }
}
