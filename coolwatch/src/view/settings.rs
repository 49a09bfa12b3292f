//! Settings view for the monitoring service controls.

use iced::widget::{button, checkbox, column, container, row, rule, scrollable, text, text_input};
use iced::{Alignment, Element, Length, Theme};

use coolwatch_api::model::MonitoringSettings;

use crate::message::Message;

/// State for the settings page.
#[derive(Debug, Clone)]
pub struct SettingsState {
    /// Whether the backend polls equipment at all.
    pub monitoring_enabled: bool,
    /// Polling interval form field, in seconds.
    pub polling_interval: String,
    /// Whether settings have been modified since load/save.
    pub modified: bool,
    /// Last error message (if any).
    pub error: Option<String>,
    /// Success message (if any).
    pub success: Option<String>,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            monitoring_enabled: true,
            polling_interval: "30".to_string(),
            modified: false,
            error: None,
            success: None,
        }
    }
}

impl SettingsState {
    /// Populate from the backend's current settings.
    pub fn from_settings(settings: MonitoringSettings) -> Self {
        Self {
            monitoring_enabled: settings.monitoring_enabled,
            polling_interval: settings.polling_interval_seconds.to_string(),
            ..Self::default()
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.monitoring_enabled = enabled;
        self.modified = true;
        self.clear_messages();
    }

    pub fn set_polling_interval(&mut self, interval: String) {
        self.polling_interval = interval;
        self.modified = true;
        self.clear_messages();
    }

    /// Validate into an API payload.
    pub fn validate(&self) -> Result<MonitoringSettings, String> {
        let interval: u32 = self
            .polling_interval
            .trim()
            .parse()
            .map_err(|_| "Polling interval must be a number".to_string())?;

        if interval < 5 {
            return Err("Polling interval must be at least 5 seconds".to_string());
        }

        if interval > 3600 {
            return Err("Polling interval cannot exceed 1 hour".to_string());
        }

        Ok(MonitoringSettings {
            monitoring_enabled: self.monitoring_enabled,
            polling_interval_seconds: interval,
        })
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
        self.error = None;
        self.success = Some("Settings saved successfully".to_string());
    }

    pub fn set_error(&mut self, error: String) {
        self.error = Some(error);
        self.success = None;
    }

    fn clear_messages(&mut self) {
        self.error = None;
        self.success = None;
    }
}

/// Render the settings view.
pub fn settings_view(state: &SettingsState) -> Element<'_, Message> {
    let header = render_header(state);
    let monitoring_section = render_monitoring_section(state);
    let actions = render_actions(state);

    let content = column![
        header,
        rule::horizontal(1),
        monitoring_section,
        rule::horizontal(1),
        actions,
    ]
    .spacing(20)
    .padding(20);

    container(scrollable(content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn render_header(state: &SettingsState) -> Element<'_, Message> {
    let back_button = button(text("<- Back").size(14))
        .on_press(Message::OpenDashboard)
        .style(iced::widget::button::secondary);

    let title = text("Settings").size(24);

    let modified_indicator = if state.modified {
        text("(unsaved changes)")
            .size(12)
            .style(|_theme: &Theme| text::Style {
                color: Some(iced::Color::from_rgb(1.0, 0.7, 0.0)),
            })
    } else {
        text("")
    };

    row![back_button, title, modified_indicator]
        .spacing(15)
        .align_y(Alignment::Center)
        .into()
}

fn render_monitoring_section(state: &SettingsState) -> Element<'_, Message> {
    let section_title = text("Monitoring Service").size(18);

    let enabled_toggle = checkbox(state.monitoring_enabled).label("Enable equipment polling")
        .on_toggle(Message::SetMonitoringEnabled);

    let interval_label = text("Polling interval (seconds):").size(14);
    let interval_input = text_input("30", &state.polling_interval)
        .on_input(Message::SetPollingInterval)
        .padding(8)
        .width(Length::Fixed(100.0));

    let interval_help = text("How often the backend polls each heat exchanger's controller")
        .size(11)
        .style(|_theme: &Theme| text::Style {
            color: Some(iced::Color::from_rgb(0.5, 0.5, 0.5)),
        });

    let interval_row = row![interval_label, interval_input]
        .spacing(10)
        .align_y(Alignment::Center);

    column![section_title, enabled_toggle, interval_row, interval_help]
        .spacing(8)
        .into()
}

fn render_actions(state: &SettingsState) -> Element<'_, Message> {
    let mut content = column![].spacing(10);

    if let Some(error) = &state.error {
        content = content.push(
            text(format!("Error: {}", error))
                .size(14)
                .style(|_theme: &Theme| text::Style {
                    color: Some(iced::Color::from_rgb(1.0, 0.3, 0.3)),
                }),
        );
    }

    if let Some(success) = &state.success {
        content = content.push(text(success.clone()).size(14).style(|_theme: &Theme| {
            text::Style {
                color: Some(iced::Color::from_rgb(0.3, 1.0, 0.3)),
            }
        }));
    }

    content = content.push(
        button(text("Save Settings").size(14))
            .on_press(Message::SaveMonitoringSettings)
            .style(iced::widget::button::primary),
    );

    content.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_validation() {
        let mut settings = SettingsState::default();
        assert!(settings.validate().is_ok());

        settings.polling_interval = "abc".to_string();
        assert!(settings.validate().is_err());

        settings.polling_interval = "2".to_string();
        assert!(settings.validate().is_err());

        settings.polling_interval = "10000".to_string();
        assert!(settings.validate().is_err());

        settings.polling_interval = "60".to_string();
        let payload = settings.validate().unwrap();
        assert_eq!(payload.polling_interval_seconds, 60);
    }

    #[test]
    fn test_edits_mark_modified_and_clear_messages() {
        let mut settings = SettingsState::default();
        settings.mark_saved();
        assert!(settings.success.is_some());

        settings.set_polling_interval("45".to_string());
        assert!(settings.modified);
        assert!(settings.success.is_none());

        settings.mark_saved();
        assert!(!settings.modified);
    }

    #[test]
    fn test_from_settings() {
        let state = SettingsState::from_settings(MonitoringSettings {
            monitoring_enabled: false,
            polling_interval_seconds: 45,
        });

        assert!(!state.monitoring_enabled);
        assert_eq!(state.polling_interval, "45");
        assert!(!state.modified);
    }
}
