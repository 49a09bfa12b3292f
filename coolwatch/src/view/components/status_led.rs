//! Status LED widget for equipment and connection indicators.

use iced::widget::{container, row, text};
use iced::{Alignment, Element, Length, Theme};

use coolwatch_api::Status;

use crate::subscription::ConnectionState;

/// State of a status LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLedState {
    /// Normal operation - green.
    Ok,
    /// Degraded - amber.
    Warning,
    /// Critical / disconnected - red.
    Critical,
    /// No data yet - gray.
    Unknown,
}

impl StatusLedState {
    /// Get the color for this state.
    pub fn color(&self) -> iced::Color {
        match self {
            StatusLedState::Ok => iced::Color::from_rgb(0.2, 0.8, 0.3),
            StatusLedState::Warning => iced::Color::from_rgb(0.9, 0.7, 0.2),
            StatusLedState::Critical => iced::Color::from_rgb(0.9, 0.2, 0.2),
            StatusLedState::Unknown => iced::Color::from_rgb(0.5, 0.5, 0.5),
        }
    }

    /// Get a text description for this state.
    pub fn label(&self) -> &'static str {
        match self {
            StatusLedState::Ok => "NORMAL",
            StatusLedState::Warning => "WARNING",
            StatusLedState::Critical => "CRITICAL",
            StatusLedState::Unknown => "NO DATA",
        }
    }
}

impl From<Status> for StatusLedState {
    fn from(status: Status) -> Self {
        match status {
            Status::Normal => StatusLedState::Ok,
            Status::Warning => StatusLedState::Warning,
            Status::Critical => StatusLedState::Critical,
        }
    }
}

impl From<ConnectionState> for StatusLedState {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Open => StatusLedState::Ok,
            ConnectionState::Connecting => StatusLedState::Warning,
            ConnectionState::ClosedPendingRetry => StatusLedState::Critical,
        }
    }
}

/// A status LED indicator widget.
pub struct StatusLed {
    /// Current state.
    state: StatusLedState,
    /// Optional label text.
    label: Option<String>,
    /// Size of the LED (diameter).
    size: f32,
    /// Whether to show the state text.
    show_state_text: bool,
}

impl StatusLed {
    /// Create a new status LED.
    pub fn new(state: StatusLedState) -> Self {
        Self {
            state,
            label: None,
            size: 12.0,
            show_state_text: false,
        }
    }

    /// Add a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the size.
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Show the state text (NORMAL/WARNING/etc).
    pub fn with_state_text(mut self) -> Self {
        self.show_state_text = true;
        self
    }

    /// Render the status LED as an Iced element.
    pub fn view<'a, Message: 'a>(self) -> Element<'a, Message> {
        let color = self.state.color();

        let led = container(text(""))
            .width(Length::Fixed(self.size))
            .height(Length::Fixed(self.size))
            .style(move |_theme: &Theme| container::Style {
                background: Some(iced::Background::Color(color)),
                border: iced::Border {
                    color: iced::Color::from_rgb(0.3, 0.3, 0.3),
                    width: 1.0,
                    radius: (self.size / 2.0).into(),
                },
                ..Default::default()
            });

        let mut content = row![led].spacing(8).align_y(Alignment::Center);

        if let Some(label) = self.label {
            content = content.push(text(label).size(12));
        }

        if self.show_state_text {
            let state_text = text(self.state.label())
                .size(10)
                .style(move |_theme: &Theme| text::Style { color: Some(color) });
            content = content.push(state_text);
        }

        content.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(StatusLedState::from(Status::Normal), StatusLedState::Ok);
        assert_eq!(
            StatusLedState::from(Status::Critical),
            StatusLedState::Critical
        );
    }

    #[test]
    fn test_connection_state_mapping() {
        assert_eq!(
            StatusLedState::from(ConnectionState::Open),
            StatusLedState::Ok
        );
        assert_eq!(
            StatusLedState::from(ConnectionState::ClosedPendingRetry),
            StatusLedState::Critical
        );
    }
}
