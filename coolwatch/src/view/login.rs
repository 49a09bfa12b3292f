//! Login form view.

use iced::widget::{button, column, container, row, text, text_input};
use iced::{Alignment, Element, Length, Theme};

use crate::message::Message;

/// State for the login page.
#[derive(Debug, Default)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    /// Error from the last attempt, shown inline.
    pub error: Option<String>,
    /// True while a login request is in flight.
    pub pending: bool,
}

impl LoginState {
    pub fn can_submit(&self) -> bool {
        !self.pending && !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

/// Render the login view.
pub fn login_view(state: &LoginState) -> Element<'_, Message> {
    let title = text("CoolWatch Login").size(24);

    let username_input = text_input("Username", &state.username)
        .on_input(Message::SetLoginUsername)
        .padding(8)
        .width(Length::Fixed(250.0));

    let password_input = text_input("Password", &state.password)
        .on_input(Message::SetLoginPassword)
        .on_submit(Message::SubmitLogin)
        .secure(true)
        .padding(8)
        .width(Length::Fixed(250.0));

    let mut submit = button(text(if state.pending { "Signing in..." } else { "Sign In" }).size(14))
        .style(iced::widget::button::primary);
    if state.can_submit() {
        submit = submit.on_press(Message::SubmitLogin);
    }

    let back = button(text("Back to dashboard").size(12))
        .on_press(Message::OpenDashboard)
        .style(iced::widget::button::secondary);

    let mut form = column![title, username_input, password_input]
        .spacing(10)
        .align_x(Alignment::Center);

    if let Some(error) = &state.error {
        form = form.push(
            text(error.clone())
                .size(13)
                .style(|_theme: &Theme| text::Style {
                    color: Some(iced::Color::from_rgb(1.0, 0.3, 0.3)),
                }),
        );
    }

    form = form.push(row![submit, back].spacing(10));

    container(form)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_submit_requires_both_fields() {
        let mut state = LoginState::default();
        assert!(!state.can_submit());

        state.username = "admin".to_string();
        assert!(!state.can_submit());

        state.password = "secret".to_string();
        assert!(state.can_submit());

        state.pending = true;
        assert!(!state.can_submit());
    }
}
