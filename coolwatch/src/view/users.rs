//! User administration view.

use iced::widget::{Column, Row, button, checkbox, column, container, row, rule, scrollable, text, text_input};
use iced::{Alignment, Element, Length, Theme};

use coolwatch_api::model::{User, UserUpsert};

use crate::message::Message;

/// Create/edit form state.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    /// Id of the user being edited, or None when creating.
    pub editing: Option<i64>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

/// State for the user administration page.
#[derive(Debug, Default)]
pub struct UsersState {
    pub users: Vec<User>,
    pub form: Option<UserForm>,
    pub error: Option<String>,
}

impl UsersState {
    /// Open the form, pre-filled when editing an existing user.
    pub fn open_form(&mut self, user: Option<&User>) {
        self.error = None;
        self.form = Some(match user {
            None => UserForm::default(),
            Some(user) => UserForm {
                editing: Some(user.id),
                username: user.username.clone(),
                email: user.email.clone().unwrap_or_default(),
                password: String::new(),
                is_admin: user.is_admin,
            },
        });
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.error = None;
    }

    /// Validate the form into an API payload.
    pub fn payload(&self) -> Result<UserUpsert, String> {
        let form = self.form.as_ref().ok_or("No form open")?;

        if form.username.trim().is_empty() {
            return Err("Username is required".to_string());
        }

        if form.editing.is_none() && form.password.trim().is_empty() {
            return Err("Password is required for new users".to_string());
        }

        Ok(UserUpsert {
            username: form.username.trim().to_string(),
            email: if form.email.trim().is_empty() {
                None
            } else {
                Some(form.email.trim().to_string())
            },
            is_admin: form.is_admin,
            // Left unchanged on edit when the field stays empty.
            password: if form.password.is_empty() {
                None
            } else {
                Some(form.password.clone())
            },
        })
    }
}

/// Render the users view.
pub fn users_view(state: &UsersState) -> Element<'_, Message> {
    let header = render_header();
    let table = render_table(state);

    let mut content = column![header, rule::horizontal(1), table]
        .spacing(15)
        .padding(20);

    if let Some(error) = &state.error {
        content = content.push(
            text(format!("Error: {}", error))
                .size(14)
                .style(|_theme: &Theme| text::Style {
                    color: Some(iced::Color::from_rgb(1.0, 0.3, 0.3)),
                }),
        );
    }

    if state.form.is_some() {
        content = content.push(rule::horizontal(1));
        content = content.push(render_form(state));
    }

    container(scrollable(content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn render_header<'a>() -> Element<'a, Message> {
    let back_button = button(text("<- Back").size(14))
        .on_press(Message::OpenDashboard)
        .style(iced::widget::button::secondary);

    let title = text("User Management").size(24);

    let new_button = button(text("New User").size(14))
        .on_press(Message::OpenUserForm(None))
        .style(iced::widget::button::primary);

    row![back_button, title, new_button]
        .spacing(15)
        .align_y(Alignment::Center)
        .into()
}

fn render_table(state: &UsersState) -> Element<'_, Message> {
    if state.users.is_empty() {
        return text("No users found").size(14).into();
    }

    let header = row![
        cell("Username", 160.0),
        cell("Email", 200.0),
        cell("Role", 100.0),
        cell("Status", 80.0),
        cell("Actions", 220.0),
    ]
    .spacing(8);

    let mut table = Column::new().push(header).spacing(6);

    for user in &state.users {
        table = table.push(render_user_row(user));
    }

    table.into()
}

fn render_user_row(user: &User) -> Element<'_, Message> {
    let role = if user.is_admin { "Admin" } else { "Technician" };
    let status = if user.is_active { "Active" } else { "Pending" };

    let actions: Row<'_, Message> = if user.is_active {
        row![
            button(text("Edit").size(11))
                .on_press(Message::OpenUserForm(Some(user.id)))
                .style(iced::widget::button::secondary),
            button(text("Delete").size(11))
                .on_press(Message::DeleteUser(user.id))
                .style(iced::widget::button::danger),
        ]
        .spacing(6)
    } else {
        row![
            button(text("Approve").size(11))
                .on_press(Message::ApproveUser(user.id))
                .style(iced::widget::button::primary),
            button(text("Deny").size(11))
                .on_press(Message::DenyUser(user.id))
                .style(iced::widget::button::danger),
        ]
        .spacing(6)
    };

    row![
        cell_owned(user.username.clone(), 160.0),
        cell_owned(user.email.clone().unwrap_or_else(|| "N/A".into()), 200.0),
        cell_owned(role.to_string(), 100.0),
        cell_owned(status.to_string(), 80.0),
        actions,
    ]
    .spacing(8)
    .align_y(Alignment::Center)
    .into()
}

fn render_form(state: &UsersState) -> Element<'_, Message> {
    let Some(form) = &state.form else {
        return text("").into();
    };

    let section_title = if form.editing.is_some() {
        text("Edit User").size(18)
    } else {
        text("New User").size(18)
    };

    let username_input = text_input("Username", &form.username)
        .on_input(Message::SetUserFormUsername)
        .padding(8)
        .width(Length::Fixed(200.0));

    let email_input = text_input("Email (optional)", &form.email)
        .on_input(Message::SetUserFormEmail)
        .padding(8)
        .width(Length::Fixed(250.0));

    let password_placeholder = if form.editing.is_some() {
        "Password (leave empty to keep)"
    } else {
        "Password"
    };
    let password_input = text_input(password_placeholder, &form.password)
        .on_input(Message::SetUserFormPassword)
        .secure(true)
        .padding(8)
        .width(Length::Fixed(250.0));

    let admin_toggle =
        checkbox(form.is_admin).label("Administrator").on_toggle(Message::SetUserFormAdmin);

    let save_button = button(text("Save").size(14))
        .on_press(Message::SubmitUserForm)
        .style(iced::widget::button::primary);

    let cancel_button = button(text("Cancel").size(14))
        .on_press(Message::CloseUserForm)
        .style(iced::widget::button::secondary);

    column![
        section_title,
        row![username_input, email_input, password_input]
            .spacing(10)
            .align_y(Alignment::Center),
        row![admin_toggle, save_button, cancel_button]
            .spacing(10)
            .align_y(Alignment::Center),
    ]
    .spacing(10)
    .into()
}

fn cell(label: &str, width: f32) -> Element<'_, Message> {
    text(label).size(12).width(Length::Fixed(width)).into()
}

fn cell_owned<'a>(label: String, width: f32) -> Element<'a, Message> {
    text(label).size(12).width(Length::Fixed(width)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, username: &str, is_admin: bool) -> User {
        User {
            id,
            username: username.to_string(),
            email: Some(format!("{}@example.com", username)),
            is_admin,
            is_active: true,
        }
    }

    #[test]
    fn test_new_user_requires_password() {
        let mut state = UsersState::default();
        state.open_form(None);
        state.form.as_mut().unwrap().username = "carol".to_string();

        assert!(state.payload().is_err());

        state.form.as_mut().unwrap().password = "secret".to_string();
        let payload = state.payload().unwrap();
        assert_eq!(payload.username, "carol");
        assert_eq!(payload.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_edit_keeps_password_when_empty() {
        let mut state = UsersState::default();
        state.open_form(Some(&user(3, "dave", true)));

        let payload = state.payload().unwrap();
        assert_eq!(payload.username, "dave");
        assert!(payload.is_admin);
        assert_eq!(payload.password, None);
    }

    #[test]
    fn test_username_is_required() {
        let mut state = UsersState::default();
        state.open_form(None);
        state.form.as_mut().unwrap().password = "secret".to_string();

        assert!(state.payload().is_err());
    }
}
