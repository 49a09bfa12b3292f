//! Program management view.

use iced::widget::{Column, button, column, container, row, rule, scrollable, text, text_input};
use iced::{Alignment, Element, Length};

use coolwatch_api::model::Program;

use crate::message::Message;

/// State for the programs page.
#[derive(Debug, Default)]
pub struct ProgramsState {
    pub programs: Vec<Program>,
    pub new_name: String,
    pub new_description: String,
}

impl ProgramsState {
    /// Validate the creation form.
    pub fn validate(&self) -> Result<(String, Option<String>), String> {
        let name = self.new_name.trim();
        if name.is_empty() {
            return Err("Program name is required".to_string());
        }

        let description = self.new_description.trim();
        Ok((
            name.to_string(),
            if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        ))
    }

    pub fn clear_form(&mut self) {
        self.new_name.clear();
        self.new_description.clear();
    }
}

/// Render the programs view.
pub fn programs_view(state: &ProgramsState) -> Element<'_, Message> {
    let back_button = button(text("<- Back").size(14))
        .on_press(Message::OpenDashboard)
        .style(iced::widget::button::secondary);

    let header = row![back_button, text("Programs").size(24)]
        .spacing(15)
        .align_y(Alignment::Center);

    let name_input = text_input("Program name", &state.new_name)
        .on_input(Message::SetNewProgramName)
        .padding(8)
        .width(Length::Fixed(200.0));

    let description_input = text_input("Description (optional)", &state.new_description)
        .on_input(Message::SetNewProgramDescription)
        .padding(8)
        .width(Length::Fixed(300.0));

    let add_button = button(text("Add Program").size(14))
        .on_press(Message::AddProgram)
        .style(iced::widget::button::primary);

    let form = row![name_input, description_input, add_button]
        .spacing(10)
        .align_y(Alignment::Center);

    let list = render_list(state);

    let content = column![header, form, rule::horizontal(1), list]
        .spacing(15)
        .padding(20);

    container(scrollable(content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn render_list(state: &ProgramsState) -> Element<'_, Message> {
    if state.programs.is_empty() {
        return text("No programs defined").size(14).into();
    }

    let mut list = Column::new().spacing(6);

    for program in &state.programs {
        let mut line = row![text(program.name.clone()).size(14)]
            .spacing(10)
            .align_y(Alignment::Center);

        if let Some(description) = &program.description {
            line = line.push(text(description.clone()).size(12));
        }

        line = line.push(
            button(text("Delete").size(11))
                .on_press(Message::DeleteProgram(program.id))
                .style(iced::widget::button::danger),
        );

        list = list.push(line);
    }

    list.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_name() {
        let mut state = ProgramsState::default();
        assert!(state.validate().is_err());

        state.new_name = "  GB200  ".to_string();
        let (name, description) = state.validate().unwrap();
        assert_eq!(name, "GB200");
        assert_eq!(description, None);
    }

    #[test]
    fn test_validate_trims_description() {
        let state = ProgramsState {
            new_name: "GB200".to_string(),
            new_description: "  Rack program  ".to_string(),
            ..ProgramsState::default()
        };

        let (_, description) = state.validate().unwrap();
        assert_eq!(description.as_deref(), Some("Rack program"));
    }
}
