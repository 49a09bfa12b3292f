//! Create/edit form for a heat exchanger.

use iced::widget::{button, checkbox, column, container, pick_list, row, rule, scrollable, text, text_input};
use iced::{Alignment, Element, Length, Theme};

use coolwatch_api::model::{HeatExchanger, HeatExchangerUpsert, Location, Program};

use crate::message::{KindChoice, Message, ProgramChoice};

/// State for the exchanger form.
#[derive(Debug, Default)]
pub struct ExchangerFormState {
    /// Id of the exchanger being edited, or None when creating.
    pub editing: Option<i64>,
    pub name: String,
    pub kind: KindChoice,
    pub rscm_ip: String,
    pub city: String,
    pub building: String,
    pub room: String,
    pub tile: String,
    pub is_active: bool,
    pub program: ProgramChoice,
    /// Programs available in the pick-list, fetched on entry.
    pub programs: Vec<Program>,
    pub error: Option<String>,
}

impl ExchangerFormState {
    /// An empty creation form.
    pub fn create() -> Self {
        Self {
            is_active: true,
            ..Self::default()
        }
    }

    /// A form pre-filled from an existing exchanger.
    pub fn edit(he: &HeatExchanger) -> Self {
        Self {
            editing: Some(he.id),
            name: he.name.clone(),
            kind: KindChoice::from_kind(he.kind.as_deref()),
            rscm_ip: he.rscm_ip.clone(),
            city: he.location.city.clone(),
            building: he.location.building.clone(),
            room: he.location.room.clone(),
            tile: he.location.tile.clone(),
            is_active: he.is_active,
            program: match (he.program_id, &he.program_name) {
                (Some(id), Some(name)) => ProgramChoice::Program {
                    id,
                    name: name.clone(),
                },
                _ => ProgramChoice::None,
            },
            programs: Vec::new(),
            error: None,
        }
    }

    /// Options for the program pick-list.
    pub fn program_options(&self) -> Vec<ProgramChoice> {
        std::iter::once(ProgramChoice::None)
            .chain(self.programs.iter().map(|p| ProgramChoice::Program {
                id: p.id,
                name: p.name.clone(),
            }))
            .collect()
    }

    /// Validate into an API payload.
    pub fn payload(&self) -> Result<HeatExchangerUpsert, String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if self.rscm_ip.trim().is_empty() {
            return Err("R-SCM IP is required".to_string());
        }

        for (label, value) in [
            ("City", &self.city),
            ("Building", &self.building),
            ("Room", &self.room),
            ("Tile", &self.tile),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} is required", label));
            }
        }

        Ok(HeatExchangerUpsert {
            name: self.name.trim().to_string(),
            kind: self.kind.as_kind(),
            rscm_ip: self.rscm_ip.trim().to_string(),
            location: Location {
                city: self.city.trim().to_string(),
                building: self.building.trim().to_string(),
                room: self.room.trim().to_string(),
                tile: self.tile.trim().to_string(),
            },
            is_active: self.is_active,
            program_id: self.program.id(),
        })
    }
}

/// Render the exchanger form view.
pub fn form_view(state: &ExchangerFormState) -> Element<'_, Message> {
    let back_button = button(text("<- Back").size(14))
        .on_press(Message::OpenDashboard)
        .style(iced::widget::button::secondary);

    let title = if state.editing.is_some() {
        text("Edit Heat Exchanger").size(24)
    } else {
        text("Add Heat Exchanger").size(24)
    };

    let header = row![back_button, title]
        .spacing(15)
        .align_y(Alignment::Center);

    let name_input = labeled(
        "Name:",
        text_input("HX-01", &state.name)
            .on_input(Message::SetFormName)
            .padding(8)
            .width(Length::Fixed(250.0))
            .into(),
    );

    let kind_picker = labeled(
        "Type:",
        pick_list(KindChoice::ALL, Some(state.kind), Message::SetFormKind).into(),
    );

    let ip_input = labeled(
        "R-SCM IP:",
        text_input("10.0.0.1", &state.rscm_ip)
            .on_input(Message::SetFormRscmIp)
            .padding(8)
            .width(Length::Fixed(200.0))
            .into(),
    );

    let location_title = text("Location").size(18);

    let location_row = row![
        text_input("City", &state.city)
            .on_input(Message::SetFormCity)
            .padding(8)
            .width(Length::Fixed(150.0)),
        text_input("Building", &state.building)
            .on_input(Message::SetFormBuilding)
            .padding(8)
            .width(Length::Fixed(150.0)),
        text_input("Room", &state.room)
            .on_input(Message::SetFormRoom)
            .padding(8)
            .width(Length::Fixed(100.0)),
        text_input("Tile", &state.tile)
            .on_input(Message::SetFormTile)
            .padding(8)
            .width(Length::Fixed(100.0)),
    ]
    .spacing(10);

    let active_toggle = checkbox(state.is_active).label("Active").on_toggle(Message::SetFormActive);

    let program_picker = labeled(
        "Program:",
        pick_list(
            state.program_options(),
            Some(state.program.clone()),
            Message::SetFormProgram,
        )
        .into(),
    );

    let mut content = column![
        header,
        rule::horizontal(1),
        name_input,
        kind_picker,
        ip_input,
        location_title,
        location_row,
        active_toggle,
        program_picker,
    ]
    .spacing(12)
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

    let save_label = if state.editing.is_some() {
        "Save Changes"
    } else {
        "Create"
    };
    content = content.push(
        button(text(save_label).size(14))
            .on_press(Message::SubmitExchangerForm)
            .style(iced::widget::button::primary),
    );

    container(scrollable(content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn labeled<'a>(label: &'a str, input: Element<'a, Message>) -> Element<'a, Message> {
    row![text(label).size(14).width(Length::Fixed(90.0)), input]
        .spacing(10)
        .align_y(Alignment::Center)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> ExchangerFormState {
        ExchangerFormState {
            name: "HX-01".to_string(),
            kind: KindChoice::Callan,
            rscm_ip: "10.0.0.1".to_string(),
            city: "Dublin".to_string(),
            building: "B2".to_string(),
            room: "104".to_string(),
            tile: "A7".to_string(),
            is_active: true,
            ..ExchangerFormState::create()
        }
    }

    #[test]
    fn test_payload_from_valid_form() {
        let payload = filled_form().payload().unwrap();
        assert_eq!(payload.name, "HX-01");
        assert_eq!(payload.kind.as_deref(), Some("Callan"));
        assert_eq!(payload.location.city, "Dublin");
        assert_eq!(payload.program_id, None);
    }

    #[test]
    fn test_every_location_field_is_required() {
        for field in ["city", "building", "room", "tile"] {
            let mut form = filled_form();
            match field {
                "city" => form.city.clear(),
                "building" => form.building.clear(),
                "room" => form.room.clear(),
                _ => form.tile.clear(),
            }
            assert!(form.payload().is_err(), "{} should be required", field);
        }
    }

    #[test]
    fn test_unspecified_kind_is_omitted() {
        let mut form = filled_form();
        form.kind = KindChoice::Unspecified;
        assert_eq!(form.payload().unwrap().kind, None);
    }
}
