//! # Main Display Module
//!
//! This module contains the main display components and layout logic
//! for the EDO keyboard application.

use iced::widget::{Space, column, container, text};
use iced::{Element, Length};

use edo_core::keyboard::describe_system;

use super::settings_panel::create_settings_panel;
use crate::widgets::edo_keyboard;

/// Creates the complete main application view
pub fn create_main_view(data: &crate::AppDisplayData) -> Element<'static, crate::Message>
{
    let (title, degree_size) = describe_system(&data.tuning);

    let mut header = column![text(title).size(28)].spacing(4);
    if let Some(degree_size) = degree_size {
        header = header.push(text(degree_size).size(16));
    }
    if !data.audio_active {
        header = header.push(text("Audio output unavailable - keys are silent").size(14));
    }

    let main_content = column![
        header,
        Space::with_height(10),
        create_settings_panel(data),
        Space::with_height(20),
        create_keyboard_panel(data),
    ]
    .padding(20);

    container(main_content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Creates the keyboard panel, or the empty-system message when there are no degrees.
fn create_keyboard_panel(data: &crate::AppDisplayData) -> Element<'static, crate::Message>
{
    if data.tuning.degree_count() == 0 {
        return text(format!(
            "A {}-TET system is a bit boring, isn't it?",
            data.tuning.degree_count()
        ))
        .size(18)
        .into();
    }

    let keyboard = edo_keyboard::EdoKeyboard::new(data.keys.clone(), data.pressed_key);

    container(keyboard.view())
        .width(Length::Fill)
        .height(Length::Fixed(220.0))
        .into()
}
