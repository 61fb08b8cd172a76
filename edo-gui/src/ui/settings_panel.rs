//! # Settings Panel Module
//!
//! Degree names, base frequency, the octave window and reset.

use iced::widget::{Space, button, column, row, text, text_input};
use iced::{Alignment, Color, Element, Length};

use edo_core::keyboard::HIGHEST_OCTAVE_NUMBER;

use crate::Message;

/// Lowest value the octave steppers accept.
const MIN_OCTAVE_SETTING: u32 = 1;
/// Highest value the octave steppers accept.
const MAX_OCTAVE_SETTING: u32 = HIGHEST_OCTAVE_NUMBER - 1;

/// Splits user input into degree names. Commas and whitespace both separate names.
pub fn parse_degree_list(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Formats degree names the way [`parse_degree_list`] reads them back.
pub fn format_degree_list(degrees: &[String]) -> String {
    degrees.join(", ")
}

/// Reads a base frequency in Hz; it must be a finite, positive number.
pub fn parse_base_frequency(input: &str) -> Result<f64, String> {
    match input.trim().parse::<f64>() {
        Ok(frequency) if frequency.is_finite() && frequency > 0.0 => Ok(frequency),
        Ok(_) => Err(format!("Base frequency must be above 0 Hz (got {})", input.trim())),
        Err(_) => Err(format!("'{}' is not a frequency", input.trim())),
    }
}

/// Creates the settings panel.
///
/// The octave controls are only shown when there is a keyboard to window,
/// and the reset button only once the tuning has been touched.
pub fn create_settings_panel(data: &crate::AppDisplayData) -> Element<'static, Message>
{
    let degrees_row = row![
        text("Degrees").size(14).width(Length::Fixed(140.0)),
        text_input("C, C#, D, ...", &data.degrees_input)
            .on_input(Message::DegreesInput)
            .on_submit(Message::DegreesSubmitted)
            .padding(6),
    ]
    .align_y(Alignment::Center)
    .spacing(10);

    let base_frequency_row = row![
        text("Base frequency (Hz)").size(14).width(Length::Fixed(140.0)),
        text_input("16.35", &data.base_frequency_input)
            .on_input(Message::BaseFrequencyInput)
            .on_submit(Message::BaseFrequencySubmitted)
            .padding(6)
            .width(Length::Fixed(120.0)),
    ]
    .align_y(Alignment::Center)
    .spacing(10);

    let mut panel = column![degrees_row, base_frequency_row].spacing(8);

    if data.tuning.degree_count() > 0 {
        panel = panel.push(
            row![
                text("Show").size(14),
                make_stepper(data.range.octaves(), Message::OctavesChanged),
                text("octaves starting from octave #").size(14),
                make_stepper(data.range.start_octave(), Message::StartOctaveChanged),
            ]
            .align_y(Alignment::Center)
            .spacing(8),
        );
    }

    if let Some(error) = &data.input_error {
        panel = panel.push(
            text(error.clone())
                .size(14)
                .color(Color::from_rgb(0.9, 0.3, 0.3)),
        );
    }

    if data.touched {
        panel = panel.push(Space::with_height(4));
        panel = panel.push(
            button(text("Reset to 12-TET").size(14))
                .padding([6, 10])
                .on_press(Message::Reset),
        );
    }

    panel.into()
}

/// A value with `-`/`+` buttons, bounded to the octave settings range.
fn make_stepper(value: u32, on_change: fn(u32) -> Message) -> Element<'static, Message>
{
    row![
        button(text("-").size(14))
            .padding([2, 8])
            .on_press_maybe((value > MIN_OCTAVE_SETTING).then(|| on_change(value - 1))),
        text(value.to_string()).size(16),
        button(text("+").size(14))
            .padding([2, 8])
            .on_press_maybe((value < MAX_OCTAVE_SETTING).then(|| on_change(value + 1))),
    ]
    .align_y(Alignment::Center)
    .spacing(6)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_lists_split_on_commas_and_spaces() {
        assert_eq!(parse_degree_list("C, C#,D  D#\tE"), vec!["C", "C#", "D", "D#", "E"]);
        assert!(parse_degree_list(" , ,, ").is_empty());
    }

    #[test]
    fn degree_lists_round_trip_through_the_text_field() {
        let degrees = parse_degree_list("Do Re Mi");
        assert_eq!(parse_degree_list(&format_degree_list(&degrees)), degrees);
    }

    #[test]
    fn base_frequency_must_be_positive() {
        assert_eq!(parse_base_frequency(" 27.5 "), Ok(27.5));
        assert!(parse_base_frequency("0").is_err());
        assert!(parse_base_frequency("-3").is_err());
        assert!(parse_base_frequency("inf").is_err());
        assert!(parse_base_frequency("NaN").is_err());
        assert!(parse_base_frequency("abc").is_err());
    }
}
