//! # EDO Keyboard Widget
//!
//! This module provides an interactive keyboard for any equal division of the
//! octave. Every key gets one equal-width column labelled with its note name;
//! keys whose degree name carries a sharp or flat are drawn dark.
//!
//! ## Features
//! - Any number of keys per octave
//! - Note name labels from the current degree set
//! - Press-and-hold playing: a key sounds until the mouse is released or
//!   leaves it
//! - Visual feedback for the held key

use iced::widget::canvas::{self, Event, Fill, Geometry, Path, Stroke, event};
use iced::widget::container;
use iced::{Color, Element, Pixels, Point, Rectangle, Renderer, Size, Theme, alignment, mouse};

use edo_core::Key;

use crate::Message;

/// Label size for keys in points.
const LABEL_SIZE: f32 = 11.0;

/// Interactive EDO keyboard.
#[derive(Debug, Clone)]
pub struct EdoKeyboard {
    keys: Vec<Key>,
    /// Key currently held down, if any
    pressed_key: Option<usize>,
}

impl EdoKeyboard {
    pub fn new(keys: Vec<Key>, pressed_key: Option<usize>) -> Self {
        Self { keys, pressed_key }
    }

    pub fn view(self) -> Element<'static, Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fill),
        )
        .into()
    }

    fn key_index_from_pos(&self, bounds: Size, pos: Point) -> Option<usize> {
        key_index_at(self.keys.len(), bounds.width, pos.x)
    }
}

/// Index of the column under `x` when `key_count` keys share `width` equally.
fn key_index_at(key_count: usize, width: f32, x: f32) -> Option<usize> {
    if key_count == 0 || width <= 0.0 || x < 0.0 {
        return None;
    }
    let index = (x / (width / key_count as f32)).floor() as usize;
    (index < key_count).then_some(index)
}

impl canvas::Program<Message> for EdoKeyboard {
    /// Key held by this widget's own press, so the release goes to the same key.
    type State = Option<usize>;

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        let Event::Mouse(mouse_event) = event else {
            return (event::Status::Ignored, None);
        };
        let hovered_key = cursor
            .position_in(bounds)
            .and_then(|position| self.key_index_from_pos(bounds.size(), position));

        match mouse_event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                if let Some(key_index) = hovered_key {
                    *state = Some(key_index);
                    return (event::Status::Captured, Some(Message::KeyPressed(key_index)));
                }
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                if let Some(key_index) = state.take() {
                    return (event::Status::Captured, Some(Message::KeyReleased(key_index)));
                }
            }
            // Sliding off the held key releases it.
            mouse::Event::CursorMoved { .. } | mouse::Event::CursorLeft => {
                if let Some(key_index) = *state {
                    if hovered_key != Some(key_index) {
                        *state = None;
                        return (event::Status::Captured, Some(Message::KeyReleased(key_index)));
                    }
                }
            }
            _ => {}
        }
        (event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        if self.keys.is_empty() {
            return vec![frame.into_geometry()];
        }

        let key_width = bounds.width / self.keys.len() as f32;

        for (i, key) in self.keys.iter().enumerate() {
            let key_x = i as f32 * key_width;
            let is_pressed = self.pressed_key == Some(i);

            let (fill, label_color) = match (is_pressed, key.accidental) {
                (true, _) => (Color::from_rgb8(0x34, 0xDB, 0x98), Color::BLACK), // Green (Held)
                (false, true) => (Color::from_rgb8(0x22, 0x22, 0x22), Color::WHITE),
                (false, false) => (Color::WHITE, Color::BLACK),
            };

            let top_left = Point::new(key_x, 0.0);
            let size = Size::new(key_width, bounds.height);
            frame.fill_rectangle(top_left, size, Fill::from(fill));
            frame.stroke(
                &Path::rectangle(top_left, size),
                Stroke::default().with_color(Color::from_rgb8(0x55, 0x55, 0x55)),
            );

            frame.fill_text(canvas::Text {
                content: key.label.clone(),
                position: Point::new(key_x + key_width / 2.0, bounds.height - 6.0),
                color: label_color,
                size: Pixels(LABEL_SIZE),
                horizontal_alignment: alignment::Horizontal::Center,
                vertical_alignment: alignment::Vertical::Bottom,
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_split_the_width_evenly() {
        assert_eq!(key_index_at(4, 400.0, 0.0), Some(0));
        assert_eq!(key_index_at(4, 400.0, 99.9), Some(0));
        assert_eq!(key_index_at(4, 400.0, 100.0), Some(1));
        assert_eq!(key_index_at(4, 400.0, 399.0), Some(3));
    }

    #[test]
    fn positions_outside_the_keys_hit_nothing() {
        assert_eq!(key_index_at(4, 400.0, 400.0), None);
        assert_eq!(key_index_at(4, 400.0, -1.0), None);
        assert_eq!(key_index_at(0, 400.0, 10.0), None);
    }
}
