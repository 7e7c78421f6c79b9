// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Piano keyboard widget.
//!
//! White keys share the width evenly; black keys sit on top, placed by their
//! offset within the octave. Layout and hit-testing are pure functions of
//! the drawing area, so mouse clicks land on the key that was drawn there.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Widget},
};

use crate::music::{generate_keyboard_data, KeyboardKey, NoteToken};
use crate::practice::{KeyState, PracticeSession};

/// White keys per octave
const OCTAVE_WHITE_KEYS: u16 = 7;

/// A key and where it is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyRect {
    pub key: KeyboardKey,
    pub rect: Rect,
}

/// Place every key of the practice range inside `area`.
///
/// White keys come first in the result, then black keys.
pub fn layout_keys(area: Rect) -> Vec<KeyRect> {
    let keys = generate_keyboard_data();
    let white_count = keys.iter().filter(|k| !k.is_black).count() as u16;
    if white_count == 0 || area.width == 0 || area.height == 0 {
        return Vec::new();
    }

    let key_width = (area.width / white_count).max(1);
    let left = area.x + area.width.saturating_sub(key_width * white_count) / 2;
    let octave_width = key_width * OCTAVE_WHITE_KEYS;
    let first_octave = keys.first().map(|k| k.octave()).unwrap_or_default();

    let black_width = (key_width * 2 / 3).max(1);
    let black_height = (area.height * 3 / 5).max(1);

    let mut white = Vec::new();
    let mut black = Vec::new();
    let mut white_index = 0u16;

    for key in keys {
        if let Some(offset) = key.offset {
            let octave_left = left + (key.octave() - first_octave) as u16 * octave_width;
            let x = octave_left + (offset / 100.0 * octave_width as f32).round() as u16;
            let rect = Rect::new(x, area.y, black_width, black_height).intersection(area);
            black.push(KeyRect { key, rect });
        } else {
            let x = left + white_index * key_width;
            let rect = Rect::new(x, area.y, key_width, area.height).intersection(area);
            white.push(KeyRect { key, rect });
            white_index += 1;
        }
    }

    white.extend(black);
    white
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Key drawn at a terminal cell, if any. Black keys win where they overlap.
pub fn key_at(area: Rect, x: u16, y: u16) -> Option<NoteToken> {
    let keys = layout_keys(area);
    keys.iter()
        .rev()
        .find(|k| k.key.is_black && contains(k.rect, x, y))
        .or_else(|| keys.iter().find(|k| !k.key.is_black && contains(k.rect, x, y)))
        .map(|k| k.key.note)
}

/// Fill and label colors for a key
pub fn key_style(state: KeyState, is_black: bool) -> Style {
    let bg = match (state, is_black) {
        (KeyState::Correct, false) => Color::LightGreen,
        (KeyState::Correct, true) => Color::Green,
        (KeyState::Incorrect, false) => Color::LightRed,
        (KeyState::Incorrect, true) => Color::Red,
        (KeyState::Pressed, false) => Color::Gray,
        (KeyState::Pressed, true) => Color::DarkGray,
        (KeyState::Hinted, false) => Color::LightBlue,
        (KeyState::Hinted, true) => Color::Blue,
        (KeyState::Idle, false) => Color::White,
        (KeyState::Idle, true) => Color::Black,
    };
    let fg = if is_black { Color::White } else { Color::Black };
    Style::default().bg(bg).fg(fg)
}

/// Keyboard widget drawn from a practice session
pub struct KeyboardWidget<'a> {
    session: &'a PracticeSession,
    block: Option<Block<'a>>,
}

impl<'a> KeyboardWidget<'a> {
    pub fn new(session: &'a PracticeSession) -> Self {
        Self {
            session,
            block: None,
        }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for KeyboardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let show_names = self.session.settings().show_note_names;

        for KeyRect { key, rect } in layout_keys(area) {
            if rect.width == 0 || rect.height == 0 {
                continue;
            }
            let style = key_style(self.session.key_state(&key.note), key.is_black);
            buf.set_style(rect, style);

            // Gap between neighbouring white keys
            if !key.is_black && rect.width > 1 {
                let edge = rect.x + rect.width - 1;
                for y in rect.y..rect.y + rect.height {
                    buf.set_string(edge, y, "▕", style.fg(Color::DarkGray));
                }
            }

            if show_names {
                let label = key.note.pitch().name();
                let label_width = label.chars().count() as u16;
                if label_width <= rect.width {
                    let x = rect.x + (rect.width - label_width) / 2;
                    let y = rect.y + rect.height - 1;
                    buf.set_string(x, y, label, style.add_modifier(Modifier::BOLD));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::PracticeSettings;
    use std::time::Instant;

    fn area() -> Rect {
        // 15 white keys, 4 cells each
        Rect::new(0, 0, 60, 10)
    }

    fn note(s: &str) -> NoteToken {
        s.parse().unwrap()
    }

    #[test]
    fn test_layout_counts() {
        let keys = layout_keys(area());
        assert_eq!(keys.len(), 25);
        assert_eq!(keys.iter().filter(|k| k.key.is_black).count(), 10);
    }

    #[test]
    fn test_white_keys_are_even() {
        let keys = layout_keys(area());
        let white: Vec<_> = keys.iter().filter(|k| !k.key.is_black).collect();
        for (i, k) in white.iter().enumerate() {
            assert_eq!(k.rect.x, i as u16 * 4);
            assert_eq!(k.rect.width, 4);
            assert_eq!(k.rect.height, 10);
        }
    }

    #[test]
    fn test_black_key_placement() {
        let keys = layout_keys(area());
        let c_sharp = keys
            .iter()
            .find(|k| k.key.note == note("C#3"))
            .unwrap();
        // 8.5% of a 28-cell octave
        assert_eq!(c_sharp.rect.x, 2);
        assert_eq!(c_sharp.rect.height, 6);

        let f_sharp4 = keys
            .iter()
            .find(|k| k.key.note == note("F#4"))
            .unwrap();
        // 28 + 44.5% of 28
        assert_eq!(f_sharp4.rect.x, 28 + 12);
    }

    #[test]
    fn test_key_at() {
        let a = area();
        // Bottom row of the first key is C3
        assert_eq!(key_at(a, 1, 9), Some(note("C3")));
        // Top of the same column is under C#3
        assert_eq!(key_at(a, 3, 0), Some(note("C#3")));
        // Last white key
        assert_eq!(key_at(a, 59, 9), Some(note("C5")));
        // Outside
        assert_eq!(key_at(a, 70, 5), None);
        assert_eq!(key_at(a, 5, 20), None);
    }

    #[test]
    fn test_key_at_matches_every_key() {
        let a = area();
        for k in layout_keys(a) {
            // Bottom-left cell of white keys, top-left of black keys
            let y = if k.key.is_black { k.rect.y } else { k.rect.y + k.rect.height - 1 };
            assert_eq!(key_at(a, k.rect.x, y), Some(k.key.note), "{}", k.key.note);
        }
    }

    #[test]
    fn test_tiny_area() {
        assert!(layout_keys(Rect::new(0, 0, 0, 5)).is_empty());
        assert_eq!(key_at(Rect::new(0, 0, 0, 5), 0, 0), None);
        // Narrower than 15 cells still lays out without panicking
        let keys = layout_keys(Rect::new(0, 0, 10, 3));
        assert_eq!(keys.len(), 25);
    }

    #[test]
    fn test_render_colors() {
        let mut session = PracticeSession::new(PracticeSettings::default()).unwrap();
        let now = Instant::now();
        session.press(note("C3"), now);
        session.press(note("C#3"), now);

        let a = area();
        let mut buf = Buffer::empty(a);
        KeyboardWidget::new(&session).render(a, &mut buf);

        // C3 pressed and in scale
        assert_eq!(buf[(0, 9)].bg, Color::LightGreen);
        // C#3 flagged wrong
        assert_eq!(buf[(3, 0)].bg, Color::Red);
        // D3 untouched
        assert_eq!(buf[(5, 9)].bg, Color::White);
        // Note names on by default
        assert_eq!(buf[(1, 9)].symbol(), "C");
    }

    #[test]
    fn test_key_styles_differ() {
        let states = [
            KeyState::Idle,
            KeyState::Hinted,
            KeyState::Pressed,
            KeyState::Correct,
            KeyState::Incorrect,
        ];
        for is_black in [false, true] {
            for (i, a) in states.iter().enumerate() {
                for b in &states[i + 1..] {
                    assert_ne!(key_style(*a, is_black), key_style(*b, is_black));
                }
            }
        }
    }
}
