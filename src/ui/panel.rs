// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Settings panel and scale display widgets.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::midi::MidiStatus;
use crate::music::PitchClass;
use crate::practice::PracticeSettings;

/// Current practice settings and MIDI device, on one line
pub struct ControlPanelWidget<'a> {
    settings: &'a PracticeSettings,
    midi: &'a MidiStatus,
    block: Option<Block<'a>>,
}

impl<'a> ControlPanelWidget<'a> {
    pub fn new(settings: &'a PracticeSettings, midi: &'a MidiStatus) -> Self {
        Self {
            settings,
            midi,
            block: None,
        }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn spans(&self) -> Vec<Span<'a>> {
        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

        let mut spans = vec![
            Span::styled("Key ", label),
            Span::styled(self.settings.key.tonic().name(), value),
            Span::styled("  Scale ", label),
            Span::styled(self.settings.key.quality().name(), value),
            Span::styled("  Names ", label),
            toggle(self.settings.show_note_names),
            Span::styled("  Hints ", label),
            toggle(self.settings.show_hints),
        ];

        if !self.midi.devices.is_empty() {
            let device = self
                .midi
                .device_name
                .clone()
                .unwrap_or_else(|| "(none)".to_string());
            spans.push(Span::styled("  MIDI ", label));
            spans.push(Span::styled(device, value));
        }
        spans
    }
}

fn toggle(on: bool) -> Span<'static> {
    if on {
        Span::styled("on", Style::default().fg(Color::Green))
    } else {
        Span::styled("off", Style::default().fg(Color::DarkGray))
    }
}

impl Widget for ControlPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(self.spans());
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };
        Paragraph::new(line).render(area, buf);
    }
}

/// Key name and its pitch classes
pub struct ScaleWidget<'a> {
    settings: &'a PracticeSettings,
    pitches: &'a [PitchClass],
    block: Option<Block<'a>>,
}

impl<'a> ScaleWidget<'a> {
    pub fn new(settings: &'a PracticeSettings, pitches: &'a [PitchClass]) -> Self {
        Self {
            settings,
            pitches,
            block: None,
        }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for ScaleWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let names: Vec<&str> = self.pitches.iter().map(|pc| pc.name()).collect();
        let line = Line::from(vec![
            Span::styled(
                format!("{} scale", self.settings.key),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  notes: ", Style::default().fg(Color::DarkGray)),
            Span::styled(names.join(", "), Style::default().fg(Color::Yellow)),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::KeySignature;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                text.push_str(buf[(x, y)].symbol());
            }
        }
        text
    }

    #[test]
    fn test_control_panel_shows_settings() {
        let settings = PracticeSettings {
            key: KeySignature::parse("F#", "minor").unwrap(),
            show_note_names: true,
            show_hints: false,
        };
        let midi = MidiStatus {
            supported: true,
            connected: true,
            device_name: Some("Keystation".to_string()),
            devices: vec!["Keystation".to_string()],
        };
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        ControlPanelWidget::new(&settings, &midi).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Key F#"));
        assert!(text.contains("Scale Natural Minor"));
        assert!(text.contains("Names on"));
        assert!(text.contains("Hints off"));
        assert!(text.contains("MIDI Keystation"));
    }

    #[test]
    fn test_control_panel_hides_midi_without_devices() {
        let settings = PracticeSettings::default();
        let midi = MidiStatus::default();
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        ControlPanelWidget::new(&settings, &midi).render(area, &mut buf);
        assert!(!buffer_text(&buf).contains("MIDI"));
    }

    #[test]
    fn test_scale_widget() {
        let settings = PracticeSettings {
            key: KeySignature::parse("G", "major").unwrap(),
            ..PracticeSettings::default()
        };
        let pitches = [
            PitchClass::G,
            PitchClass::A,
            PitchClass::B,
            PitchClass::C,
            PitchClass::D,
            PitchClass::E,
            PitchClass::Fs,
        ];
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        ScaleWidget::new(&settings, &pitches).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("G Major scale"));
        assert!(text.contains("G, A, B, C, D, E, F#"));
    }
}
