// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard shortcut and note-key handling.
//!
//! Two rows of the computer keyboard play the practice range, laid out like
//! a piano (lower row `z`..`/` and upper row `q`..`i` are white keys, the
//! rows above them are black keys). Other keys trigger practice and display
//! actions.
//!
//! Terminals that never report key releases get an auto-release after a
//! hold timeout instead.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ControlAction;
use crate::music::{NoteToken, PitchClass};

/// Default note keys
const DEFAULT_NOTE_KEYS: [(char, PitchClass, u32); 30] = [
    // Lower row, white keys
    ('z', PitchClass::C, 3),
    ('x', PitchClass::D, 3),
    ('c', PitchClass::E, 3),
    ('v', PitchClass::F, 3),
    ('b', PitchClass::G, 3),
    ('n', PitchClass::A, 3),
    ('m', PitchClass::B, 3),
    (',', PitchClass::C, 4),
    ('.', PitchClass::D, 4),
    ('/', PitchClass::E, 4),
    // Home row, black keys
    ('s', PitchClass::Cs, 3),
    ('d', PitchClass::Ds, 3),
    ('g', PitchClass::Fs, 3),
    ('h', PitchClass::Gs, 3),
    ('j', PitchClass::As, 3),
    ('l', PitchClass::Ds, 4),
    ('k', PitchClass::Cs, 4),
    // Upper row, white keys
    ('q', PitchClass::C, 4),
    ('w', PitchClass::D, 4),
    ('e', PitchClass::E, 4),
    ('r', PitchClass::F, 4),
    ('t', PitchClass::G, 4),
    ('y', PitchClass::A, 4),
    ('u', PitchClass::B, 4),
    ('i', PitchClass::C, 5),
    // Number row, black keys
    ('2', PitchClass::Cs, 4),
    ('3', PitchClass::Ds, 4),
    ('5', PitchClass::Fs, 4),
    ('6', PitchClass::Gs, 4),
    ('7', PitchClass::As, 4),
];

/// A keyboard shortcut definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// Key code
    pub code: KeyCode,
    /// Required modifiers
    pub modifiers: KeyModifiers,
}

impl Shortcut {
    /// Create a new shortcut
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Create a shortcut with no modifiers
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Create a shortcut with Ctrl modifier
    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }
}

/// A keyboard binding (shortcut to action)
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// The shortcut
    pub shortcut: Shortcut,
    /// The action to perform
    pub action: ControlAction,
    /// Description for help display
    pub description: String,
    /// Category for grouping in help
    pub category: String,
}

impl KeyBinding {
    /// Create a new key binding
    pub fn new(shortcut: Shortcut, action: ControlAction, description: impl Into<String>) -> Self {
        Self {
            shortcut,
            action,
            description: description.into(),
            category: "General".to_string(),
        }
    }

    /// Set the category
    pub fn category(mut self, cat: impl Into<String>) -> Self {
        self.category = cat.into();
        self
    }
}

/// Keyboard controller with configurable bindings
pub struct KeyboardController {
    bindings: HashMap<Shortcut, KeyBinding>,
    notes: HashMap<char, NoteToken>,
    /// Note keys currently down, with the time of the last press
    held: HashMap<char, (NoteToken, Instant)>,
    /// Auto-release delay, used only when key-up events never arrive
    hold_timeout: Option<Duration>,
}

impl KeyboardController {
    /// Create an empty keyboard controller
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            notes: HashMap::new(),
            held: HashMap::new(),
            hold_timeout: None,
        }
    }

    /// Create a keyboard controller with default bindings
    pub fn with_defaults() -> Self {
        let mut controller = Self::new();
        controller.add_default_bindings();
        for (c, pitch, octave) in DEFAULT_NOTE_KEYS {
            controller.bind_note(c, NoteToken::new(pitch, octave));
        }
        controller
    }

    /// Add default keyboard bindings
    fn add_default_bindings(&mut self) {
        // Practice
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Right), ControlAction::NextKey, "Next Key")
                .category("Practice"),
        );
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Left), ControlAction::PrevKey, "Previous Key")
                .category("Practice"),
        );
        self.add(
            KeyBinding::new(
                Shortcut::key(KeyCode::Up),
                ControlAction::ToggleQuality,
                "Major/Minor",
            )
            .category("Practice"),
        );
        self.add(
            KeyBinding::new(
                Shortcut::key(KeyCode::Down),
                ControlAction::ToggleQuality,
                "Major/Minor",
            )
            .category("Practice"),
        );
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::F(5)), ControlAction::Reset, "Reset Progress")
                .category("Practice"),
        );

        // Display
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::F(1)), ControlAction::ToggleHelp, "Toggle Help")
                .category("Display"),
        );
        self.add(
            KeyBinding::new(
                Shortcut::key(KeyCode::F(2)),
                ControlAction::ToggleNoteNames,
                "Toggle Note Names",
            )
            .category("Display"),
        );
        self.add(
            KeyBinding::new(
                Shortcut::key(KeyCode::F(3)),
                ControlAction::ToggleHints,
                "Toggle Hints",
            )
            .category("Display"),
        );

        // MIDI
        self.add(
            KeyBinding::new(
                Shortcut::key(KeyCode::F(4)),
                ControlAction::NextMidiDevice,
                "Next MIDI Device",
            )
            .category("MIDI"),
        );

        // General
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Esc), ControlAction::Quit, "Quit")
                .category("General"),
        );
        self.add(
            KeyBinding::new(Shortcut::ctrl(KeyCode::Char('c')), ControlAction::Quit, "Quit")
                .category("General"),
        );
    }

    /// Add a key binding
    pub fn add(&mut self, binding: KeyBinding) {
        self.bindings.insert(binding.shortcut.clone(), binding);
    }

    /// Bind a character to a note, replacing any previous binding
    pub fn bind_note(&mut self, c: char, note: NoteToken) {
        self.notes.insert(c.to_ascii_lowercase(), note);
    }

    /// Apply `char -> note token` overrides from configuration
    pub fn apply_note_bindings(&mut self, bindings: &HashMap<String, String>) -> Result<()> {
        for (key, token) in bindings {
            let mut chars = key.chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(anyhow!("Keyboard binding '{}' must be a single character", key)),
            };
            let note = token
                .parse::<NoteToken>()
                .with_context(|| format!("Keyboard binding '{}' has bad note '{}'", key, token))?;
            self.bind_note(c, note);
        }
        Ok(())
    }

    /// Note bound to a character, if any
    pub fn note_for(&self, c: char) -> Option<NoteToken> {
        self.notes.get(&c.to_ascii_lowercase()).copied()
    }

    /// Note bindings in keyboard order, for help display
    pub fn note_bindings(&self) -> Vec<(char, NoteToken)> {
        let mut notes: Vec<_> = self.notes.iter().map(|(c, n)| (*c, *n)).collect();
        notes.sort_by_key(|(c, n)| (*n, *c));
        notes
    }

    /// Enable auto-release for terminals without key-up events
    pub fn set_hold_timeout(&mut self, timeout: Option<Duration>) {
        self.hold_timeout = timeout;
    }

    /// Get action for a shortcut
    pub fn get_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<&ControlAction> {
        let shortcut = Shortcut::new(code, modifiers);
        self.bindings.get(&shortcut).map(|b| &b.action)
    }

    /// Process a key event and return the action
    pub fn process_key(&mut self, event: &KeyEvent, now: Instant) -> Option<ControlAction> {
        match event.kind {
            KeyEventKind::Repeat => None,
            KeyEventKind::Release => match event.code {
                KeyCode::Char(c) => self
                    .held
                    .remove(&c.to_ascii_lowercase())
                    .map(|(note, _)| ControlAction::ReleaseNote(note)),
                _ => None,
            },
            KeyEventKind::Press => {
                if let Some(action) = self.note_press(event, now) {
                    return action;
                }
                self.get_action(event.code, event.modifiers).cloned()
            }
        }
    }

    /// `Some` when the event is a note key; the inner value is the action,
    /// `None` for a repeated press of a key already down.
    fn note_press(&mut self, event: &KeyEvent, now: Instant) -> Option<Option<ControlAction>> {
        let KeyCode::Char(c) = event.code else {
            return None;
        };
        let blocked = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER | KeyModifiers::META;
        if event.modifiers.intersects(blocked) {
            return None;
        }
        let c = c.to_ascii_lowercase();
        let note = self.note_for(c)?;

        if let Some(entry) = self.held.get_mut(&c) {
            // Without key-up events, a held key arrives as repeated presses
            entry.1 = now;
            return Some(None);
        }
        self.held.insert(c, (note, now));
        Some(Some(ControlAction::PressNote(note)))
    }

    /// Release notes held past the auto-release timeout
    pub fn expire_held(&mut self, now: Instant) -> Vec<ControlAction> {
        let Some(timeout) = self.hold_timeout else {
            return Vec::new();
        };
        let expired: Vec<char> = self
            .held
            .iter()
            .filter(|(_, (_, pressed_at))| now.duration_since(*pressed_at) >= timeout)
            .map(|(c, _)| *c)
            .collect();

        expired
            .into_iter()
            .filter_map(|c| self.held.remove(&c))
            .map(|(note, _)| ControlAction::ReleaseNote(note))
            .collect()
    }

    /// Forget every held key, returning their releases
    pub fn release_all(&mut self) -> Vec<ControlAction> {
        self.held
            .drain()
            .map(|(_, (note, _))| ControlAction::ReleaseNote(note))
            .collect()
    }

    /// Get bindings grouped by category
    pub fn bindings_by_category(&self) -> HashMap<String, Vec<&KeyBinding>> {
        let mut grouped: HashMap<String, Vec<&KeyBinding>> = HashMap::new();

        for binding in self.bindings.values() {
            grouped
                .entry(binding.category.clone())
                .or_default()
                .push(binding);
        }

        grouped
    }
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Format a shortcut for display
pub fn format_shortcut(shortcut: &Shortcut) -> String {
    let mut parts = Vec::new();

    if shortcut.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl");
    }
    if shortcut.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt");
    }
    if shortcut.modifiers.contains(KeyModifiers::SHIFT) {
        parts.push("Shift");
    }

    let key = match shortcut.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_uppercase().to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        _ => "?".to_string(),
    };

    parts.push(&key);
    parts.join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn release(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Release)
    }

    fn note(s: &str) -> NoteToken {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_note_map() {
        let controller = KeyboardController::with_defaults();
        let expected = [
            ('z', "C3"), ('x', "D3"), ('c', "E3"), ('v', "F3"), ('b', "G3"),
            ('n', "A3"), ('m', "B3"), (',', "C4"), ('.', "D4"), ('/', "E4"),
            ('s', "C#3"), ('d', "D#3"), ('g', "F#3"), ('h', "G#3"), ('j', "A#3"),
            ('k', "C#4"), ('l', "D#4"),
            ('q', "C4"), ('w', "D4"), ('e', "E4"), ('r', "F4"), ('t', "G4"),
            ('y', "A4"), ('u', "B4"), ('i', "C5"),
            ('2', "C#4"), ('3', "D#4"), ('5', "F#4"), ('6', "G#4"), ('7', "A#4"),
        ];
        for (c, token) in expected {
            assert_eq!(controller.note_for(c), Some(note(token)), "key {}", c);
        }
        assert_eq!(controller.note_for('a'), None);
        assert_eq!(controller.note_for('Z'), Some(note("C3")));
    }

    #[test]
    fn test_press_and_release() {
        let mut controller = KeyboardController::with_defaults();
        let now = Instant::now();

        assert_eq!(
            controller.process_key(&press('z'), now),
            Some(ControlAction::PressNote(note("C3")))
        );
        assert_eq!(
            controller.process_key(&release('z'), now),
            Some(ControlAction::ReleaseNote(note("C3")))
        );
        assert_eq!(controller.process_key(&release('z'), now), None);
    }

    #[test]
    fn test_repeats_are_ignored() {
        let mut controller = KeyboardController::with_defaults();
        let now = Instant::now();
        let repeat =
            KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Repeat);

        assert!(controller.process_key(&press('q'), now).is_some());
        assert_eq!(controller.process_key(&repeat, now), None);
        assert_eq!(controller.process_key(&press('q'), now), None);
    }

    #[test]
    fn test_modifiers_block_notes() {
        let mut controller = KeyboardController::with_defaults();
        let now = Instant::now();

        for modifiers in [KeyModifiers::ALT, KeyModifiers::SUPER] {
            let event = KeyEvent::new_with_kind(KeyCode::Char('z'), modifiers, KeyEventKind::Press);
            assert_eq!(controller.process_key(&event, now), None);
        }

        let ctrl_c = KeyEvent::new_with_kind(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        );
        assert_eq!(controller.process_key(&ctrl_c, now), Some(ControlAction::Quit));

        let shifted = KeyEvent::new_with_kind(
            KeyCode::Char('Z'),
            KeyModifiers::SHIFT,
            KeyEventKind::Press,
        );
        assert_eq!(
            controller.process_key(&shifted, now),
            Some(ControlAction::PressNote(note("C3")))
        );
    }

    #[test]
    fn test_shortcuts() {
        let controller = KeyboardController::with_defaults();
        let none = KeyModifiers::NONE;

        assert_eq!(controller.get_action(KeyCode::Right, none), Some(&ControlAction::NextKey));
        assert_eq!(controller.get_action(KeyCode::Left, none), Some(&ControlAction::PrevKey));
        assert_eq!(controller.get_action(KeyCode::Up, none), Some(&ControlAction::ToggleQuality));
        assert_eq!(controller.get_action(KeyCode::F(1), none), Some(&ControlAction::ToggleHelp));
        assert_eq!(controller.get_action(KeyCode::F(2), none), Some(&ControlAction::ToggleNoteNames));
        assert_eq!(controller.get_action(KeyCode::F(3), none), Some(&ControlAction::ToggleHints));
        assert_eq!(controller.get_action(KeyCode::F(4), none), Some(&ControlAction::NextMidiDevice));
        assert_eq!(controller.get_action(KeyCode::F(5), none), Some(&ControlAction::Reset));
        assert_eq!(controller.get_action(KeyCode::Esc, none), Some(&ControlAction::Quit));
    }

    #[test]
    fn test_auto_release() {
        let mut controller = KeyboardController::with_defaults();
        controller.set_hold_timeout(Some(Duration::from_millis(1500)));
        let start = Instant::now();

        controller.process_key(&press('e'), start);
        assert!(controller.expire_held(start + Duration::from_millis(1000)).is_empty());

        // Terminal repeat refreshes the hold
        controller.process_key(&press('e'), start + Duration::from_millis(1000));
        assert!(controller.expire_held(start + Duration::from_millis(2000)).is_empty());

        let released = controller.expire_held(start + Duration::from_millis(2500));
        assert_eq!(released, vec![ControlAction::ReleaseNote(note("E4"))]);
    }

    #[test]
    fn test_no_auto_release_without_timeout() {
        let mut controller = KeyboardController::with_defaults();
        let start = Instant::now();
        controller.process_key(&press('e'), start);
        assert!(controller.expire_held(start + Duration::from_secs(60)).is_empty());
        assert_eq!(controller.release_all().len(), 1);
    }

    #[test]
    fn test_apply_note_bindings() {
        let mut controller = KeyboardController::with_defaults();
        let mut bindings = HashMap::new();
        bindings.insert("a".to_string(), "B2".to_string());
        bindings.insert("z".to_string(), "Db3".to_string());
        controller.apply_note_bindings(&bindings).unwrap();

        assert_eq!(controller.note_for('a'), Some(note("B2")));
        assert_eq!(controller.note_for('z'), Some(note("C#3")));

        let mut bad = HashMap::new();
        bad.insert("a".to_string(), "H2".to_string());
        assert!(controller.apply_note_bindings(&bad).is_err());
    }

    #[test]
    fn test_note_bindings_sorted() {
        let controller = KeyboardController::with_defaults();
        let notes = controller.note_bindings();
        assert_eq!(notes.len(), 30);
        assert_eq!(notes[0], ('z', note("C3")));
        assert_eq!(notes.last().map(|(c, _)| *c), Some('i'));
    }

    #[test]
    fn test_format_shortcut() {
        assert_eq!(format_shortcut(&Shortcut::ctrl(KeyCode::Char('c'))), "Ctrl+C");
        assert_eq!(format_shortcut(&Shortcut::key(KeyCode::F(5))), "F5");
        assert_eq!(format_shortcut(&Shortcut::key(KeyCode::Left)), "←");
    }

    #[test]
    fn test_bindings_by_category() {
        let controller = KeyboardController::with_defaults();
        let grouped = controller.bindings_by_category();
        assert!(grouped.contains_key("Practice"));
        assert!(grouped.contains_key("Display"));
        assert!(grouped.contains_key("MIDI"));
        assert!(grouped.contains_key("General"));
    }
}
