// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Ties the practice session to its inputs and feedback.
//!
//! Key presses, mouse clicks and MIDI notes all arrive here as
//! [`ControlAction`]s. The trainer judges notes, plays feedback and keeps
//! the UI state in step.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use crate::audio::AudioEngine;
use crate::config::TrainerFile;
use crate::control::{ControlAction, KeyboardController};
use crate::midi::MidiMessage;
use crate::practice::{PracticeSession, PressOutcome};
use crate::ui::UiState;

/// What the event loop should do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Switch to the next MIDI input; the loop owns the device manager
    NextMidiDevice,
    Quit,
}

/// Practice session plus the services it drives
pub struct Trainer {
    pub session: PracticeSession,
    pub controls: KeyboardController,
    pub ui: UiState,
    audio: AudioEngine,
    /// Set when the terminal never reports key releases
    hold_timeout: Option<Duration>,
}

impl Trainer {
    /// Build a trainer from a validated configuration
    pub fn new(config: &TrainerFile, audio: AudioEngine) -> Result<Self> {
        let session = PracticeSession::new(config.practice_settings()?)?;
        let mut controls = KeyboardController::with_defaults();
        controls.apply_note_bindings(&config.keyboard.bindings)?;
        audio.set_volume(config.audio.volume);

        Ok(Self {
            session,
            controls,
            ui: UiState::default(),
            audio,
            hold_timeout: None,
        })
    }

    pub fn audio(&self) -> &AudioEngine {
        &self.audio
    }

    /// Release note keys automatically after `hold_ms`.
    ///
    /// Only needed for terminals that send no key-up events.
    pub fn use_hold_timeout(&mut self, hold_ms: u64) {
        self.hold_timeout = Some(Duration::from_millis(hold_ms));
        self.controls.set_hold_timeout(self.hold_timeout);
    }

    /// Apply one action
    pub fn apply(&mut self, action: ControlAction, now: Instant) -> Flow {
        let mut settings = *self.session.settings();

        match action {
            ControlAction::PressNote(note) => {
                match self.session.press(note, now) {
                    PressOutcome::Ignored => {}
                    PressOutcome::Correct => self.audio.play_note(&note),
                    PressOutcome::Incorrect => {
                        self.audio.play_note(&note);
                        self.audio.play_incorrect();
                    }
                    PressOutcome::ScaleComplete => {
                        self.audio.play_note(&note);
                        self.audio.play_correct();
                        self.ui.set_status(format!(
                            "{} complete! ({} so far)",
                            settings.key,
                            self.session.completed()
                        ));
                    }
                }
                return Flow::Continue;
            }
            ControlAction::ReleaseNote(note) => {
                self.session.release(note);
                return Flow::Continue;
            }
            ControlAction::NextKey => settings.key = settings.key.transpose(1),
            ControlAction::PrevKey => settings.key = settings.key.transpose(-1),
            ControlAction::ToggleQuality => {
                settings.key = settings.key.with_quality(settings.key.quality().toggled())
            }
            ControlAction::ToggleNoteNames => settings.show_note_names = !settings.show_note_names,
            ControlAction::ToggleHints => settings.show_hints = !settings.show_hints,
            ControlAction::Reset => {
                self.session.reset();
                self.ui.set_status("Progress reset");
                return Flow::Continue;
            }
            ControlAction::ToggleHelp => {
                self.ui.show_help = !self.ui.show_help;
                return Flow::Continue;
            }
            ControlAction::NextMidiDevice => return Flow::NextMidiDevice,
            ControlAction::Quit => return Flow::Quit,
        }

        if let Err(e) = self.session.set_settings(settings) {
            warn!(error = %e, "rejected settings change");
            self.ui.set_status(format!("Error: {}", e));
        }
        Flow::Continue
    }

    /// Translate MIDI input into note actions
    pub fn apply_midi(&mut self, message: &MidiMessage, now: Instant) {
        let action = match (message, message.note_token()) {
            (MidiMessage::NoteOn { .. }, Some(note)) => ControlAction::PressNote(note),
            (MidiMessage::NoteOff { .. }, Some(note)) => ControlAction::ReleaseNote(note),
            _ => return,
        };
        self.apply(action, now);
    }

    /// Take settings, bindings and volume from a reloaded configuration
    pub fn reload(&mut self, config: &TrainerFile) -> Result<()> {
        let settings = config.practice_settings()?;

        let mut controls = KeyboardController::with_defaults();
        controls.apply_note_bindings(&config.keyboard.bindings)?;
        if self.hold_timeout.is_some() {
            self.hold_timeout = Some(Duration::from_millis(config.keyboard.hold_ms));
        }
        controls.set_hold_timeout(self.hold_timeout);

        self.session.set_settings(settings)?;
        for action in self.controls.release_all() {
            if let ControlAction::ReleaseNote(note) = action {
                self.session.release(note);
            }
        }
        self.controls = controls;
        self.audio.set_volume(config.audio.volume);

        info!(key = %settings.key, "configuration reloaded");
        self.ui.set_status("Configuration reloaded");
        Ok(())
    }

    /// Advance timers: flashes, completion reset, held-key expiry, status
    pub fn tick(&mut self, now: Instant) {
        for action in self.controls.expire_held(now) {
            self.apply(action, now);
        }
        self.session.tick(now);
        self.ui.clear_expired_status();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Waveform;
    use crate::music::{KeySignature, NoteToken, ScaleQuality};

    fn trainer() -> Trainer {
        Trainer::new(&TrainerFile::default(), AudioEngine::silent()).unwrap()
    }

    fn note(s: &str) -> NoteToken {
        s.parse().unwrap()
    }

    fn press(t: &mut Trainer, s: &str, now: Instant) {
        assert_eq!(t.apply(ControlAction::PressNote(note(s)), now), Flow::Continue);
    }

    fn sounding(t: &Trainer) -> Vec<(Waveform, f32)> {
        t.audio().synth().lock().unwrap().voices()
    }

    #[test]
    fn test_wrong_note_sounds_then_buzzes() {
        let mut t = Trainer::new(&TrainerFile::default(), AudioEngine::offline(8000)).unwrap();
        press(&mut t, "C#4", Instant::now());

        let voices = sounding(&t);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].0, Waveform::Piano);
        assert!((voices[0].1 - 277.18).abs() < 0.05, "{}", voices[0].1);
        assert_eq!(voices[1].0, Waveform::Square);
        assert!((voices[1].1 - 200.0).abs() < 0.05);
    }

    #[test]
    fn test_correct_and_repeated_presses() {
        let mut t = Trainer::new(&TrainerFile::default(), AudioEngine::offline(8000)).unwrap();
        let now = Instant::now();
        press(&mut t, "E3", now);
        assert_eq!(sounding(&t).len(), 1);

        // Already held: no new sound
        press(&mut t, "E3", now);
        assert_eq!(sounding(&t).len(), 1);
    }

    #[test]
    fn test_key_navigation() {
        let mut t = trainer();
        let now = Instant::now();

        t.apply(ControlAction::NextKey, now);
        assert_eq!(t.session.settings().key, KeySignature::parse("C#", "major").unwrap());

        t.apply(ControlAction::PrevKey, now);
        t.apply(ControlAction::PrevKey, now);
        assert_eq!(t.session.settings().key, KeySignature::parse("B", "major").unwrap());

        t.apply(ControlAction::ToggleQuality, now);
        assert_eq!(t.session.settings().key.quality(), ScaleQuality::Minor);
    }

    #[test]
    fn test_key_change_clears_keyboard() {
        let mut t = trainer();
        let now = Instant::now();
        press(&mut t, "E3", now);
        assert_eq!(t.session.pressed().len(), 1);

        t.apply(ControlAction::NextKey, now);
        assert!(t.session.pressed().is_empty());
    }

    #[test]
    fn test_display_toggles_keep_progress() {
        let mut t = trainer();
        let now = Instant::now();
        press(&mut t, "E3", now);

        t.apply(ControlAction::ToggleHints, now);
        t.apply(ControlAction::ToggleNoteNames, now);
        assert!(t.session.settings().show_hints);
        assert!(!t.session.settings().show_note_names);
        assert_eq!(t.session.pressed(), &[note("E3")]);
    }

    #[test]
    fn test_scale_completion_sets_status() {
        let mut t = trainer();
        let now = Instant::now();
        for s in ["C3", "D3", "E3", "F3", "G3", "A3"] {
            press(&mut t, s, now);
        }
        assert!(t.ui.status_message.is_none());

        press(&mut t, "B4", now);
        assert_eq!(t.session.completed(), 1);
        assert_eq!(
            t.ui.status_message.as_deref(),
            Some("C Major complete! (1 so far)")
        );
    }

    #[test]
    fn test_flow_actions() {
        let mut t = trainer();
        let now = Instant::now();
        assert_eq!(t.apply(ControlAction::Quit, now), Flow::Quit);
        assert_eq!(t.apply(ControlAction::NextMidiDevice, now), Flow::NextMidiDevice);
        assert_eq!(t.apply(ControlAction::ToggleHelp, now), Flow::Continue);
        assert!(t.ui.show_help);
    }

    #[test]
    fn test_midi_messages_press_and_release() {
        let mut t = trainer();
        let now = Instant::now();

        // Note 52 is E4
        t.apply_midi(&MidiMessage::NoteOn { channel: 0, note: 52, velocity: 90 }, now);
        assert_eq!(t.session.pressed(), &[note("E4")]);

        t.apply_midi(&MidiMessage::NoteOff { channel: 0, note: 52, velocity: 0 }, now);
        assert!(t.session.pressed().is_empty());

        t.apply_midi(&MidiMessage::Other(vec![0xB0, 7, 100]), now);
        assert!(t.session.pressed().is_empty());
    }

    #[test]
    fn test_reload_replaces_settings() {
        let mut t = trainer();
        let mut config = TrainerFile::default();
        config.practice.key = "Bb".to_string();
        config.practice.scale = "minor".to_string();
        config.practice.show_hints = true;
        config.keyboard.bindings.insert("p".to_string(), "F#5".to_string());

        t.reload(&config).unwrap();
        assert_eq!(t.session.settings().key, KeySignature::parse("A#", "minor").unwrap());
        assert!(t.session.settings().show_hints);
        assert_eq!(t.controls.note_for('p'), Some(note("F#5")));
        assert_eq!(t.ui.status_message.as_deref(), Some("Configuration reloaded"));
    }

    #[test]
    fn test_bad_reload_keeps_settings() {
        let mut t = trainer();
        let mut config = TrainerFile::default();
        config.practice.key = "H".to_string();

        assert!(t.reload(&config).is_err());
        assert_eq!(t.session.settings().key, KeySignature::default());
    }

    #[test]
    fn test_tick_expires_held_keys() {
        use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

        let mut t = trainer();
        t.use_hold_timeout(100);
        let start = Instant::now();

        let event = KeyEvent::new_with_kind(KeyCode::Char('z'), KeyModifiers::NONE, KeyEventKind::Press);
        let action = t.controls.process_key(&event, start).unwrap();
        t.apply(action, start);
        assert_eq!(t.session.pressed(), &[note("C3")]);

        t.tick(start + Duration::from_millis(50));
        assert_eq!(t.session.pressed().len(), 1);

        t.tick(start + Duration::from_millis(150));
        assert!(t.session.pressed().is_empty());
    }
}
