// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Practice session state.
//!
//! Tracks which keys are held, judges each press against the current scale,
//! and counts completed scales. A scale is complete when every one of its
//! pitch classes is held at the same time, in any octave.
//!
//! Timers are driven by the caller passing `Instant`s in, so the session
//! itself never reads the clock.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::music::{
    get_scale_notes, is_note_in_scale, scale_pitch_classes, KeySignature, NoteToken, PitchClass,
    TheoryError,
};

/// How long a wrong note stays flagged
pub const INCORRECT_FLASH: Duration = Duration::from_millis(300);

/// Delay between completing a scale and clearing the keyboard
pub const COMPLETION_RESET: Duration = Duration::from_millis(1000);

/// Learner-facing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeSettings {
    pub key: KeySignature,
    pub show_note_names: bool,
    pub show_hints: bool,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            key: KeySignature::default(),
            show_note_names: true,
            show_hints: false,
        }
    }
}

/// Result of pressing a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Key was already held
    Ignored,
    /// In the scale
    Correct,
    /// Not in the scale
    Incorrect,
    /// In the scale, and every scale pitch class is now held
    ScaleComplete,
}

/// Display state of a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Idle,
    Hinted,
    Pressed,
    Correct,
    Incorrect,
}

/// A running practice session
#[derive(Debug, Clone)]
pub struct PracticeSession {
    settings: PracticeSettings,
    scale: Vec<NoteToken>,
    pressed: Vec<NoteToken>,
    incorrect: Vec<NoteToken>,
    completed: u32,
    incorrect_clear_at: Option<Instant>,
    completion_clear_at: Option<Instant>,
}

impl PracticeSession {
    /// Start a session for the given settings
    pub fn new(settings: PracticeSettings) -> Result<Self, TheoryError> {
        let scale = get_scale_notes(&settings.key)?;
        info!(key = %settings.key, "practice session started");
        Ok(Self {
            settings,
            scale,
            pressed: Vec::new(),
            incorrect: Vec::new(),
            completed: 0,
            incorrect_clear_at: None,
            completion_clear_at: None,
        })
    }

    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    /// Current scale note set
    pub fn scale(&self) -> &[NoteToken] {
        &self.scale
    }

    /// Distinct scale pitch classes in degree order
    pub fn scale_pitch_classes(&self) -> Vec<PitchClass> {
        scale_pitch_classes(&self.scale)
    }

    pub fn pressed(&self) -> &[NoteToken] {
        &self.pressed
    }

    pub fn incorrect(&self) -> &[NoteToken] {
        &self.incorrect
    }

    /// Number of scales completed this session
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Replace the settings.
    ///
    /// A key change regenerates the scale and clears progress on the
    /// keyboard; display toggles leave progress alone. The completed
    /// counter is always kept.
    pub fn set_settings(&mut self, settings: PracticeSettings) -> Result<(), TheoryError> {
        if settings.key != self.settings.key {
            self.scale = get_scale_notes(&settings.key)?;
            info!(key = %settings.key, "practice key changed");
            self.reset();
        }
        self.settings = settings;
        Ok(())
    }

    /// Whether a note belongs to the current scale, ignoring octave
    pub fn in_scale(&self, note: &NoteToken) -> bool {
        is_note_in_scale(&note.to_string(), &self.scale)
    }

    /// Press a key and judge it
    pub fn press(&mut self, note: NoteToken, now: Instant) -> PressOutcome {
        if self.pressed.contains(&note) {
            return PressOutcome::Ignored;
        }
        self.pressed.push(note);

        if !self.in_scale(&note) {
            debug!(%note, "incorrect note");
            self.incorrect = vec![note];
            self.incorrect_clear_at = Some(now + INCORRECT_FLASH);
            return PressOutcome::Incorrect;
        }

        let complete = self
            .scale_pitch_classes()
            .iter()
            .all(|pc| self.pressed.iter().any(|held| held.pitch() == *pc));

        if complete {
            self.completed += 1;
            self.completion_clear_at = Some(now + COMPLETION_RESET);
            info!(key = %self.settings.key, completed = self.completed, "scale complete");
            PressOutcome::ScaleComplete
        } else {
            debug!(%note, "correct note");
            PressOutcome::Correct
        }
    }

    /// Release a held key
    pub fn release(&mut self, note: NoteToken) {
        self.pressed.retain(|held| *held != note);
    }

    /// Clear held and flagged keys
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.incorrect.clear();
        self.incorrect_clear_at = None;
        self.completion_clear_at = None;
    }

    /// Apply any timers that have expired by `now`
    pub fn tick(&mut self, now: Instant) {
        if self.completion_clear_at.is_some_and(|at| now >= at) {
            self.reset();
            return;
        }
        if self.incorrect_clear_at.is_some_and(|at| now >= at) {
            self.incorrect.clear();
            self.incorrect_clear_at = None;
        }
    }

    /// How a key should be drawn
    pub fn key_state(&self, note: &NoteToken) -> KeyState {
        if self.incorrect.contains(note) {
            KeyState::Incorrect
        } else if self.pressed.contains(note) {
            if self.in_scale(note) {
                KeyState::Correct
            } else {
                KeyState::Pressed
            }
        } else if self.settings.show_hints && self.in_scale(note) {
            KeyState::Hinted
        } else {
            KeyState::Idle
        }
    }
}
