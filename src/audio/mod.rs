// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio feedback for the trainer.
//!
//! This module provides:
//! - A small voice mixer for note, chord and buzzer sounds
//! - Audio output via cpal
//!
//! A silent engine ignores every call. An offline engine mixes voices into
//! its synth without an output device.

pub mod output;
pub mod synth;

pub use output::{AudioOutput, OutputConfig};
pub use synth::{Synth, Waveform};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::music::{NoteToken, PitchClass};

/// How long a played note is held
pub const NOTE_LENGTH: Duration = Duration::from_millis(250);

/// Spacing between the notes of the success chord
pub const CHORD_STEP: Duration = Duration::from_millis(50);

pub const BUZZER_HZ: f32 = 200.0;
pub const BUZZER_LENGTH: Duration = Duration::from_millis(300);

/// Notes of the success chord, in order
pub const CORRECT_CHORD: [(PitchClass, u32); 4] = [
    (PitchClass::C, 4),
    (PitchClass::E, 4),
    (PitchClass::G, 4),
    (PitchClass::C, 5),
];

/// Audio engine combining synth and output
pub struct AudioEngine {
    synth: Arc<Mutex<Synth>>,
    output: Option<AudioOutput>,
    /// Whether play calls reach the synth
    enabled: bool,
}

impl AudioEngine {
    /// Open the default output device
    pub fn start(config: OutputConfig, volume: f32) -> Result<Self, AudioError> {
        let mut synth = Synth::new(config.sample_rate);
        synth.set_gain(volume);
        let synth = Arc::new(Mutex::new(synth));

        let render_synth = Arc::clone(&synth);
        let output = AudioOutput::new(config, move |buffer, channels| {
            if let Ok(mut synth) = render_synth.lock() {
                synth.render(buffer, channels);
            }
        })?;

        Ok(Self {
            synth,
            output: Some(output),
            enabled: true,
        })
    }

    /// An engine that never makes a sound
    pub fn silent() -> Self {
        Self {
            synth: Arc::new(Mutex::new(Synth::new(OutputConfig::default().sample_rate))),
            output: None,
            enabled: false,
        }
    }

    /// An engine that triggers voices but renders only when asked
    pub fn offline(sample_rate: u32) -> Self {
        Self {
            synth: Arc::new(Mutex::new(Synth::new(sample_rate))),
            output: None,
            enabled: true,
        }
    }

    /// Whether sound is actually reaching a device
    pub fn is_running(&self) -> bool {
        self.output.is_some()
    }

    /// Get synth reference
    pub fn synth(&self) -> Arc<Mutex<Synth>> {
        Arc::clone(&self.synth)
    }

    fn with_synth(&self, f: impl FnOnce(&mut Synth)) {
        if !self.enabled {
            return;
        }
        if let Ok(mut synth) = self.synth.lock() {
            f(&mut synth);
        }
    }

    /// Short piano-like tone at the note's pitch
    pub fn play_note(&self, note: &NoteToken) {
        debug!(%note, "play note");
        let frequency = note.frequency();
        self.with_synth(|synth| {
            synth.trigger(frequency, Waveform::Piano, NOTE_LENGTH, Duration::ZERO)
        });
    }

    /// Rising C major chord
    pub fn play_correct(&self) {
        self.with_synth(|synth| {
            for (step, (pitch, octave)) in CORRECT_CHORD.into_iter().enumerate() {
                let frequency = NoteToken::new(pitch, octave).frequency();
                synth.trigger(frequency, Waveform::Piano, NOTE_LENGTH, CHORD_STEP * step as u32);
            }
        });
    }

    /// Low square-wave buzz
    pub fn play_incorrect(&self) {
        self.with_synth(|synth| {
            synth.trigger(BUZZER_HZ, Waveform::Square, BUZZER_LENGTH, Duration::ZERO)
        });
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_volume(&self, volume: f32) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.set_gain(volume);
        }
    }

    /// Stop every sounding voice
    pub fn all_notes_off(&self) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.clear();
        }
    }
}

/// Audio error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("Audio initialization failed: {0}")]
    InitFailed(String),
    #[error("Audio stream failed: {0}")]
    StreamFailed(String),
    #[error("No audio device available")]
    NoDevice,
    #[error("Invalid audio configuration: {0}")]
    InvalidConfig(String),
}
