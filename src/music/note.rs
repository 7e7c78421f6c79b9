// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note tokens (pitch class + octave) and their absolute indices.
//!
//! The absolute index is `octave * 12 + pitch class`, which is also how
//! incoming MIDI note numbers are read: note 60 is `C5` here, not `C4`.

use std::fmt;
use std::str::FromStr;

use super::{normalize, PitchClass, TheoryError};

/// A pitch class at a specific octave, e.g. `F#4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteToken {
    octave: u32,
    pitch: PitchClass,
}

impl NoteToken {
    pub fn new(pitch: PitchClass, octave: u32) -> Self {
        Self { octave, pitch }
    }

    pub fn pitch(&self) -> PitchClass {
        self.pitch
    }

    pub fn octave(&self) -> u32 {
        self.octave
    }

    /// Absolute index (`octave * 12 + pitch class`)
    pub fn index(&self) -> u32 {
        self.octave
            .saturating_mul(12)
            .saturating_add(self.pitch.index() as u32)
    }

    /// Whether two tokens name the same pitch class, ignoring octave
    pub fn same_pitch(&self, other: &NoteToken) -> bool {
        self.pitch == other.pitch
    }

    /// Frequency in Hz, with `A4` at 440 Hz and `C4` as middle C
    pub fn frequency(&self) -> f32 {
        let semitones_from_a4 = self.octave as f32 * 12.0 + self.pitch.index() as f32 - 57.0;
        440.0 * 2f32.powf(semitones_from_a4 / 12.0)
    }
}

impl fmt::Display for NoteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch, self.octave)
    }
}

impl FromStr for NoteToken {
    type Err = TheoryError;

    /// Parse `<spelling><octave>`; the spelling goes through the normalizer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || TheoryError::UnparseableNoteToken(s.to_string());
        let (spelling, octave) = split_octave(s.trim()).ok_or_else(unparseable)?;
        let pitch = PitchClass::from_canonical(normalize(spelling)).ok_or_else(unparseable)?;
        let octave = octave.parse::<u32>().map_err(|_| unparseable())?;
        Ok(NoteToken::new(pitch, octave))
    }
}

/// Split a token into its spelling and trailing octave digits.
///
/// Returns `None` unless both parts are non-empty.
pub fn split_octave(token: &str) -> Option<(&str, &str)> {
    let spelling_len = token.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (spelling, octave) = token.split_at(spelling_len);
    if spelling.is_empty() || octave.is_empty() {
        None
    } else {
        Some((spelling, octave))
    }
}

/// Absolute index of a strictly-canonical token.
///
/// Accepts only one of the 12 sharp spellings followed by a single octave
/// digit. Alternate spellings are not normalized here, so `Bb3` is `None`.
pub fn note_to_index(note: &str) -> Option<u32> {
    let (name, octave) = split_octave(note)?;
    if octave.len() != 1 {
        return None;
    }
    let pitch = PitchClass::from_canonical(name)?;
    let octave = octave.parse::<u32>().ok()?;
    Some(octave * 12 + pitch.index() as u32)
}

/// Token for an absolute index. Total over all indices.
pub fn index_to_note(index: u32) -> NoteToken {
    NoteToken::new(PitchClass::from_index(index), index / 12)
}
