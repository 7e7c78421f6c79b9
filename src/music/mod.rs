// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory core.
//!
//! Pitch classes and enharmonic normalization, note tokens and their numeric
//! indices, diatonic scale generation, scale membership, and the projection
//! of the practice range onto piano keys. Everything here is pure: no shared
//! state, no I/O.

pub mod keyboard;
pub mod note;
pub mod pitch;
pub mod scale;

pub use keyboard::{generate_keyboard_data, KeyboardKey};
pub use note::{index_to_note, note_to_index, split_octave, NoteToken};
pub use pitch::{normalize, PitchClass};
pub use scale::{
    get_scale_notes, get_scale_notes_with, is_note_in_scale, scale_pitch_classes,
    DiatonicSpeller, IntervalSource, KeySignature, ScaleQuality,
};

use thiserror::Error;

/// Errors raised by the theory core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    /// The interval source could not build a scale for this tonic/quality.
    #[error("cannot build a {quality} scale on tonic {tonic:?}")]
    InvalidKeySignature { tonic: String, quality: String },

    /// A note string is not `<spelling><octave>`.
    #[error("unparseable note token: {0:?}")]
    UnparseableNoteToken(String),

    /// A bare spelling that does not normalize to one of the 12 pitch classes.
    #[error("unknown pitch class: {0:?}")]
    UnknownPitchClass(String),
}
