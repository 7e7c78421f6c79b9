// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch classes and enharmonic normalization.
//!
//! Every spelling the trainer handles is folded onto one of twelve
//! sharp-based names. The fold only goes one way: flats and theoretical
//! sharps become plain sharps or naturals, sharps never become flats.

use std::fmt;
use std::str::FromStr;

use super::TheoryError;

/// Pitch classes, spelled with sharps only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Position in the chromatic order (0-11)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Pitch class at a chromatic position, wrapping past 11
    pub fn from_index(index: u32) -> Self {
        PitchClass::ALL[(index % 12) as usize]
    }

    /// Canonical spelling
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Exact match against the 12 canonical spellings, without normalization.
    pub fn from_canonical(name: &str) -> Option<Self> {
        PitchClass::ALL.into_iter().find(|pc| pc.name() == name)
    }

    /// Parse any known spelling (canonical, flat, or theoretical sharp).
    pub fn parse(name: &str) -> Option<Self> {
        Self::from_canonical(normalize(name.trim()))
    }

    /// Whether this pitch class sits on a black piano key
    pub fn is_black(self) -> bool {
        matches!(
            self,
            PitchClass::Cs | PitchClass::Ds | PitchClass::Fs | PitchClass::Gs | PitchClass::As
        )
    }

    /// Transpose by semitones
    pub fn transpose(self, semitones: i32) -> Self {
        let index = (self.index() as i32 + semitones).rem_euclid(12);
        Self::from_index(index as u32)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TheoryError::UnknownPitchClass(s.to_string()))
    }
}

/// Fold a bare spelling onto its canonical sharp-based name.
///
/// Covers the five standard flats and the theoretical spellings that sharp
/// keys produce (E#, B#, and the double sharps up to G##). Anything else is
/// returned untouched, so an unchanged result does not mean the input was
/// valid.
pub fn normalize(name: &str) -> &str {
    match name {
        "Bb" => "A#",
        "Db" => "C#",
        "Eb" => "D#",
        "Gb" => "F#",
        "Ab" => "G#",
        "E#" => "F",
        "B#" => "C",
        "F##" => "G",
        "C##" => "D",
        "G##" => "A",
        other => other,
    }
}
