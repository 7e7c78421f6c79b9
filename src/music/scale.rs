// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale qualities, key signatures, and the practice scale note set.
//!
//! A scale is spelled from its tonic with one letter per degree, the way a
//! musician would write it (so F major has Bb and C# major has E# and B#).
//! Those spellings are then folded through [`normalize`] before they become
//! note tokens, which means every token the trainer compares is sharp-based.

use std::fmt;
use std::str::FromStr;

use super::{normalize, split_octave, NoteToken, PitchClass, TheoryError};

/// Octaves covered by the practice keyboard
pub const SCALE_OCTAVES: [u32; 3] = [3, 4, 5];

/// Highest octave; only the tonic is kept there
pub const TOP_OCTAVE: u32 = 5;

/// Scale qualities the trainer can drill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleQuality {
    Major,
    /// Natural minor (Aeolian)
    Minor,
}

impl ScaleQuality {
    pub const ALL: [ScaleQuality; 2] = [ScaleQuality::Major, ScaleQuality::Minor];

    /// Semitones from the tonic for each of the seven degrees
    pub fn intervals(self) -> [u8; 7] {
        match self {
            // W-W-H-W-W-W-H
            ScaleQuality::Major => [0, 2, 4, 5, 7, 9, 11],
            // W-H-W-W-H-W-W
            ScaleQuality::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// Identifier used in config files and on the command line
    pub fn id(self) -> &'static str {
        match self {
            ScaleQuality::Major => "major",
            ScaleQuality::Minor => "minor",
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ScaleQuality::Major => "Major",
            ScaleQuality::Minor => "Natural Minor",
        }
    }

    /// The other quality
    pub fn toggled(self) -> Self {
        match self {
            ScaleQuality::Major => ScaleQuality::Minor,
            ScaleQuality::Minor => ScaleQuality::Major,
        }
    }
}

impl fmt::Display for ScaleQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleQuality {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match key.as_str() {
            "major" | "ionian" => Ok(ScaleQuality::Major),
            "minor" | "naturalminor" | "aeolian" => Ok(ScaleQuality::Minor),
            _ => Err(TheoryError::InvalidKeySignature {
                tonic: String::new(),
                quality: s.to_string(),
            }),
        }
    }
}

/// Tonic plus quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySignature {
    tonic: PitchClass,
    quality: ScaleQuality,
}

impl KeySignature {
    pub fn new(tonic: PitchClass, quality: ScaleQuality) -> Self {
        Self { tonic, quality }
    }

    /// Parse from strings (e.g. `"Bb"`, `"minor"`).
    ///
    /// The tonic may use any spelling the normalizer knows.
    pub fn parse(tonic: &str, quality: &str) -> Result<Self, TheoryError> {
        let invalid = || TheoryError::InvalidKeySignature {
            tonic: tonic.to_string(),
            quality: quality.to_string(),
        };
        let tonic_pc = PitchClass::parse(tonic).ok_or_else(invalid)?;
        let quality = quality.parse::<ScaleQuality>().map_err(|_| invalid())?;
        Ok(Self::new(tonic_pc, quality))
    }

    pub fn tonic(&self) -> PitchClass {
        self.tonic
    }

    pub fn quality(&self) -> ScaleQuality {
        self.quality
    }

    /// Same quality, tonic moved by semitones
    pub fn transpose(&self, semitones: i32) -> Self {
        Self::new(self.tonic.transpose(semitones), self.quality)
    }

    /// Same tonic, other quality
    pub fn with_quality(&self, quality: ScaleQuality) -> Self {
        Self::new(self.tonic, quality)
    }
}

impl Default for KeySignature {
    fn default() -> Self {
        Self::new(PitchClass::C, ScaleQuality::Major)
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.quality)
    }
}

/// Source of spelled scale degrees.
///
/// Implementations return the seven degree names starting at the tonic, in
/// whatever spelling they naturally produce. Anything other than seven names
/// is treated as "cannot build this scale".
pub trait IntervalSource {
    fn spell(&self, key: &KeySignature) -> Vec<String>;
}

/// Built-in interval source: one letter per degree, accidentals as needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiatonicSpeller;

/// Letter names with their natural pitch class index
const LETTERS: [(char, u8); 7] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

impl DiatonicSpeller {
    fn accidental(offset: i32) -> Option<&'static str> {
        match offset {
            -2 => Some("bb"),
            -1 => Some("b"),
            0 => Some(""),
            1 => Some("#"),
            2 => Some("##"),
            _ => None,
        }
    }
}

impl IntervalSource for DiatonicSpeller {
    fn spell(&self, key: &KeySignature) -> Vec<String> {
        let tonic = key.tonic();
        let Some(first_letter) = tonic.name().chars().next() else {
            return Vec::new();
        };
        let Some(start) = LETTERS.iter().position(|&(letter, _)| letter == first_letter) else {
            return Vec::new();
        };

        key.quality()
            .intervals()
            .iter()
            .enumerate()
            .map(|(degree, &interval)| {
                let (letter, natural) = LETTERS[(start + degree) % LETTERS.len()];
                let target = (tonic.index() + interval) % 12;
                // Signed distance from the natural letter, folded into -6..=5
                let offset = (target as i32 - natural as i32 + 6).rem_euclid(12) - 6;
                Self::accidental(offset).map(|acc| format!("{}{}", letter, acc))
            })
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default()
    }
}

/// Scale note set for a key using the built-in speller.
pub fn get_scale_notes(key: &KeySignature) -> Result<Vec<NoteToken>, TheoryError> {
    get_scale_notes_with(&DiatonicSpeller, key)
}

/// Scale note set for a key using a specific interval source.
///
/// Produces the seven degrees at octaves 3 and 4 followed by the tonic at
/// octave 5: 15 tokens, in degree order, every spelling canonical.
pub fn get_scale_notes_with(
    source: &dyn IntervalSource,
    key: &KeySignature,
) -> Result<Vec<NoteToken>, TheoryError> {
    let invalid = || TheoryError::InvalidKeySignature {
        tonic: key.tonic().to_string(),
        quality: key.quality().id().to_string(),
    };

    let spelled = source.spell(key);
    if spelled.len() != 7 {
        return Err(invalid());
    }

    let degrees = spelled
        .iter()
        .map(|name| PitchClass::from_canonical(normalize(name)))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;

    let mut notes = Vec::with_capacity(15);
    for octave in SCALE_OCTAVES {
        for &pitch in &degrees {
            if octave == TOP_OCTAVE && pitch != key.tonic() {
                continue;
            }
            notes.push(NoteToken::new(pitch, octave));
        }
    }

    Ok(notes)
}

/// Whether a note string's pitch class appears anywhere in `scale`.
///
/// Octave is ignored. Strings that are not `<spelling><octave>` are simply
/// not in the scale.
pub fn is_note_in_scale(note: &str, scale: &[NoteToken]) -> bool {
    let Some((spelling, _)) = split_octave(note) else {
        return false;
    };
    let wanted = normalize(spelling);
    scale
        .iter()
        .any(|entry| normalize(entry.pitch().name()) == wanted)
}

/// Distinct pitch classes of a scale note set, in degree order
pub fn scale_pitch_classes(scale: &[NoteToken]) -> Vec<PitchClass> {
    let mut seen = Vec::with_capacity(7);
    for token in scale {
        if !seen.contains(&token.pitch()) {
            seen.push(token.pitch());
        }
    }
    seen
}
