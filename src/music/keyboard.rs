// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Piano key layout for the practice range (C3 up to C5).

use super::{NoteToken, PitchClass};

/// Lowest octave on the practice keyboard
pub const FIRST_OCTAVE: u32 = 3;

/// Octave holding the single top key
pub const LAST_OCTAVE: u32 = 5;

/// Left edge of each black key, as a percentage of its octave's width
fn black_key_offset(pitch: PitchClass) -> Option<f32> {
    match pitch {
        PitchClass::Cs => Some(8.5),
        PitchClass::Ds => Some(20.5),
        PitchClass::Fs => Some(44.5),
        PitchClass::Gs => Some(56.5),
        PitchClass::As => Some(68.5),
        _ => None,
    }
}

/// One key on the rendered keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardKey {
    pub note: NoteToken,
    /// Absolute index (`octave * 12 + pitch class`)
    pub index: u32,
    pub is_black: bool,
    /// Left edge within the octave in percent; black keys only
    pub offset: Option<f32>,
}

impl KeyboardKey {
    fn new(note: NoteToken) -> Self {
        let pitch = note.pitch();
        Self {
            note,
            index: note.index(),
            is_black: pitch.is_black(),
            offset: black_key_offset(pitch),
        }
    }

    pub fn octave(&self) -> u32 {
        self.note.octave()
    }
}

/// Keys from C3 through B4 plus C5, in ascending order.
pub fn generate_keyboard_data() -> Vec<KeyboardKey> {
    let mut keys = Vec::with_capacity(25);
    for octave in FIRST_OCTAVE..=LAST_OCTAVE {
        for pitch in PitchClass::ALL {
            if octave == LAST_OCTAVE && pitch != PitchClass::C {
                continue;
            }
            keys.push(KeyboardKey::new(NoteToken::new(pitch, octave)));
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_range() {
        let keys = generate_keyboard_data();
        assert_eq!(keys.len(), 25);
        assert_eq!(keys.first().map(|k| k.note.to_string()), Some("C3".to_string()));
        assert_eq!(keys.last().map(|k| k.note.to_string()), Some("C5".to_string()));
    }

    #[test]
    fn test_white_and_black_counts() {
        let keys = generate_keyboard_data();
        let white = keys.iter().filter(|k| !k.is_black).count();
        let black = keys.iter().filter(|k| k.is_black).count();
        assert_eq!(white, 15);
        assert_eq!(black, 10);
    }

    #[test]
    fn test_indices_ascend() {
        let keys = generate_keyboard_data();
        assert_eq!(keys[0].index, 36);
        for pair in keys.windows(2) {
            assert_eq!(pair[1].index, pair[0].index + 1);
        }
    }

    #[test]
    fn test_black_key_offsets() {
        let keys = generate_keyboard_data();
        for key in &keys {
            assert_eq!(key.offset.is_some(), key.is_black, "{}", key.note);
        }
        let f_sharp = keys.iter().find(|k| k.note.to_string() == "F#4").unwrap();
        assert_eq!(f_sharp.offset, Some(44.5));
        assert_eq!(f_sharp.octave(), 4);
    }
}
