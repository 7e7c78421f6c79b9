// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Control system for computer keyboard input.
//!
//! Turns key events into note presses and releases on the practice
//! keyboard, plus the handful of actions that change settings.

pub mod keyboard;

pub use keyboard::{format_shortcut, KeyBinding, KeyboardController, Shortcut};

use crate::music::NoteToken;

/// Action that can be triggered by controls
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    // Notes
    /// Press a key on the practice keyboard
    PressNote(NoteToken),
    /// Release a key on the practice keyboard
    ReleaseNote(NoteToken),

    // Practice
    /// Move the tonic up a semitone
    NextKey,
    /// Move the tonic down a semitone
    PrevKey,
    /// Switch between major and minor
    ToggleQuality,
    /// Clear held and flagged keys
    Reset,

    // Display
    ToggleNoteNames,
    ToggleHints,
    ToggleHelp,

    // MIDI
    /// Connect to the next MIDI input device
    NextMidiDevice,

    /// Quit application
    Quit,
}

impl ControlAction {
    /// Check if this is a note press or release
    pub fn is_note(&self) -> bool {
        matches!(
            self,
            ControlAction::PressNote(_) | ControlAction::ReleaseNote(_)
        )
    }

    /// Check if this action changes practice settings
    pub fn changes_settings(&self) -> bool {
        matches!(
            self,
            ControlAction::NextKey
                | ControlAction::PrevKey
                | ControlAction::ToggleQuality
                | ControlAction::ToggleNoteNames
                | ControlAction::ToggleHints
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::PitchClass;

    #[test]
    fn test_control_action_categories() {
        let c3 = NoteToken::new(PitchClass::C, 3);
        assert!(ControlAction::PressNote(c3).is_note());
        assert!(ControlAction::ReleaseNote(c3).is_note());
        assert!(!ControlAction::Reset.is_note());

        assert!(ControlAction::NextKey.changes_settings());
        assert!(ControlAction::ToggleHints.changes_settings());
        assert!(!ControlAction::Reset.changes_settings());
        assert!(!ControlAction::PressNote(c3).changes_settings());
    }
}
