// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI input from external keyboards.
//!
//! Only note on/off matters to the trainer; everything else a device sends
//! is parsed as `Other` and dropped by the caller.

pub mod input;

pub use input::{list_sources, print_sources, MidiDeviceManager, MidiInput, MidiStatus};

use crate::music::{index_to_note, NoteToken};

/// MIDI message constants
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const STATUS_MASK: u8 = 0xF0;
    pub const CHANNEL_MASK: u8 = 0x0F;
    pub const DATA_MASK: u8 = 0x7F;
}

/// Parsed MIDI message types
#[derive(Debug, Clone, PartialEq)]
pub enum MidiMessage {
    /// Note On: channel (0-15), note (0-127), velocity (1-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Anything else
    Other(Vec<u8>),
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a MidiMessage
    pub fn parse(data: &[u8]) -> Option<Self> {
        let status = *data.first()?;
        let msg_type = status & messages::STATUS_MASK;
        let channel = status & messages::CHANNEL_MASK;

        match msg_type {
            messages::NOTE_OFF if data.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: data[1] & messages::DATA_MASK,
                velocity: data[2] & messages::DATA_MASK,
            }),
            messages::NOTE_ON if data.len() >= 3 => {
                let note = data[1] & messages::DATA_MASK;
                let velocity = data[2] & messages::DATA_MASK;
                // Note On with velocity 0 is equivalent to Note Off
                if velocity == 0 {
                    Some(MidiMessage::NoteOff {
                        channel,
                        note,
                        velocity: 0,
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note,
                        velocity,
                    })
                }
            }
            _ => Some(MidiMessage::Other(data.to_vec())),
        }
    }

    /// Practice-keyboard note for a note message.
    ///
    /// The MIDI note number is read directly as an absolute index, so note
    /// 60 is `C5`.
    pub fn note_token(&self) -> Option<NoteToken> {
        match self {
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => {
                Some(index_to_note(*note as u32))
            }
            MidiMessage::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let msg = MidiMessage::parse(&[0x91, 60, 100]);
        assert_eq!(
            msg,
            Some(MidiMessage::NoteOn {
                channel: 1,
                note: 60,
                velocity: 100
            })
        );
    }

    #[test]
    fn test_parse_note_on_velocity_zero() {
        let msg = MidiMessage::parse(&[0x90, 60, 0]);
        assert_eq!(
            msg,
            Some(MidiMessage::NoteOff {
                channel: 0,
                note: 60,
                velocity: 0
            })
        );
    }

    #[test]
    fn test_parse_note_off() {
        let msg = MidiMessage::parse(&[0x8F, 48, 64]);
        assert_eq!(
            msg,
            Some(MidiMessage::NoteOff {
                channel: 15,
                note: 48,
                velocity: 64
            })
        );
    }

    #[test]
    fn test_parse_other_and_empty() {
        assert_eq!(
            MidiMessage::parse(&[0xB0, 1, 64]),
            Some(MidiMessage::Other(vec![0xB0, 1, 64]))
        );
        assert_eq!(MidiMessage::parse(&[0xF8]), Some(MidiMessage::Other(vec![0xF8])));
        // Truncated note on
        assert_eq!(MidiMessage::parse(&[0x90, 60]), Some(MidiMessage::Other(vec![0x90, 60])));
        assert_eq!(MidiMessage::parse(&[]), None);
    }

    #[test]
    fn test_note_token() {
        let on = MidiMessage::parse(&[0x90, 60, 100]).unwrap();
        assert_eq!(on.note_token().map(|n| n.to_string()), Some("C5".to_string()));

        let off = MidiMessage::parse(&[0x80, 42, 0]).unwrap();
        assert_eq!(off.note_token().map(|n| n.to_string()), Some("F#3".to_string()));

        assert_eq!(MidiMessage::Other(vec![0xF8]).note_token(), None);
    }
}
