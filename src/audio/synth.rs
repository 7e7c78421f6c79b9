// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Small voice mixer for feedback sounds.
//!
//! Renders interleaved `f32` frames without touching any audio device, so
//! the output callback just locks it and calls `render`.

use std::f32::consts::PI;
use std::time::Duration;

/// Voices beyond this steal the oldest
pub const MAX_VOICES: usize = 32;

const ATTACK_MS: f32 = 5.0;
const RELEASE_MS: f32 = 120.0;
/// Time for the piano tone to decay to 1/e
const PIANO_DECAY_SECS: f32 = 0.5;
const SQUARE_LEVEL: f32 = 0.25;

/// Voice timbre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// Decaying tone with a few harmonics
    Piano,
    /// Flat square wave
    Square,
}

#[derive(Debug, Clone)]
struct Voice {
    waveform: Waveform,
    phase: f32,
    increment: f32,
    /// Samples of silence before the voice starts
    delay: usize,
    position: usize,
    /// Samples at full envelope
    gate: usize,
    release: usize,
    attack: usize,
}

impl Voice {
    fn is_finished(&self) -> bool {
        self.delay == 0 && self.position >= self.gate + self.release
    }

    fn next_sample(&mut self, sample_rate: f32) -> f32 {
        if self.delay > 0 {
            self.delay -= 1;
            return 0.0;
        }

        let raw = match self.waveform {
            Waveform::Piano => {
                let p = self.phase;
                let tone = p.sin() + 0.5 * (2.0 * p).sin() + 0.25 * (3.0 * p).sin();
                let t = self.position as f32 / sample_rate;
                tone / 1.75 * (-t / PIANO_DECAY_SECS).exp()
            }
            Waveform::Square => {
                if self.phase < PI {
                    SQUARE_LEVEL
                } else {
                    -SQUARE_LEVEL
                }
            }
        };

        let attack = (self.position as f32 / self.attack.max(1) as f32).min(1.0);
        let release = if self.position < self.gate {
            1.0
        } else {
            let into_release = (self.position - self.gate) as f32;
            (1.0 - into_release / self.release.max(1) as f32).max(0.0)
        };

        self.phase += self.increment;
        if self.phase >= 2.0 * PI {
            self.phase -= 2.0 * PI;
        }
        self.position += 1;

        raw * attack * release
    }
}

/// Polyphonic mixer of one-shot voices
#[derive(Debug, Clone)]
pub struct Synth {
    sample_rate: f32,
    gain: f32,
    voices: Vec<Voice>,
}

impl Synth {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1) as f32,
            gain: 0.8,
            voices: Vec::new(),
        }
    }

    fn samples(&self, duration: Duration) -> usize {
        (duration.as_secs_f32() * self.sample_rate) as usize
    }

    /// Start a voice after `delay`, held for `duration` then released
    pub fn trigger(
        &mut self,
        frequency: f32,
        waveform: Waveform,
        duration: Duration,
        delay: Duration,
    ) {
        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0);
        }
        let release = match waveform {
            Waveform::Piano => self.samples(Duration::from_secs_f32(RELEASE_MS / 1000.0)),
            // Buzzer stops on time
            Waveform::Square => self.samples(Duration::from_millis(5)),
        };
        self.voices.push(Voice {
            waveform,
            phase: 0.0,
            increment: 2.0 * PI * frequency / self.sample_rate,
            delay: self.samples(delay),
            position: 0,
            gate: self.samples(duration),
            release,
            attack: self.samples(Duration::from_secs_f32(ATTACK_MS / 1000.0)),
        });
    }

    /// Set master gain (0.0 - 1.0)
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Waveform and frequency of each voice, oldest first
    pub fn voices(&self) -> Vec<(Waveform, f32)> {
        self.voices
            .iter()
            .map(|v| (v.waveform, v.increment * self.sample_rate / (2.0 * PI)))
            .collect()
    }

    /// Silence every voice
    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// Mix voices into an interleaved buffer, adding to what is there
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in buffer.chunks_mut(channels) {
            let mut sample = 0.0;
            for voice in &mut self.voices {
                sample += voice.next_sample(self.sample_rate);
            }
            let sample = sample * self.gain;
            for out in frame.iter_mut() {
                *out = (*out + sample).clamp(-1.0, 1.0);
            }
        }
        self.voices.retain(|v| !v.is_finished());
    }
}
