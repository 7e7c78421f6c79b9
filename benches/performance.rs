// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for the scale trainer
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Scale generation and membership checks
//! - Note token parsing
//! - MIDI parsing
//! - Keyboard layout and hit-testing
//! - Synth rendering

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ratatui::layout::Rect;

use scale_trainer::audio::{Synth, Waveform};
use scale_trainer::midi::MidiMessage;
use scale_trainer::music::{
    get_scale_notes, is_note_in_scale, normalize, note_to_index, KeySignature, NoteToken,
    PitchClass, ScaleQuality,
};
use scale_trainer::practice::{PracticeSession, PracticeSettings};
use scale_trainer::ui::{key_at, layout_keys};

/// Benchmark scale generation for every key
fn bench_scale_generation(c: &mut Criterion) {
    c.bench_function("all_24_scales", |b| {
        b.iter(|| {
            for tonic in PitchClass::ALL {
                for quality in ScaleQuality::ALL {
                    black_box(get_scale_notes(&KeySignature::new(tonic, quality)).ok());
                }
            }
        })
    });
}

/// Benchmark the membership predicate (run on every key press)
fn bench_membership(c: &mut Criterion) {
    let scale = get_scale_notes(&KeySignature::new(PitchClass::F, ScaleQuality::Major))
        .unwrap_or_default();
    let tokens = ["C3", "Bb4", "A#4", "F##3", "E5", "junk"];

    let mut group = c.benchmark_group("membership");
    for token in tokens {
        group.bench_with_input(BenchmarkId::from_parameter(token), &token, |b, token| {
            b.iter(|| black_box(is_note_in_scale(black_box(token), &scale)))
        });
    }
    group.finish();
}

/// Benchmark spelling normalization and token parsing
fn bench_note_parsing(c: &mut Criterion) {
    let spellings = ["C", "Bb", "E#", "F##", "Cb", "G#"];
    c.bench_function("normalize", |b| {
        b.iter(|| {
            for s in spellings {
                black_box(normalize(black_box(s)));
            }
        })
    });

    c.bench_function("parse_note_token", |b| {
        b.iter(|| black_box("Db4".parse::<NoteToken>().ok()))
    });

    c.bench_function("note_to_index", |b| {
        b.iter(|| black_box(note_to_index(black_box("G#3"))))
    });
}

/// Benchmark MIDI message parsing
fn bench_midi_parsing(c: &mut Criterion) {
    let messages: Vec<[u8; 3]> = vec![
        [0x90, 60, 100],
        [0x80, 60, 0],
        [0x90, 64, 0],
        [0xB0, 7, 127],
    ];

    c.bench_function("midi_parse", |b| {
        b.iter(|| {
            for msg in &messages {
                let parsed = MidiMessage::parse(black_box(msg));
                black_box(parsed.and_then(|m| m.note_token()));
            }
        })
    });
}

/// Benchmark keyboard layout and mouse hit-testing
fn bench_keyboard_layout(c: &mut Criterion) {
    let area = Rect::new(1, 10, 118, 20);

    c.bench_function("layout_keys", |b| {
        b.iter(|| black_box(layout_keys(black_box(area)).len()))
    });

    c.bench_function("key_at", |b| {
        b.iter(|| black_box(key_at(area, black_box(40), black_box(12))))
    });
}

/// Benchmark a full practice pass over one scale
fn bench_practice_session(c: &mut Criterion) {
    let notes: Vec<NoteToken> = ["C3", "D3", "E3", "F3", "G3", "A3", "B3"]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    c.bench_function("complete_scale", |b| {
        b.iter(|| {
            let Ok(mut session) = PracticeSession::new(PracticeSettings::default()) else {
                return;
            };
            let now = Instant::now();
            for note in &notes {
                black_box(session.press(*note, now));
            }
        })
    });
}

/// Benchmark synth rendering (must keep up with the audio callback)
fn bench_synth_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth_render");

    for voices in [1usize, 4, 16].iter() {
        group.bench_with_input(BenchmarkId::new("voices", voices), voices, |b, &voices| {
            let mut buffer = vec![0.0f32; 1024];
            b.iter_batched(
                || {
                    let mut synth = Synth::new(44100);
                    for i in 0..voices {
                        synth.trigger(
                            220.0 + i as f32 * 30.0,
                            Waveform::Piano,
                            Duration::from_millis(250),
                            Duration::ZERO,
                        );
                    }
                    synth
                },
                |mut synth| {
                    buffer.fill(0.0);
                    synth.render(&mut buffer, 2);
                    black_box(buffer[0])
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_scale_generation,
    bench_membership,
    bench_note_parsing,
    bench_midi_parsing,
    bench_keyboard_layout,
    bench_practice_session,
    bench_synth_render,
);

criterion_main!(benches);
