// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossterm::event::Event;
use tracing::{info, warn};

use scale_trainer::audio::{AudioEngine, OutputConfig};
use scale_trainer::config::{ConfigEvent, ConfigWatcher, TrainerFile};
use scale_trainer::midi::{print_sources, MidiDeviceManager};
use scale_trainer::music::{get_scale_notes, KeySignature};
use scale_trainer::trainer::{Flow, Trainer};
use scale_trainer::ui::{App, TrainerView};

/// Config file picked up from the working directory when none is given
const DEFAULT_CONFIG: &str = "scale-trainer.yaml";

/// How often the MIDI device list is rescanned
const MIDI_REFRESH: Duration = Duration::from_secs(2);

fn print_usage() {
    println!("Scale Trainer - practice major and minor scales on a terminal keyboard");
    println!();
    println!("Usage: scale-trainer [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>                Load settings from a YAML or TOML file");
    println!("  --key <TONIC>                  Start in this key (e.g. C, F#, Bb)");
    println!("  --scale <major|minor>          Start with this scale type");
    println!("  --midi <N|NAME>                Connect to MIDI source N, or the first matching NAME");
    println!("  --list-midi                    List available MIDI sources (inputs)");
    println!("  --scale-notes <TONIC> <SCALE>  Print the notes of a scale and exit");
    println!("  --no-audio                     Disable sound feedback");
    println!("  --help                         Show this help message");
}

/// Options that start the trainer
#[derive(Debug, Default)]
struct RunOptions {
    config: Option<PathBuf>,
    key: Option<String>,
    scale: Option<String>,
    midi: Option<MidiChoice>,
    no_audio: bool,
}

/// MIDI source picked on the command line
#[derive(Debug)]
enum MidiChoice {
    Index(usize),
    Name(String),
}

impl MidiChoice {
    fn parse(raw: &str) -> Self {
        match raw.parse() {
            Ok(index) => MidiChoice::Index(index),
            Err(_) => MidiChoice::Name(raw.to_string()),
        }
    }
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

fn print_scale_notes(tonic: &str, quality: &str) -> Result<()> {
    let key = KeySignature::parse(tonic, quality)?;
    let notes = get_scale_notes(&key)?;
    let names: Vec<String> = notes.iter().map(|n| n.to_string()).collect();
    println!("{}: {}", key, names.join(" "));
    Ok(())
}

fn load_config(options: &RunOptions) -> Result<TrainerFile> {
    let mut config = match &options.config {
        Some(path) => TrainerFile::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => TrainerFile::load(DEFAULT_CONFIG)?,
        None => TrainerFile::default(),
    };

    if let Some(key) = &options.key {
        config.practice.key = key.clone();
    }
    if let Some(scale) = &options.scale {
        config.practice.scale = scale.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Log to the configured file; the terminal belongs to the UI
fn init_logging(config: &TrainerFile) -> Result<()> {
    let Some(file) = &config.logging.file else {
        return Ok(());
    };
    let level: tracing::Level = config
        .logging
        .level
        .parse()
        .map_err(|_| anyhow!("Unknown log level '{}'", config.logging.level))?;
    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| format!("Failed to open log file: {}", file))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

fn start_audio(config: &TrainerFile, no_audio: bool) -> AudioEngine {
    if no_audio || !config.audio.enabled {
        info!("audio disabled");
        return AudioEngine::silent();
    }
    let output = OutputConfig {
        sample_rate: config.audio.sample_rate,
        buffer_size: config.audio.buffer_size,
        ..OutputConfig::default()
    };
    AudioEngine::start(output, config.audio.volume).unwrap_or_else(|e| {
        warn!(error = %e, "audio unavailable, continuing without sound");
        AudioEngine::silent()
    })
}

fn config_path(options: &RunOptions) -> Option<PathBuf> {
    options.config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG);
        default.exists().then_some(default)
    })
}

fn run(options: RunOptions) -> Result<()> {
    let config = load_config(&options)?;
    init_logging(&config)?;
    info!(key = %config.practice.key, scale = %config.practice.scale, "starting");

    let audio = start_audio(&config, options.no_audio);
    let mut trainer = Trainer::new(&config, audio)?;

    let mut midi = MidiDeviceManager::new(config.midi.device.clone());
    match &options.midi {
        Some(MidiChoice::Index(index)) => midi
            .connect_index(*index)
            .with_context(|| format!("Failed to connect to MIDI source {}", index))?,
        Some(MidiChoice::Name(name)) => midi
            .connect_name(name)
            .with_context(|| format!("Failed to connect to MIDI device '{}'", name))?,
        None => {}
    }

    let watcher = match config_path(&options) {
        Some(path) => match ConfigWatcher::new(&path, None) {
            Ok(watcher) => {
                info!(path = ?watcher.watched_path(), "watching config for changes");
                Some(watcher)
            }
            Err(e) => {
                warn!(error = %e, "config hot reload disabled");
                None
            }
        },
        None => None,
    };

    let mut app = App::new().context("Failed to initialize terminal")?;
    if !app.key_release_events() {
        info!(hold_ms = config.keyboard.hold_ms, "terminal sends no key releases");
        trainer.use_hold_timeout(config.keyboard.hold_ms);
    }

    let mut last_refresh = Instant::now();

    loop {
        let midi_status = midi.status();
        app.draw(&TrainerView {
            session: &trainer.session,
            midi: &midi_status,
            ui: &trainer.ui,
            controls: &trainer.controls,
        })?;

        let now = Instant::now();
        let actions: Vec<_> = match app.poll_event()? {
            Some(Event::Key(key)) => trainer.controls.process_key(&key, now).into_iter().collect(),
            Some(Event::Mouse(mouse)) => app.handle_mouse(mouse),
            _ => Vec::new(),
        };

        for action in actions {
            match trainer.apply(action, now) {
                Flow::Continue => {}
                Flow::Quit => {
                    trainer.audio().all_notes_off();
                    info!("quit");
                    return Ok(());
                }
                Flow::NextMidiDevice => match midi.next_device() {
                    Ok(()) => {
                        let name = midi.status().device_name.unwrap_or_default();
                        trainer.ui.set_status(format!("MIDI: {}", name));
                    }
                    Err(e) => trainer.ui.set_status(format!("MIDI: {}", e)),
                },
            }
        }

        for message in midi.recv_all() {
            trainer.apply_midi(&message, now);
        }
        if now.duration_since(last_refresh) >= MIDI_REFRESH {
            midi.refresh();
            last_refresh = now;
        }

        if let Some(watcher) = &watcher {
            for event in watcher.recv_all() {
                match event {
                    ConfigEvent::Reloaded(config) => {
                        if let Err(e) = trainer.reload(&config) {
                            trainer.ui.set_status(format!("Config error: {}", e));
                        }
                    }
                    ConfigEvent::Error(e) => {
                        trainer.ui.set_status(format!("Config error: {}", e));
                    }
                }
            }
        }

        trainer.tick(now);
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut options = RunOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                options.config = Some(PathBuf::from(value(&args, i, "--config")?));
                i += 1;
            }
            "--key" => {
                options.key = Some(value(&args, i, "--key")?.to_string());
                i += 1;
            }
            "--scale" => {
                options.scale = Some(value(&args, i, "--scale")?.to_string());
                i += 1;
            }
            "--midi" => {
                options.midi = Some(MidiChoice::parse(value(&args, i, "--midi")?));
                i += 1;
            }
            "--no-audio" => options.no_audio = true,
            "--list-midi" => {
                print_sources()?;
                return Ok(());
            }
            "--scale-notes" => {
                if args.len() < i + 3 {
                    eprintln!("Error: --scale-notes requires a tonic and a scale type");
                    std::process::exit(1);
                }
                return print_scale_notes(&args[i + 1], &args[i + 2]);
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    run(options)
}
