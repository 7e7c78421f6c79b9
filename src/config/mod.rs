// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the scale trainer.
//!
//! A trainer file holds the practice settings, MIDI device preference,
//! keyboard bindings, audio settings and log destination. Files ending in
//! `.toml` are read as TOML, anything else as YAML.

pub mod watcher;

pub use watcher::{validate_config, ConfigEvent, ConfigWatcher};

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::music::{KeySignature, NoteToken};
use crate::practice::PracticeSettings;

/// Root configuration for the trainer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrainerFile {
    #[serde(default)]
    pub practice: PracticeConfig,
    #[serde(default)]
    pub midi: MidiDeviceConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrainerFile {
    /// Load a trainer configuration, picking the format from the extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        if is_toml(path) {
            Self::from_toml(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Parse a trainer configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a trainer configuration from TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Save configuration, picking the format from the extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = if is_toml(path) {
            self.to_toml()?
        } else {
            self.to_yaml()?
        };
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Check every field that can be named wrongly.
    pub fn validate(&self) -> Result<()> {
        self.practice.key_signature()?;

        for (key, token) in &self.keyboard.bindings {
            let mut chars = key.chars();
            if chars.next().is_none() || chars.next().is_some() {
                return Err(anyhow!(
                    "Keyboard binding '{}' must be a single character",
                    key
                ));
            }
            token
                .parse::<NoteToken>()
                .with_context(|| format!("Keyboard binding '{}' has bad note '{}'", key, token))?;
        }

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(anyhow!(
                "Audio volume must be between 0.0 and 1.0, got {}",
                self.audio.volume
            ));
        }

        self.logging.level.parse::<tracing::Level>().map_err(|_| {
            anyhow!(
                "Unknown log level '{}' (expected error, warn, info, debug or trace)",
                self.logging.level
            )
        })?;

        Ok(())
    }

    /// Practice settings described by this file
    pub fn practice_settings(&self) -> Result<PracticeSettings> {
        Ok(PracticeSettings {
            key: self.practice.key_signature()?,
            show_note_names: self.practice.show_note_names,
            show_hints: self.practice.show_hints,
        })
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

/// Practice settings as written in the file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PracticeConfig {
    /// Tonic, e.g. "C", "F#", "Bb"
    #[serde(default = "default_key")]
    pub key: String,
    /// "major" or "minor"
    #[serde(default = "default_scale")]
    pub scale: String,
    #[serde(default = "default_true")]
    pub show_note_names: bool,
    #[serde(default)]
    pub show_hints: bool,
}

fn default_key() -> String {
    "C".to_string()
}
fn default_scale() -> String {
    "major".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            scale: default_scale(),
            show_note_names: true,
            show_hints: false,
        }
    }
}

impl PracticeConfig {
    pub fn key_signature(&self) -> Result<KeySignature> {
        KeySignature::parse(&self.key, &self.scale).context("Invalid practice key")
    }
}

/// MIDI device configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MidiDeviceConfig {
    /// Partial device name to connect to
    #[serde(default)]
    pub device: Option<String>,
}

/// Computer keyboard configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyboardConfig {
    /// Auto-release delay for terminals that never report key-up
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    /// Character to note token overrides, e.g. `z: C3`
    #[serde(default)]
    pub bindings: HashMap<String, String>,
}

fn default_hold_ms() -> u64 {
    1500
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            hold_ms: default_hold_ms(),
            bindings: HashMap::new(),
        }
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Master volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
}

fn default_volume() -> f32 {
    0.8
}
fn default_sample_rate() -> u32 {
    44100
}
fn default_buffer_size() -> u32 {
    512
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
        }
    }
}

/// Log destination. The terminal UI owns stdout, so logs only go to a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log file; logging is off when unset
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_level(),
        }
    }
}
