// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI Input handling for receiving notes from keyboards.
//!
//! `MidiInput` is one open connection; `MidiDeviceManager` tracks the
//! available devices, picks one, and notices when it goes away.

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{anyhow, Result};
use midir::{Ignore, MidiInputConnection};
use tracing::{debug, info, warn};

use super::MidiMessage;

const CLIENT_NAME: &str = "Scale Trainer";

/// MIDI Input handler using midir
pub struct MidiInput {
    _connection: MidiInputConnection<()>,
    receiver: Receiver<MidiMessage>,
    device_name: String,
}

impl MidiInput {
    /// Create a new MIDI input connected to the specified source
    pub fn new(source_index: usize) -> Result<Self> {
        let client = open_client()?;
        let ports = client.ports();
        let port = ports
            .get(source_index)
            .ok_or_else(|| anyhow!("MIDI source {} not found", source_index))?;
        let name = client
            .port_name(port)
            .map_err(|e| anyhow!("Failed to read MIDI source name: {}", e))?;
        Self::open(name)
    }

    /// Create a new MIDI input connected to the source with this exact name
    pub fn open(device_name: String) -> Result<Self> {
        let mut client = open_client()?;
        client.ignore(Ignore::All);

        let port = client
            .ports()
            .into_iter()
            .find(|p| client.port_name(p).map_or(false, |n| n == device_name))
            .ok_or_else(|| anyhow!("MIDI device '{}' not found", device_name))?;

        let (tx, rx): (Sender<MidiMessage>, Receiver<MidiMessage>) = mpsc::channel();

        let connection = client
            .connect(
                &port,
                "scale-trainer-input",
                move |_timestamp, data, _| {
                    if let Some(msg) = MidiMessage::parse(data) {
                        let _ = tx.send(msg);
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to '{}': {}", device_name, e))?;

        info!(device = %device_name, "MIDI input connected");

        Ok(Self {
            _connection: connection,
            receiver: rx,
            device_name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Try to receive the next MIDI message (non-blocking)
    pub fn try_recv(&self) -> Option<MidiMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending MIDI messages
    pub fn recv_all(&self) -> Vec<MidiMessage> {
        let mut messages = Vec::new();
        while let Some(msg) = self.try_recv() {
            messages.push(msg);
        }
        messages
    }
}

fn open_client() -> Result<midir::MidiInput> {
    midir::MidiInput::new(CLIENT_NAME).map_err(|e| anyhow!("Failed to create MIDI client: {}", e))
}

/// Snapshot of MIDI availability for display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MidiStatus {
    /// Whether the platform MIDI system could be opened
    pub supported: bool,
    pub connected: bool,
    pub device_name: Option<String>,
    pub devices: Vec<String>,
}

/// Tracks available MIDI inputs and the one currently connected
pub struct MidiDeviceManager {
    supported: bool,
    devices: Vec<String>,
    input: Option<MidiInput>,
    /// Partial name to prefer when auto-selecting
    preferred: Option<String>,
}

impl MidiDeviceManager {
    /// Scan for devices and auto-select one if possible
    pub fn new(preferred: Option<String>) -> Self {
        let mut manager = Self {
            supported: true,
            devices: Vec::new(),
            input: None,
            preferred,
        };
        manager.refresh();
        manager
    }

    /// Rescan devices.
    ///
    /// Drops the connection when its device has gone away, and auto-selects
    /// a device when nothing is connected.
    pub fn refresh(&mut self) {
        match list_sources() {
            Ok(sources) => {
                self.supported = true;
                let devices: Vec<String> = sources.into_iter().map(|(_, name)| name).collect();
                if devices != self.devices {
                    debug!(?devices, "MIDI device list changed");
                }
                self.devices = devices;
            }
            Err(e) => {
                if self.supported {
                    warn!(error = %e, "MIDI unavailable");
                }
                self.supported = false;
                self.devices.clear();
            }
        }

        if let Some(input) = &self.input {
            if !device_present(&self.devices, input.device_name()) {
                info!(device = %input.device_name(), "MIDI device disconnected");
                self.input = None;
            }
        }

        if self.input.is_none() {
            if let Some(index) = auto_select(&self.devices, self.preferred.as_deref()) {
                if let Err(e) = self.connect_index(index) {
                    warn!(error = %e, "MIDI auto-select failed");
                }
            }
        }
    }

    /// Connect to a device by its position in the device list
    pub fn connect_index(&mut self, index: usize) -> Result<()> {
        let name = self
            .devices
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("MIDI source {} not found", index))?;
        // Close first; some backends refuse a second connection to one port
        self.input = None;
        self.input = Some(MidiInput::open(name)?);
        Ok(())
    }

    /// Connect to the first device whose name contains `partial`
    pub fn connect_name(&mut self, partial: &str) -> Result<()> {
        let index = find_device(&self.devices, partial)
            .ok_or_else(|| anyhow!("No MIDI device matching '{}'", partial))?;
        self.connect_index(index)
    }

    /// Connect to the device after the current one, wrapping around
    pub fn next_device(&mut self) -> Result<()> {
        if self.devices.is_empty() {
            return Err(anyhow!("No MIDI devices available"));
        }
        let current = self
            .input
            .as_ref()
            .and_then(|input| self.devices.iter().position(|d| d == input.device_name()));
        let next = match current {
            Some(i) => (i + 1) % self.devices.len(),
            None => 0,
        };
        self.connect_index(next)
    }

    pub fn status(&self) -> MidiStatus {
        MidiStatus {
            supported: self.supported,
            connected: self.input.is_some(),
            device_name: self.input.as_ref().map(|i| i.device_name().to_string()),
            devices: self.devices.clone(),
        }
    }

    /// Receive all pending messages from the connected device
    pub fn recv_all(&self) -> Vec<MidiMessage> {
        self.input
            .as_ref()
            .map(MidiInput::recv_all)
            .unwrap_or_default()
    }
}

/// Device to connect to when nothing is selected.
///
/// A device matching the preferred name wins; otherwise a lone device is
/// picked automatically.
fn auto_select(devices: &[String], preferred: Option<&str>) -> Option<usize> {
    if let Some(index) = preferred.and_then(|p| find_device(devices, p)) {
        return Some(index);
    }
    if devices.len() == 1 {
        Some(0)
    } else {
        None
    }
}

fn find_device(devices: &[String], partial: &str) -> Option<usize> {
    let needle = partial.to_lowercase();
    devices
        .iter()
        .position(|d| d.to_lowercase().contains(&needle))
}

fn device_present(devices: &[String], name: &str) -> bool {
    devices.iter().any(|d| d == name)
}

/// List all available MIDI sources
pub fn list_sources() -> Result<Vec<(usize, String)>> {
    let client = open_client()?;
    let ports = client.ports();
    let result = ports
        .iter()
        .enumerate()
        .map(|(i, port)| {
            let name = client
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown {}", i));
            (i, name)
        })
        .collect();
    Ok(result)
}

/// Print all available MIDI sources to stdout
pub fn print_sources() -> Result<()> {
    let sources = list_sources()?;
    if sources.is_empty() {
        println!("No MIDI sources found.");
    } else {
        println!("Available MIDI sources (inputs):");
        for (i, name) in sources {
            println!("  {}: {}", i, name);
        }
    }
    Ok(())
}
