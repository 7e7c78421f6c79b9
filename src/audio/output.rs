// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Opens the default output device and pulls samples from a callback.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use tracing::{error, info, warn};

use super::AudioError;

/// Audio output configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Buffer size in frames
    pub buffer_size: u32,
    /// Number of output channels
    pub channels: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 512,
            channels: 2,
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), AudioError> {
        if !(8000..=192_000).contains(&self.sample_rate) {
            return Err(AudioError::InvalidConfig(format!(
                "sample rate {} out of range",
                self.sample_rate
            )));
        }
        if !(64..=4096).contains(&self.buffer_size) {
            return Err(AudioError::InvalidConfig(format!(
                "buffer size {} out of range (64-4096)",
                self.buffer_size
            )));
        }
        if self.channels == 0 {
            return Err(AudioError::InvalidConfig("no output channels".to_string()));
        }
        Ok(())
    }

    /// Calculate latency in milliseconds
    pub fn latency_ms(&self) -> f64 {
        (self.buffer_size as f64 / self.sample_rate as f64) * 1000.0
    }
}

/// Audio output stream
pub struct AudioOutput {
    _stream: Stream,
    _device: Device,
    config: OutputConfig,
}

impl AudioOutput {
    /// Create a new audio output with callback
    pub fn new<F>(config: OutputConfig, callback: F) -> Result<Self, AudioError>
    where
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        config.validate()?;

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        device
            .default_output_config()
            .map_err(|e| AudioError::InitFailed(format!("Failed to get default config: {}", e)))?;

        let fixed = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let callback = std::sync::Arc::new(std::sync::Mutex::new(callback));
        let stream = match build_stream(&device, &fixed, callback.clone()) {
            Ok(stream) => stream,
            Err(e) => {
                // Some devices reject fixed buffer sizes
                warn!(error = %e, "fixed buffer size rejected, using device default");
                let flexible = StreamConfig {
                    buffer_size: cpal::BufferSize::Default,
                    ..fixed
                };
                build_stream(&device, &flexible, callback)?
            }
        };

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("Failed to start stream: {}", e)))?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = config.sample_rate,
            latency_ms = config.latency_ms(),
            "audio output started"
        );

        Ok(Self {
            _stream: stream,
            _device: device,
            config,
        })
    }

    /// Get current configuration
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }
}

fn build_stream<F>(
    device: &Device,
    stream_config: &StreamConfig,
    callback: std::sync::Arc<std::sync::Mutex<F>>,
) -> Result<Stream, AudioError>
where
    F: FnMut(&mut [f32], usize) + Send + 'static,
{
    let channels = stream_config.channels as usize;
    device
        .build_output_stream(
            stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                data.fill(0.0);
                if let Ok(mut callback) = callback.lock() {
                    callback(data, channels);
                }
            },
            move |err| {
                error!(error = %err, "audio stream error");
            },
            None,
        )
        .map_err(|e| AudioError::StreamFailed(format!("Failed to build stream: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.buffer_size, 512);
        assert_eq!(config.channels, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_latency_calculation() {
        let config = OutputConfig::default();
        assert!((config.latency_ms() - 11.6).abs() < 0.1);
    }

    #[test]
    fn test_invalid_config() {
        let config = OutputConfig {
            buffer_size: 16,
            ..OutputConfig::default()
        };
        assert!(matches!(config.validate(), Err(AudioError::InvalidConfig(_))));

        let config = OutputConfig {
            sample_rate: 0,
            ..OutputConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
