//! Configuration management for the encoder session
//!
//! This module holds the accepted parameter ranges, the encoder
//! configuration with its validation logic, and the pure derivations
//! made from it at init time (output quality and output buffer size).

use std::ops::RangeInclusive;

use crate::error::{SessionError, SessionResult};

/// Output sample rate handed to the engine, whatever the input rate
pub const DEFAULT_OUTPUT_SAMPLE_RATE: u32 = 44100;

/// Accepted input sample rates (Hz)
pub const SAMPLE_RATE_RANGE: RangeInclusive<i32> = 11025..=48000;

/// Accepted channel counts
pub const CHANNELS_RANGE: RangeInclusive<i32> = 1..=2;

/// Accepted quality levels
pub const QUALITY_RANGE: RangeInclusive<i32> = 0..=9;

/// Accepted chunk sizes (samples per channel per encode call)
pub const SAMPLES_RANGE: RangeInclusive<i32> = 2048..=16384;

/// Fixed overhead of the output buffer bound, in bytes
pub const OUTPUT_BUFFER_OVERHEAD: usize = 7200;

/// CBR bitrates (kbps) indexed by quality
pub const CBR_BITRATES: [u32; 10] = [32, 48, 64, 96, 128, 160, 192, 224, 256, 320];

/// Encoding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Constant bitrate, quality selects a kbps target
    #[default]
    Cbr = 0,
    /// Variable bitrate, quality is the engine's VBR scale (0 best)
    Vbr = 1,
}

impl Mode {
    /// Raw integer used by the status-code interface
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl From<i32> for Mode {
    /// 1 selects VBR, every other value CBR.
    fn from(value: i32) -> Self {
        match value {
            1 => Mode::Vbr,
            _ => Mode::Cbr,
        }
    }
}

/// Map a quality level to the engine's output quality parameter.
///
/// VBR passes the level through. CBR looks the level up in
/// [`CBR_BITRATES`]; anything outside 0-9 falls back to 320 kbps.
pub fn output_quality(mode: Mode, quality: i32) -> u32 {
    match mode {
        Mode::Vbr => quality.max(0) as u32,
        Mode::Cbr => usize::try_from(quality)
            .ok()
            .and_then(|index| CBR_BITRATES.get(index).copied())
            .unwrap_or(320),
    }
}

/// Size of the output buffer for a given chunk size: `floor(samples * 1.25) + 7200`
pub fn output_buffer_capacity(samples: usize) -> usize {
    samples + samples / 4 + OUTPUT_BUFFER_OVERHEAD
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncoderConfig {
    /// Input sample rate (Hz)
    pub sample_rate: i32,
    /// Input channel count (1 = mono, 2 = stereo)
    pub channels: i32,
    /// Quality level, 0-9
    pub quality: i32,
    /// Samples per channel accepted by one encode call
    pub samples: i32,
    /// Encoding mode
    pub mode: Mode,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            quality: 9,
            samples: 2048,
            mode: Mode::Cbr,
        }
    }
}

impl EncoderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, sample_rate: i32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn channels(mut self, channels: i32) -> Self {
        self.channels = channels;
        self
    }

    pub fn quality(mut self, quality: i32) -> Self {
        self.quality = quality;
        self
    }

    pub fn samples(mut self, samples: i32) -> Self {
        self.samples = samples;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Validate the configuration.
    ///
    /// Checks run in a fixed order and the first failure wins: sample rate,
    /// channels, quality, samples.
    pub fn validate(&self) -> SessionResult<()> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate) {
            return Err(SessionError::ConfigSampleRate(self.sample_rate));
        }

        if !CHANNELS_RANGE.contains(&self.channels) {
            return Err(SessionError::ConfigNumChannels(self.channels));
        }

        if !QUALITY_RANGE.contains(&self.quality) {
            return Err(SessionError::ConfigQuality(self.quality));
        }

        if !SAMPLES_RANGE.contains(&self.samples) {
            return Err(SessionError::ConfigSamples(self.samples));
        }

        Ok(())
    }

    /// Output quality derived from mode and quality
    pub fn output_quality(&self) -> u32 {
        output_quality(self.mode, self.quality)
    }

    /// Output buffer size for this chunk size (0 for a negative chunk size)
    pub fn output_buffer_capacity(&self) -> usize {
        output_buffer_capacity(usize::try_from(self.samples).unwrap_or(0))
    }

    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }
}
