//! Encoder session state machine
//!
//! An [`EncoderSession`] owns one engine handle, two input staging buffers
//! (left and right channel) and one output staging buffer. The caller fills
//! the input buffers, calls [`encode`](EncoderSession::encode) with the
//! number of samples staged, and reads the bytes left in the output buffer
//! before the next call overwrites them. Passing zero samples flushes.
//!
//! Lifecycle: `create` -> `init` -> (`encode` | `flush`)* -> `destroy`.

use log::{debug, trace, warn};

use crate::config::{EncoderConfig, Mode, DEFAULT_OUTPUT_SAMPLE_RATE};
use crate::engine::{Engine, EngineParams, RateControl};
use crate::error::{SessionError, SessionResult};

/// State that only exists after a successful init
struct Active<E> {
    config: EncoderConfig,
    output_quality: u32,
    input_buffer_left: Vec<f32>,
    input_buffer_right: Vec<f32>,
    output_buffer: Vec<u8>,
    output_buffer_size: usize,
    engine: E,
}

/// One encoding instance
pub struct EncoderSession<E: Engine> {
    active: Option<Active<E>>,
}

impl<E: Engine> Default for EncoderSession<E> {
    fn default() -> Self {
        Self::create()
    }
}

impl<E: Engine> EncoderSession<E> {
    /// New uninitialized session: no buffers, no engine.
    pub fn create() -> Self {
        Self { active: None }
    }

    /// Validate `config`, acquire an engine and configure it.
    pub fn init(&mut self, config: &EncoderConfig) -> SessionResult<()> {
        self.init_with(config, E::open)
    }

    /// Like [`init`](Self::init), acquiring the engine handle through `open`.
    ///
    /// Any state from an earlier init is released first, so a failed call
    /// leaves the session uninitialized.
    pub fn init_with<F>(&mut self, config: &EncoderConfig, open: F) -> SessionResult<()>
    where
        F: FnOnce() -> Option<E>,
    {
        if let Some(previous) = self.active.take() {
            warn!("Re-initializing an encoder session, releasing previous state");
            previous.engine.close();
        }

        config.validate()?;

        let mut engine = open().ok_or(SessionError::EngineInit)?;

        // Validation bounds every field, so these conversions cannot truncate.
        let samples = config.samples as usize;
        let output_quality = config.output_quality();
        let output_buffer = vec![0u8; config.output_buffer_capacity()];

        let rate_control = match config.mode {
            Mode::Vbr => RateControl::Vbr {
                quality: output_quality,
            },
            Mode::Cbr => RateControl::Cbr {
                kbps: output_quality,
            },
        };
        let params = EngineParams {
            in_sample_rate: config.sample_rate as u32,
            out_sample_rate: DEFAULT_OUTPUT_SAMPLE_RATE,
            channels: config.channels as u8,
            rate_control,
        };

        let configured = engine.configure(&params).and_then(|_| engine.init_params());
        if let Err(code) = configured {
            warn!("Engine rejected parameters {:?}: {}", params, code);
            engine.close();
            return Err(SessionError::EngineInitParams);
        }

        debug!(
            "Encoder session initialized: {} Hz, {} channel(s), {:?} quality {} -> {}, {} samples, {} byte output buffer",
            config.sample_rate,
            config.channels,
            config.mode,
            config.quality,
            output_quality,
            samples,
            output_buffer.len()
        );

        self.active = Some(Active {
            config: config.clone(),
            output_quality,
            input_buffer_left: vec![0.0; samples],
            input_buffer_right: vec![0.0; samples],
            output_buffer,
            output_buffer_size: 0,
            engine,
        });

        Ok(())
    }

    /// Encode `num_samples` samples per channel from the input buffers.
    ///
    /// Zero flushes the engine instead. On success the output buffer holds
    /// the returned number of bytes, replacing whatever was there.
    pub fn encode(&mut self, num_samples: i32) -> SessionResult<usize> {
        if num_samples == 0 {
            return self.flush();
        }

        let active = self.active.as_mut().ok_or(SessionError::NotInitialized)?;

        if num_samples < 0 {
            return Err(SessionError::InvalidNumSamples(num_samples));
        }

        let n = num_samples as usize;
        let capacity = active.input_buffer_left.len();
        if n > capacity {
            return Err(SessionError::TooManySamples {
                requested: num_samples,
                capacity,
            });
        }

        let right = if active.config.is_stereo() {
            Some(&active.input_buffer_right[..n])
        } else {
            None
        };

        let num_bytes = active
            .engine
            .encode_buffer(&active.input_buffer_left[..n], right, &mut active.output_buffer)
            .map_err(|code| {
                warn!("Engine encode failed: {}", code);
                SessionError::EngineEncodeFailure {
                    engine_code: code.0,
                }
            })?;

        active.output_buffer_size = num_bytes.min(active.output_buffer.len());
        trace!("Encoded {} samples into {} bytes", n, num_bytes);

        Ok(active.output_buffer_size)
    }

    /// Flush the engine so a partially encoded final frame is not lost.
    ///
    /// Call once at end of stream, after the last encode.
    pub fn flush(&mut self) -> SessionResult<usize> {
        let active = self.active.as_mut().ok_or(SessionError::NotInitialized)?;

        let num_bytes = active
            .engine
            .flush(&mut active.output_buffer)
            .map_err(|code| {
                warn!("Engine flush failed: {}", code);
                SessionError::EngineFlushFailure
            })?;

        active.output_buffer_size = num_bytes.min(active.output_buffer.len());
        debug!("Flushed {} bytes", num_bytes);

        Ok(active.output_buffer_size)
    }

    /// Release the engine handle and all buffers.
    pub fn destroy(self) {
        if let Some(active) = self.active {
            debug!("Destroying encoder session");
            active.engine.close();
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.active.is_some()
    }

    /// Configuration accepted by the last successful init
    pub fn config(&self) -> Option<&EncoderConfig> {
        self.active.as_ref().map(|a| &a.config)
    }

    pub fn mode(&self) -> Option<Mode> {
        self.config().map(|c| c.mode)
    }

    /// Samples per channel accepted by one encode call, 0 before init
    pub fn input_sample_capacity(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.input_buffer_left.len())
    }

    pub fn input_sample_rate(&self) -> Option<u32> {
        self.config().map(|c| c.sample_rate as u32)
    }

    pub fn input_channel_count(&self) -> Option<u8> {
        self.config().map(|c| c.channels as u8)
    }

    pub fn output_sample_rate(&self) -> u32 {
        DEFAULT_OUTPUT_SAMPLE_RATE
    }

    /// VBR quality level or CBR bitrate in kbps, depending on the mode
    pub fn output_quality(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.output_quality)
    }

    pub fn output_buffer_capacity(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.output_buffer.len())
    }

    /// Valid bytes from the most recent encode or flush
    pub fn output_buffer_size(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.output_buffer_size)
    }

    /// The valid output bytes
    pub fn output(&self) -> &[u8] {
        match &self.active {
            Some(a) => &a.output_buffer[..a.output_buffer_size],
            None => &[],
        }
    }

    pub fn input_buffer_left_mut(&mut self) -> Option<&mut [f32]> {
        self.active.as_mut().map(|a| a.input_buffer_left.as_mut_slice())
    }

    /// Right channel staging buffer; allocated for mono sessions too, but
    /// never handed to the engine there.
    pub fn input_buffer_right_mut(&mut self) -> Option<&mut [f32]> {
        self.active.as_mut().map(|a| a.input_buffer_right.as_mut_slice())
    }

    /// Both staging buffers at once
    pub fn input_buffers_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        self.active.as_mut().map(|a| {
            (
                a.input_buffer_left.as_mut_slice(),
                a.input_buffer_right.as_mut_slice(),
            )
        })
    }
}
