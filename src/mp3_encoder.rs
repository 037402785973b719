//! High-level MP3 encoder interface
//!
//! [`Encoder`] wraps an [`EncoderSession`] and hides the staging-buffer
//! protocol: callers hand over channel slices and get the encoded bytes back.
//! Once any call fails the encoder stops accepting work, matching the
//! session's rule that a failed call leaves its state unspecified.

use log::debug;

use crate::config::{EncoderConfig, Mode};
use crate::engine::Engine;
use crate::error::{EncoderError, InputDataError, Result};
use crate::pcm_utils::deinterleave_into;
use crate::session::EncoderSession;

/// Lifecycle of an [`Encoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Accepting samples
    Running,
    /// Flushed and closed, or consumed by `close`
    Closed,
    /// A previous call failed
    Error,
}

/// Streaming MP3 encoder
pub struct Encoder<E: Engine> {
    session: EncoderSession<E>,
    config: EncoderConfig,
    state: EncoderState,
}

impl<E: Engine> Encoder<E> {
    /// Create and initialize an encoder
    pub fn new(config: EncoderConfig) -> Result<Self> {
        Self::with_engine(config, E::open)
    }

    /// Create an encoder whose engine handle comes from `open`
    pub fn with_engine<F>(config: EncoderConfig, open: F) -> Result<Self>
    where
        F: FnOnce() -> Option<E>,
    {
        let mut session = EncoderSession::create();
        if let Err(e) = session.init_with(&config, open) {
            session.destroy();
            return Err(e.into());
        }

        Ok(Self {
            session,
            config,
            state: EncoderState::Running,
        })
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EncoderState::Running
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Valid bytes produced by the last call
    pub fn output_buffer_size(&self) -> usize {
        self.session.output_buffer_size()
    }

    pub fn output_buffer_max_size(&self) -> usize {
        self.session.output_buffer_capacity()
    }

    pub fn output_sample_rate(&self) -> u32 {
        self.session.output_sample_rate()
    }

    /// VBR quality or CBR kbps handed to the engine
    pub fn output_quality(&self) -> u32 {
        self.config.output_quality()
    }

    /// Maximum samples per channel per [`encode`](Self::encode) call
    pub fn input_samples(&self) -> usize {
        self.session.input_sample_capacity()
    }

    pub fn input_sample_rate(&self) -> u32 {
        self.config.sample_rate as u32
    }

    pub fn input_channels(&self) -> u8 {
        self.config.channels as u8
    }

    /// Encode one chunk of samples.
    ///
    /// `right` is required for stereo encoders and ignored for mono ones.
    /// An empty `left` flushes the encoder, like [`flush`](Self::flush). The
    /// returned slice is valid until the next call.
    pub fn encode(&mut self, left: &[f32], right: Option<&[f32]>) -> Result<&[u8]> {
        self.ensure_running()?;
        if left.is_empty() {
            return self.flush();
        }

        if let Err(e) = self.stage(left, right) {
            self.state = EncoderState::Error;
            return Err(e);
        }

        let num_samples = i32::try_from(left.len()).unwrap_or(i32::MAX);
        match self.session.encode(num_samples) {
            Ok(_) => Ok(self.session.output()),
            Err(e) => {
                self.state = EncoderState::Error;
                Err(e.into())
            }
        }
    }

    /// Encode interleaved PCM of any length.
    ///
    /// The input is split into chunks no larger than the session capacity.
    /// Returns the bytes of every chunk concatenated.
    pub fn encode_interleaved(&mut self, pcm: &[f32]) -> Result<Vec<u8>> {
        self.ensure_running()?;

        let channels = self.input_channels();
        if pcm.len() % channels as usize != 0 {
            self.state = EncoderState::Error;
            return Err(InputDataError::InvalidInterleavedLength {
                len: pcm.len(),
                channels,
            }
            .into());
        }

        let chunk_len = self.input_samples() * channels as usize;
        let mut mp3_data = Vec::new();

        for chunk in pcm.chunks(chunk_len) {
            let frames = {
                let (left, right) = self
                    .session
                    .input_buffers_mut()
                    .ok_or(EncoderError::Closed)?;
                deinterleave_into(chunk, channels as usize, left, right)
            };

            let num_samples = i32::try_from(frames).unwrap_or(i32::MAX);
            match self.session.encode(num_samples) {
                Ok(_) => mp3_data.extend_from_slice(self.session.output()),
                Err(e) => {
                    self.state = EncoderState::Error;
                    return Err(e.into());
                }
            }
        }

        Ok(mp3_data)
    }

    /// Flush the engine. No more samples are accepted afterwards.
    pub fn flush(&mut self) -> Result<&[u8]> {
        self.ensure_running()?;

        match self.session.flush() {
            Ok(_) => {
                self.state = EncoderState::Closed;
                Ok(self.session.output())
            }
            Err(e) => {
                self.state = EncoderState::Error;
                Err(e.into())
            }
        }
    }

    /// Flush and return the final bytes as an owned vector
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.flush().map(<[u8]>::to_vec)
    }

    /// Destroy the encoder and release its session.
    ///
    /// Fails with [`EncoderError::Closed`] if a previous call failed; the
    /// session is released either way.
    pub fn close(self) -> Result<()> {
        let failed = self.state == EncoderState::Error;
        debug!("Closing encoder in state {:?}", self.state);
        self.session.destroy();

        if failed {
            return Err(EncoderError::Closed);
        }
        Ok(())
    }

    fn ensure_running(&self) -> Result<()> {
        match self.state {
            EncoderState::Running => Ok(()),
            _ => Err(EncoderError::Closed),
        }
    }

    fn stage(&mut self, left: &[f32], right: Option<&[f32]>) -> Result<()> {
        let stereo = self.config.is_stereo();
        let capacity = self.session.input_sample_capacity();

        if let Some(right) = right {
            if right.len() != left.len() {
                return Err(InputDataError::ChannelLengthMismatch {
                    left: left.len(),
                    right: right.len(),
                }
                .into());
            }
        } else if stereo && !left.is_empty() {
            return Err(InputDataError::MissingChannel {
                channels: self.input_channels(),
            }
            .into());
        }

        // Oversized chunks are left for the session to reject.
        if left.len() > capacity {
            return Ok(());
        }

        let (left_buf, right_buf) = self
            .session
            .input_buffers_mut()
            .ok_or(EncoderError::Closed)?;
        left_buf[..left.len()].copy_from_slice(left);
        if let (true, Some(right)) = (stereo, right) {
            right_buf[..right.len()].copy_from_slice(right);
        }

        Ok(())
    }
}

/// Encode whole channel buffers with any engine and return the complete stream.
pub fn encode_pcm_with<E: Engine>(
    config: EncoderConfig,
    left: &[f32],
    right: Option<&[f32]>,
) -> Result<Vec<u8>> {
    let mut encoder = Encoder::<E>::new(config)?;
    let chunk = encoder.input_samples();
    let mut mp3_data = Vec::new();

    for (i, left_chunk) in left.chunks(chunk).enumerate() {
        let right_chunk = right.map(|r| {
            let start = (i * chunk).min(r.len());
            let end = (start + left_chunk.len()).min(r.len());
            &r[start..end]
        });
        mp3_data.extend_from_slice(encoder.encode(left_chunk, right_chunk)?);
    }

    mp3_data.extend_from_slice(encoder.flush()?);
    encoder.close()?;

    Ok(mp3_data)
}

/// Encode whole channel buffers with libmp3lame.
///
/// `right` is required when `config.channels` is 2.
#[cfg(feature = "lame")]
pub fn encode_pcm_to_mp3(config: EncoderConfig, left: &[f32], right: Option<&[f32]>) -> Result<Vec<u8>> {
    encode_pcm_with::<crate::lame::LameEngine>(config, left, right)
}
