//! # MP3 Encoder Session
//!
//! A stateful driver around an MP3 encoding engine. It validates encoder
//! parameters, owns the input and output staging buffers, and sequences
//! encode and flush calls so that raw PCM can be streamed in bounded chunks
//! and complete MP3 frames come out.
//!
//! The low-level interface is [`EncoderSession`], which follows the
//! create/init/encode/flush/destroy protocol and reports integer status
//! codes through [`SessionError`]. [`Encoder`] is the slice-based wrapper
//! most callers want. With the default `lame` feature the engine is
//! libmp3lame.
//!
//! ```no_run
//! use mp3_session::{EncoderConfig, Mode, Mp3Session};
//!
//! let config = EncoderConfig::new().channels(2).quality(5).samples(4096).mode(Mode::Vbr);
//! let mut session = Mp3Session::create();
//! session.init(&config)?;
//!
//! let mut stream = Vec::new();
//! if let Some((left, right)) = session.input_buffers_mut() {
//!     left.fill(0.0);
//!     right.fill(0.0);
//! }
//! session.encode(4096)?;
//! stream.extend_from_slice(session.output());
//! session.flush()?;
//! stream.extend_from_slice(session.output());
//! session.destroy();
//! # Ok::<(), mp3_session::SessionError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
#[cfg(feature = "lame")]
pub mod lame;
pub mod mp3_encoder;
pub mod pcm_utils;
pub mod session;

pub use config::{EncoderConfig, Mode, DEFAULT_OUTPUT_SAMPLE_RATE};
pub use engine::{Engine, EngineCode, EngineParams, RateControl};
pub use error::{status_code, EncoderError, InputDataError, SessionError};
pub use mp3_encoder::{encode_pcm_with, Encoder, EncoderState};
pub use session::EncoderSession;

#[cfg(feature = "lame")]
pub use lame::LameEngine;
#[cfg(feature = "lame")]
pub use mp3_encoder::encode_pcm_to_mp3;

/// Session driving libmp3lame
#[cfg(feature = "lame")]
pub type Mp3Session = EncoderSession<LameEngine>;

/// Slice-based encoder driving libmp3lame
#[cfg(feature = "lame")]
pub type Mp3Encoder = Encoder<LameEngine>;
