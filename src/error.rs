//! Error types for the encoder session
//!
//! Session failures map one-to-one onto the integer status codes of the
//! external interface (0 = success, negative = failure). The high-level
//! [`Encoder`](crate::mp3_encoder::Encoder) adds its own input validation and
//! lifecycle errors on top.

use thiserror::Error;

/// Offset subtracted from raw engine encode codes before they are reported.
pub const ENGINE_CODE_OFFSET: i32 = 100;

/// Status code for a successful call.
pub const NO_ERROR: i32 = 0;

/// Reserved status code, never produced.
pub const RESERVED_REALLOC_BUFFER_SIZE: i32 = -6;

/// Reserved status code, never produced as a distinct path.
pub const RESERVED_ENGINE_ENCODE_IEEE_FLOAT: i32 = -8;

/// Failures reported by [`EncoderSession`](crate::session::EncoderSession)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Sample rate outside [11025, 48000]
    #[error("Invalid input sample rate: {0} Hz")]
    ConfigSampleRate(i32),

    /// Channel count outside [1, 2]
    #[error("Invalid input channels (mono and stereo only): {0}")]
    ConfigNumChannels(i32),

    /// Quality outside [0, 9]
    #[error("Invalid quality: {0}")]
    ConfigQuality(i32),

    /// The engine handle could not be acquired
    #[error("Error acquiring an encoder engine handle")]
    EngineInit,

    /// The engine rejected the configured parameters
    #[error("Error finalizing encoder engine parameters")]
    EngineInitParams,

    #[error("Error reallocating buffers")]
    ReallocBufferSize,

    /// More samples requested than the session buffers hold
    #[error("Too much input samples: {requested} requested, capacity is {capacity}")]
    TooManySamples { requested: i32, capacity: usize },

    #[error("Error encoding IEEE float samples")]
    EngineEncodeIeeeFloat,

    /// The engine flush call failed
    #[error("Error flushing the encoder engine")]
    EngineFlushFailure,

    /// Negative sample count passed to encode
    #[error("Invalid number of samples passed: {0}")]
    InvalidNumSamples(i32),

    /// Chunk size outside [2048, 16384]
    #[error("Invalid input samples: {0}")]
    ConfigSamples(i32),

    /// Operation attempted before a successful init
    #[error("Encoder session is not initialized")]
    NotInitialized,

    /// The engine encode call failed with the given raw code
    #[error("Error encoding samples: {}", engine_reason(*engine_code))]
    EngineEncodeFailure { engine_code: i32 },
}

impl SessionError {
    /// Integer status code of this error
    pub fn code(&self) -> i32 {
        match self {
            SessionError::ConfigSampleRate(_) => -1,
            SessionError::ConfigNumChannels(_) => -2,
            SessionError::ConfigQuality(_) => -3,
            SessionError::EngineInit => -4,
            SessionError::EngineInitParams => -5,
            SessionError::ReallocBufferSize => RESERVED_REALLOC_BUFFER_SIZE,
            SessionError::TooManySamples { .. } => -7,
            SessionError::EngineEncodeIeeeFloat => RESERVED_ENGINE_ENCODE_IEEE_FLOAT,
            SessionError::EngineFlushFailure => -9,
            SessionError::InvalidNumSamples(_) => -10,
            SessionError::ConfigSamples(_) => -11,
            SessionError::NotInitialized => -12,
            SessionError::EngineEncodeFailure { engine_code } => {
                engine_code.saturating_sub(ENGINE_CODE_OFFSET)
            }
        }
    }

    /// Decode an integer status code.
    ///
    /// Returns `None` for 0 and for values that name no failure. Payloads that
    /// the code does not carry (the offending value, the capacity) are zeroed.
    /// Any code at or below `-ENGINE_CODE_OFFSET` is an engine encode failure.
    pub fn from_code(code: i32) -> Option<Self> {
        let error = match code {
            -1 => SessionError::ConfigSampleRate(0),
            -2 => SessionError::ConfigNumChannels(0),
            -3 => SessionError::ConfigQuality(0),
            -4 => SessionError::EngineInit,
            -5 => SessionError::EngineInitParams,
            -6 => SessionError::ReallocBufferSize,
            -7 => SessionError::TooManySamples {
                requested: 0,
                capacity: 0,
            },
            -8 => SessionError::EngineEncodeIeeeFloat,
            -9 => SessionError::EngineFlushFailure,
            -10 => SessionError::InvalidNumSamples(0),
            -11 => SessionError::ConfigSamples(0),
            -12 => SessionError::NotInitialized,
            c if c <= -ENGINE_CODE_OFFSET => SessionError::EngineEncodeFailure {
                engine_code: c + ENGINE_CODE_OFFSET,
            },
            _ => return None,
        };
        Some(error)
    }

    /// True for the configuration errors detected before any engine call
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            SessionError::ConfigSampleRate(_)
                | SessionError::ConfigNumChannels(_)
                | SessionError::ConfigQuality(_)
                | SessionError::ConfigSamples(_)
        )
    }
}

/// Human readable reason for a raw engine encode code.
pub fn engine_reason(engine_code: i32) -> &'static str {
    match engine_code {
        0 => "ok",
        -1 => "buffer was too small",
        -2 => "malloc() problem",
        -3 => "engine parameters were not initialized",
        -4 => "psycho acoustic problems",
        -10 => "no memory",
        -11 => "bad bitrate",
        -12 => "bad sample frequency",
        -13 => "internal error",
        _ => "unknown engine error",
    }
}

/// Collapse a session result into its integer status code.
pub fn status_code<T>(result: &std::result::Result<T, SessionError>) -> i32 {
    match result {
        Ok(_) => NO_ERROR,
        Err(e) => e.code(),
    }
}

/// Input data validation errors of the high-level encoder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputDataError {
    /// Left and right slices differ in length
    #[error("Encoder channels have different lengths: left {left}, right {right}")]
    ChannelLengthMismatch { left: usize, right: usize },

    /// A stereo encoder was handed only one channel
    #[error("Missing right channel for a {channels} channel encoder")]
    MissingChannel { channels: u8 },

    /// Interleaved data is not a whole number of frames
    #[error("Invalid interleaved PCM length: {len} samples is not a multiple of {channels} channels")]
    InvalidInterleavedLength { len: usize, channels: u8 },
}

/// Main error type of the high-level encoder
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The underlying session reported a failure
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Input data validation errors
    #[error("Input data error: {0}")]
    InputData(#[from] InputDataError),

    /// The encoder was closed or failed earlier
    #[error("Encoder already closed")]
    Closed,
}

impl EncoderError {
    /// Status code of the underlying session failure, if there is one
    pub fn session_code(&self) -> Option<i32> {
        match self {
            EncoderError::Session(e) => Some(e.code()),
            _ => None,
        }
    }
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
pub type Result<T> = std::result::Result<T, EncoderError>;
