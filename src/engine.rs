//! Encoder engine contract
//!
//! The session never compresses audio itself. It drives an engine through
//! this trait: acquire a handle, configure it, finalize its parameters, then
//! feed it buffers and flush it. Implementations report failures with the
//! engine's own negative code; the session decides which status code that
//! becomes.

use std::fmt;

/// Raw negative code reported by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCode(pub i32);

impl fmt::Display for EngineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine code {}", self.0)
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineCode>;

/// Rate control handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateControl {
    /// Variable bitrate at the given quality (0 best, 9 worst)
    Vbr { quality: u32 },
    /// Constant bitrate in kbps
    Cbr { kbps: u32 },
}

/// Parameters applied to an engine before it is finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    pub in_sample_rate: u32,
    pub out_sample_rate: u32,
    pub channels: u8,
    pub rate_control: RateControl,
}

/// An MP3 encoding engine
pub trait Engine: Sized {
    /// Acquire a fresh engine handle, `None` if the engine cannot allocate one
    fn open() -> Option<Self>;

    /// Apply input/output format and rate control
    fn configure(&mut self, params: &EngineParams) -> EngineResult<()>;

    /// Finalize parameter setup; encoding is only valid afterwards
    fn init_params(&mut self) -> EngineResult<()>;

    /// Encode `left.len()` samples per channel into `output`.
    ///
    /// `right` is `None` for mono input and must then never be read. On
    /// success returns the number of bytes written to the front of `output`.
    fn encode_buffer(
        &mut self,
        left: &[f32],
        right: Option<&[f32]>,
        output: &mut [u8],
    ) -> EngineResult<usize>;

    /// Emit whatever the engine still holds, returning the bytes written
    fn flush(&mut self, output: &mut [u8]) -> EngineResult<usize>;

    /// Release the handle
    fn close(self) {}
}
