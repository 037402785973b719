//! libmp3lame engine
//!
//! Wraps `mp3lame_encoder`: the builder is the handle while parameters are
//! being set, `build()` is the parameter finalization, and the resulting
//! encoder serves encode and flush calls.

use std::mem::{self, MaybeUninit};
use std::os::raw::c_int;

use log::warn;
use mp3lame_encoder::{
    Bitrate, Builder, DualPcm, EncodeError, FlushGap, MonoPcm, Quality, VbrMode,
};

use crate::engine::{Engine, EngineCode, EngineParams, EngineResult, RateControl};

/// Generic LAME failure, used when a setter or `build()` is rejected
const LAME_GENERIC_ERROR: i32 = -1;

/// LAME reports -3 when encoding before `lame_init_params`
const LAME_PARAMS_NOT_INITIALIZED: i32 = -3;

enum State {
    Configuring(Builder),
    Ready(mp3lame_encoder::Encoder),
    Failed,
}

/// Engine backed by libmp3lame
pub struct LameEngine {
    state: State,
}

impl LameEngine {
    fn builder(&mut self) -> EngineResult<&mut Builder> {
        match &mut self.state {
            State::Configuring(builder) => Ok(builder),
            _ => Err(EngineCode(LAME_GENERIC_ERROR)),
        }
    }

    fn encoder(&mut self) -> EngineResult<&mut mp3lame_encoder::Encoder> {
        match &mut self.state {
            State::Ready(encoder) => Ok(encoder),
            _ => Err(EngineCode(LAME_PARAMS_NOT_INITIALIZED)),
        }
    }
}

impl Engine for LameEngine {
    fn open() -> Option<Self> {
        Builder::new().map(|builder| Self {
            state: State::Configuring(builder),
        })
    }

    fn configure(&mut self, params: &EngineParams) -> EngineResult<()> {
        let builder = self.builder()?;

        builder
            .set_sample_rate(params.in_sample_rate)
            .map_err(|e| rejected("input sample rate", e))?;

        // The builder only exposes the input rate; the output rate is set on
        // the raw handle so LAME does not pick one from the bitrate.
        let out_rate = c_int::try_from(params.out_sample_rate)
            .map_err(|_| EngineCode(LAME_GENERIC_ERROR))?;
        let res = unsafe { mp3lame_sys::lame_set_out_samplerate(builder.as_ptr(), out_rate) };
        if res < 0 {
            return Err(EngineCode(res));
        }

        builder
            .set_num_channels(params.channels)
            .map_err(|e| rejected("channel count", e))?;

        match params.rate_control {
            RateControl::Vbr { quality } => {
                builder
                    .set_vbr_mode(VbrMode::Mtrh)
                    .map_err(|e| rejected("vbr mode", e))?;
                builder
                    .set_vbr_quality(vbr_quality(quality))
                    .map_err(|e| rejected("vbr quality", e))?;
            }
            RateControl::Cbr { kbps } => {
                builder
                    .set_vbr_mode(VbrMode::Off)
                    .map_err(|e| rejected("vbr mode", e))?;
                let bitrate = cbr_bitrate(kbps).ok_or(EngineCode(LAME_GENERIC_ERROR))?;
                builder
                    .set_brate(bitrate)
                    .map_err(|e| rejected("bitrate", e))?;
            }
        }

        Ok(())
    }

    fn init_params(&mut self) -> EngineResult<()> {
        match mem::replace(&mut self.state, State::Failed) {
            State::Configuring(builder) => {
                let encoder = builder.build().map_err(|e| rejected("parameters", e))?;
                self.state = State::Ready(encoder);
                Ok(())
            }
            other => {
                self.state = other;
                Err(EngineCode(LAME_GENERIC_ERROR))
            }
        }
    }

    fn encode_buffer(
        &mut self,
        left: &[f32],
        right: Option<&[f32]>,
        output: &mut [u8],
    ) -> EngineResult<usize> {
        let encoder = self.encoder()?;
        let output = as_uninit(output);

        let result = match right {
            Some(right) => encoder.encode(DualPcm { left, right }, output),
            None => encoder.encode(MonoPcm(left), output),
        };

        result.map_err(|e| EngineCode(encode_code(e)))
    }

    fn flush(&mut self, output: &mut [u8]) -> EngineResult<usize> {
        let encoder = self.encoder()?;
        encoder
            .flush::<FlushGap>(as_uninit(output))
            .map_err(|e| EngineCode(encode_code(e)))
    }
}

fn rejected(what: &str, err: impl std::fmt::Debug) -> EngineCode {
    warn!("LAME rejected {}: {:?}", what, err);
    EngineCode(LAME_GENERIC_ERROR)
}

// LAME only ever writes initialized bytes into its output buffer, and a
// `u8` is valid for any bit pattern it could leave behind.
fn as_uninit(output: &mut [u8]) -> &mut [MaybeUninit<u8>] {
    unsafe { &mut *(output as *mut [u8] as *mut [MaybeUninit<u8>]) }
}

/// Raw LAME return code behind an encode error
fn encode_code(err: EncodeError) -> i32 {
    match err {
        EncodeError::BufferTooSmall => -1,
        EncodeError::NoMem => -2,
        EncodeError::InvalidState => -3,
        EncodeError::PsychoAcoustic => -4,
        EncodeError::Other(code) => code,
    }
}

fn vbr_quality(quality: u32) -> Quality {
    match quality {
        0 => Quality::Best,
        1 => Quality::SecondBest,
        2 => Quality::NearBest,
        3 => Quality::VeryNice,
        4 => Quality::Nice,
        5 => Quality::Good,
        6 => Quality::Decent,
        7 => Quality::Ok,
        8 => Quality::SecondWorst,
        _ => Quality::Worst,
    }
}

fn cbr_bitrate(kbps: u32) -> Option<Bitrate> {
    let bitrate = match kbps {
        32 => Bitrate::Kbps32,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        96 => Bitrate::Kbps96,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        _ => return None,
    };
    Some(bitrate)
}
