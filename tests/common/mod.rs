//! Shared test engine
//!
//! `ScriptedEngine` produces bytes derived from the samples it is handed, so
//! tests can tell exactly which buffers the session passed it, and records
//! every call it receives.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use mp3_session::engine::{Engine, EngineCode, EngineParams, EngineResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Configure(EngineParams),
    InitParams,
    Encode { samples: usize, right: bool },
    Flush,
    Close,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Default)]
pub struct ScriptedEngine {
    pub log: CallLog,
    pub encoded: usize,
    pub fail_params: bool,
    pub fail_encode: Option<i32>,
    pub fail_flush: bool,
}

impl ScriptedEngine {
    pub fn with_log(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            ..Default::default()
        }
    }
}

/// One byte per sample: the sample scaled to i8, plus the right sample if any
pub fn sample_byte(left: f32, right: Option<f32>) -> u8 {
    let l = (left.clamp(-1.0, 1.0) * 100.0) as i8;
    let r = right.map_or(0, |r| (r.clamp(-1.0, 1.0) * 20.0) as i8);
    l.wrapping_add(r) as u8
}

impl Engine for ScriptedEngine {
    fn open() -> Option<Self> {
        Some(Self::default())
    }

    fn configure(&mut self, params: &EngineParams) -> EngineResult<()> {
        self.log.borrow_mut().push(Call::Configure(*params));
        Ok(())
    }

    fn init_params(&mut self) -> EngineResult<()> {
        self.log.borrow_mut().push(Call::InitParams);
        if self.fail_params {
            return Err(EngineCode(-1));
        }
        Ok(())
    }

    fn encode_buffer(
        &mut self,
        left: &[f32],
        right: Option<&[f32]>,
        output: &mut [u8],
    ) -> EngineResult<usize> {
        self.log.borrow_mut().push(Call::Encode {
            samples: left.len(),
            right: right.is_some(),
        });
        if let Some(code) = self.fail_encode {
            return Err(EngineCode(code));
        }
        if let Some(right) = right {
            assert_eq!(right.len(), left.len(), "channel slices differ");
        }

        let n = left.len().min(output.len());
        for (i, byte) in output[..n].iter_mut().enumerate() {
            *byte = sample_byte(left[i], right.map(|r| r[i]));
        }
        self.encoded += left.len();
        Ok(n)
    }

    fn flush(&mut self, output: &mut [u8]) -> EngineResult<usize> {
        self.log.borrow_mut().push(Call::Flush);
        if self.fail_flush {
            return Err(EngineCode(-1));
        }
        let tail = (self.encoded as u32).to_le_bytes();
        output[..5].copy_from_slice(b"FLUSH");
        output[5..9].copy_from_slice(&tail);
        Ok(9)
    }

    fn close(self) {
        self.log.borrow_mut().push(Call::Close);
    }
}
