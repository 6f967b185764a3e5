//! Evaluation driver
//!
//! One line in, the module's text out. The order is fixed:
//! allocate, write, `evaluate`, read the accumulator, `clear_output`, release.
//! The clear runs whether or not the evaluation printed anything, so output
//! from two lines can never run together.

use super::bridge;
use crate::error::AllocationError;
use crate::module::{status, VmModule};

/// Outcome reported by the module's `evaluate` return code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalStatus {
    Completed,
    Failed(i32),
}

impl EvalStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 | status::OUT_OF_TEXT => EvalStatus::Completed,
            code => EvalStatus::Failed(code),
        }
    }
}

/// What one evaluation produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Text the module wrote, including any error message
    pub output: String,

    /// `None` when the line was blank and the module was never called
    pub status: Option<EvalStatus>,
}

/// Evaluate `line` in the module.
///
/// Blank lines are skipped entirely. An [`AllocationError`] means the module
/// was not called at all.
pub fn evaluate<M: VmModule + ?Sized>(
    module: &mut M,
    line: &str,
) -> Result<Evaluation, AllocationError> {
    if line.trim().is_empty() {
        return Ok(Evaluation::default());
    }

    let (code, output) = bridge::with_input_text(module, line, |buffer, ptr| {
        let code = buffer.evaluate(ptr);
        (code, drain_output(&mut **buffer))
    })?;

    let status = EvalStatus::from_code(code);
    if let EvalStatus::Failed(code) = status {
        log::debug!("evaluate returned {} for {:?}", code, line);
    }
    Ok(Evaluation {
        output,
        status: Some(status),
    })
}

/// Read the output accumulator in full, then clear it.
pub fn drain_output<M: VmModule + ?Sized>(module: &mut M) -> String {
    let len = module.output_len();
    let output = if len > 0 {
        bridge::read_bytes(module, module.output_ptr(), len)
    } else {
        String::new()
    };
    module.clear_output();
    output
}
