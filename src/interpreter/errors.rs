//! Error types for the embedded Forth module
//!
//! This module defines [`ForthError`], which represents every way an evaluation
//! can stop early. None of these reach the host as a Rust error: the module
//! prints the message into its output accumulator, resets its stacks and
//! returns [`VM_ERREXIT`](super::constants::VM_ERREXIT).

use crate::memory::stack::StackFault;
use crate::memory::MemoryError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForthError {
    /// Word is neither defined nor a number in the current base
    #[error("{0} not found")]
    Undefined(String),

    #[error("Error: Stack underflow")]
    StackUnderflow,

    #[error("Error: Stack overflow")]
    StackOverflow,

    #[error("Error: Return stack underflow")]
    ReturnStackUnderflow,

    #[error("Error: Return stack overflow")]
    ReturnStackOverflow,

    /// Division or modulo by zero
    #[error("Error: Divide by zero")]
    DivisionByZero,

    /// Control word used outside a definition
    #[error("Error: {0} is compile-only")]
    CompileOnly(String),

    /// Defining word used inside a definition
    #[error("Error: {0} is not allowed in a definition")]
    InterpretOnly(String),

    /// `if`/`then`, `do`/`loop`, `begin`/`until` etc. do not pair up
    #[error("Error: unmatched control structure at {0}")]
    ControlMismatch(String),

    /// Parsing word found no name in the input
    #[error("Error: {0} needs a name")]
    MissingName(String),

    /// Unterminated `."`, `.(` or `(`
    #[error("Error: missing closing {0}")]
    UnterminatedString(char),

    #[error("Error: Dictionary full")]
    DictionaryFull,

    #[error("Error: {0}")]
    Memory(#[from] MemoryError),
}

impl From<StackFault> for ForthError {
    fn from(fault: StackFault) -> Self {
        match fault {
            StackFault::Overflow => ForthError::StackOverflow,
            StackFault::Underflow => ForthError::StackUnderflow,
        }
    }
}
