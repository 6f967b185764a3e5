//! Embedded Forth module
//!
//! This module provides the VM the console drives:
//! - [`module`]: [`ForthModule`], the exported entry points over linear memory
//! - [`engine`]: outer interpreter, compiler and inner interpreter
//! - [`builtins`]: primitive words
//! - [`dictionary`]: word storage and lookup
//! - [`errors`]: evaluation errors, reported as output text
//!
//! # Execution Model
//!
//! Input is split on whitespace. Each word is looked up in the dictionary and
//! executed (or compiled, inside `:` ... `;`); anything else must parse as a
//! number in the current `base`. Colon definitions compile to a flat
//! instruction list with resolved branch targets, run by an inner loop with
//! an explicit call stack.
//!
//! # Host Words
//!
//! `leds ( u -- )` shows the low 8 bits of `u` on the console's lamp row and
//! `refresh ( -- )` hints that the console may repaint.

mod builtins;
pub mod constants;
pub mod dictionary;
pub mod engine;
pub mod errors;
pub mod module;

pub use module::{ForthLoader, ForthModule};
