//! Memory model of the embedded module
//!
//! This module provides the storage the Forth module runs on:
//! - [`linear`]: the flat, byte-addressed linear memory the host can see, with a
//!   downward-growing scratch stack for transient buffers
//! - [`stack`]: bounded cell stacks used for the data and return stacks
//!
//! # Cells
//!
//! A cell is a 32-bit signed integer stored little-endian in linear memory.
//! Addresses are 32-bit offsets from the start of linear memory, so a cell can
//! always hold an address.
//!
//! # Layout
//!
//! ```text
//! 0x0000            output accumulator (OUTPUT_CAPACITY bytes)
//! OUTPUT_CAPACITY   data space (variables, `allot`, `,`), grows up
//! ...
//! len - SCRATCH     scratch stack limit
//! len               scratch stack base, grows down
//! ```

pub mod linear;
pub mod stack;

use thiserror::Error;

pub use linear::LinearMemory;
pub use stack::{Cell, CellStack};

/// Size in bytes of one cell
pub const CELL_SIZE: usize = 4;

/// Errors raised by memory accesses inside the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("invalid address 0x{address:x} (+{len})")]
    OutOfBounds { address: u32, len: usize },

    #[error("data space exhausted")]
    DataSpaceFull,
}

/// Round `n` up to the next multiple of the cell size
pub fn cell_align(n: usize) -> usize {
    (n + CELL_SIZE - 1) & !(CELL_SIZE - 1)
}
