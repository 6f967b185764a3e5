//! The call boundary between the console and the VM module
//!
//! A module owns a flat linear memory addressed by 32-bit offsets. The host
//! never holds references into it; it only passes [`ModulePtr`] offsets to the
//! module's entry points and copies bytes in and out of [`VmModule::memory`].
//!
//! # Entry points
//!
//! | Entry point        | Effect                                                  |
//! |--------------------|---------------------------------------------------------|
//! | `init`             | build VM state, may write a banner to the accumulator   |
//! | `evaluate`         | run NUL-terminated text at a pointer, returns a code    |
//! | `output_ptr/len`   | location of the output accumulator contents            |
//! | `clear_output`     | empty the accumulator                                   |
//! | `stack_hex_dump`   | write a NUL-terminated hex dump into a caller buffer    |
//! | `reset`            | return VM state to its post-init condition              |
//!
//! Transient memory is managed the same way a C module's shadow stack is:
//! save a mark, allocate, and restore the mark when done. The
//! [`bridge`](crate::console::bridge) module is the only code that does this.

use crate::error::ModuleLoadError;
use std::rc::Rc;

/// Offset into module linear memory
pub type ModulePtr = u32;

/// Codes returned by [`VmModule::evaluate`]
pub mod status {
    /// The input was consumed to the end
    pub const OUT_OF_TEXT: i32 = -257;

    /// Evaluation stopped on an error; the message is in the output
    pub const ERROR_EXIT: i32 = -260;
}

/// Saved position of the module's scratch stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackMark(pub u32);

/// The exported surface of a VM module.
pub trait VmModule {
    /// Whole linear memory, read-only
    fn memory(&self) -> &[u8];

    /// Whole linear memory, writable
    fn memory_mut(&mut self) -> &mut [u8];

    /// Current scratch stack position
    fn stack_save(&self) -> StackMark;

    /// Reserve `size` bytes of scratch memory, `None` when exhausted
    fn stack_alloc(&mut self, size: usize) -> Option<ModulePtr>;

    /// Release everything allocated since `mark`
    fn stack_restore(&mut self, mark: StackMark);

    /// Bytes still available to `stack_alloc`
    fn stack_available(&self) -> usize;

    fn init(&mut self, dict_cells: i32, stack_cells: i32) -> i32;

    fn evaluate(&mut self, input: ModulePtr) -> i32;

    fn output_ptr(&self) -> ModulePtr;

    fn output_len(&self) -> usize;

    fn clear_output(&mut self);

    /// Write the data stack dump into `buf`; returns the number of cells shown
    fn stack_hex_dump(&mut self, buf: ModulePtr, buf_size: usize, max_cells: usize) -> usize;

    fn reset(&mut self);
}

/// Functions the host exports to the module.
///
/// Both are side-effecting and must not block. They take `&self` because the
/// module calls them while the host is itself inside a module call.
pub trait HostImports {
    /// Show the low 8 bits of `value` on the lamp row
    fn set_lamps(&self, value: u32);

    /// Hint that the host may repaint now
    fn request_refresh(&self);
}

/// Something that can bring a module up.
pub trait ModuleLoader {
    fn load(&self, host: Rc<dyn HostImports>) -> Result<Box<dyn VmModule>, ModuleLoadError>;
}
