//! Transient buffers in module memory
//!
//! Every host-to-module text transfer goes through [`with_transient_buffer`]:
//! it saves the module's scratch stack, allocates, runs the caller's closure
//! and restores the stack when the [`TransientBuffer`] guard drops. Because
//! the restore lives in `Drop`, it also runs when the closure returns early or
//! a module call panics and unwinds.
//!
//! The guard dereferences to the module so entry points can be called while
//! the buffer is alive. The buffer address is only meaningful inside the
//! closure; after release the region belongs to the module again.

use crate::error::AllocationError;
use crate::module::{ModulePtr, StackMark, VmModule};
use std::ops::{Deref, DerefMut};

/// A region of module memory owned for the duration of one call
pub struct TransientBuffer<'m, M: VmModule + ?Sized> {
    module: &'m mut M,
    mark: StackMark,
    ptr: ModulePtr,
    size: usize,
}

impl<M: VmModule + ?Sized> TransientBuffer<'_, M> {
    pub fn ptr(&self) -> ModulePtr {
        self.ptr
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Copy `data` into the buffer, truncated to its size
    pub fn write(&mut self, data: &[u8]) {
        let start = self.ptr as usize;
        let len = data.len().min(self.size);
        self.module.memory_mut()[start..start + len].copy_from_slice(&data[..len]);
    }

    /// NUL-terminated text the callee left in the buffer
    pub fn read_c_string(&self) -> String {
        read_c_string(&*self.module, self.ptr, self.size)
    }
}

impl<M: VmModule + ?Sized> Deref for TransientBuffer<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        &*self.module
    }
}

impl<M: VmModule + ?Sized> DerefMut for TransientBuffer<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut *self.module
    }
}

impl<M: VmModule + ?Sized> Drop for TransientBuffer<'_, M> {
    fn drop(&mut self) {
        self.module.stack_restore(self.mark);
    }
}

/// Acquire `size` bytes of module memory for the duration of `f`.
///
/// On allocation failure nothing is read or written and the scratch stack is
/// left as it was.
pub fn with_transient_buffer<M, T, F>(
    module: &mut M,
    size: usize,
    f: F,
) -> Result<T, AllocationError>
where
    M: VmModule + ?Sized,
    F: FnOnce(&mut TransientBuffer<'_, M>) -> T,
{
    let mark = module.stack_save();
    let Some(ptr) = module.stack_alloc(size) else {
        let available = module.stack_available();
        module.stack_restore(mark);
        log::warn!(
            "transient buffer of {} bytes not available ({} free)",
            size,
            available
        );
        return Err(AllocationError {
            requested: size,
            available,
        });
    };

    let mut buffer = TransientBuffer {
        module,
        mark,
        ptr,
        size,
    };
    Ok(f(&mut buffer))
}

/// Marshal `text` into module memory as a NUL-terminated string and run `f`
/// with its address.
///
/// The allocation is sized in bytes, not characters, plus the terminator.
pub fn with_input_text<M, T, F>(module: &mut M, text: &str, f: F) -> Result<T, AllocationError>
where
    M: VmModule + ?Sized,
    F: FnOnce(&mut TransientBuffer<'_, M>, ModulePtr) -> T,
{
    let size = text.len() + 1;
    with_transient_buffer(module, size, |buffer| {
        let mut bytes = Vec::with_capacity(size);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(0);
        buffer.write(&bytes);
        let ptr = buffer.ptr();
        f(buffer, ptr)
    })
}

/// Copy `len` bytes out of module memory. Out-of-range parts are dropped.
pub fn read_bytes<M: VmModule + ?Sized>(module: &M, ptr: ModulePtr, len: usize) -> String {
    let memory = module.memory();
    let start = (ptr as usize).min(memory.len());
    let end = start.saturating_add(len).min(memory.len());
    String::from_utf8_lossy(&memory[start..end]).into_owned()
}

/// Copy a NUL-terminated string of at most `max` bytes out of module memory
pub fn read_c_string<M: VmModule + ?Sized>(module: &M, ptr: ModulePtr, max: usize) -> String {
    let memory = module.memory();
    let start = (ptr as usize).min(memory.len());
    let end = start.saturating_add(max).min(memory.len());
    let raw = &memory[start..end];
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..len]).into_owned()
}
