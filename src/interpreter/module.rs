//! Exported entry points of the embedded Forth module
//!
//! [`ForthModule`] is what the console loads. It keeps its whole observable
//! state in a [`LinearMemory`] and exposes it only through [`VmModule`]:
//! the host hands in offsets, the module reads and writes its own memory.
//!
//! [`Machine`] is the part of the module an evaluation can touch besides the
//! VM state itself: linear memory, the output accumulator and the host
//! imports.

use super::constants::*;
use super::engine::Vm;
use super::errors::ForthError;
use crate::error::ModuleLoadError;
use crate::memory::{LinearMemory, MemoryError, CELL_SIZE};
use crate::module::{HostImports, ModuleLoader, ModulePtr, StackMark, VmModule};
use std::rc::Rc;

/// Default data/return stack depth when `init` is given a non-positive size
pub const DEFAULT_STACK_CELLS: usize = 256;

pub struct Machine {
    pub memory: LinearMemory,
    out_len: usize,
    pub host: Rc<dyn HostImports>,
}

impl Machine {
    fn new(memory: LinearMemory, host: Rc<dyn HostImports>) -> Self {
        Machine {
            memory,
            out_len: 0,
            host,
        }
    }

    /// Append to the output accumulator.
    ///
    /// Text past `OUTPUT_CAPACITY - 1` bytes is dropped, the newline is only
    /// added if it fits, and the contents stay NUL-terminated.
    pub fn text_out(&mut self, msg: &[u8], newline: bool) {
        let out = &mut self.memory.bytes_mut()[..OUTPUT_CAPACITY];
        for &b in msg.iter().take_while(|&&b| b != 0) {
            if self.out_len >= OUTPUT_CAPACITY - 1 {
                break;
            }
            out[self.out_len] = b;
            self.out_len += 1;
        }
        if newline && self.out_len + 1 < OUTPUT_CAPACITY {
            out[self.out_len] = b'\n';
            self.out_len += 1;
        }
        out[self.out_len] = 0;
    }

    pub fn clear_output(&mut self) {
        self.out_len = 0;
        self.memory.bytes_mut()[0] = 0;
    }

    pub fn output_len(&self) -> usize {
        self.out_len
    }

    /// Programs may only write into data space
    fn check_writable(&self, address: u32, len: usize) -> Result<(), MemoryError> {
        let end = address as usize + len;
        if address < DATA_START || end > self.memory.scratch_limit() as usize {
            return Err(MemoryError::OutOfBounds { address, len });
        }
        Ok(())
    }

    pub fn store_cell(&mut self, address: u32, value: i32) -> Result<(), MemoryError> {
        self.check_writable(address, CELL_SIZE)?;
        self.memory.write_cell(address, value)
    }

    pub fn store_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        self.check_writable(address, 1)?;
        self.memory.write_byte(address, value)
    }

    /// Current number base, falling back to decimal if `base` holds garbage
    pub fn base(&self) -> u32 {
        match self.memory.read_cell(BASE_ADDR) {
            Ok(b @ 2..=36) => b as u32,
            _ => 10,
        }
    }

    pub fn set_base(&mut self, base: u32) {
        // BASE_ADDR is inside data space by construction
        let _ = self.store_cell(BASE_ADDR, base as i32);
    }
}

pub struct ForthModule {
    machine: Machine,
    vm: Option<Vm>,
}

impl ForthModule {
    /// Bytes of linear memory the fixed layout needs
    pub const MIN_MEMORY_BYTES: usize = OUTPUT_CAPACITY + MIN_DATA_SPACE + SCRATCH_SIZE;

    /// Create a module with `memory_bytes` of linear memory.
    pub fn instantiate(
        memory_bytes: usize,
        host: Rc<dyn HostImports>,
    ) -> Result<Self, ModuleLoadError> {
        if memory_bytes < Self::MIN_MEMORY_BYTES || memory_bytes > u32::MAX as usize {
            return Err(ModuleLoadError::MemoryTooSmall {
                requested: memory_bytes,
                required: Self::MIN_MEMORY_BYTES,
            });
        }
        let memory = LinearMemory::new(memory_bytes, SCRATCH_SIZE);
        log::debug!(
            "instantiated module: {} bytes, data space 0x{:x}..0x{:x}",
            memory_bytes,
            DATA_START,
            memory.scratch_limit()
        );
        Ok(ForthModule {
            machine: Machine::new(memory, host),
            vm: None,
        })
    }

    fn interpret(&mut self, text: &str) -> i32 {
        match self.vm.as_mut() {
            Some(vm) => vm.interpret(&mut self.machine, text),
            None => VM_ERREXIT,
        }
    }
}

impl VmModule for ForthModule {
    fn memory(&self) -> &[u8] {
        self.machine.memory.bytes()
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        self.machine.memory.bytes_mut()
    }

    fn stack_save(&self) -> StackMark {
        StackMark(self.machine.memory.scratch_save())
    }

    fn stack_alloc(&mut self, size: usize) -> Option<ModulePtr> {
        self.machine.memory.scratch_alloc(size)
    }

    fn stack_restore(&mut self, mark: StackMark) {
        self.machine.memory.scratch_restore(mark.0);
    }

    fn stack_available(&self) -> usize {
        self.machine.memory.scratch_available()
    }

    fn init(&mut self, dict_cells: i32, stack_cells: i32) -> i32 {
        if self.vm.is_some() {
            return 0;
        }
        if dict_cells <= 0 {
            return -1;
        }
        let stack_cells = if stack_cells > 0 {
            stack_cells as usize
        } else {
            DEFAULT_STACK_CELLS
        };

        match Vm::new(dict_cells as usize, stack_cells, &mut self.machine) {
            Ok(vm) => self.vm = Some(vm),
            Err(ForthError::DictionaryFull) => {
                log::warn!("module init failed: dictionary of {} cells too small", dict_cells);
                return -1;
            }
            Err(err) => {
                log::warn!("module init failed: {}", err);
                return -2;
            }
        }

        self.machine.clear_output();
        self.interpret(".ver cr");
        0
    }

    fn evaluate(&mut self, input: ModulePtr) -> i32 {
        if self.vm.is_none() {
            return VM_ERREXIT;
        }
        let text = match self.machine.memory.read_c_string(input, usize::MAX) {
            Ok(raw) => String::from_utf8_lossy(raw).into_owned(),
            Err(_) => return VM_ERREXIT,
        };
        self.interpret(&text)
    }

    fn output_ptr(&self) -> ModulePtr {
        0
    }

    fn output_len(&self) -> usize {
        self.machine.output_len()
    }

    fn clear_output(&mut self) {
        self.machine.clear_output();
    }

    fn stack_hex_dump(&mut self, buf: ModulePtr, buf_size: usize, max_cells: usize) -> usize {
        if buf_size == 0 || self.machine.memory.read_bytes(buf, buf_size).is_err() {
            return 0;
        }
        let Some(vm) = self.vm.as_ref() else {
            let _ = self.machine.memory.write_byte(buf, 0);
            return 0;
        };

        let depth = vm.data.depth();
        let count = if max_cells > 0 && max_cells < depth {
            max_cells
        } else {
            depth
        };

        // Same truncation as snprintf: a piece that does not fit is cut
        // short and ends the dump.
        let limit = buf_size - 1;
        let mut text = Vec::with_capacity(buf_size);
        let mut push = |piece: String| -> bool {
            let room = limit - text.len();
            if piece.len() > room {
                text.extend_from_slice(&piece.as_bytes()[..room]);
                return false;
            }
            text.extend_from_slice(piece.as_bytes());
            true
        };
        if push(format!("n = {}", depth)) {
            for cell in vm.data.cells().iter().rev().take(count) {
                if !push(format!("\n0x{:x}", *cell as u32)) {
                    break;
                }
            }
        }
        text.push(0);
        let _ = self.machine.memory.write_bytes(buf, &text);
        count
    }

    fn reset(&mut self) {
        if let Some(vm) = self.vm.as_mut() {
            vm.reset(&mut self.machine);
        }
    }
}

/// Loads [`ForthModule`]s with a fixed memory size.
#[derive(Debug, Clone, Copy)]
pub struct ForthLoader {
    pub memory_bytes: usize,
}

impl Default for ForthLoader {
    fn default() -> Self {
        ForthLoader {
            memory_bytes: DEFAULT_MEMORY_BYTES,
        }
    }
}

impl ModuleLoader for ForthLoader {
    fn load(&self, host: Rc<dyn HostImports>) -> Result<Box<dyn VmModule>, ModuleLoadError> {
        Ok(Box::new(ForthModule::instantiate(self.memory_bytes, host)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct NullHost {
        lamps: Cell<u32>,
    }

    impl HostImports for NullHost {
        fn set_lamps(&self, value: u32) {
            self.lamps.set(value);
        }
        fn request_refresh(&self) {}
    }

    fn module() -> ForthModule {
        ForthModule::instantiate(DEFAULT_MEMORY_BYTES, Rc::new(NullHost::default())).unwrap()
    }

    fn output(m: &ForthModule) -> String {
        let ptr = m.output_ptr() as usize;
        String::from_utf8_lossy(&m.memory()[ptr..ptr + m.output_len()]).into_owned()
    }

    #[test]
    fn test_instantiate_rejects_small_memory() {
        let result = ForthModule::instantiate(1024, Rc::new(NullHost::default()));
        assert!(matches!(
            result,
            Err(ModuleLoadError::MemoryTooSmall { requested: 1024, .. })
        ));
    }

    #[test]
    fn test_init_writes_banner_and_is_idempotent() {
        let mut m = module();
        assert_eq!(m.init(20000, 256), 0);
        assert_eq!(output(&m), format!("{}\n", VERSION_BANNER));
        m.clear_output();
        assert_eq!(m.init(20000, 256), 0);
        assert_eq!(m.output_len(), 0);
    }

    #[test]
    fn test_init_rejects_bad_sizes() {
        assert_eq!(module().init(0, 256), -1);
        let mut m = module();
        assert_eq!(m.init(5, 256), -1);
        assert_eq!(m.evaluate(DATA_START), VM_ERREXIT);
    }

    #[test]
    fn test_evaluate_before_init_fails() {
        let mut m = module();
        assert_eq!(m.evaluate(DATA_START), VM_ERREXIT);
    }

    #[test]
    fn test_text_out_truncates_and_terminates() {
        let mut m = module();
        let long = vec![b'a'; OUTPUT_CAPACITY + 10];
        m.machine.text_out(&long, true);
        assert_eq!(m.output_len(), OUTPUT_CAPACITY - 1);
        assert_eq!(m.memory()[OUTPUT_CAPACITY - 1], 0);
        assert!(!output(&m).contains('\n'));
    }

    #[test]
    fn test_stack_hex_dump_format_and_truncation() {
        let mut m = module();
        m.init(20000, 256);
        if let Some(vm) = m.vm.as_mut() {
            for v in [1, -1, 255] {
                vm.data.push(v).unwrap();
            }
        }
        let buf = DATA_START + 1024;
        assert_eq!(m.stack_hex_dump(buf, 256, 8), 3);
        let text = m.machine.memory.read_c_string(buf, 256).unwrap().to_vec();
        assert_eq!(text, b"n = 3\n0xff\n0xffffffff\n0x1");

        assert_eq!(m.stack_hex_dump(buf, 256, 2), 2);
        let text = m.machine.memory.read_c_string(buf, 256).unwrap().to_vec();
        assert_eq!(text, b"n = 3\n0xff\n0xffffffff");

        m.stack_hex_dump(buf, 10, 8);
        let text = m.machine.memory.read_c_string(buf, 256).unwrap().to_vec();
        assert_eq!(text, b"n = 3\n0xf");
    }

    #[test]
    fn test_program_cannot_write_outside_data_space() {
        let mut m = module();
        assert!(m.machine.store_cell(0, 1).is_err());
        assert!(m.machine.store_cell(DATA_START, 1).is_ok());
        let limit = m.machine.memory.scratch_limit();
        assert!(m.machine.store_cell(limit - 2, 1).is_err());
    }
}
