//! A scripted module for exercising the console without the Forth engine

use crate::error::ModuleLoadError;
use crate::memory::LinearMemory;
use crate::module::{HostImports, ModuleLoader, ModulePtr, StackMark, VmModule};
use std::rc::Rc;

pub struct ScriptedModule {
    memory: LinearMemory,
    out_len: usize,
    /// Entry points called, in order
    pub calls: Vec<&'static str>,
    /// Texts passed to `evaluate`
    pub inputs: Vec<String>,
    /// Copy evaluated text into the output accumulator
    pub echo: bool,
    pub eval_code: i32,
    pub init_code: i32,
    pub stack_text: String,
    /// Refuse every scratch allocation once a line has been evaluated
    pub starve_after_eval: bool,
    starved: bool,
}

impl ScriptedModule {
    pub fn new(size: usize, scratch: usize) -> Self {
        ScriptedModule {
            memory: LinearMemory::new(size, scratch),
            out_len: 0,
            calls: Vec::new(),
            inputs: Vec::new(),
            echo: false,
            eval_code: -257,
            init_code: 0,
            stack_text: "n = 0".to_string(),
            starve_after_eval: false,
            starved: false,
        }
    }

    fn output_capacity(&self) -> usize {
        self.memory.scratch_limit() as usize
    }

    pub fn append_output(&mut self, text: &str) {
        let room = self.output_capacity().saturating_sub(self.out_len);
        let bytes = &text.as_bytes()[..text.len().min(room)];
        let start = self.out_len;
        self.memory.bytes_mut()[start..start + bytes.len()].copy_from_slice(bytes);
        self.out_len += bytes.len();
    }
}

/// A module that echoes every evaluated line back as output
pub fn echo_module() -> ScriptedModule {
    let mut module = ScriptedModule::new(4096, 1024);
    module.echo = true;
    module
}

impl VmModule for ScriptedModule {
    fn memory(&self) -> &[u8] {
        self.memory.bytes()
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        self.memory.bytes_mut()
    }

    fn stack_save(&self) -> StackMark {
        StackMark(self.memory.scratch_save())
    }

    fn stack_alloc(&mut self, size: usize) -> Option<ModulePtr> {
        if self.starved {
            return None;
        }
        self.memory.scratch_alloc(size)
    }

    fn stack_restore(&mut self, mark: StackMark) {
        self.memory.scratch_restore(mark.0);
    }

    fn stack_available(&self) -> usize {
        self.memory.scratch_available()
    }

    fn init(&mut self, _dict_cells: i32, _stack_cells: i32) -> i32 {
        self.calls.push("init");
        if self.init_code == 0 {
            self.append_output("scripted\n");
        }
        self.init_code
    }

    fn evaluate(&mut self, input: ModulePtr) -> i32 {
        self.calls.push("evaluate");
        let text = self
            .memory
            .read_c_string(input, usize::MAX)
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .unwrap_or_default();
        if self.echo {
            self.append_output(&text);
        }
        self.inputs.push(text);
        self.starved = self.starve_after_eval;
        self.eval_code
    }

    fn output_ptr(&self) -> ModulePtr {
        0
    }

    fn output_len(&self) -> usize {
        self.out_len
    }

    fn clear_output(&mut self) {
        self.calls.push("clear_output");
        self.out_len = 0;
    }

    fn stack_hex_dump(&mut self, buf: ModulePtr, buf_size: usize, _max_cells: usize) -> usize {
        self.calls.push("stack_hex_dump");
        let mut text = self.stack_text.clone().into_bytes();
        text.truncate(buf_size.saturating_sub(1));
        text.push(0);
        let _ = self.memory.write_bytes(buf, &text);
        0
    }

    fn reset(&mut self) {
        self.calls.push("reset");
    }
}

/// Loads an echoing [`ScriptedModule`] configured from its fields
pub struct ScriptedLoader {
    pub scratch: usize,
    pub init_code: i32,
    pub eval_code: i32,
    pub starve_after_eval: bool,
}

impl Default for ScriptedLoader {
    fn default() -> Self {
        ScriptedLoader {
            scratch: 1024,
            init_code: 0,
            eval_code: -257,
            starve_after_eval: false,
        }
    }
}

impl ModuleLoader for ScriptedLoader {
    fn load(&self, _host: Rc<dyn HostImports>) -> Result<Box<dyn VmModule>, ModuleLoadError> {
        let mut module = ScriptedModule::new(4096, self.scratch);
        module.echo = true;
        module.init_code = self.init_code;
        module.eval_code = self.eval_code;
        module.starve_after_eval = self.starve_after_eval;
        Ok(Box::new(module))
    }
}

/// A loader whose module never comes up
pub struct FailingLoader;

impl ModuleLoader for FailingLoader {
    fn load(&self, _host: Rc<dyn HostImports>) -> Result<Box<dyn VmModule>, ModuleLoadError> {
        Err(ModuleLoadError::MemoryTooSmall {
            requested: 0,
            required: 1,
        })
    }
}
