// Execution engine for the embedded Forth module

use super::constants::*;
use super::dictionary::{Dictionary, Instr, WordId, WordKind};
use super::errors::ForthError;
use super::module::Machine;
use crate::memory::{cell_align, Cell, CellStack, CELL_SIZE};
use std::rc::Rc;

/// Open control structure while compiling
#[derive(Debug)]
enum Control {
    If(usize),
    Else(usize),
    Begin(usize),
    While { begin: usize, exit: usize },
    Do {
        body: usize,
        skip: Option<usize>,
        leaves: Vec<usize>,
    },
}

/// A colon definition under construction
#[derive(Debug)]
struct Definition {
    name: String,
    id: WordId,
    code: Vec<Instr>,
    control: Vec<Control>,
}

/// VM state created by `init`
pub struct Vm {
    pub(crate) dict: Dictionary,

    /// Data stack
    pub(crate) data: CellStack,

    /// Return stack (loop parameters and `>r`)
    pub(crate) ret: CellStack,

    /// Next free address in data space
    pub(crate) here: u32,

    /// Definition being compiled; persists across evaluations
    compiling: Option<Definition>,

    /// Input text of the current evaluation
    source: Vec<u8>,

    /// Parse position in `source`
    pos: usize,
}

impl Vm {
    pub fn new(
        dict_cells: usize,
        stack_cells: usize,
        machine: &mut Machine,
    ) -> Result<Self, ForthError> {
        let dict = Dictionary::with_primitives(dict_cells)?;
        machine.set_base(10);
        Ok(Vm {
            dict,
            data: CellStack::new(stack_cells),
            ret: CellStack::new(stack_cells),
            here: BASE_ADDR + CELL_SIZE as u32,
            compiling: None,
            source: Vec::new(),
            pos: 0,
        })
    }

    /// Interpret one piece of text, returning the module status code.
    ///
    /// Errors are printed to the output accumulator and leave the VM as
    /// after `reset`, with any half-built definition discarded.
    pub fn interpret(&mut self, machine: &mut Machine, text: &str) -> i32 {
        self.source = text.as_bytes().to_vec();
        self.pos = 0;

        let result = self.interpret_source(machine);
        self.source.clear();
        self.pos = 0;

        match result {
            Ok(()) => VM_OUTOFTEXT,
            Err(err) => {
                log::debug!("evaluation error: {}", err);
                machine.text_out(err.to_string().as_bytes(), true);
                self.reset(machine);
                VM_ERREXIT
            }
        }
    }

    /// Clear both stacks, leave compile state and return to decimal.
    /// The dictionary and data space are kept.
    pub fn reset(&mut self, machine: &mut Machine) {
        self.ret.clear();
        self.compiling = None;
        self.data.clear();
        machine.set_base(10);
    }

    fn interpret_source(&mut self, machine: &mut Machine) -> Result<(), ForthError> {
        while let Some(token) = self.next_word() {
            self.interpret_word(machine, &token)?;
        }
        Ok(())
    }

    fn interpret_word(&mut self, machine: &mut Machine, token: &str) -> Result<(), ForthError> {
        let name = token.to_ascii_lowercase();
        if self.special_word(machine, &name)? {
            return Ok(());
        }

        if let Some(id) = self.dict.lookup(&name) {
            return match self.compiling.as_mut() {
                Some(def) => {
                    let instr = match &self.dict.word(id).kind {
                        WordKind::Primitive(prim) => Instr::Prim(*prim),
                        _ => Instr::Call(id),
                    };
                    def.code.push(instr);
                    Ok(())
                }
                None => self.execute(machine, id),
            };
        }

        match parse_number(token, machine.base()) {
            Some(n) => match self.compiling.as_mut() {
                Some(def) => {
                    def.code.push(Instr::Lit(n));
                    Ok(())
                }
                None => self.push(n),
            },
            None => Err(ForthError::Undefined(token.to_string())),
        }
    }

    /// Parsing, defining and control words. Returns `false` if `name` is an
    /// ordinary word.
    fn special_word(&mut self, machine: &mut Machine, name: &str) -> Result<bool, ForthError> {
        match name {
            "(" => {
                self.parse_until(b')');
            }
            "\\" => {
                self.parse_until(b'\n');
            }
            ".(" => {
                let text = self
                    .parse_until(b')')
                    .ok_or(ForthError::UnterminatedString(')'))?;
                machine.text_out(&text, false);
            }
            ".\"" => {
                let text = self
                    .parse_until(b'"')
                    .ok_or(ForthError::UnterminatedString('"'))?;
                match self.compiling.as_mut() {
                    Some(def) => {
                        let text: Rc<str> = String::from_utf8_lossy(&text).into();
                        def.code.push(Instr::Print(text));
                    }
                    None => machine.text_out(&text, false),
                }
            }
            ":" => {
                self.interpret_only(name)?;
                let word = self.require_name(name)?;
                self.compiling = Some(Definition {
                    name: word,
                    id: self.dict.next_id(),
                    code: Vec::new(),
                    control: Vec::new(),
                });
            }
            ";" => {
                let def = self
                    .compiling
                    .take()
                    .ok_or_else(|| ForthError::CompileOnly(name.to_string()))?;
                if !def.control.is_empty() {
                    return Err(ForthError::ControlMismatch(name.to_string()));
                }
                self.dict.define(&def.name, WordKind::Colon(def.code.into()))?;
            }
            "variable" => {
                self.interpret_only(name)?;
                let word = self.require_name(name)?;
                let addr = cell_align(self.here as usize) as u32;
                machine.store_cell(addr, 0)?;
                self.here = addr + CELL_SIZE as u32;
                self.dict.define(&word, WordKind::Variable(addr))?;
            }
            "constant" => {
                self.interpret_only(name)?;
                let word = self.require_name(name)?;
                let value = self.pop()?;
                self.dict.define(&word, WordKind::Constant(value))?;
            }
            "if" | "else" | "then" | "begin" | "until" | "again" | "while" | "repeat" | "do"
            | "?do" | "loop" | "+loop" | "leave" | "exit" | "recurse" => {
                let def = self
                    .compiling
                    .as_mut()
                    .ok_or_else(|| ForthError::CompileOnly(name.to_string()))?;
                compile_control(def, name)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn interpret_only(&self, name: &str) -> Result<(), ForthError> {
        if self.compiling.is_some() {
            return Err(ForthError::InterpretOnly(name.to_string()));
        }
        Ok(())
    }

    fn require_name(&mut self, word: &str) -> Result<String, ForthError> {
        self.next_word()
            .ok_or_else(|| ForthError::MissingName(word.to_string()))
    }

    /// Next whitespace-delimited word; the delimiter after it is consumed
    fn next_word(&mut self) -> Option<String> {
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if self.pos >= self.source.len() {
            return None;
        }
        let start = self.pos;
        while self.pos < self.source.len() && !self.source[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        let word = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        if self.pos < self.source.len() {
            self.pos += 1;
        }
        Some(word)
    }

    /// Text up to `delim`, consuming the delimiter. Consumes the rest of the
    /// input and returns `None` if the delimiter never appears.
    fn parse_until(&mut self, delim: u8) -> Option<Vec<u8>> {
        let rest = &self.source[self.pos..];
        match rest.iter().position(|&b| b == delim) {
            Some(end) => {
                let text = rest[..end].to_vec();
                self.pos += end + 1;
                Some(text)
            }
            None => {
                self.pos = self.source.len();
                None
            }
        }
    }

    pub(crate) fn push(&mut self, value: Cell) -> Result<(), ForthError> {
        Ok(self.data.push(value)?)
    }

    pub(crate) fn pop(&mut self) -> Result<Cell, ForthError> {
        Ok(self.data.pop()?)
    }

    pub(crate) fn rpush(&mut self, value: Cell) -> Result<(), ForthError> {
        self.ret
            .push(value)
            .map_err(|_| ForthError::ReturnStackOverflow)
    }

    pub(crate) fn rpop(&mut self) -> Result<Cell, ForthError> {
        self.ret.pop().map_err(|_| ForthError::ReturnStackUnderflow)
    }

    pub(crate) fn rfetch(&self, index: usize) -> Result<Cell, ForthError> {
        self.ret
            .fetch(index)
            .map_err(|_| ForthError::ReturnStackUnderflow)
    }

    /// Run a single word
    fn execute(&mut self, machine: &mut Machine, id: WordId) -> Result<(), ForthError> {
        match self.dict.word(id).kind.clone() {
            WordKind::Primitive(prim) => self.primitive(machine, prim),
            WordKind::Constant(value) => self.push(value),
            WordKind::Variable(addr) => self.push(addr as Cell),
            WordKind::Colon(code) => self.run(machine, code),
        }
    }

    /// Inner interpreter for colon definitions. Nested calls are kept on an
    /// explicit frame stack so deep recursion is an error, not a host crash.
    fn run(&mut self, machine: &mut Machine, body: Rc<[Instr]>) -> Result<(), ForthError> {
        let mut frames: Vec<(Rc<[Instr]>, usize)> = Vec::new();
        let mut code = body;
        let mut ip = 0;

        loop {
            let Some(instr) = code.get(ip).cloned() else {
                match frames.pop() {
                    Some((caller, ret)) => {
                        code = caller;
                        ip = ret;
                        continue;
                    }
                    None => return Ok(()),
                }
            };
            ip += 1;

            match instr {
                Instr::Lit(value) => self.push(value)?,
                Instr::Prim(prim) => self.primitive(machine, prim)?,
                Instr::Call(id) => match &self.dict.word(id).kind {
                    WordKind::Colon(callee) => {
                        if frames.len() >= MAX_CALL_DEPTH {
                            return Err(ForthError::ReturnStackOverflow);
                        }
                        let callee = Rc::clone(callee);
                        frames.push((code, ip));
                        code = callee;
                        ip = 0;
                    }
                    _ => self.execute(machine, id)?,
                },
                Instr::Branch(target) => ip = target,
                Instr::BranchIfZero(target) => {
                    if self.pop()? == 0 {
                        ip = target;
                    }
                }
                Instr::Do => {
                    let start = self.pop()?;
                    let limit = self.pop()?;
                    self.rpush(limit)?;
                    self.rpush(start)?;
                }
                Instr::QDo(target) => {
                    let start = self.pop()?;
                    let limit = self.pop()?;
                    if start == limit {
                        ip = target;
                    } else {
                        self.rpush(limit)?;
                        self.rpush(start)?;
                    }
                }
                Instr::Loop(body) => {
                    let index = self.rpop()?.wrapping_add(1);
                    if index == self.rfetch(0)? {
                        self.rpop()?;
                    } else {
                        self.rpush(index)?;
                        ip = body;
                    }
                }
                Instr::PlusLoop(body) => {
                    let step = self.pop()?;
                    let index = self.rpop()?;
                    let limit = self.rfetch(0)?;
                    let next = index.wrapping_add(step);
                    // Exit when the step crosses the boundary between
                    // limit-1 and limit, in either direction.
                    if (index.wrapping_sub(limit) ^ next.wrapping_sub(limit)) < 0 {
                        self.rpop()?;
                    } else {
                        self.rpush(next)?;
                        ip = body;
                    }
                }
                Instr::Leave(target) => {
                    self.rpop()?;
                    self.rpop()?;
                    ip = target;
                }
                Instr::Exit => ip = code.len(),
                Instr::Print(text) => machine.text_out(text.as_bytes(), false),
            }
        }
    }
}

/// Compile one control word into `def`
fn compile_control(def: &mut Definition, name: &str) -> Result<(), ForthError> {
    let mismatch = || ForthError::ControlMismatch(name.to_string());
    let code = &mut def.code;

    match name {
        "if" => {
            def.control.push(Control::If(code.len()));
            code.push(Instr::BranchIfZero(0));
        }
        "else" => {
            let Some(Control::If(at)) = def.control.pop() else {
                return Err(mismatch());
            };
            def.control.push(Control::Else(code.len()));
            code.push(Instr::Branch(0));
            code[at] = Instr::BranchIfZero(code.len());
        }
        "then" => match def.control.pop() {
            Some(Control::If(at)) => code[at] = Instr::BranchIfZero(code.len()),
            Some(Control::Else(at)) => code[at] = Instr::Branch(code.len()),
            _ => return Err(mismatch()),
        },
        "begin" => def.control.push(Control::Begin(code.len())),
        "until" | "again" => {
            let Some(Control::Begin(begin)) = def.control.pop() else {
                return Err(mismatch());
            };
            code.push(if name == "until" {
                Instr::BranchIfZero(begin)
            } else {
                Instr::Branch(begin)
            });
        }
        "while" => {
            let Some(Control::Begin(begin)) = def.control.pop() else {
                return Err(mismatch());
            };
            def.control.push(Control::While {
                begin,
                exit: code.len(),
            });
            code.push(Instr::BranchIfZero(0));
        }
        "repeat" => {
            let Some(Control::While { begin, exit }) = def.control.pop() else {
                return Err(mismatch());
            };
            code.push(Instr::Branch(begin));
            code[exit] = Instr::BranchIfZero(code.len());
        }
        "do" | "?do" => {
            let skip = if name == "?do" {
                code.push(Instr::QDo(0));
                Some(code.len() - 1)
            } else {
                code.push(Instr::Do);
                None
            };
            def.control.push(Control::Do {
                body: code.len(),
                skip,
                leaves: Vec::new(),
            });
        }
        "loop" | "+loop" => {
            let Some(Control::Do { body, skip, leaves }) = def.control.pop() else {
                return Err(mismatch());
            };
            code.push(if name == "loop" {
                Instr::Loop(body)
            } else {
                Instr::PlusLoop(body)
            });
            let end = code.len();
            if let Some(at) = skip {
                code[at] = Instr::QDo(end);
            }
            for at in leaves {
                code[at] = Instr::Leave(end);
            }
        }
        "leave" => {
            let at = code.len();
            let Some(Control::Do { leaves, .. }) = def
                .control
                .iter_mut()
                .rev()
                .find(|c| matches!(c, Control::Do { .. }))
            else {
                return Err(mismatch());
            };
            leaves.push(at);
            code.push(Instr::Leave(0));
        }
        "exit" => code.push(Instr::Exit),
        "recurse" => code.push(Instr::Call(def.id)),
        _ => return Err(mismatch()),
    }
    Ok(())
}

/// Parse `token` as a signed integer in `base`. Values that fit in 32 bits
/// unsigned wrap into a cell, so `ffffffff` in hex is -1.
pub fn parse_number(token: &str, base: u32) -> Option<Cell> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => (true, rest),
        _ => (false, token),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(base)) {
        return None;
    }
    let magnitude = u64::from_str_radix(digits, base).ok()?;
    if magnitude > u32::MAX as u64 {
        return None;
    }
    let value = magnitude as u32 as Cell;
    Some(if negative {
        value.wrapping_neg()
    } else {
        value
    })
}

/// Format `value` in `base` (2..=36), lowercase digits
pub fn format_unsigned(mut value: u32, base: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        let d = value % base;
        digits.push(std::char::from_digit(d, base).unwrap_or('?'));
        value /= base;
    }
    digits.iter().rev().collect()
}

pub fn format_signed(value: Cell, base: u32) -> String {
    if value < 0 {
        format!("-{}", format_unsigned(value.unsigned_abs(), base))
    } else {
        format_unsigned(value as u32, base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42", 10), Some(42));
        assert_eq!(parse_number("-42", 10), Some(-42));
        assert_eq!(parse_number("ff", 16), Some(255));
        assert_eq!(parse_number("FF", 16), Some(255));
        assert_eq!(parse_number("ffffffff", 16), Some(-1));
        assert_eq!(parse_number("ff", 10), None);
        assert_eq!(parse_number("-", 10), None);
        assert_eq!(parse_number("+5", 10), None);
        assert_eq!(parse_number("99999999999", 10), None);
    }

    #[test]
    fn test_format_numbers() {
        assert_eq!(format_signed(0, 10), "0");
        assert_eq!(format_signed(-15, 10), "-15");
        assert_eq!(format_signed(255, 16), "ff");
        assert_eq!(format_signed(i32::MIN, 10), "-2147483648");
        assert_eq!(format_unsigned(u32::MAX, 16), "ffffffff");
        assert_eq!(format_unsigned(5, 2), "101");
    }
}
