//! Built-in word implementations
//!
//! Every [`Prim`] is executed here. All primitives are methods on [`Vm`] and
//! receive the [`Machine`] so they can reach linear memory, the output
//! accumulator and the host imports.
//!
//! # Implementation Notes
//!
//! - Arithmetic wraps on overflow like 32-bit C arithmetic
//! - Division truncates toward zero; division by zero is an error
//! - Flags are `-1` (true) and `0` (false)
//! - `leds` and `refresh` call back into the host

use super::constants::*;
use super::dictionary::Prim;
use super::engine::{format_signed, format_unsigned, Vm};
use super::errors::ForthError;
use super::module::Machine;
use crate::memory::{cell_align, Cell, MemoryError, CELL_SIZE};

fn flag(b: bool) -> Cell {
    if b {
        -1
    } else {
        0
    }
}

impl Vm {
    pub(crate) fn primitive(&mut self, machine: &mut Machine, prim: Prim) -> Result<(), ForthError> {
        match prim {
            Prim::Add => self.binary(|a, b| Ok(a.wrapping_add(b)))?,
            Prim::Sub => self.binary(|a, b| Ok(a.wrapping_sub(b)))?,
            Prim::Mul => self.binary(|a, b| Ok(a.wrapping_mul(b)))?,
            Prim::Div => self.binary(|a, b| {
                if b == 0 {
                    Err(ForthError::DivisionByZero)
                } else {
                    Ok(a.wrapping_div(b))
                }
            })?,
            Prim::Mod => self.binary(|a, b| {
                if b == 0 {
                    Err(ForthError::DivisionByZero)
                } else {
                    Ok(a.wrapping_rem(b))
                }
            })?,
            Prim::DivMod => {
                self.data.require(2)?;
                let b = self.pop()?;
                let a = self.pop()?;
                if b == 0 {
                    return Err(ForthError::DivisionByZero);
                }
                self.push(a.wrapping_rem(b))?;
                self.push(a.wrapping_div(b))?;
            }
            Prim::Negate => self.unary(|a| a.wrapping_neg())?,
            Prim::Abs => self.unary(|a| a.wrapping_abs())?,
            Prim::Min => self.binary(|a, b| Ok(a.min(b)))?,
            Prim::Max => self.binary(|a, b| Ok(a.max(b)))?,
            Prim::OnePlus => self.unary(|a| a.wrapping_add(1))?,
            Prim::OneMinus => self.unary(|a| a.wrapping_sub(1))?,
            Prim::TwoStar => self.unary(|a| a.wrapping_shl(1))?,
            Prim::TwoSlash => self.unary(|a| a >> 1)?,
            Prim::And => self.binary(|a, b| Ok(a & b))?,
            Prim::Or => self.binary(|a, b| Ok(a | b))?,
            Prim::Xor => self.binary(|a, b| Ok(a ^ b))?,
            Prim::Invert => self.unary(|a| !a)?,
            Prim::Lshift => self.binary(|a, b| {
                Ok((a as u32).checked_shl(b as u32).unwrap_or(0) as Cell)
            })?,
            Prim::Rshift => self.binary(|a, b| {
                Ok((a as u32).checked_shr(b as u32).unwrap_or(0) as Cell)
            })?,
            Prim::Eq => self.binary(|a, b| Ok(flag(a == b)))?,
            Prim::NotEq => self.binary(|a, b| Ok(flag(a != b)))?,
            Prim::Less => self.binary(|a, b| Ok(flag(a < b)))?,
            Prim::Greater => self.binary(|a, b| Ok(flag(a > b)))?,
            Prim::ZeroEq => self.unary(|a| flag(a == 0))?,
            Prim::ZeroLess => self.unary(|a| flag(a < 0))?,
            Prim::ULess => self.binary(|a, b| Ok(flag((a as u32) < (b as u32))))?,

            Prim::Dup => {
                let a = self.data.fetch(0)?;
                self.push(a)?;
            }
            Prim::Drop => {
                self.pop()?;
            }
            Prim::Swap => {
                self.data.require(2)?;
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(b)?;
                self.push(a)?;
            }
            Prim::Over => {
                let a = self.data.fetch(1)?;
                self.push(a)?;
            }
            Prim::Rot => {
                self.data.require(3)?;
                let c = self.pop()?;
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(b)?;
                self.push(c)?;
                self.push(a)?;
            }
            Prim::Nip => {
                self.data.require(2)?;
                let b = self.pop()?;
                self.pop()?;
                self.push(b)?;
            }
            Prim::Tuck => {
                self.data.require(2)?;
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(b)?;
                self.push(a)?;
                self.push(b)?;
            }
            Prim::QDup => {
                let a = self.data.fetch(0)?;
                if a != 0 {
                    self.push(a)?;
                }
            }
            Prim::TwoDup => {
                let b = self.data.fetch(0)?;
                let a = self.data.fetch(1)?;
                self.push(a)?;
                self.push(b)?;
            }
            Prim::TwoDrop => {
                self.data.require(2)?;
                self.pop()?;
                self.pop()?;
            }
            Prim::Depth => {
                let depth = self.data.depth() as Cell;
                self.push(depth)?;
            }
            Prim::Clear => self.data.clear(),
            Prim::ToR => {
                let a = self.pop()?;
                self.rpush(a)?;
            }
            Prim::RFrom => {
                let a = self.rpop()?;
                self.push(a)?;
            }
            Prim::RFetch | Prim::I => {
                let a = self.rfetch(0)?;
                self.push(a)?;
            }
            Prim::J => {
                let a = self.rfetch(2)?;
                self.push(a)?;
            }

            Prim::Dot => {
                let a = self.pop()?;
                let text = format!("{} ", format_signed(a, machine.base()));
                machine.text_out(text.as_bytes(), false);
            }
            Prim::UDot => {
                let a = self.pop()?;
                let text = format!("{} ", format_unsigned(a as u32, machine.base()));
                machine.text_out(text.as_bytes(), false);
            }
            Prim::DotS => {
                let base = machine.base();
                let mut text = format!("<{}> ", self.data.depth());
                for cell in self.data.cells() {
                    text.push_str(&format_signed(*cell, base));
                    text.push(' ');
                }
                machine.text_out(text.as_bytes(), false);
            }
            Prim::Cr => machine.text_out(b"", true),
            Prim::Emit => {
                let a = self.pop()?;
                machine.text_out(&[a as u8], false);
            }
            Prim::Space => machine.text_out(b" ", false),
            Prim::Spaces => {
                let n = self.pop()?.max(0) as usize;
                machine.text_out(" ".repeat(n.min(OUTPUT_CAPACITY)).as_bytes(), false);
            }
            Prim::Type => {
                self.data.require(2)?;
                let len = self.pop()?.max(0) as usize;
                let addr = self.pop()? as u32;
                let bytes = machine.memory.read_bytes(addr, len)?.to_vec();
                machine.text_out(&bytes, false);
            }

            Prim::Hex => machine.set_base(16),
            Prim::Decimal => machine.set_base(10),
            Prim::Base => self.push(BASE_ADDR as Cell)?,

            Prim::Store => {
                self.data.require(2)?;
                let addr = self.pop()? as u32;
                let value = self.pop()?;
                machine.store_cell(addr, value)?;
            }
            Prim::Fetch => {
                let addr = self.pop()? as u32;
                let value = machine.memory.read_cell(addr)?;
                self.push(value)?;
            }
            Prim::PlusStore => {
                self.data.require(2)?;
                let addr = self.pop()? as u32;
                let n = self.pop()?;
                let value = machine.memory.read_cell(addr)?.wrapping_add(n);
                machine.store_cell(addr, value)?;
            }
            Prim::CStore => {
                self.data.require(2)?;
                let addr = self.pop()? as u32;
                let value = self.pop()?;
                machine.store_byte(addr, value as u8)?;
            }
            Prim::CFetch => {
                let addr = self.pop()? as u32;
                let value = machine.memory.read_byte(addr)?;
                self.push(value as Cell)?;
            }
            Prim::Here => self.push(self.here as Cell)?,
            Prim::Allot => {
                let n = self.pop()? as i64;
                let next = self.here as i64 + n;
                let limit = machine.memory.scratch_limit() as i64;
                if next < (BASE_ADDR + CELL_SIZE as u32) as i64 || next > limit {
                    return Err(MemoryError::DataSpaceFull.into());
                }
                self.here = next as u32;
            }
            Prim::Comma => {
                let value = self.pop()?;
                let addr = cell_align(self.here as usize) as u32;
                machine.store_cell(addr, value)?;
                self.here = addr + CELL_SIZE as u32;
            }
            Prim::Cells => self.unary(|a| a.wrapping_mul(CELL_SIZE as Cell))?,

            Prim::Words => {
                let names = self.dict.visible_names().join(" ");
                machine.text_out(names.as_bytes(), true);
            }
            Prim::Ver => machine.text_out(VERSION_BANNER.as_bytes(), false),
            Prim::Leds => {
                let value = self.pop()?;
                machine.host.set_lamps(value as u32);
            }
            Prim::Refresh => machine.host.request_refresh(),
        }
        Ok(())
    }

    fn unary(&mut self, op: impl FnOnce(Cell) -> Cell) -> Result<(), ForthError> {
        let a = self.pop()?;
        self.push(op(a))
    }

    /// ( a b -- op(a, b) ); nothing is consumed on underflow or error
    fn binary(
        &mut self,
        op: impl FnOnce(Cell, Cell) -> Result<Cell, ForthError>,
    ) -> Result<(), ForthError> {
        let b = self.data.fetch(0)?;
        let a = self.data.fetch(1)?;
        let result = op(a, b)?;
        self.pop()?;
        self.pop()?;
        self.push(result)
    }
}
