//! Bounded cell stacks
//!
//! The Forth module keeps its data stack and return stack outside linear
//! memory, as plain vectors with a fixed capacity. Overflow and underflow are
//! reported as [`StackFault`]s and turned into error output by the
//! interpreter.

/// A single stack cell
pub type Cell = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackFault {
    Overflow,
    Underflow,
}

#[derive(Debug, Clone)]
pub struct CellStack {
    cells: Vec<Cell>,
    capacity: usize,
}

impl CellStack {
    pub fn new(capacity: usize) -> Self {
        CellStack {
            cells: Vec::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, value: Cell) -> Result<(), StackFault> {
        if self.cells.len() >= self.capacity {
            return Err(StackFault::Overflow);
        }
        self.cells.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Cell, StackFault> {
        self.cells.pop().ok_or(StackFault::Underflow)
    }

    /// Cell `index` positions below the top (0 = top)
    pub fn fetch(&self, index: usize) -> Result<Cell, StackFault> {
        self.cells
            .len()
            .checked_sub(index + 1)
            .map(|i| self.cells[i])
            .ok_or(StackFault::Underflow)
    }

    /// Fail unless at least `n` cells are present
    pub fn require(&self, n: usize) -> Result<(), StackFault> {
        if self.cells.len() < n {
            Err(StackFault::Underflow)
        } else {
            Ok(())
        }
    }

    pub fn depth(&self) -> usize {
        self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Cells from bottom to top
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
