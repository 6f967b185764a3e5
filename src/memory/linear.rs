//! Flat linear memory with a scratch stack
//!
//! [`LinearMemory`] is the only memory the host can reach. All accessors
//! bounds-check and return [`MemoryError::OutOfBounds`] instead of panicking,
//! so a stale or forged offset can never touch anything outside the region.

use super::{MemoryError, CELL_SIZE};

/// Scratch allocations are aligned like a C shadow stack
const SCRATCH_ALIGN: u32 = 16;

#[derive(Debug, Clone)]
pub struct LinearMemory {
    bytes: Vec<u8>,
    /// Lowest address the scratch stack may reach
    scratch_limit: u32,
    /// Current top of the scratch stack
    scratch_ptr: u32,
}

impl LinearMemory {
    /// Create `size` zeroed bytes, reserving the top `scratch_size` bytes for
    /// transient allocations.
    pub fn new(size: usize, scratch_size: usize) -> Self {
        let size = size.min(u32::MAX as usize);
        let top = size as u32;
        LinearMemory {
            bytes: vec![0; size],
            scratch_limit: top.saturating_sub(scratch_size as u32),
            scratch_ptr: top,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// First address of the scratch region; data space must stay below it
    pub fn scratch_limit(&self) -> u32 {
        self.scratch_limit
    }

    fn range(&self, address: u32, len: usize) -> Result<std::ops::Range<usize>, MemoryError> {
        let start = address as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(start..end),
            _ => Err(MemoryError::OutOfBounds { address, len }),
        }
    }

    /// Read bytes from memory
    pub fn read_bytes(&self, address: u32, len: usize) -> Result<&[u8], MemoryError> {
        let range = self.range(address, len)?;
        Ok(&self.bytes[range])
    }

    /// Write bytes into memory
    pub fn write_bytes(&mut self, address: u32, data: &[u8]) -> Result<(), MemoryError> {
        let range = self.range(address, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    pub fn read_byte(&self, address: u32) -> Result<u8, MemoryError> {
        Ok(self.read_bytes(address, 1)?[0])
    }

    pub fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        self.write_bytes(address, &[value])
    }

    pub fn read_cell(&self, address: u32) -> Result<i32, MemoryError> {
        let raw = self.read_bytes(address, CELL_SIZE)?;
        Ok(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn write_cell(&mut self, address: u32, value: i32) -> Result<(), MemoryError> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    /// Bytes from `address` up to (not including) the first NUL, at most `max`
    pub fn read_c_string(&self, address: u32, max: usize) -> Result<&[u8], MemoryError> {
        let available = self.bytes.len().saturating_sub(address as usize).min(max);
        let raw = self.read_bytes(address, available)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(&raw[..end])
    }

    /// Current scratch stack position
    pub fn scratch_save(&self) -> u32 {
        self.scratch_ptr
    }

    /// Allocate `size` bytes from the scratch stack
    pub fn scratch_alloc(&mut self, size: usize) -> Option<u32> {
        let size = u32::try_from(size).ok()?;
        let ptr = self.scratch_ptr.checked_sub(size)? & !(SCRATCH_ALIGN - 1);
        if ptr < self.scratch_limit {
            return None;
        }
        self.scratch_ptr = ptr;
        Some(ptr)
    }

    /// Release scratch allocations made after `mark`
    pub fn scratch_restore(&mut self, mark: u32) {
        // Marks outside the scratch region can only come from a confused caller
        self.scratch_ptr = mark.clamp(self.scratch_limit, self.bytes.len() as u32);
    }

    pub fn scratch_available(&self) -> usize {
        (self.scratch_ptr - self.scratch_limit) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_are_little_endian() {
        let mut mem = LinearMemory::new(64, 16);
        mem.write_cell(8, 0x0102_0304).unwrap();
        assert_eq!(mem.read_bytes(8, 4).unwrap(), &[4, 3, 2, 1]);
        assert_eq!(mem.read_cell(8).unwrap(), 0x0102_0304);
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let mut mem = LinearMemory::new(64, 16);
        assert!(matches!(
            mem.read_cell(62),
            Err(MemoryError::OutOfBounds { address: 62, len: 4 })
        ));
        assert!(mem.write_bytes(u32::MAX, &[1]).is_err());
    }

    #[test]
    fn test_read_c_string_stops_at_nul() {
        let mut mem = LinearMemory::new(64, 16);
        mem.write_bytes(0, b"abc\0def").unwrap();
        assert_eq!(mem.read_c_string(0, 64).unwrap(), b"abc");
        assert_eq!(mem.read_c_string(0, 2).unwrap(), b"ab");
        assert_eq!(mem.read_c_string(4, 3).unwrap(), b"def");
    }

    #[test]
    fn test_scratch_alloc_and_restore() {
        let mut mem = LinearMemory::new(1024, 256);
        let mark = mem.scratch_save();
        assert_eq!(mark, 1024);

        let a = mem.scratch_alloc(10).unwrap();
        assert_eq!(a % 16, 0);
        assert!(a >= 768 && a < 1024);
        let b = mem.scratch_alloc(20).unwrap();
        assert!(b < a);

        mem.scratch_restore(mark);
        assert_eq!(mem.scratch_save(), 1024);
        assert_eq!(mem.scratch_available(), 256);
    }

    #[test]
    fn test_scratch_exhaustion() {
        let mut mem = LinearMemory::new(1024, 256);
        assert!(mem.scratch_alloc(300).is_none());
        // A failed allocation leaves the stack where it was
        assert_eq!(mem.scratch_save(), 1024);
        assert!(mem.scratch_alloc(256).is_some());
        assert!(mem.scratch_alloc(1).is_none());
    }
}
