//! The lamp row and the host functions exported to the module
//!
//! Lamps are driven by the module calling [`HostImports::set_lamps`], which can
//! happen in the middle of an evaluation. The panel therefore sits behind a
//! `RefCell` and is updated through a shared [`Peripherals`] handle.

use crate::module::HostImports;
use std::cell::{Cell, Ref, RefCell};

/// Number of bits decoded from a lamp value
pub const LAMP_COUNT: usize = 8;

/// Decode bits 0 to 7 of `value`, least significant first
pub fn lamp_bits(value: u32) -> [bool; LAMP_COUNT] {
    std::array::from_fn(|bit| value & (1 << bit) != 0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LampPanel {
    slots: Vec<bool>,
}

impl Default for LampPanel {
    fn default() -> Self {
        LampPanel::new(LAMP_COUNT)
    }
}

impl LampPanel {
    /// A panel with `slots` lamps, all off
    pub fn new(slots: usize) -> Self {
        LampPanel {
            slots: vec![false; slots],
        }
    }

    /// Set every available slot from the low bits of `value`.
    ///
    /// Slots beyond the eighth are left alone; missing slots are skipped.
    pub fn set_lamps(&mut self, value: u32) {
        for (slot, on) in self.slots.iter_mut().zip(lamp_bits(value)) {
            *slot = on;
        }
    }

    pub fn slots(&self) -> &[bool] {
        &self.slots
    }

    pub fn is_on(&self, index: usize) -> bool {
        self.slots.get(index).copied().unwrap_or(false)
    }
}

/// Host-side state the module can reach through its imports
#[derive(Debug, Default)]
pub struct Peripherals {
    lamps: RefCell<LampPanel>,
    refresh_requests: Cell<u64>,
}

impl Peripherals {
    pub fn new(lamp_slots: usize) -> Self {
        Peripherals {
            lamps: RefCell::new(LampPanel::new(lamp_slots)),
            refresh_requests: Cell::new(0),
        }
    }

    pub fn lamps(&self) -> Ref<'_, LampPanel> {
        self.lamps.borrow()
    }

    /// Number of repaint hints since the last call, resetting the count
    pub fn take_refresh_requests(&self) -> u64 {
        self.refresh_requests.replace(0)
    }
}

impl HostImports for Peripherals {
    fn set_lamps(&self, value: u32) {
        log::trace!("set_lamps({:#010b})", value & 0xff);
        self.lamps.borrow_mut().set_lamps(value);
    }

    fn request_refresh(&self) {
        self.refresh_requests.set(self.refresh_requests.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_zero_and_two() {
        for prior in [0u32, 0xff, 0b1010_1010] {
            let mut panel = LampPanel::default();
            panel.set_lamps(prior);
            panel.set_lamps(0b0000_0101);
            assert_eq!(
                panel.slots(),
                &[true, false, true, false, false, false, false, false]
            );
        }
    }

    #[test]
    fn test_bit_eight_turns_everything_off() {
        let mut panel = LampPanel::default();
        panel.set_lamps(0xff);
        panel.set_lamps(256);
        assert!(panel.slots().iter().all(|on| !on));
    }

    #[test]
    fn test_high_bits_are_ignored() {
        assert_eq!(lamp_bits(0xffff_ff01), lamp_bits(0x01));
        assert_eq!(lamp_bits(-1i32 as u32), [true; LAMP_COUNT]);
    }

    #[test]
    fn test_fewer_slots_are_updated_without_error() {
        let mut panel = LampPanel::new(3);
        panel.set_lamps(0b1111_1101);
        assert_eq!(panel.slots(), &[true, false, true]);
        assert!(!panel.is_on(7));
    }

    #[test]
    fn test_peripherals_count_refresh_requests() {
        let peripherals = Peripherals::new(LAMP_COUNT);
        peripherals.request_refresh();
        peripherals.request_refresh();
        peripherals.set_lamps(0b1000_0000);
        assert!(peripherals.lamps().is_on(7));
        assert_eq!(peripherals.take_refresh_requests(), 2);
        assert_eq!(peripherals.take_refresh_requests(), 0);
    }
}
