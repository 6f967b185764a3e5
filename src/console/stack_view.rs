//! Data stack rendering
//!
//! After every evaluation and reset the host asks the module for a hex dump
//! of the top of the data stack and shows it verbatim. A short highlight pulse
//! marks the update; re-triggering while lit restarts it.

use super::bridge;
use crate::error::AllocationError;
use crate::module::VmModule;
use std::time::{Duration, Instant};

/// Size of the transient buffer handed to `stack_hex_dump`
pub const STACK_DUMP_BYTES: usize = 256;

/// Cells requested from the top of the stack
pub const STACK_DUMP_CELLS: usize = 8;

/// How long the update highlight stays on
pub const PULSE_DURATION: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Triggered; turns on at the next frame
    Rearming,
    Lit(Instant),
}

/// A retriggerable one-shot highlight
#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    phase: Phase,
    duration: Duration,
}

impl Default for Pulse {
    fn default() -> Self {
        Pulse::new(PULSE_DURATION)
    }
}

impl Pulse {
    pub fn new(duration: Duration) -> Self {
        Pulse {
            phase: Phase::Idle,
            duration,
        }
    }

    /// Restart the pulse. If it is already lit it goes dark for one frame
    /// first so the restart is visible.
    pub fn trigger(&mut self) {
        self.phase = Phase::Rearming;
    }

    /// Move the pulse forward to `now`. Call once per frame.
    pub fn advance(&mut self, now: Instant) {
        self.phase = match self.phase {
            Phase::Idle => Phase::Idle,
            Phase::Rearming => Phase::Lit(now),
            Phase::Lit(since) if now.duration_since(since) >= self.duration => Phase::Idle,
            lit => lit,
        };
    }

    pub fn is_lit(&self) -> bool {
        matches!(self.phase, Phase::Lit(_))
    }
}

/// The rendered stack dump and its highlight
#[derive(Debug, Clone, Default)]
pub struct StackView {
    text: String,
    pub pulse: Pulse,
}

impl StackView {
    /// Ask the module for a fresh dump.
    ///
    /// The text is shown as the module wrote it, minus surrounding whitespace.
    /// On allocation failure the previous text stays.
    pub fn refresh<M: VmModule + ?Sized>(&mut self, module: &mut M) -> Result<(), AllocationError> {
        let text = bridge::with_transient_buffer(module, STACK_DUMP_BYTES, |buffer| {
            let ptr = buffer.ptr();
            let size = buffer.size();
            buffer.write(&[0]);
            buffer.stack_hex_dump(ptr, size, STACK_DUMP_CELLS);
            buffer.read_c_string()
        })?;
        self.text = text.trim().to_string();
        self.pulse.trigger();
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
