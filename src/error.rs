//! Host-side error types
//!
//! Errors here describe failures of the console itself, never of the Forth
//! program being evaluated. A word that is not found or a stack underflow is
//! reported by the module through its output text and is ordinary output as
//! far as the host is concerned.
//!
//! - [`AllocationError`]: a transient buffer could not be acquired. Local to
//!   the operation that asked for it; the console stays usable.
//! - [`ModuleLoadError`]: the module could not be instantiated or initialized.
//!   Terminal for the session.

use thiserror::Error;

/// A transient buffer could not be carved out of module memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("module allocation of {requested} bytes failed ({available} bytes free)")]
pub struct AllocationError {
    pub requested: usize,
    pub available: usize,
}

/// The VM module failed to come up.
#[derive(Debug, Error)]
pub enum ModuleLoadError {
    /// Linear memory cannot hold the fixed module layout
    #[error("module memory of {requested} bytes is too small (need at least {required})")]
    MemoryTooSmall { requested: usize, required: usize },

    /// The module's `init` entry point returned a non-zero code
    #[error("module init failed with code {0}")]
    Init(i32),

    /// The prelude source could not be read
    #[error("cannot read prelude {path}: {source}")]
    Prelude {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A buffer needed during startup could not be allocated
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Any failure surfaced by the session controller.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),

    /// The session already failed to load; nothing more can run
    #[error("VM module is not loaded")]
    NotLoaded,
}
