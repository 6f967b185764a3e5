//! # Introduction
//!
//! lampforth is a terminal console for a Forth VM that runs as a module
//! behind a narrow, buffer-based call boundary. The console sends each typed
//! line into the module, drains the text it printed, shows the top of the
//! data stack as a hex dump and lights a row of eight lamps that Forth code
//! drives with the `leds` word.
//!
//! ## Pipeline
//!
//! ```text
//! keystroke → Session → Driver → Bridge → VmModule → StackView → TUI
//!                                             │
//!                                             └── HostImports → Lamps
//! ```
//!
//! 1. [`module`]: the [`module::VmModule`] call boundary and the host imports.
//! 2. [`console`]: host side. Scoped buffers, evaluation, stack view, history,
//!    lamps and the [`console::Session`] that owns the module.
//! 3. [`interpreter`]: the embedded Forth module, [`interpreter::ForthModule`].
//! 4. [`memory`]: linear memory and cell stacks the module is built on.
//! 5. [`snapshot`]: the transcript and parsed stack snapshots.
//! 6. [`ui`]: ratatui-based TUI; not part of the stable library API.
//! 7. [`config`]: command-line options.

pub mod config;
pub mod console;
pub mod error;
pub mod interpreter;
pub mod memory;
pub mod module;
pub mod snapshot;
pub mod ui;
