//! Command-line configuration

use crate::console::lamps::LAMP_COUNT;
use crate::console::session::{SessionConfig, INIT_DICT_CELLS, INIT_STACK_CELLS};
use crate::interpreter::ForthLoader;
use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;

/// lampforth - an interactive Forth console with stack view and lamp display
#[derive(Debug, Clone, Parser)]
#[command(name = "lampforth", version, about, long_about = None)]
pub struct Cli {
    /// Dictionary capacity in cells, passed to the module's init.
    #[arg(long, default_value_t = INIT_DICT_CELLS, allow_negative_numbers = true)]
    pub dict_cells: i32,

    /// Data and return stack capacity in cells.
    #[arg(long, default_value_t = INIT_STACK_CELLS, allow_negative_numbers = true)]
    pub stack_cells: i32,

    /// Module linear memory size in KiB.
    #[arg(long, value_name = "KIB", default_value_t = 256)]
    pub memory_kib: usize,

    /// Number of lamps shown (1-8).
    #[arg(long, default_value_t = LAMP_COUNT, value_parser = clap::value_parser!(u8).range(1..=8).map(usize::from))]
    pub lamps: usize,

    /// Forth source evaluated line by line after init.
    #[arg(long, value_name = "FILE")]
    pub prelude: Option<PathBuf>,

    /// Write log records to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Read lines from stdin and print output instead of starting the TUI.
    #[arg(long)]
    pub headless: bool,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            dict_cells: self.dict_cells,
            stack_cells: self.stack_cells,
            prelude: self.prelude.clone(),
        }
    }

    pub fn loader(&self) -> ForthLoader {
        ForthLoader {
            memory_bytes: self.memory_kib.saturating_mul(1024),
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}
