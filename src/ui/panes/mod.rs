//! TUI pane rendering modules
//!
//! Each pane is a stateless `render_*` function over borrowed console state.
//!
//! - [`transcript`]: echoed input and module output, scrollable
//! - [`stack`]: the data stack dump with its update pulse
//! - [`lamps`]: the lamp row
//! - [`input`]: the line being typed
//! - [`status`]: status bar with keybindings and session state

pub mod input;
pub mod lamps;
pub mod stack;
pub mod status;
pub mod transcript;

pub use input::render_input_pane;
pub use lamps::render_lamps_pane;
pub use stack::{render_stack_pane, StackRenderData};
pub use status::{render_status_bar, StatusRenderData};
pub use transcript::render_transcript_pane;
