//! Host side of the console
//!
//! Everything that talks to a [`VmModule`](crate::module::VmModule) lives
//! here, leaves first:
//!
//! - [`bridge`]: scoped transient buffers in module memory
//! - [`driver`]: one line in, drained output out
//! - [`stack_view`]: the data stack dump and its update pulse
//! - [`history`]: submitted lines and recall
//! - [`headless`]: the console over piped stdin and stdout
//! - [`lamps`]: the lamp row the module drives through its imports
//! - [`session`]: module lifecycle and the status line

pub mod bridge;
pub mod driver;
pub mod headless;
pub mod history;
pub mod lamps;
pub mod session;
pub mod stack_view;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::{EvalStatus, Evaluation};
pub use history::History;
pub use lamps::{LampPanel, Peripherals};
pub use session::{Session, SessionConfig, SessionState};
pub use stack_view::StackView;
