//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into layers:
//!
//! - **[`app`]**: application state and the keyboard event loop
//! - **[`input`]**: the line editor behind the input pane
//! - **[`panes`]**: stateless render functions for each visible pane (transcript,
//!   input, stack, lamps, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a started
//! [`Session`] and call [`App::run`] to start the event loop.
//!
//! [`Session`]: crate::console::Session
//! [`App::run`]: app::App::run

pub mod app;
pub mod input;
pub mod panes;
pub mod theme;

pub use app::App;
