//! Terminal output for the `themeweave` binary.
//!
//! This module provides:
//! - [`UserInterface`] trait so commands can be tested against [`MockUI`]
//! - [`TerminalUI`] writing styled status to the terminal
//! - [`WeaveTheme`] colors and message formatting
//!
//! # Example
//!
//! ```
//! use themeweave::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.output("<p>Hello</p>\n");
//! ui.success("Rendered page.html");
//!
//! assert_eq!(ui.outputs(), ["<p>Hello</p>\n"]);
//! assert!(ui.has_success("page.html"));
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, WeaveTheme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Change the output mode.
    fn set_output_mode(&mut self, mode: OutputMode);

    /// Write command output (rendered templates, listings) verbatim.
    ///
    /// Output is never suppressed by the output mode.
    fn output(&mut self, text: &str);

    /// Display a status message.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);
}
