//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! project configuration once, applies the global `--config` and `--theme`
//! overrides and routes the subcommand to its implementation.

pub mod completions;
pub mod dispatcher;
pub mod extensions;
pub mod render;
pub mod resolve;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
