//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// themeweave - Theme-aware template resolution and rendering.
#[derive(Debug, Parser)]
#[command(name = "themeweave")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .themeweave/config.yml and config.local.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides discovery from the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Active theme (overrides the configured theme)
    #[arg(short, long, global = true, env = "THEMEWEAVE_THEME")]
    pub theme: Option<String>,

    /// Only print command output and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve template names to files
    Resolve(ResolveArgs),

    /// Render a template
    Render(RenderArgs),

    /// List registered filters, functions, tests, operators, tags and globals
    Extensions(ExtensionsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `resolve` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResolveArgs {
    /// Template names to resolve
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Show which strategy found each template
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for the `render` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RenderArgs {
    /// Template name to render
    pub name: String,

    /// Context variable as key=value (value parsed as JSON when possible)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// JSON file whose top-level object becomes the context
    #[arg(long, value_name = "FILE")]
    pub json_context: Option<PathBuf>,

    /// Force HTML escaping on or off for this render
    #[arg(long)]
    pub autoescape: Option<bool>,
}

/// Arguments for the `extensions` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ExtensionsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
