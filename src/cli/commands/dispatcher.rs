//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, WeaveConfig};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for command output and status
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    theme_override: Option<String>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            config_override: None,
            theme_override: None,
        }
    }

    /// Load this config file instead of merging the project files.
    pub fn with_config(mut self, path: Option<PathBuf>) -> Self {
        self.config_override = path;
        self
    }

    /// Use this theme instead of the configured one.
    pub fn with_theme(mut self, theme: Option<String>) -> Self {
        self.theme_override = theme;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load the project configuration with the command-line overrides applied.
    pub fn load_config(&self) -> Result<WeaveConfig> {
        let mut config = load_config(&self.project_root, self.config_override.as_deref())?;
        if let Some(theme) = &self.theme_override {
            config.theme = Some(theme.clone());
        }
        Ok(config)
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Resolve(args) => {
                let cmd = super::resolve::ResolveCommand::new(self.load_config()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Render(args) => {
                let cmd = super::render::RenderCommand::new(self.load_config()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Extensions(args) => {
                let cmd =
                    super::extensions::ExtensionsCommand::new(self.load_config()?, args.clone());
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{ExtensionsArgs, ResolveArgs};
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"));
        assert_eq!(dispatcher.project_root(), Path::new("/test"));
    }

    #[test]
    fn theme_override_replaces_configured_theme() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".themeweave")).unwrap();
        fs::write(temp.path().join(".themeweave/config.yml"), "theme: mytheme").unwrap();

        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf())
            .with_theme(Some("admin".to_string()));
        assert_eq!(dispatcher.load_config().unwrap().theme.as_deref(), Some("admin"));

        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());
        assert_eq!(dispatcher.load_config().unwrap().theme.as_deref(), Some("mytheme"));
    }

    #[test]
    fn dispatch_routes_resolve() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("templates")).unwrap();
        fs::write(temp.path().join("templates/page.html"), "page").unwrap();
        let custom = temp.path().join("weave.yml");
        fs::write(&custom, "search_paths: [templates]").unwrap();

        let cli = Cli {
            config: Some(custom.clone()),
            project: None,
            theme: None,
            quiet: false,
            no_color: true,
            debug: false,
            command: Commands::Resolve(ResolveArgs {
                names: vec!["page.html".to_string()],
                explain: false,
            }),
        };
        let dispatcher =
            CommandDispatcher::new(temp.path().to_path_buf()).with_config(Some(custom));
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();
        assert!(result.success);
        assert!(ui.output_text().contains("page.html"));
    }

    #[test]
    fn dispatch_surfaces_config_errors() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".themeweave")).unwrap();
        fs::write(temp.path().join(".themeweave/config.yml"), "theme: [").unwrap();

        let cli = Cli {
            config: None,
            project: None,
            theme: None,
            quiet: false,
            no_color: true,
            debug: false,
            command: Commands::Extensions(ExtensionsArgs::default()),
        };
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());
        let mut ui = MockUI::new();

        assert!(dispatcher.dispatch(&cli, &mut ui).is_err());
    }
}
