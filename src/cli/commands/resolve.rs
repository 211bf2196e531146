//! Resolve command implementation.
//!
//! The `themeweave resolve` command prints the file each template name
//! resolves to.

use crate::cli::args::ResolveArgs;
use crate::config::WeaveConfig;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The resolve command implementation.
pub struct ResolveCommand {
    config: WeaveConfig,
    args: ResolveArgs,
}

impl ResolveCommand {
    /// Create a new resolve command.
    pub fn new(config: WeaveConfig, args: ResolveArgs) -> Self {
        Self { config, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ResolveArgs {
        &self.args
    }
}

impl Command for ResolveCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut resolver = self.config.build_resolver()?;
        let mut failed = 0;

        for name in &self.args.names {
            match resolver.resolve_with_source(name) {
                Ok((path, source)) if self.args.explain => {
                    ui.output(&format!("{}\t{}\t({})\n", name, path.display(), source));
                }
                Ok((path, _)) => ui.output(&format!("{}\n", path.display())),
                Err(e) => {
                    failed += 1;
                    ui.error(&e.report());
                }
            }
        }

        if failed > 0 {
            tracing::debug!(failed, total = self.args.names.len(), "Unresolved templates");
            return Ok(CommandResult::failure(1));
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, WeaveConfig) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("templates")).unwrap();
        fs::create_dir_all(temp.path().join("themes/mytheme")).unwrap();
        fs::write(temp.path().join("templates/page.html"), "page").unwrap();
        fs::write(temp.path().join("themes/mytheme/node.html"), "node").unwrap();

        let mut config: WeaveConfig = serde_yaml::from_str(
            "theme: mytheme\nsearch_paths: [templates]\ndiscovery:\n  roots: [themes/mytheme]\n",
        )
        .unwrap();
        config.resolve_paths(temp.path());
        (temp, config)
    }

    fn args(names: &[&str], explain: bool) -> ResolveArgs {
        ResolveArgs {
            names: names.iter().map(|n| n.to_string()).collect(),
            explain,
        }
    }

    #[test]
    fn prints_one_path_per_name() {
        let (temp, config) = project();
        let cmd = ResolveCommand::new(config, args(&["page.html", "mytheme::node.html"], false));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(
            ui.outputs(),
            [
                format!("{}\n", temp.path().join("templates/page.html").display()),
                format!("{}\n", temp.path().join("themes/mytheme/node.html").display()),
            ]
        );
    }

    #[test]
    fn explain_names_the_strategy() {
        let (_temp, config) = project();
        let cmd = ResolveCommand::new(config, args(&["page.html", "mytheme::node.html"], true));
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert!(ui.outputs()[0].starts_with("page.html\t"));
        assert!(ui.outputs()[0].ends_with("(roots)\n"));
        assert!(ui.outputs()[1].ends_with("(theme index)\n"));
    }

    #[test]
    fn missing_name_fails_but_resolves_the_rest() {
        let (_temp, config) = project();
        let cmd = ResolveCommand::new(config, args(&["missing.html", "page.html"], false));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
        assert_eq!(ui.outputs().len(), 1);
        assert!(ui.has_error("Could not find template \"missing.html\""));
        assert!(ui.has_error("looked into"));
    }

    #[test]
    fn invalid_name_is_reported() {
        let (_temp, config) = project();
        let cmd = ResolveCommand::new(config, args(&["../secret.html"], false));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(!result.success);
        assert!(ui.has_error("Invalid template name"));
    }
}
