//! Extensions command implementation.
//!
//! The `themeweave extensions` command lists everything templates can use:
//! filters, functions, tests, operators, tags and globals.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::cli::args::ExtensionsArgs;
use crate::config::WeaveConfig;
use crate::error::Result;
use crate::extension::OperatorDescriptor;
use crate::ui::{UserInterface, WeaveTheme};

use super::dispatcher::{Command, CommandResult};

/// The extensions command implementation.
pub struct ExtensionsCommand {
    config: WeaveConfig,
    args: ExtensionsArgs,
}

/// Serializable snapshot of an engine's extensions.
#[derive(Debug, Serialize)]
pub struct ExtensionListing {
    pub theme: Option<String>,
    pub filters: Vec<String>,
    pub functions: Vec<String>,
    pub tests: Vec<String>,
    pub operators: Vec<OperatorDescriptor>,
    pub tags: Vec<TagListing>,
    pub globals: BTreeMap<String, Value>,
    pub contributors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TagListing {
    pub name: String,
    pub keywords: Vec<String>,
}

impl ExtensionsCommand {
    /// Create a new extensions command.
    pub fn new(config: WeaveConfig, args: ExtensionsArgs) -> Self {
        Self { config, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ExtensionsArgs {
        &self.args
    }

    /// Collect the listing from the configured engine.
    pub fn listing(&self) -> Result<ExtensionListing> {
        let engine = self.config.build_engine()?;
        let registry = engine.registry();
        let owned = |names: Vec<&str>| names.into_iter().map(String::from).collect();

        Ok(ExtensionListing {
            theme: self.config.active_theme().map(|t| t.name().to_string()),
            filters: owned(registry.filter_names()),
            functions: owned(registry.function_names()),
            tests: owned(registry.test_names()),
            operators: registry.operators().to_vec(),
            tags: registry
                .tags()
                .iter()
                .map(|tag| TagListing {
                    name: tag.name().to_string(),
                    keywords: tag.keywords().iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
            globals: engine.globals(),
            contributors: registry.contributors().to_vec(),
        })
    }
}

impl Command for ExtensionsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let listing = self.listing()?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&listing).map_err(anyhow::Error::from)?;
            ui.output(&format!("{}\n", json));
            return Ok(CommandResult::success());
        }

        let theme = WeaveTheme::detect();
        let mut text = String::new();
        let mut section = |title: &str, lines: Vec<String>| {
            text.push_str(&format!("{}\n", theme.key.apply_to(title)));
            if lines.is_empty() {
                text.push_str(&format!("  {}\n", theme.dim.apply_to("(none)")));
            }
            for line in lines {
                text.push_str(&format!("  {}\n", line));
            }
        };

        let names = |names: &[String]| -> Vec<String> {
            names
                .iter()
                .map(|n| theme.name.apply_to(n).to_string())
                .collect()
        };

        section("Filters:", names(&listing.filters));
        section("Functions:", names(&listing.functions));
        section("Tests:", names(&listing.tests));
        section(
            "Operators:",
            listing
                .operators
                .iter()
                .map(|op| {
                    format!(
                        "{:<4}{}",
                        theme.name.apply_to(&op.symbol),
                        theme.dim.apply_to(describe_operator(op))
                    )
                })
                .collect(),
        );
        section(
            "Tags:",
            listing
                .tags
                .iter()
                .map(|tag| {
                    format!(
                        "{} {}",
                        theme.name.apply_to(&tag.name),
                        theme.dim.apply_to(format!("({})", tag.keywords.join(", ")))
                    )
                })
                .collect(),
        );
        section(
            "Globals:",
            listing
                .globals
                .iter()
                .map(|(name, value)| format!("{} = {}", theme.name.apply_to(name), value))
                .collect(),
        );
        if !listing.contributors.is_empty() {
            section("Contributors:", listing.contributors.clone());
        }

        ui.output(&text);
        match &listing.theme {
            Some(name) => ui.success(&format!("Active theme: {}", name)),
            None => ui.warning("No active theme, theme-qualified names will not fall back"),
        }
        Ok(CommandResult::success())
    }
}

fn describe_operator(op: &OperatorDescriptor) -> String {
    let arity = match op.associativity {
        Some(assoc) => format!("{:?} {:?}", op.arity, assoc),
        None => format!("{:?}", op.arity),
    };
    format!(
        "{}, precedence {}, becomes `{}`",
        arity.to_lowercase(),
        op.precedence,
        op.node
    )
}
