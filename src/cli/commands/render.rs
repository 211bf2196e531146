//! Render command implementation.
//!
//! The `themeweave render` command renders one template with the configured
//! loader, extensions and globals.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context as _};
use serde_json::Value;
use tera::Context;

use crate::cli::args::RenderArgs;
use crate::config::WeaveConfig;
use crate::error::{Result, WeaveError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The render command implementation.
pub struct RenderCommand {
    config: WeaveConfig,
    args: RenderArgs,
}

impl RenderCommand {
    /// Create a new render command.
    pub fn new(config: WeaveConfig, args: RenderArgs) -> Self {
        Self { config, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RenderArgs {
        &self.args
    }

    /// Context from `--json-context` overlaid with every `--var`.
    fn build_context(&self) -> Result<Context> {
        let mut context = match &self.args.json_context {
            Some(path) => load_json_context(path)?,
            None => Context::new(),
        };

        for var in &self.args.vars {
            let (key, value) = parse_var(var)?;
            context.insert(key, &value);
        }
        Ok(context)
    }
}

impl Command for RenderCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let context = self.build_context()?;
        let mut engine = self.config.build_engine()?;
        if let Some(enabled) = self.args.autoescape {
            engine.set_autoescape(enabled);
        }

        match engine.render(&self.args.name, &context) {
            Ok(output) => {
                ui.output(&output);
                tracing::debug!(
                    template = %self.args.name,
                    loaded = engine.loaded().len(),
                    "Rendered template"
                );
                Ok(CommandResult::success())
            }
            Err(
                e @ (WeaveError::TemplateNotFound { .. }
                | WeaveError::InvalidTemplateName { .. }
                | WeaveError::Syntax { .. }
                | WeaveError::Render { .. }),
            ) => {
                ui.error(&e.report());
                Ok(CommandResult::failure(1))
            }
            Err(e) => Err(e),
        }
    }
}

fn load_json_context(path: &Path) -> Result<Context> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in context file {}", path.display()))?;
    if !value.is_object() {
        return Err(anyhow!(
            "Context file {} must contain a JSON object",
            path.display()
        )
        .into());
    }
    Context::from_value(value).map_err(|e| anyhow!("Invalid context: {}", e).into())
}

/// Split `key=value`, reading the value as JSON when it parses and as a
/// plain string otherwise.
fn parse_var(var: &str) -> Result<(&str, Value)> {
    let (key, raw) = var
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid --var '{}': expected KEY=VALUE", var))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Invalid --var '{}': empty key", var).into());
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key, value))
}
