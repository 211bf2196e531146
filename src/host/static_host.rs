//! A host whose services are answered from configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{HostServices, ImageInfo};

/// A block that can be placed with `viewblock()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Module providing the block.
    pub module: String,
    /// Block delta within its module.
    pub delta: String,
    /// Theme the block is placed in, if any.
    #[serde(default)]
    pub theme: Option<String>,
    /// Markup string or render array.
    #[serde(default)]
    pub content: Value,
}

/// The `host:` section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Scheme and host, e.g. `https://example.com`.
    pub base_url: String,
    /// Base path ending in `/`.
    pub base_path: String,
    /// Public files directory below the base URL.
    pub files_path: String,
    /// Path of the current request.
    pub current_path: String,
    /// Theme name to theme directory.
    pub theme_paths: HashMap<String, String>,
    /// Theme name to its settings.
    pub theme_settings: HashMap<String, Map<String, Value>>,
    /// Enabled modules.
    pub modules: Vec<String>,
    /// Persistent variables.
    pub variables: Map<String, Value>,
    /// Placeable blocks.
    pub blocks: Vec<BlockConfig>,
    /// Image URL to dimensions.
    pub images: HashMap<String, ImageInfo>,
    /// System path to alias.
    pub aliases: HashMap<String, String>,
    /// Source string to translated string.
    pub translations: HashMap<String, String>,
    /// Form element to error message.
    pub form_errors: Map<String, Value>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            base_path: "/".to_string(),
            files_path: "sites/default/files".to_string(),
            current_path: String::new(),
            theme_paths: HashMap::new(),
            theme_settings: HashMap::new(),
            modules: Vec::new(),
            variables: Map::new(),
            blocks: Vec::new(),
            images: HashMap::new(),
            aliases: HashMap::new(),
            translations: HashMap::new(),
            form_errors: Map::new(),
        }
    }
}

/// [`HostServices`] answered from a [`HostConfig`].
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    config: HostConfig,
    theme: Option<String>,
}

impl StaticHost {
    /// Create a host from configuration and the active theme name.
    pub fn new(config: HostConfig, theme: Option<String>) -> Self {
        Self { config, theme }
    }

    /// The configuration backing this host.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    fn theme_or_active<'a>(&'a self, theme: Option<&'a str>) -> Option<&'a str> {
        theme.or(self.theme.as_deref())
    }
}

impl HostServices for StaticHost {
    fn base_path(&self) -> String {
        if self.config.base_path.ends_with('/') {
            self.config.base_path.clone()
        } else {
            format!("{}/", self.config.base_path)
        }
    }

    fn base_url(&self) -> String {
        self.config.base_url.trim_end_matches('/').to_string()
    }

    fn files_path(&self) -> String {
        self.config.files_path.trim_matches('/').to_string()
    }

    fn translate(&self, text: &str, args: &Map<String, Value>) -> String {
        let translated = self
            .config
            .translations
            .get(text)
            .map(String::as_str)
            .unwrap_or(text);
        super::format::translate(translated, args)
    }

    fn theme_setting(&self, name: &str, theme: Option<&str>) -> Option<Value> {
        let theme = self.theme_or_active(theme)?;
        self.config.theme_settings.get(theme)?.get(name).cloned()
    }

    fn module_exists(&self, module: &str) -> bool {
        self.config.modules.iter().any(|m| m == module)
    }

    fn variable(&self, name: &str) -> Option<Value> {
        self.config.variables.get(name).cloned()
    }

    fn current_path(&self) -> String {
        self.config.current_path.clone()
    }

    fn block(&self, delta: &str, module: Option<&str>, theme: Option<&str>) -> Option<Value> {
        let theme = self.theme_or_active(theme);
        let block = self.config.blocks.iter().find(|b| {
            b.delta == delta
                && match module {
                    Some(module) => b.module == module,
                    None => theme.is_some() && b.theme.as_deref() == theme,
                }
        })?;

        let content = match &block.content {
            Value::String(markup) => serde_json::json!({ "#markup": markup }),
            other => other.clone(),
        };
        Some(content)
    }

    fn image_info(&self, url: &str) -> Option<ImageInfo> {
        self.config.images.get(url).copied()
    }

    fn path_alias(&self, path: &str) -> String {
        self.config
            .aliases
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.to_string())
    }

    fn form_errors(&self) -> Map<String, Value> {
        self.config.form_errors.clone()
    }

    fn theme_path(&self, theme: Option<&str>) -> String {
        self.theme_or_active(theme)
            .and_then(|t| self.config.theme_paths.get(t))
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or_default()
    }
}
