//! Assembly of the loader, resolver, host and engine from configuration.

use std::sync::Arc;

use crate::config::schema::WeaveConfig;
use crate::engine::TemplateEngine;
use crate::error::Result;
use crate::extension::ExtensionRegistry;
use crate::host::StaticHost;
use crate::loader::{ActiveTheme, DiscoveredTemplates, FilesystemLoader, TemplateNameResolver};

impl WeaveConfig {
    /// The configured theme, ignoring an empty name.
    pub fn active_theme(&self) -> Option<ActiveTheme> {
        self.theme
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ActiveTheme::new)
    }

    /// Loader over `search_paths` and `namespaces`.
    pub fn filesystem_loader(&self) -> FilesystemLoader {
        let mut loader = FilesystemLoader::with_paths(self.search_paths.iter().cloned());
        for (namespace, roots) in &self.namespaces {
            for root in roots {
                loader.add_namespaced_path(namespace, root.clone());
            }
        }
        loader
    }

    /// Resolver over the configured loader, discovery index and theme.
    pub fn build_resolver(&self) -> Result<TemplateNameResolver> {
        let index = DiscoveredTemplates::from_config(&self.discovery, &self.templates)?;
        tracing::debug!(
            roots = self.search_paths.len(),
            indexed = index.len(),
            theme = ?self.theme,
            "Building template resolver"
        );
        Ok(TemplateNameResolver::new(
            self.filesystem_loader(),
            index,
            self.active_theme(),
        ))
    }

    /// Host answering from the `host` section.
    pub fn build_host(&self) -> StaticHost {
        StaticHost::new(
            self.host.clone(),
            self.active_theme().map(|t| t.name().to_string()),
        )
    }

    /// Registry with the built-in extensions bound to the configured host.
    pub fn build_registry(&self) -> ExtensionRegistry {
        ExtensionRegistry::new(
            Arc::new(self.build_host()),
            self.active_theme().map(|t| t.name().to_string()),
        )
    }

    /// Engine with the configured globals and escaping.
    pub fn build_engine(&self) -> Result<TemplateEngine> {
        let mut engine = TemplateEngine::new(self.build_resolver()?, self.build_registry());
        engine.set_autoescape(self.autoescape);
        for (name, value) in &self.globals {
            engine.add_global(name.clone(), value.clone());
        }
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn blank_theme_is_no_theme() {
        let config = WeaveConfig {
            theme: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.active_theme().is_none());
    }

    #[test]
    fn loader_gets_search_paths_and_namespaces() {
        let mut config = WeaveConfig {
            search_paths: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            ..Default::default()
        };
        config
            .namespaces
            .insert("admin".to_string(), vec![PathBuf::from("/admin")]);

        let loader = config.filesystem_loader();
        assert_eq!(loader.paths(crate::loader::MAIN_NAMESPACE), [PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(loader.paths("admin"), [PathBuf::from("/admin")]);
    }

    #[test]
    fn resolver_falls_back_to_theme_index() {
        let temp = TempDir::new().unwrap();
        let theme_dir = temp.path().join("themes/mytheme");
        fs::create_dir_all(&theme_dir).unwrap();
        fs::write(theme_dir.join("node.html"), "node").unwrap();

        let config = WeaveConfig {
            theme: Some("mytheme".to_string()),
            discovery: crate::config::DiscoveryConfig {
                roots: vec![theme_dir.clone()],
                ..Default::default()
            },
            ..Default::default()
        };

        let mut resolver = config.build_resolver().unwrap();
        assert_eq!(
            resolver.resolve("mytheme::node.html").unwrap(),
            theme_dir.join("node.html")
        );
    }

    #[test]
    fn engine_uses_globals_and_host() {
        let mut config: WeaveConfig = serde_yaml::from_str(
            r#"
globals:
  site_name: Example
host:
  base_path: /site/
"#,
        )
        .unwrap();
        config.autoescape = false;

        let mut engine = config.build_engine().unwrap();
        let out = engine
            .render_str("{{ site_name }} {{ base_path }}", &tera::Context::new())
            .unwrap();
        assert_eq!(out, "Example /site/");
    }
}
