//! Configuration file discovery and loading.

use crate::config::merger::merge_configs;
use crate::config::schema::WeaveConfig;
use crate::error::{Result, WeaveError};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding project configuration.
pub const CONFIG_DIR: &str = ".themeweave";

/// Paths to configuration files in merge order (later overrides earlier).
///
/// 1. Project config (`.themeweave/config.yml`)
/// 2. Local overrides (`.themeweave/config.local.yml`)
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .themeweave/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .themeweave/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            project: existing(project_root.join(CONFIG_DIR).join("config.yml")),
            project_local: existing(project_root.join(CONFIG_DIR).join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }

    /// Check if a project config exists.
    pub fn has_project_config(&self) -> bool {
        self.project.is_some()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Find the project root by walking up from `start`.
///
/// A `.themeweave` directory marks a root; `.git` is the fallback.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist and
/// `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<WeaveConfig> {
    let content = read_config(path)?;
    parse_config(&content, path)
}

/// Parse YAML content, reporting errors against `source_path`.
pub fn parse_config(content: &str, source_path: &Path) -> Result<WeaveConfig> {
    if content.trim().is_empty() {
        return Ok(WeaveConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| WeaveError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as raw YAML so it can be merged before parsing.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = read_config(path)?;
    serde_yaml::from_str(&content).map_err(|e| WeaveError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WeaveError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            WeaveError::Io(e)
        }
    })
}

/// Load and merge the project and local config files.
///
/// # Errors
///
/// Returns `ConfigNotFound` if no project config exists and
/// `ConfigParseError` if any file is invalid.
pub fn load_merged_config(project_root: &Path) -> Result<WeaveConfig> {
    let paths = ConfigPaths::discover(project_root);
    let project_path = project_root.join(CONFIG_DIR).join("config.yml");

    if !paths.has_project_config() {
        return Err(WeaveError::ConfigNotFound { path: project_path });
    }

    let configs = paths
        .all_existing()
        .into_iter()
        .map(|path| load_config_value(path))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_configs(&configs);
    if merged.as_mapping().is_some_and(|m| m.is_empty()) {
        return Ok(WeaveConfig::default());
    }

    serde_yaml::from_value(merged).map_err(|e| WeaveError::ConfigParseError {
        path: project_path,
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Load configuration for a project, with relative paths resolved against
/// `project_root`.
///
/// With `config_override` only that file is loaded. Without it the project
/// and local files are merged; a project without config gets defaults.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<WeaveConfig> {
    let mut config = match config_override {
        Some(path) => load_config_file(path)?,
        None => match load_merged_config(project_root) {
            Err(WeaveError::ConfigNotFound { path }) => {
                tracing::debug!(path = %path.display(), "No project config, using defaults");
                WeaveConfig::default()
            }
            other => other?,
        },
    };

    config.resolve_paths(project_root);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(config: &str, local: Option<&str>) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        if let Some(local) = local {
            fs::write(dir.join("config.local.yml"), local).unwrap();
        }
        temp
    }

    #[test]
    fn discover_finds_project_and_local() {
        let temp = project("theme: a", Some("theme: b"));
        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.has_project_config());
        assert!(paths.project_local.is_some());
        assert_eq!(
            paths.all_existing(),
            vec![
                &temp.path().join(CONFIG_DIR).join("config.yml"),
                &temp.path().join(CONFIG_DIR).join("config.local.yml"),
            ]
        );
    }

    #[test]
    fn discover_without_config() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::discover(temp.path());
        assert!(!paths.has_project_config());
        assert!(paths.all_existing().is_empty());
    }

    #[test]
    fn find_project_root_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("themes").join("mytheme");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(temp.path().join(CONFIG_DIR)).unwrap();

        assert_eq!(find_project_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn find_project_root_falls_back_to_git() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();

        assert_eq!(find_project_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn load_config_file_errors() {
        assert!(matches!(
            load_config_file(Path::new("/nonexistent/config.yml")),
            Err(WeaveError::ConfigNotFound { .. })
        ));
        assert!(matches!(
            parse_config("theme: [", Path::new("config.yml")),
            Err(WeaveError::ConfigParseError { .. })
        ));
        assert!(matches!(
            parse_config("search_paths: 3", Path::new("config.yml")),
            Err(WeaveError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("", Path::new("config.yml")).unwrap();
        assert_eq!(config, WeaveConfig::default());
    }

    #[test]
    fn merged_config_applies_local_overrides() {
        let temp = project(
            "theme: mytheme\nsearch_paths: [templates]\nhost:\n  base_url: https://example.com\n",
            Some("theme: admin\nhost:\n  base_path: /dev/\n"),
        );

        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config.theme.as_deref(), Some("admin"));
        assert_eq!(config.search_paths, vec![PathBuf::from("templates")]);
        assert_eq!(config.host.base_url, "https://example.com");
        assert_eq!(config.host.base_path, "/dev/");
    }

    #[test]
    fn merged_config_requires_project_file() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            load_merged_config(temp.path()),
            Err(WeaveError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn load_config_defaults_without_project_file() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config.theme, None);
    }

    #[test]
    fn load_config_override_skips_merge_and_resolves_paths() {
        let temp = project("theme: merged", None);
        let custom = temp.path().join("custom.yml");
        fs::write(&custom, "theme: custom\nsearch_paths: [views]").unwrap();

        let config = load_config(temp.path(), Some(&custom)).unwrap();
        assert_eq!(config.theme.as_deref(), Some("custom"));
        assert_eq!(config.search_paths, vec![temp.path().join("views")]);
    }

    #[test]
    fn load_config_surfaces_parse_errors() {
        let temp = project("theme: [", None);
        assert!(matches!(
            load_config(temp.path(), None),
            Err(WeaveError::ConfigParseError { .. })
        ));
    }
}
