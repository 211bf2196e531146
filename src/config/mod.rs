//! Configuration loading and parsing for themeweave.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Layering in [`merger`]
//! - Building resolvers and engines in [`build`]
//!
//! # Example
//!
//! ```
//! use themeweave::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".themeweave");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "theme: mytheme\nsearch_paths: [templates]").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert_eq!(config.theme.as_deref(), Some("mytheme"));
//! assert_eq!(config.search_paths, vec![temp.path().join("templates")]);
//! ```
//!
//! # Configuration File Locations
//!
//! Merged in this order, later files winning:
//! 1. Project config (`.themeweave/config.yml`)
//! 2. Local overrides (`.themeweave/config.local.yml`)

pub mod build;
pub mod loader;
pub mod merger;
pub mod schema;

pub use schema::{DiscoveryConfig, WeaveConfig};

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, ConfigPaths, CONFIG_DIR,
};

pub use merger::{deep_merge, merge_configs};
