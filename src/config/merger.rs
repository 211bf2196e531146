//! Layering of YAML configuration values.
//!
//! `config.local.yml` is laid over `config.yml`:
//!
//! - Mappings merge key by key
//! - Sequences are replaced whole, so a local `search_paths` replaces the
//!   project list instead of extending it
//! - A `null` in the overlay deletes the key
//! - An empty overlay file changes nothing

use serde_yaml::Value;

/// Lay `overlay` over `base`.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut merged = base_map.clone();

            for (key, value) in overlay_map {
                if value.is_null() {
                    merged.remove(key);
                } else if let Some(existing) = base_map.get(key) {
                    merged.insert(key.clone(), deep_merge(existing, value));
                } else {
                    merged.insert(key.clone(), value.clone());
                }
            }

            Value::Mapping(merged)
        }
        (base, Value::Null) => base.clone(),
        (_, overlay) => overlay.clone(),
    }
}

/// Merge layers in order, the last one winning.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .fold(Value::Mapping(Default::default()), |merged, layer| {
            deep_merge(&merged, layer)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn local_theme_overrides_project_theme() {
        let base = yaml("theme: mytheme\nsearch_paths: [templates]");
        let overlay = yaml("theme: admin");

        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged["theme"], "admin");
        assert_eq!(merged["search_paths"][0], "templates");
    }

    #[test]
    fn search_paths_are_replaced() {
        let base = yaml("search_paths: [templates, shared]");
        let overlay = yaml("search_paths: [local]");

        let merged = deep_merge(&base, &overlay);
        let paths = merged["search_paths"].as_sequence().unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0], "local");
    }

    #[test]
    fn host_section_merges_by_key() {
        let base = yaml(
            r#"
host:
  base_url: https://example.com
  variables:
    site_name: Example
    slogan: Hi
"#,
        );
        let overlay = yaml(
            r#"
host:
  base_url: http://localhost:8080
  variables:
    slogan: null
"#,
        );

        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged["host"]["base_url"], "http://localhost:8080");
        assert_eq!(merged["host"]["variables"]["site_name"], "Example");
        assert!(merged["host"]["variables"].get("slogan").is_none());
    }

    #[test]
    fn empty_overlay_keeps_base() {
        let base = yaml("theme: mytheme");
        let merged = merge_configs(&[base, yaml("")]);
        assert_eq!(merged["theme"], "mytheme");
    }

    #[test]
    fn scalar_replaces_mapping() {
        let merged = deep_merge(&yaml("discovery:\n  roots: [a]"), &yaml("discovery: off"));
        assert_eq!(merged["discovery"], "off");
    }

    #[test]
    fn layers_apply_in_order() {
        let merged = merge_configs(&[
            yaml("theme: a\nautoescape: false"),
            yaml("theme: b"),
            yaml("autoescape: true"),
        ]);
        assert_eq!(merged["theme"], "b");
        assert_eq!(merged["autoescape"], true);
    }

    #[test]
    fn no_layers_is_empty_mapping() {
        assert!(merge_configs(&[]).as_mapping().unwrap().is_empty());
    }
}
