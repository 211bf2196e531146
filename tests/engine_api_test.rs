//! Integration tests for rendering through a configured engine.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use tera::Context;
use themeweave::config::load_config;
use themeweave::engine::TemplateEngine;
use themeweave::extension::{
    Associativity, ExtensionContributor, ExtensionRegistry, OperatorDescriptor, OperatorNode,
};
use themeweave::WeaveError;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const CONFIG: &str = r#"
theme: mytheme
search_paths: [templates]
discovery:
  roots: [themes/mytheme/templates]
globals:
  site_name: Example
host:
  base_path: /site/
  modules: [devel]
  theme_settings:
    mytheme:
      logo: /logo.png
  blocks:
    - module: system
      delta: main-menu
      theme: mytheme
      content: "<ul>menu</ul>"
"#;

/// Project with one search root and a theme whose templates are only
/// reachable through the discovery index.
fn site() -> (TempDir, TemplateEngine) {
    let temp = TempDir::new().unwrap();
    write(temp.path(), ".themeweave/config.yml", CONFIG);
    write(
        temp.path(),
        "themes/mytheme/templates/layout.html",
        "<title>{{ site_name }}</title>{% block content %}{% endblock %}{{ viewblock(delta='main-menu') }}",
    );
    write(
        temp.path(),
        "themes/mytheme/templates/partials/logo.html",
        "<img src=\"{{ theme_get_setting(name='logo') }}\">",
    );
    write(
        temp.path(),
        "templates/page.html",
        r#"{% extends "mytheme::layout.html" %}{% block content %}{% include "mytheme::partials/logo.html" %}<h1>{{ title | ucfirst }}</h1>{% endblock %}"#,
    );

    let config = load_config(temp.path(), None).unwrap();
    let engine = config.build_engine().unwrap();
    (temp, engine)
}

#[test]
fn renders_through_theme_fallbacks_and_host() {
    let (_temp, mut engine) = site();
    let mut context = Context::new();
    context.insert("title", "welcome");

    let out = engine.render("page.html", &context).unwrap();

    assert_eq!(
        out,
        "<title>Example</title><img src=\"/logo.png\"><h1>Welcome</h1><ul>menu</ul>"
    );
    assert_eq!(
        engine.loaded(),
        vec![
            "mytheme::layout.html",
            "mytheme::partials/logo.html",
            "page.html"
        ]
    );
}

#[test]
fn globals_and_builtins_are_visible() {
    let (_temp, mut engine) = site();
    let out = engine
        .render_str(
            "{{ base_path }}|{{ module_exists(module='devel') }}|{{ 1536 | size }}|{{ classname(value=3) }}",
            &Context::new(),
        )
        .unwrap();
    assert_eq!(out, "/site/|true|1.5 KB|integer");
}

#[test]
fn custom_tags_and_operators_render() {
    let (_temp, mut engine) = site();
    let mut context = Context::new();
    context.insert(
        "node",
        &json!({"type": "article", "title": "News", "hidden": false, "#printed": true}),
    );

    let out = engine
        .render_str(
            "{% with node.title as heading %}{{ heading }}{% endwith %}\
             {% switch node.type %}{% case 'page' %}:page{% case 'article', 'blog' %}:post{% endswitch %}\
             {% if !node.hidden && node is property('printed') %}:shown{% endif %}",
            &context,
        )
        .unwrap();
    assert_eq!(out, "News:post:shown");
}

struct ReverseModule;

impl ExtensionContributor for ReverseModule {
    fn name(&self) -> &str {
        "reverse"
    }

    fn contribute(&self, registry: &mut ExtensionRegistry) {
        registry.add_filter(
            "reverse_words",
            Arc::new(|value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
                let text = value.as_str().unwrap_or_default();
                Ok(Value::String(text.split(' ').rev().collect::<Vec<_>>().join(" ")))
            }),
        );
        registry.add_operator(OperatorDescriptor::binary(
            "and_also",
            15,
            Associativity::Left,
            OperatorNode::And,
        ));
        registry.add_global("site_name", json!("Contributed"));
    }
}

#[test]
fn contributors_extend_and_override() {
    let (_temp, mut engine) = site();
    engine.contribute(&ReverseModule);

    assert!(engine.registry().contributors().contains(&"reverse".to_string()));

    let out = engine
        .render_str(
            "{{ 'one two' | reverse_words }}{% if true and_also true %}!{% endif %}",
            &Context::new(),
        )
        .unwrap();
    assert_eq!(out, "two one!");

    // Engine globals from configuration still win over registry globals
    assert_eq!(engine.globals()["site_name"], json!("Example"));
}

#[test]
fn missing_include_is_template_not_found() {
    let (temp, mut engine) = site();
    write(
        temp.path(),
        "templates/broken.html",
        r#"{% include "mytheme::nowhere.html" %}"#,
    );

    match engine.render("broken.html", &Context::new()).unwrap_err() {
        WeaveError::TemplateNotFound { name, .. } => assert_eq!(name, "mytheme::nowhere.html"),
        other => panic!("Expected TemplateNotFound, got {:?}", other),
    }
}

#[test]
fn unclosed_custom_tag_is_a_syntax_error() {
    let (temp, mut engine) = site();
    write(temp.path(), "templates/open.html", "{% with x as y %}");

    assert!(matches!(
        engine.render("open.html", &Context::new()),
        Err(WeaveError::Syntax { ref template, .. }) if template == "open.html"
    ));
}
