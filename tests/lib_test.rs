//! Library integration tests.

use themeweave::loader::LoaderError;
use themeweave::WeaveError;

#[test]
fn error_types_are_public() {
    let err = WeaveError::UnresolvedTemplate {
        name: "test.html".into(),
    };
    assert!(err.to_string().contains("test.html"));
}

#[test]
fn not_found_report_includes_loader_error() {
    let err = WeaveError::TemplateNotFound {
        name: "page.html".into(),
        source: LoaderError::NotFound {
            name: "page.html".into(),
            searched: vec!["/srv/templates".into()],
        },
    };
    assert!(err.report().contains("/srv/templates"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> themeweave::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use themeweave::cli::{Cli, Commands};

    let cli = Cli::parse_from(["themeweave", "extensions", "--json"]);

    if let Commands::Extensions(args) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Extensions command");
    }
}

#[test]
fn config_builds_engine() {
    let config = themeweave::config::WeaveConfig::default();
    let mut engine = config.build_engine().unwrap();
    let out = engine
        .render_str("{{ 'hello' | ucfirst }}", &tera::Context::new())
        .unwrap();
    assert_eq!(out, "Hello");
}
