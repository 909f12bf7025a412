use std::io::Write;

use advent::{Config, config::CompletionBackend};
use time::macros::date;

#[test]
fn test_config_loads_from_file() -> anyhow::Result<()> {
    let dir = temp_dir::TempDir::new()?;
    let path = dir.child("advent.toml");
    let mut file = std::fs::File::create(&path)?;
    writeln!(
        file,
        r#"
[calendar]
start_date = "2025-12-01"
activities = ["Cocoa", "Carol"]

[completion]
backend = "database"
"#
    )?;

    let config = Config::load(Some(path.display().to_string()))?;

    assert_eq!(config.calendar.start_date()?, date!(2025 - 12 - 01));
    assert_eq!(config.calendar.activities, vec!["Cocoa", "Carol"]);
    assert_eq!(config.completion.backend, CompletionBackend::Database);
    assert_eq!(config.session.cookie_name, "advent_session");
    assert!(config.validate().is_ok());

    Ok(())
}

#[test]
fn test_config_defaults_without_file() -> anyhow::Result<()> {
    let config = Config::load(Some("does-not-exist.toml".to_owned()))?;

    assert_eq!(config.calendar.activities.len(), 25);
    assert_eq!(config.calendar.timezone, "UTC");
    assert!(!config.server.host.is_empty());
    assert!(config.validate().is_ok());

    Ok(())
}

fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
    Ok(Config::load_from(Some("does-not-exist.toml".to_owned()), vars(pairs))?)
}

#[test]
fn test_config_binds_all_interfaces_by_default() -> anyhow::Result<()> {
    let config = load(&[])?;

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.observability.log_level, "info");

    Ok(())
}

#[test]
fn test_flask_debug_enables_debug_logging() -> anyhow::Result<()> {
    assert_eq!(load(&[("FLASK_DEBUG", "true")])?.observability.log_level, "debug");
    assert_eq!(load(&[("FLASK_DEBUG", "True")])?.observability.log_level, "debug");
    assert_eq!(load(&[("ADVENT_DEBUG", "true")])?.observability.log_level, "debug");
    assert_eq!(load(&[("FLASK_DEBUG", "false")])?.observability.log_level, "info");

    Ok(())
}

#[test]
fn test_prefixed_variables_override_file() -> anyhow::Result<()> {
    let config = load(&[
        ("ADVENT__DATABASE__URL", "sqlite:prefixed.db"),
        ("ADVENT__SERVER__PORT", "8080"),
        ("ADVENT__COMPLETION__BACKEND", "database"),
    ])?;

    assert_eq!(config.database.url, "sqlite:prefixed.db");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.completion.backend, CompletionBackend::Database);

    Ok(())
}

#[test]
fn test_legacy_variables_win_over_prefixed() -> anyhow::Result<()> {
    let config = load(&[
        ("ADVENT__SESSION__SECRET", "prefixed_secret_key_minimum_32_characters"),
        ("SECRET_KEY", "legacy_secret_key_minimum_32_characters_long"),
        ("ADVENT__CALENDAR__START_DATE", "2030-12-01"),
        ("ADVENT_START_DATE", "2025-11-30"),
        ("ADVENT__DATABASE__URL", "sqlite:prefixed.db"),
        ("DATABASE_URL", "sqlite:legacy.db"),
    ])?;

    assert_eq!(
        config.session.secret,
        "legacy_secret_key_minimum_32_characters_long"
    );
    assert_eq!(config.calendar.start_date()?, date!(2025 - 11 - 30));
    assert_eq!(config.database.url, "sqlite:legacy.db");
    assert!(config.validate().is_ok());

    Ok(())
}

#[test]
fn test_config_path_variable_selects_file() -> anyhow::Result<()> {
    let dir = temp_dir::TempDir::new()?;
    let path = dir.child("from-env.toml");
    std::fs::write(&path, "[server]\nport = 6001\n")?;
    let path = path.display().to_string();

    let config = Config::load_from(None, vars(&[("CONFIG_PATH", path.as_str())]))?;

    assert_eq!(config.server.port, 6001);

    Ok(())
}
