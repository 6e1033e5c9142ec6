use bizcore::config::{ConfigLoader, LogFormat};
use bizcore::query_builder::Dialect;
use std::env;
use std::path::PathBuf;

fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

/// Environment overrides would mask the files under test.
fn env_overrides_present() -> bool {
    env::var("DATABASE_URL").is_ok() || env::vars().any(|(key, _)| key.starts_with("BIZCORE__"))
}

#[test]
fn test_shipped_base_config_is_valid() {
    if env_overrides_present() {
        return;
    }
    let config = ConfigLoader::new()
        .with_directory(config_dir())
        .with_environment("development")
        .load()
        .unwrap();

    assert_eq!(config.database.dialect().unwrap(), Dialect::Postgres);
    assert_eq!(config.database.max_connections, 10);
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_test_environment_uses_sqlite() {
    if env_overrides_present() {
        return;
    }
    let config = ConfigLoader::new()
        .with_directory(config_dir())
        .with_environment("test")
        .load()
        .unwrap();

    assert_eq!(config.database.dialect().unwrap(), Dialect::Sqlite);
    assert_eq!(config.database.max_connections, 4);
    assert_eq!(config.database.acquire_timeout_seconds, 30);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_production_environment_overrides() {
    if env_overrides_present() {
        return;
    }
    let config = ConfigLoader::new()
        .with_directory(config_dir())
        .with_environment("production")
        .load()
        .unwrap();

    assert_eq!(config.database.max_connections, 25);
    assert_eq!(config.database.min_connections, 2);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.validate().is_ok());
}
