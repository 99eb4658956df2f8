use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use filetrack::config::{Config, ConfigError};
use filetrack::scanner::{DEFAULT_CHUNK_SIZE, DEFAULT_READ_ATTEMPTS};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config = Config::from_figment(&figment).unwrap();
    assert_eq!(config.max_files, None);
    assert_eq!(config.hasher().read_attempts(), DEFAULT_READ_ATTEMPTS);
    assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    assert_eq!(config.retry_delay_ms, 0);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "max_files = 50\nchunk_size = 8192\nretry_delay_ms = 250\n",
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert_eq!(config.max_files, Some(50));
    assert_eq!(config.chunk_size, 8192);
    assert_eq!(config.retry_delay_ms, 250);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("FILETRACK_TEST_ENV_MAX_FILES", "7");
    std::env::set_var("FILETRACK_TEST_ENV_CHUNK_SIZE", "4096");

    // Separate prefix so concurrently running app tests see no overrides
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("FILETRACK_TEST_ENV_"));
    let config = Config::from_figment(&figment).unwrap();

    assert_eq!(config.max_files, Some(7));
    assert_eq!(config.chunk_size, 4096);

    std::env::remove_var("FILETRACK_TEST_ENV_MAX_FILES");
    std::env::remove_var("FILETRACK_TEST_ENV_CHUNK_SIZE");
}

#[test]
fn test_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "retry_delay_ms = 2\nmax_files = 10\n").unwrap();
    std::env::set_var("FILETRACK_TEST_LAYER_RETRY_DELAY_MS", "9");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("FILETRACK_TEST_LAYER_"));
    let config = Config::from_figment(&figment).unwrap();

    assert_eq!(config.retry_delay_ms, 9);
    assert_eq!(config.max_files, Some(10));

    std::env::remove_var("FILETRACK_TEST_LAYER_RETRY_DELAY_MS");
}

#[test]
fn test_missing_explicit_config_file() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.toml");
    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(p) if p == missing));
}

#[test]
fn test_invalid_toml_type() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_files = \"lots\"\n").unwrap();

    let err = Config::load(Some(&config_path)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_out_of_range_values_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    fs::write(&config_path, "max_files = 0\n").unwrap();
    let err = Config::load(Some(&config_path)).unwrap_err();
    assert!(matches!(err, ConfigError::Value { key: "max_files", .. }));

    fs::write(&config_path, "chunk_size = 0\n").unwrap();
    let err = Config::load(Some(&config_path)).unwrap_err();
    assert!(matches!(err, ConfigError::Value { key: "chunk_size", .. }));
}

#[test]
fn test_read_attempts_cannot_be_lowered() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "read_attempts = 1\n").unwrap();

    let err = Config::load(Some(&config_path)).unwrap_err();
    assert!(matches!(err, ConfigError::Value { key: "read_attempts", .. }));

    std::env::set_var("FILETRACK_TEST_PIN_READ_ATTEMPTS", "1");
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("FILETRACK_TEST_PIN_"));
    let err = Config::from_figment(&figment).unwrap_err();
    assert!(matches!(err, ConfigError::Value { key: "read_attempts", .. }));
    std::env::remove_var("FILETRACK_TEST_PIN_READ_ATTEMPTS");
}
