//! Configuration loading tests
//!
//! Tests that the startup config loads correctly
//! and falls back to defaults where it should

use speakeasy::speech::BackendPreference;
use speakeasy::state::config::Config;
use std::io::Write;

#[test]
fn test_config_loads_successfully() {
    // Real home directory; the file may or may not exist
    let config = Config::load().expect("Failed to load config");

    if let Some(path) = config.path() {
        assert!(path.to_string_lossy().contains(".speakeasy.cfg"));
    }

    // Just verify the accessors don't panic
    let _ = config.rate();
    let _ = config.volume();
    let _ = config.voice();
    let _ = config.backend();
    let _ = config.cloud_settings();
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load_from(&dir.path().join("absent.cfg")).is_err());
}

#[test]
fn test_partial_config_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[speech]").unwrap();
    writeln!(file, "voice = de").unwrap();

    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.path(), Some(file.path()));
    assert_eq!(config.voice().as_deref(), Some("de"));
    assert_eq!(config.rate(), None);
    assert_eq!(config.volume(), None);
    assert_eq!(config.backend(), BackendPreference::Auto);
    assert_eq!(config.cloud_settings().lang, "en");
}

#[test]
fn test_blank_values_are_unset() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[speech]\nvoice =\nrate =   \n").unwrap();

    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.voice(), None);
    assert_eq!(config.rate(), None);
}
