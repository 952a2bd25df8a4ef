//! Error types for speakeasy

use std::io;
use thiserror::Error;

/// Main error type for speakeasy
#[derive(Error, Debug)]
pub enum SpeakeasyError {
    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("No speech engine available: {0}")]
    EngineUnavailable(String),

    #[error("Cloud TTS error: {0}")]
    Cloud(String),

    #[error("Cloud TTS not available. Rebuild with: cargo build --features cloud")]
    CloudUnavailable,

    #[error("Speech in progress; stop it before changing settings")]
    Busy,

    #[error("Invalid {name}: {value} (allowed {allowed})")]
    InvalidSetting {
        name: &'static str,
        value: String,
        allowed: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[cfg(feature = "cloud")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for speakeasy operations
pub type Result<T> = std::result::Result<T, SpeakeasyError>;

impl From<&str> for SpeakeasyError {
    fn from(s: &str) -> Self {
        SpeakeasyError::Other(s.to_string())
    }
}
