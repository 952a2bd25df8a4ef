//! Local speech engine abstraction
//!
//! Provides a unified interface over the offline synthesizers we can drive.
//! The session controller owns exactly one engine for the life of the process.

use super::Voice;
use crate::platform::is_wsl;
use crate::{Result, SpeakeasyError};
use log::info;
use std::path::Path;

/// Local text-to-speech engine
///
/// Backends hold their own copy of the current rate, volume and voice;
/// the session pushes its settings in before every utterance.
pub trait Engine: Send {
    /// Short backend name for logs and messages
    fn name(&self) -> &'static str;

    /// List the voices this engine can use
    fn voices(&mut self) -> Result<Vec<Voice>>;

    /// Set speech rate in words per minute
    fn set_rate(&mut self, wpm: u16) -> Result<()>;

    /// Set speech volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Select a voice by its engine id
    fn set_voice(&mut self, id: &str) -> Result<()>;

    /// Start speaking text and return without waiting for it to finish
    fn speak(&mut self, text: &str) -> Result<()>;

    /// Is an utterance still playing?
    fn is_speaking(&mut self) -> Result<bool>;

    /// Abort playback and discard anything not yet spoken
    fn stop(&mut self) -> Result<()>;

    /// Synthesize text into a WAV file at `path`
    fn save_to_file(&mut self, text: &str, path: &Path) -> Result<()>;
}

/// Which backend to start with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Try every backend in platform order
    #[default]
    Auto,
    /// espeak-ng subprocess only
    Espeak,
    /// Platform speech API via the tts crate only
    Native,
}

impl std::str::FromStr for BackendPreference {
    type Err = SpeakeasyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            "native" | "tts" => Ok(Self::Native),
            other => Err(SpeakeasyError::Config(format!(
                "unknown engine backend '{}' (expected auto, espeak or native)",
                other
            ))),
        }
    }
}

fn try_espeak() -> Result<Box<dyn Engine>> {
    use super::backends::espeak::EspeakEngine;
    info!("Trying espeak-ng backend...");
    let engine = EspeakEngine::new()?;
    info!("✓ Successfully initialized espeak-ng backend");
    Ok(Box::new(engine))
}

fn try_native() -> Result<Box<dyn Engine>> {
    use super::backends::native::NativeEngine;
    info!("Trying native TTS backend...");
    let engine = NativeEngine::new()?;
    info!("✓ Successfully initialized native TTS backend");
    Ok(Box::new(engine))
}

/// Create a platform-appropriate speech engine
///
/// **Linux (including WSL):**
/// 1. espeak-ng (can also write WAV files)
/// 2. Speech Dispatcher through the tts crate (playback only)
///
/// **macOS / Windows:**
/// 1. Native platform speech through the tts crate
/// 2. espeak-ng, if installed
///
/// A pinned preference tries only that backend.
pub fn create_engine(preference: BackendPreference) -> Result<Box<dyn Engine>> {
    let platform = std::env::consts::OS;

    match preference {
        BackendPreference::Espeak => return try_espeak(),
        BackendPreference::Native => return try_native(),
        BackendPreference::Auto => {}
    }

    if platform == "linux" {
        if is_wsl() {
            info!("Detected WSL environment");
        } else {
            info!("Detected native Linux environment");
        }

        let espeak_err = match try_espeak() {
            Ok(engine) => return Ok(engine),
            Err(e) => {
                info!("✗ espeak-ng backend unavailable: {}", e);
                e
            }
        };

        return try_native().map_err(|e| {
            SpeakeasyError::EngineUnavailable(format!(
                "No speech backend available on Linux. Tried:\n\
                 1. espeak-ng ({})\n\
                 2. Speech Dispatcher (install: sudo apt install speech-dispatcher)\n\
                 Error: {}",
                espeak_err, e
            ))
        });
    }

    info!("Creating native speech engine for platform: {}", platform);
    let native_err = match try_native() {
        Ok(engine) => return Ok(engine),
        Err(e) => {
            info!("✗ Native TTS backend unavailable: {}", e);
            e
        }
    };

    try_espeak().map_err(|e| {
        SpeakeasyError::EngineUnavailable(format!(
            "Failed to initialize speech backend for platform '{}': {}; espeak-ng fallback: {}",
            platform, native_err, e
        ))
    })
}
