//! Session state
//!
//! Everything here lives only in process memory and is dropped at exit.

pub mod config;

use crate::{Result, SpeakeasyError};
use log::debug;
use std::ops::RangeInclusive;

/// Allowed speech rate in words per minute
pub const RATE_RANGE: RangeInclusive<u16> = 50..=300;

/// Allowed volume
pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;

pub const DEFAULT_RATE: u16 = 150;
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Check a rate against [`RATE_RANGE`]
pub fn validate_rate(rate: u16) -> Result<u16> {
    if RATE_RANGE.contains(&rate) {
        Ok(rate)
    } else {
        Err(SpeakeasyError::InvalidSetting {
            name: "rate",
            value: rate.to_string(),
            allowed: "50-300",
        })
    }
}

/// Check a volume against [`VOLUME_RANGE`]; NaN is rejected
pub fn validate_volume(volume: f32) -> Result<f32> {
    if VOLUME_RANGE.contains(&volume) {
        Ok(volume)
    } else {
        Err(SpeakeasyError::InvalidSetting {
            name: "volume",
            value: volume.to_string(),
            allowed: "0.0-1.0",
        })
    }
}

/// Voice, rate and volume defaults for the current run
///
/// Setters validate first, so an instance never holds an out-of-range value.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    voice_id: Option<String>,
    rate: u16,
    volume: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            voice_id: None,
            rate: DEFAULT_RATE,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl SessionConfig {
    pub fn voice_id(&self) -> Option<&str> {
        self.voice_id.as_deref()
    }

    pub fn rate(&self) -> u16 {
        self.rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_voice_id(&mut self, id: Option<String>) {
        debug!("Current voice: {:?}", id);
        self.voice_id = id;
    }

    /// Set the rate; out-of-range values leave the previous rate in place
    pub fn set_rate(&mut self, rate: u16) -> Result<()> {
        self.rate = validate_rate(rate)?;
        debug!("Rate set to {}", self.rate);
        Ok(())
    }

    /// Set the volume; out-of-range values leave the previous volume in place
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = validate_volume(volume)?;
        debug!("Volume set to {}", self.volume);
        Ok(())
    }
}

/// Whether the session currently has an utterance playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakingState {
    Idle,
    Speaking,
}

/// Number of characters shown in the text preview
pub const PREVIEW_CHARS: usize = 50;

/// The working text
///
/// Replaced wholesale by entry and load actions, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the buffer; empty text is ignored and reported as `false`
    pub fn replace(&mut self, text: String) -> bool {
        if text.is_empty() {
            return false;
        }
        debug!("Text buffer replaced: {} chars", text.chars().count());
        self.text = text;
        true
    }

    /// First 50 characters, with "..." appended when the text is longer
    pub fn preview(&self) -> Option<String> {
        if self.text.is_empty() {
            return None;
        }

        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            Some(format!("{}...", head))
        } else {
            Some(head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.rate(), 150);
        assert_eq!(config.volume(), 1.0);
        assert_eq!(config.voice_id(), None);
    }

    #[test]
    fn test_out_of_range_rate_keeps_previous() {
        let mut config = SessionConfig::default();
        config.set_rate(220).unwrap();

        for bad in [0, 49, 301, 1000, u16::MAX] {
            assert!(config.set_rate(bad).is_err(), "rate {} accepted", bad);
            assert_eq!(config.rate(), 220);
        }

        config.set_rate(50).unwrap();
        config.set_rate(300).unwrap();
        assert_eq!(config.rate(), 300);
    }

    #[test]
    fn test_out_of_range_volume_keeps_previous() {
        let mut config = SessionConfig::default();
        config.set_volume(0.4).unwrap();

        for bad in [-0.1, 1.01, 7.0, f32::NAN, f32::INFINITY] {
            assert!(config.set_volume(bad).is_err(), "volume {} accepted", bad);
            assert_eq!(config.volume(), 0.4);
        }

        config.set_volume(0.0).unwrap();
        assert_eq!(config.volume(), 0.0);
    }

    #[test]
    fn test_preview() {
        let mut buffer = TextBuffer::new();
        assert_eq!(buffer.preview(), None);

        buffer.replace("short".to_string());
        assert_eq!(buffer.preview().unwrap(), "short");

        buffer.replace("x".repeat(50));
        assert_eq!(buffer.preview().unwrap(), "x".repeat(50));

        buffer.replace("é".repeat(51));
        assert_eq!(buffer.preview().unwrap(), format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn test_replace_ignores_empty() {
        let mut buffer = TextBuffer::new();
        assert!(buffer.replace("first\nsecond".to_string()));
        assert!(!buffer.replace(String::new()));
        assert_eq!(buffer.contents(), "first\nsecond");
    }
}
