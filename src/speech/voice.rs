//! Voice catalog
//!
//! Voices are read from the local engine once, when the session starts,
//! and never refreshed afterwards.

use super::Engine;
use log::{debug, warn};

/// A synthesis voice exposed by the local engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Engine-specific identifier, passed back to the engine on selection
    pub id: String,

    /// Human readable name
    pub name: String,

    /// Locale tags the voice can speak (e.g. "en-us")
    pub languages: Vec<String>,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, languages: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            languages,
        }
    }
}

/// How the user picks a voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelector {
    /// Zero-based position in the catalog
    Index(usize),
    /// Engine voice id
    Id(String),
}

/// Cached, ordered list of engine voices
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    /// Read the voice list from the engine
    ///
    /// A failing engine yields an empty catalog; having no voices is not fatal.
    pub fn load(engine: &mut dyn Engine) -> Self {
        match engine.voices() {
            Ok(voices) => {
                debug!("Loaded {} voices from {} engine", voices.len(), engine.name());
                Self::new(voices)
            }
            Err(e) => {
                warn!("Could not list voices from {} engine: {}", engine.name(), e);
                Self::default()
            }
        }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id == id)
    }

    /// Resolve a selector to a voice in this catalog
    pub fn resolve(&self, selector: &VoiceSelector) -> Option<&Voice> {
        match selector {
            VoiceSelector::Index(idx) => self.get(*idx),
            VoiceSelector::Id(id) => self.find(id),
        }
    }

    /// Display name for a voice id, "Default" when unset or unknown
    pub fn name_of(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.find(id))
            .map(|v| v.name.as_str())
            .unwrap_or("Default")
    }
}
