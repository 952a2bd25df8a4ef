//! Speech synthesis system

pub mod backends;
pub mod engine;
pub mod session;
pub mod voice;

pub use engine::{create_engine, BackendPreference, Engine};
pub use session::{SpeakOptions, SpeechSession};
pub use voice::{Voice, VoiceCatalog, VoiceSelector};
