//! Local speech engine backends

// espeak-ng subprocess backend (playback and WAV export)
pub mod espeak;

// Platform speech through the tts crate (playback only)
pub mod native;
