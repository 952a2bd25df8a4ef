//! speakeasy - interactive text-to-speech console
//!
//! Type or load text, pick a voice, listen to it, and export it as WAV
//! (local engine) or MP3 (cloud service).

pub mod error;
pub mod export;
pub mod platform;
pub mod shell;
pub mod speech;
pub mod state;

pub use error::{Result, SpeakeasyError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "speakeasy";
