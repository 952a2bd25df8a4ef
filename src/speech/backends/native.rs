//! Native TTS backend using the tts crate
//!
//! The `tts` crate gives a unified interface to:
//! - Speech Dispatcher on Linux
//! - AVFoundation on macOS/iOS
//! - WinRT / SAPI on Windows
//!
//! None of those are exposed with a file sink, so this backend can play
//! speech but cannot export it.

use crate::speech::{Engine, Voice};
use crate::{Result, SpeakeasyError};
use log::{debug, error, warn};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tts::Tts as TtsCrate;

/// Words per minute that map onto the platform's normal rate
const NORMAL_WPM: u16 = 150;
const MIN_WPM: u16 = 50;
const MAX_WPM: u16 = 300;

/// Native TTS backend using the tts crate
pub struct NativeEngine {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    /// Set while an utterance started by us has not ended.
    /// Only maintained when the platform reports utterance callbacks.
    active: Option<Arc<AtomicBool>>,
}

impl NativeEngine {
    /// Create a new native TTS engine
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = TtsCrate::default().map_err(|e| {
            SpeakeasyError::EngineUnavailable(format!("Failed to initialize TTS: {}", e))
        })?;

        let active = if tts.supported_features().utterance_callbacks {
            let flag = Arc::new(AtomicBool::new(false));
            let on_end = Arc::clone(&flag);
            let on_stop = Arc::clone(&flag);
            tts.on_utterance_end(Some(Box::new(move |_| on_end.store(false, Ordering::SeqCst))))
                .map_err(|e| SpeakeasyError::Speech(format!("Failed to register callback: {}", e)))?;
            tts.on_utterance_stop(Some(Box::new(move |_| on_stop.store(false, Ordering::SeqCst))))
                .map_err(|e| SpeakeasyError::Speech(format!("Failed to register callback: {}", e)))?;
            Some(flag)
        } else {
            None
        };

        debug!("Native TTS backend created successfully");
        Ok(Self { tts, active })
    }

    /// Map words per minute onto the platform's rate scale
    ///
    /// 150 wpm lands on the platform's normal rate; 50 and 300 land on
    /// its minimum and maximum.
    fn wpm_to_rate(wpm: u16, min: f32, normal: f32, max: f32) -> f32 {
        let wpm = wpm.clamp(MIN_WPM, MAX_WPM);
        if wpm >= NORMAL_WPM {
            let t = f32::from(wpm - NORMAL_WPM) / f32::from(MAX_WPM - NORMAL_WPM);
            normal + (max - normal) * t
        } else {
            let t = f32::from(NORMAL_WPM - wpm) / f32::from(NORMAL_WPM - MIN_WPM);
            normal - (normal - min) * t
        }
    }
}

impl Engine for NativeEngine {
    fn name(&self) -> &'static str {
        "native"
    }

    fn voices(&mut self) -> Result<Vec<Voice>> {
        if !self.tts.supported_features().voice {
            debug!("Voice selection not supported on this platform");
            return Ok(Vec::new());
        }

        let voices = self
            .tts
            .voices()
            .map_err(|e| SpeakeasyError::Speech(format!("Failed to get voices: {}", e)))?;

        Ok(voices
            .iter()
            .map(|v| Voice::new(v.id(), v.name(), vec![v.language().to_string()]))
            .collect())
    }

    fn set_rate(&mut self, wpm: u16) -> Result<()> {
        debug!("Setting rate to {} wpm", wpm);

        if !self.tts.supported_features().rate {
            warn!("Rate control not supported on this platform");
            return Ok(());
        }

        let rate = Self::wpm_to_rate(
            wpm,
            self.tts.min_rate(),
            self.tts.normal_rate(),
            self.tts.max_rate(),
        );
        self.tts
            .set_rate(rate)
            .map_err(|e| SpeakeasyError::Speech(format!("Failed to set rate: {}", e)))?;

        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        debug!("Setting volume to {}", volume);

        if !self.tts.supported_features().volume {
            warn!("Volume control not supported on this platform");
            return Ok(());
        }

        let min = self.tts.min_volume();
        let max = self.tts.max_volume();
        self.tts
            .set_volume(min + (max - min) * volume.clamp(0.0, 1.0))
            .map_err(|e| SpeakeasyError::Speech(format!("Failed to set volume: {}", e)))?;

        Ok(())
    }

    fn set_voice(&mut self, id: &str) -> Result<()> {
        if !self.tts.supported_features().voice {
            warn!("Voice selection not supported on this platform");
            return Ok(());
        }

        let voices = self
            .tts
            .voices()
            .map_err(|e| SpeakeasyError::Speech(format!("Failed to get voices: {}", e)))?;

        match voices.iter().find(|v| v.id() == id) {
            Some(voice) => {
                debug!("Selecting voice: {:?}", voice);
                self.tts
                    .set_voice(voice)
                    .map_err(|e| SpeakeasyError::Speech(format!("Failed to set voice: {}", e)))?;
            }
            None => warn!("Voice {} not offered by the platform", id),
        }

        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        debug!("Speaking {} chars", text.len());
        if let Some(active) = &self.active {
            active.store(true, Ordering::SeqCst);
        }

        self.tts.speak(text, true).map_err(|e| {
            error!("Failed to speak: {}", e);
            if let Some(active) = &self.active {
                active.store(false, Ordering::SeqCst);
            }
            SpeakeasyError::Speech(format!("Speak failed: {}", e))
        })?;

        Ok(())
    }

    fn is_speaking(&mut self) -> Result<bool> {
        if let Some(active) = &self.active {
            return Ok(active.load(Ordering::SeqCst));
        }

        if self.tts.supported_features().is_speaking {
            return self
                .tts
                .is_speaking()
                .map_err(|e| SpeakeasyError::Speech(format!("Failed to query speech: {}", e)));
        }

        Ok(false)
    }

    fn stop(&mut self) -> Result<()> {
        debug!("Stopping speech");
        self.tts.stop().map_err(|e| {
            error!("Failed to stop speech: {}", e);
            SpeakeasyError::Speech(format!("Stop failed: {}", e))
        })?;

        if let Some(active) = &self.active {
            active.store(false, Ordering::SeqCst);
        }

        Ok(())
    }

    fn save_to_file(&mut self, _text: &str, path: &Path) -> Result<()> {
        Err(SpeakeasyError::Speech(format!(
            "The native speech backend cannot write audio files ({}). \
             Install espeak-ng (sudo apt install espeak-ng) to export WAV.",
            path.display()
        )))
    }
}
