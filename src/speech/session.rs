//! Speech session controller
//!
//! Owns the local engine, the voice catalog and the session config, and
//! tracks whether something is being spoken. Only one utterance is ever
//! active: a new `speak` stops the previous one first.

use super::{Engine, VoiceCatalog, VoiceSelector};
use crate::state::{validate_rate, validate_volume, SessionConfig, SpeakingState};
use crate::{Result, SpeakeasyError};
use log::{debug, error, info, warn};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Pause after stopping an utterance before starting the next one
pub const STOP_GRACE: Duration = Duration::from_millis(500);

/// How often completion is checked while waiting on the engine
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

type SharedEngine = Arc<Mutex<Box<dyn Engine>>>;

/// Per-call overrides for speaking or exporting
///
/// Unset fields fall back to the session config.
#[derive(Debug, Clone, Default)]
pub struct SpeakOptions {
    pub rate: Option<u16>,
    pub volume: Option<f32>,
    pub voice_id: Option<String>,
    /// Wait for the utterance to finish before returning
    pub blocking: bool,
}

impl SpeakOptions {
    pub fn blocking() -> Self {
        Self {
            blocking: true,
            ..Self::default()
        }
    }

    pub fn background() -> Self {
        Self::default()
    }
}

fn lock_engine(engine: &SharedEngine) -> Result<MutexGuard<'_, Box<dyn Engine>>> {
    engine
        .lock()
        .map_err(|_| "speech engine lock poisoned".into())
}

/// Poll the engine until the utterance tagged `generation` ends
///
/// Returns early if a newer utterance or a stop has superseded it.
fn wait_for_completion(
    engine: &SharedEngine,
    current: &AtomicU64,
    generation: u64,
    poll: Duration,
) -> Result<()> {
    loop {
        if current.load(Ordering::SeqCst) != generation {
            debug!("Utterance {} superseded", generation);
            return Ok(());
        }
        if !lock_engine(engine)?.is_speaking()? {
            debug!("Utterance {} finished", generation);
            return Ok(());
        }
        thread::sleep(poll);
    }
}

/// Mark the session idle, unless a newer utterance has started since
fn finish(speaking: &AtomicBool, current: &AtomicU64, generation: u64) {
    if current.load(Ordering::SeqCst) == generation {
        speaking.store(false, Ordering::SeqCst);
    }
}

/// Speech session controller
pub struct SpeechSession {
    /// The one local engine, shared with the background worker
    engine: SharedEngine,

    /// Voices read from the engine at startup
    catalog: VoiceCatalog,

    /// Current voice, rate and volume
    config: SessionConfig,

    /// Speaking state; cleared by stop or by the worker on completion
    speaking: Arc<AtomicBool>,

    /// Bumped on every start and stop so stale workers can tell
    generation: Arc<AtomicU64>,

    /// Background worker for the last non-blocking utterance
    worker: Option<JoinHandle<()>>,

    grace: Duration,
    poll_interval: Duration,
}

impl SpeechSession {
    /// Take ownership of an engine and read its voices
    ///
    /// The first voice in the catalog becomes the current voice.
    pub fn new(mut engine: Box<dyn Engine>) -> Self {
        let catalog = VoiceCatalog::load(engine.as_mut());
        info!(
            "Speech session using {} engine with {} voices",
            engine.name(),
            catalog.len()
        );

        let mut config = SessionConfig::default();
        config.set_voice_id(catalog.get(0).map(|v| v.id.clone()));

        Self {
            engine: Arc::new(Mutex::new(engine)),
            catalog,
            config,
            speaking: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            worker: None,
            grace: STOP_GRACE,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Override the stop grace period and completion poll interval
    pub fn with_timing(mut self, grace: Duration, poll_interval: Duration) -> Self {
        self.grace = grace;
        self.poll_interval = poll_interval;
        self
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn engine_name(&self) -> &'static str {
        lock_engine(&self.engine)
            .map(|engine| engine.name())
            .unwrap_or("unknown")
    }

    /// Display name of the current voice ("Default" when unset)
    pub fn current_voice_name(&self) -> &str {
        self.catalog.name_of(self.config.voice_id())
    }

    pub fn state(&self) -> SpeakingState {
        if self.speaking.load(Ordering::SeqCst) {
            SpeakingState::Speaking
        } else {
            SpeakingState::Idle
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.state() == SpeakingState::Speaking
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_speaking() {
            Err(SpeakeasyError::Busy)
        } else {
            Ok(())
        }
    }

    /// Change the default rate; refused while speaking or out of range
    pub fn set_rate(&mut self, rate: u16) -> Result<()> {
        self.ensure_idle()?;
        self.config.set_rate(rate)
    }

    /// Change the default volume; refused while speaking or out of range
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.ensure_idle()?;
        self.config.set_volume(volume)
    }

    /// Make a catalog voice the current voice
    ///
    /// Returns false, leaving the current voice alone, for an unknown
    /// voice or while speaking.
    pub fn select_voice(&mut self, selector: VoiceSelector) -> bool {
        if self.is_speaking() {
            warn!("Refusing to change voice while speaking");
            return false;
        }

        match self.catalog.resolve(&selector) {
            Some(voice) => {
                let id = voice.id.clone();
                self.config.set_voice_id(Some(id));
                true
            }
            None => {
                debug!("No voice matches {:?}", selector);
                false
            }
        }
    }

    /// Push effective rate, volume and voice into the engine
    fn apply(&self, engine: &mut dyn Engine, options: &SpeakOptions) -> Result<()> {
        let rate = match options.rate {
            Some(rate) => validate_rate(rate)?,
            None => self.config.rate(),
        };
        let volume = match options.volume {
            Some(volume) => validate_volume(volume)?,
            None => self.config.volume(),
        };

        engine.set_rate(rate)?;
        engine.set_volume(volume)?;
        if let Some(id) = options.voice_id.as_deref().or(self.config.voice_id()) {
            engine.set_voice(id)?;
        }
        Ok(())
    }

    /// Wait for the previous background worker to exit
    fn reap_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("Speech worker panicked");
            }
        }
    }

    /// Speak text
    ///
    /// An utterance already in progress is stopped first, followed by a
    /// short grace period. With `blocking` set this returns once the engine
    /// is done; otherwise a worker thread waits for completion and returns
    /// the session to idle. Poll [`SpeechSession::state`] to observe that.
    pub fn speak(&mut self, text: &str, options: SpeakOptions) -> Result<()> {
        if text.trim().is_empty() {
            debug!("Nothing to speak");
            return Ok(());
        }

        if self.is_speaking() {
            debug!("Replacing active utterance");
            self.stop();
            thread::sleep(self.grace);
        }
        self.reap_worker();

        let generation = {
            let mut engine = lock_engine(&self.engine)?;
            self.apply(engine.as_mut(), &options)?;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            engine.speak(text)?;
            generation
        };
        self.speaking.store(true, Ordering::SeqCst);
        debug!("Utterance {} started ({} chars)", generation, text.chars().count());

        if options.blocking {
            let result =
                wait_for_completion(&self.engine, &self.generation, generation, self.poll_interval);
            finish(&self.speaking, &self.generation, generation);
            return result;
        }

        let engine = Arc::clone(&self.engine);
        let speaking = Arc::clone(&self.speaking);
        let current = Arc::clone(&self.generation);
        let poll = self.poll_interval;

        let handle = thread::Builder::new()
            .name(format!("speech-{}", generation))
            .spawn(move || {
                if let Err(e) = wait_for_completion(&engine, &current, generation, poll) {
                    error!("Error waiting for speech: {}", e);
                }
                finish(&speaking, &current, generation);
            })?;
        self.worker = Some(handle);

        Ok(())
    }

    /// Stop speaking
    ///
    /// Returns false without touching anything when idle.
    pub fn stop(&mut self) -> bool {
        if !self.is_speaking() {
            return false;
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        match lock_engine(&self.engine) {
            Ok(mut engine) => {
                if let Err(e) = engine.stop() {
                    warn!("Engine failed to stop: {}", e);
                }
            }
            Err(e) => warn!("Could not reach engine to stop: {}", e),
        }
        self.speaking.store(false, Ordering::SeqCst);
        debug!("Speech stopped");
        true
    }

    /// Render text to a WAV file with the local engine
    ///
    /// Any running utterance is stopped first.
    pub fn save_to_file(&mut self, text: &str, path: &Path, options: &SpeakOptions) -> Result<()> {
        if self.stop() {
            debug!("Stopped speech to export");
        }
        self.reap_worker();

        let mut engine = lock_engine(&self.engine)?;
        self.apply(engine.as_mut(), options)?;
        engine.save_to_file(text, path)
    }
}

impl Drop for SpeechSession {
    fn drop(&mut self) {
        debug!("Shutting down speech session");
        self.stop();
        self.reap_worker();
    }
}
