//! Scripted engine shared by the integration tests

#![allow(dead_code)]

use speakeasy::speech::{Engine, SpeechSession, Voice};
use speakeasy::{Result, SpeakeasyError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What the session asked the engine to do
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Rate(u16),
    Volume(f32),
    Voice(String),
    Speak(String),
    Stop,
    Save(String),
}

#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<Call>,
    /// Polls left before the current utterance ends; `None` when idle
    pub remaining: Option<u32>,
    /// Set if speak was called while an utterance was still playing
    pub overlapped: bool,
    pub fail_save: bool,
}

impl MockState {
    pub fn spoken(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Speak(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Engine whose utterances last a fixed number of `is_speaking` polls
pub struct MockEngine {
    voices: Vec<Voice>,
    polls_per_utterance: u32,
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    pub fn new(voices: Vec<Voice>, polls_per_utterance: u32) -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState::default()));
        let engine = Self {
            voices,
            polls_per_utterance,
            state: Arc::clone(&state),
        };
        (engine, state)
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Engine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn voices(&mut self) -> Result<Vec<Voice>> {
        Ok(self.voices.clone())
    }

    fn set_rate(&mut self, wpm: u16) -> Result<()> {
        self.record(Call::Rate(wpm));
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.record(Call::Volume(volume));
        Ok(())
    }

    fn set_voice(&mut self, id: &str) -> Result<()> {
        self.record(Call::Voice(id.to_string()));
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.remaining.is_some() {
            state.overlapped = true;
        }
        state.calls.push(Call::Speak(text.to_string()));
        state.remaining = Some(self.polls_per_utterance);
        Ok(())
    }

    fn is_speaking(&mut self) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.remaining {
            Some(0) | None => {
                state.remaining = None;
                Ok(false)
            }
            Some(n) => {
                state.remaining = Some(n - 1);
                Ok(true)
            }
        }
    }

    fn stop(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Stop);
        state.remaining = None;
        Ok(())
    }

    fn save_to_file(&mut self, text: &str, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Save(text.to_string()));
        if state.fail_save {
            return Err(SpeakeasyError::Speech("disk on fire".to_string()));
        }
        std::fs::write(path, b"RIFF....WAVE")?;
        Ok(())
    }
}

pub fn voices() -> Vec<Voice> {
    vec![
        Voice::new("en-us", "English (America)", vec!["en-us".into(), "en".into()]),
        Voice::new("en-gb", "English (Great Britain)", vec!["en-gb".into()]),
        Voice::new("de", "German", vec!["de".into()]),
    ]
}

/// Session over a mock engine with fast timing
pub fn session(polls_per_utterance: u32) -> (SpeechSession, Arc<Mutex<MockState>>) {
    let (engine, state) = MockEngine::new(voices(), polls_per_utterance);
    let session = SpeechSession::new(Box::new(engine))
        .with_timing(Duration::from_millis(5), Duration::from_millis(2));
    (session, state)
}

/// Poll until `check` holds or two seconds pass
pub fn wait_until(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    check()
}
