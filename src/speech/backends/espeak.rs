//! espeak-ng subprocess backend
//!
//! Each utterance runs as its own `espeak-ng` process, so completion is the
//! child exiting and stopping is killing it. This is also the only backend
//! that can render to a WAV file (`espeak-ng -w`).
//!
//! On WSL with WSLg, audio goes through the PulseAudio server exposed at
//! /mnt/wslg/PulseServer.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::platform::is_wsl;
use crate::speech::{Engine, Voice};
use crate::{Result, SpeakeasyError};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// "(en 10)" entries in the Other Languages column
static OTHER_LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^\s()]+)\s+\d+\)").expect("valid regex"));

/// espeak-ng speed limits in words per minute
const MIN_SPEED: u16 = 80;
const MAX_SPEED: u16 = 450;

/// espeak-ng backend
pub struct EspeakEngine {
    /// Currently running espeak-ng process
    current_process: Option<Child>,

    /// Speed in words per minute
    speed: u16,

    /// Amplitude (0-200, 100 is normal)
    amplitude: u8,

    /// Voice name for espeak-ng
    voice: String,

    /// Path to espeak-ng
    espeak_path: String,
}

impl EspeakEngine {
    /// Setup PulseAudio server environment
    ///
    /// Auto-detects the WSLg PulseAudio server and sets PULSE_SERVER if needed.
    fn setup_pulseaudio() -> Result<()> {
        const WSLG_PULSE_PATH: &str = "/mnt/wslg/PulseServer";

        if std::env::var("PULSE_SERVER").is_ok() {
            debug!("PULSE_SERVER already set via environment");
            return Ok(());
        }

        if Path::new(WSLG_PULSE_PATH).exists() {
            info!("Auto-detected WSLG PulseAudio server at {}", WSLG_PULSE_PATH);
            std::env::set_var("PULSE_SERVER", WSLG_PULSE_PATH);
            return Ok(());
        }

        if is_wsl() {
            warn!("WSLG PulseAudio server not found at {}", WSLG_PULSE_PATH);
            warn!("Make sure WSLg is installed and running, or set PULSE_SERVER");
            return Err(SpeakeasyError::EngineUnavailable(
                "PulseAudio server not found. Install WSLg or set PULSE_SERVER environment variable."
                    .to_string(),
            ));
        }

        debug!("PulseAudio will use default configuration");
        Ok(())
    }

    /// Create a new espeak-ng engine
    ///
    /// Verifies espeak-ng is installed and audio output is reachable
    pub fn new() -> Result<Self> {
        debug!("Creating espeak-ng backend");

        Self::setup_pulseaudio()?;

        let espeak_path = Self::find_espeak()?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self {
            current_process: None,
            speed: 150,
            amplitude: 100,
            voice: "en".to_string(),
            espeak_path,
        })
    }

    /// Find espeak-ng executable
    fn find_espeak() -> Result<String> {
        let paths = ["espeak-ng", "/usr/bin/espeak-ng", "/usr/local/bin/espeak-ng"];

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(SpeakeasyError::EngineUnavailable(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Clamp words per minute into espeak's supported speed range
    fn wpm_to_espeak_speed(wpm: u16) -> u16 {
        wpm.clamp(MIN_SPEED, MAX_SPEED)
    }

    /// Convert volume (0.0-1.0) to espeak amplitude (0-200, 100 is normal)
    fn volume_to_espeak_amplitude(volume: f32) -> u8 {
        (volume.clamp(0.0, 2.0) * 100.0).round() as u8
    }

    /// Parse the table printed by `espeak-ng --voices`
    ///
    /// ```text
    /// Pty Language       Age/Gender VoiceName          File                 Other Languages
    ///  5  en-us           --/M      English_(America)  gmw/en-US            (en 10)
    /// ```
    pub fn parse_voice_list(output: &str) -> Vec<Voice> {
        let mut voices: Vec<Voice> = Vec::new();

        for line in output.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 || fields[0] == "Pty" || fields[0].parse::<u32>().is_err() {
                continue;
            }

            let id = fields[1];
            if voices.iter().any(|v| v.id == id) {
                continue;
            }

            let mut languages = vec![id.to_string()];
            let rest = fields[5..].join(" ");
            for caps in OTHER_LANGUAGE.captures_iter(&rest) {
                let lang = caps[1].to_string();
                if !languages.contains(&lang) {
                    languages.push(lang);
                }
            }

            voices.push(Voice::new(id, fields[3].replace('_', " "), languages));
        }

        voices
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.espeak_path);
        cmd.arg("-v").arg(&self.voice);
        cmd.arg("-s").arg(Self::wpm_to_espeak_speed(self.speed).to_string());
        cmd.arg("-a").arg(self.amplitude.to_string());
        cmd.arg("--stdin");
        cmd.stdin(Stdio::piped());
        cmd
    }

    /// Hand text to a spawned espeak-ng over stdin
    fn feed(child: &mut Child, text: &str) -> Result<()> {
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    /// Feed text to a fresh process, killing and reaping it if that fails
    fn feed_or_kill(child: &mut Child, text: &str) -> Result<()> {
        if let Err(e) = Self::feed(child, text) {
            debug!("Failed to feed espeak-ng, killing it: {}", e);
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
        Ok(())
    }

    /// Kill any currently running speech process
    fn cancel_process(&mut self) {
        if let Some(mut child) = self.current_process.take() {
            debug!("Killing espeak-ng process");
            match child.kill() {
                Ok(_) => {
                    let _ = child.wait();
                }
                Err(e) => {
                    debug!("Failed to kill espeak-ng process: {}", e);
                }
            }
        }
    }
}

impl Engine for EspeakEngine {
    fn name(&self) -> &'static str {
        "espeak-ng"
    }

    fn voices(&mut self) -> Result<Vec<Voice>> {
        let output = Command::new(&self.espeak_path)
            .arg("--voices")
            .stderr(Stdio::null())
            .output()
            .map_err(|e| SpeakeasyError::Speech(format!("Failed to list voices: {}", e)))?;

        if !output.status.success() {
            return Err(SpeakeasyError::Speech(format!(
                "espeak-ng --voices exited with {}",
                output.status
            )));
        }

        Ok(Self::parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn set_rate(&mut self, wpm: u16) -> Result<()> {
        debug!("Setting rate to {} wpm", wpm);
        self.speed = wpm;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        debug!("Setting volume to {}", volume);
        self.amplitude = Self::volume_to_espeak_amplitude(volume);
        Ok(())
    }

    fn set_voice(&mut self, id: &str) -> Result<()> {
        debug!("Setting voice to {}", id);
        self.voice = id.to_string();
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        self.cancel_process();
        debug!("Speaking {} chars", text.len());

        let mut cmd = self.base_command();
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(|e| {
            error!("Failed to spawn espeak-ng: {}", e);
            SpeakeasyError::Speech(format!("Failed to start espeak-ng: {}", e))
        })?;

        Self::feed_or_kill(&mut child, text)?;

        self.current_process = Some(child);
        debug!("espeak-ng process started");
        Ok(())
    }

    fn is_speaking(&mut self) -> Result<bool> {
        let Some(child) = self.current_process.as_mut() else {
            return Ok(false);
        };

        match child.try_wait()? {
            Some(status) => {
                debug!("espeak-ng finished with {}", status);
                self.current_process = None;
                Ok(false)
            }
            None => Ok(true),
        }
    }

    fn stop(&mut self) -> Result<()> {
        debug!("Stopping speech");
        self.cancel_process();
        Ok(())
    }

    fn save_to_file(&mut self, text: &str, path: &Path) -> Result<()> {
        debug!("Writing speech to {}", path.display());

        let mut cmd = self.base_command();
        cmd.arg("-w").arg(path);
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| SpeakeasyError::Speech(format!("Failed to start espeak-ng: {}", e)))?;
        Self::feed_or_kill(&mut child, text)?;
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeakeasyError::Speech(format!(
                "espeak-ng failed to write {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl Drop for EspeakEngine {
    fn drop(&mut self) {
        debug!("Shutting down espeak-ng backend");
        self.cancel_process();
    }
}
