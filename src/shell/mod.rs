//! Interactive menu shell
//!
//! Presents the numbered menus and turns answers into calls on the speech
//! session and the exporter. Every failure is printed and the loop goes on;
//! only broken terminal I/O ends a session early.

pub mod prompt;

use crate::export::{export_to_file, CloudService, ExportFormat, ExportRequest, ExportService};
use crate::speech::{SpeakOptions, SpeechSession, VoiceSelector};
use crate::state::TextBuffer;
use crate::Result;
use log::{debug, info, warn};
use std::io::{BufRead, Write};

const BANNER: &str = "======================================";

/// The interactive session
pub struct Shell<R, W> {
    input: R,
    output: W,
    session: SpeechSession,
    cloud: Option<Box<dyn CloudService>>,
    text: TextBuffer,
    clear_screen: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(
        input: R,
        output: W,
        session: SpeechSession,
        cloud: Option<Box<dyn CloudService>>,
    ) -> Self {
        Self {
            input,
            output,
            session,
            cloud,
            text: TextBuffer::new(),
            clear_screen: false,
        }
    }

    /// Clear the terminal before each menu
    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    pub fn session(&self) -> &SpeechSession {
        &self.session
    }

    pub fn text(&self) -> &str {
        self.text.contents()
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        prompt::ask(&mut self.input, &mut self.output, prompt)
    }

    fn pause(&mut self) -> Result<()> {
        prompt::pause(&mut self.input, &mut self.output)
    }

    /// Print a message and wait for Enter
    fn notify(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        self.pause()
    }

    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            write!(self.output, "\x1b[2J\x1b[H")?;
        }
        Ok(())
    }

    fn heading(&mut self, title: &str) -> Result<()> {
        self.clear()?;
        writeln!(self.output)?;
        writeln!(self.output, "===== {} =====", title)?;
        Ok(())
    }

    /// Run the main menu until the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        info!("Shell started");

        loop {
            self.clear()?;
            self.print_status()?;

            let choice = match self.ask("Select an option (1-6)")? {
                Some(choice) => choice,
                None => {
                    debug!("Input closed");
                    break;
                }
            };

            match choice.as_str() {
                "1" => self.text_menu()?,
                "2" => self.voice_menu()?,
                "3" => self.speak_current()?,
                "4" => self.save_menu()?,
                "5" => self.settings_menu()?,
                "6" => break,
                other => {
                    debug!("Invalid menu choice {:?}", other);
                    writeln!(self.output)?;
                    self.notify("Invalid choice. Please try again.")?;
                }
            }
        }

        writeln!(self.output, "\nExiting program. Goodbye!")?;
        self.output.flush()?;
        info!("Shell finished");
        Ok(())
    }

    fn print_status(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", BANNER)?;
        writeln!(self.output, "          SPEAKEASY TEXT-TO-SPEECH    ")?;
        writeln!(self.output, "{}", BANNER)?;

        writeln!(self.output, "\nCurrent Status:")?;
        match self.text.preview() {
            Some(preview) => writeln!(self.output, "Text: \"{}\"", preview)?,
            None => writeln!(self.output, "Text: None")?,
        }
        writeln!(self.output, "Voice: {}", self.session.current_voice_name())?;
        writeln!(self.output, "Rate: {}", self.session.config().rate())?;
        writeln!(self.output, "Volume: {:?}", self.session.config().volume())?;

        writeln!(self.output, "\nOptions:")?;
        writeln!(self.output, "1. Enter/Load Text")?;
        writeln!(self.output, "2. Select Voice")?;
        writeln!(self.output, "3. Speak Current Text")?;
        writeln!(self.output, "4. Save to File (WAV/MP3)")?;
        writeln!(self.output, "5. Adjust Settings")?;
        writeln!(self.output, "6. Exit")?;
        Ok(())
    }

    fn text_menu(&mut self) -> Result<()> {
        self.heading("TEXT INPUT OPTIONS")?;
        writeln!(self.output, "1. Enter text now")?;
        writeln!(self.output, "2. Read text from a file")?;
        writeln!(self.output, "3. Back to main menu")?;

        match self.ask("Select an option (1-3)")?.as_deref() {
            Some("1") => {
                writeln!(self.output, "\nEnter your text (type 'END' on a new line to finish):")?;
                self.output.flush()?;
                let entered = prompt::read_until_sentinel(&mut self.input)?;
                if !self.text.replace(entered) {
                    self.notify("No text entered; keeping the current text.")?;
                }
            }
            Some("2") => {
                let Some(path) = self.ask("Enter the path to your text file")? else {
                    return Ok(());
                };
                self.load_file(&path)?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Replace the working text with a file's contents
    ///
    /// Read failures leave the current text untouched.
    fn load_file(&mut self, path: &str) -> Result<()> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                info!("Loaded {} chars from {}", contents.chars().count(), path);
                if !self.text.replace(contents) {
                    self.notify("File is empty; keeping the current text.")?;
                }
            }
            Err(e) => {
                warn!("Could not read {}: {}", path, e);
                self.notify(&format!("Error reading file: {}", e))?;
            }
        }
        Ok(())
    }

    fn voice_menu(&mut self) -> Result<()> {
        self.heading("VOICE SELECTION")?;

        let count = self.session.catalog().len();
        if count == 0 {
            return self.notify("No voices available!");
        }

        writeln!(self.output, "\nAvailable Voices:")?;
        writeln!(self.output, "{}", "-".repeat(50))?;
        for (i, voice) in self.session.catalog().voices().iter().enumerate() {
            writeln!(self.output, "Voice #{}:", i + 1)?;
            writeln!(self.output, "ID: {}", voice.id)?;
            writeln!(self.output, "Name: {}", voice.name)?;
            writeln!(self.output, "Languages: {}", voice.languages.join(", "))?;
            writeln!(self.output, "{}", "-".repeat(50))?;
        }

        let Some(answer) = self.ask(&format!("Select a voice (1-{})", count))? else {
            return Ok(());
        };

        let message = match answer.parse::<usize>() {
            Ok(number) => {
                let selected = number
                    .checked_sub(1)
                    .map(|idx| self.session.select_voice(VoiceSelector::Index(idx)))
                    .unwrap_or(false);
                if selected {
                    format!("Voice set to: {}", self.session.current_voice_name())
                } else {
                    "Invalid selection!".to_string()
                }
            }
            Err(_) => "Invalid input! Please enter a number.".to_string(),
        };

        self.notify(&message)
    }

    fn speak_current(&mut self) -> Result<()> {
        if self.text.is_empty() {
            writeln!(self.output)?;
            return self.notify("No text to speak!");
        }

        writeln!(self.output, "\nSpeaking...")?;
        self.output.flush()?;

        if let Err(e) = self.session.speak(self.text.contents(), SpeakOptions::blocking()) {
            warn!("Speech failed: {}", e);
            self.notify(&format!("Error during speech: {}", e))?;
        }
        Ok(())
    }

    fn save_menu(&mut self) -> Result<()> {
        if self.text.is_empty() {
            return self.notify("No text to save!");
        }

        self.heading("FILE SAVING OPTIONS")?;
        writeln!(self.output, "1. Save as WAV (Local TTS)")?;
        if self.cloud.is_some() {
            writeln!(self.output, "2. Save as MP3 (Google TTS - Internet required)")?;
        } else {
            writeln!(self.output, "2. Save as MP3 (Google TTS - not available)")?;
        }
        writeln!(self.output, "3. Back to main menu")?;

        let (format, service) = match self.ask("Select an option")?.as_deref() {
            Some("1") => (ExportFormat::Wav, ExportService::Local),
            Some("2") => (ExportFormat::Mp3, ExportService::Cloud),
            _ => return Ok(()),
        };

        let filename = match self.ask("Enter filename (without extension)")? {
            Some(name) if !name.is_empty() => name,
            Some(_) => return self.notify("No filename given!"),
            None => return Ok(()),
        };

        let request = ExportRequest::new(self.text.contents(), &filename, format, service);
        export_to_file(
            &mut self.session,
            self.cloud.as_deref(),
            &request,
            &mut self.output,
        );
        self.pause()
    }

    fn settings_menu(&mut self) -> Result<()> {
        self.heading("ADJUST SETTINGS")?;

        if self.session.stop() {
            writeln!(self.output, "Stopped speech to change settings.")?;
        }

        let current_rate = self.session.config().rate();
        if let Some(answer) = self.ask(&format!("Enter speech rate (50-300, current {})", current_rate))? {
            let applied = answer
                .parse::<u16>()
                .map_err(|e| e.to_string())
                .and_then(|rate| self.session.set_rate(rate).map_err(|e| e.to_string()));
            if let Err(reason) = applied {
                debug!("Rejected rate {:?}: {}", answer, reason);
                writeln!(self.output, "Invalid rate! Keeping {}.", current_rate)?;
            }
        }

        let current_volume = self.session.config().volume();
        if let Some(answer) = self.ask(&format!("Enter volume (0.0-1.0, current {:?})", current_volume))? {
            let applied = answer
                .parse::<f32>()
                .map_err(|e| e.to_string())
                .and_then(|volume| self.session.set_volume(volume).map_err(|e| e.to_string()));
            if let Err(reason) = applied {
                debug!("Rejected volume {:?}: {}", answer, reason);
                writeln!(self.output, "Invalid volume! Keeping {:?}.", current_volume)?;
            }
        }

        self.pause()
    }
}
