//! Cloud text-to-speech client
//!
//! Talks to the Google Translate speech endpoint, which returns MP3 for at
//! most 100 characters per request. Longer text is split into chunks and
//! the MP3 responses are concatenated into one file.
//!
//! The HTTP client is only compiled with the `cloud` feature. Without it
//! [`CloudTts::new`] reports the service as unavailable.

use crate::{Result, SpeakeasyError};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::time::Duration;

/// Longest text the endpoint accepts in one request
pub const MAX_CHUNK_CHARS: usize = 100;

/// A run of text up to and including sentence punctuation, or a trailing
/// run without any
static SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?;:\n]*[.!?;:]+|[^.!?;:\n]+").expect("valid regex"));

/// Something that can turn text into an MP3 file over the network
pub trait CloudService {
    /// Synthesize `text` and write the MP3 to `path`
    fn save(&self, text: &str, path: &Path) -> Result<()>;
}

/// Cloud client settings
#[derive(Debug, Clone, PartialEq)]
pub struct CloudSettings {
    /// Language tag understood by the service (e.g. "en", "de")
    pub lang: String,
    /// Top-level domain of the Google host, which picks the accent
    pub tld: String,
    /// Slower speech
    pub slow: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            tld: "com".to_string(),
            slow: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Append a piece to the chunk being built, starting a new chunk when it
/// would not fit
fn push_piece(piece: &str, current: &mut String, chunks: &mut Vec<String>, max_chars: usize) {
    let joined = if current.is_empty() {
        piece.chars().count()
    } else {
        current.chars().count() + 1 + piece.chars().count()
    };

    if joined > max_chars && !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
    if !current.is_empty() {
        current.push(' ');
    }
    current.push_str(piece);
}

/// Split text into pieces the endpoint will accept
///
/// Sentences are kept together where they fit, long sentences are split
/// between words, and single words longer than `max_chars` are cut.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in SENTENCE.find_iter(text) {
        let sentence = sentence.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        if sentence.is_empty() {
            continue;
        }

        if sentence.chars().count() <= max_chars {
            push_piece(&sentence, &mut current, &mut chunks, max_chars);
            continue;
        }

        for word in sentence.split(' ') {
            let chars: Vec<char> = word.chars().collect();
            for part in chars.chunks(max_chars) {
                let part: String = part.iter().collect();
                push_piece(&part, &mut current, &mut chunks, max_chars);
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Google Translate text-to-speech client
pub struct CloudTts {
    settings: CloudSettings,

    #[cfg(feature = "cloud")]
    client: reqwest::blocking::Client,
}

impl CloudTts {
    /// Whether this build includes the HTTP client
    pub fn is_available() -> bool {
        cfg!(feature = "cloud")
    }

    /// Create a client
    #[cfg(feature = "cloud")]
    pub fn new(settings: CloudSettings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("speakeasy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        debug!("Cloud TTS client ready ({:?})", settings);
        Ok(Self { settings, client })
    }

    /// Create a client
    #[cfg(not(feature = "cloud"))]
    pub fn new(settings: CloudSettings) -> Result<Self> {
        debug!("Cloud TTS not compiled in; ignoring {:?}", settings);
        Err(SpeakeasyError::CloudUnavailable)
    }

    pub fn settings(&self) -> &CloudSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!("https://translate.google.{}/translate_tts", self.settings.tld)
    }

    #[cfg(feature = "cloud")]
    fn fetch(&self, chunk: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct Query<'a> {
            ie: &'static str,
            q: &'a str,
            tl: &'a str,
            ttsspeed: &'static str,
            total: usize,
            idx: usize,
            client: &'static str,
            textlen: usize,
        }

        let query = Query {
            ie: "UTF-8",
            q: chunk,
            tl: &self.settings.lang,
            ttsspeed: if self.settings.slow { "0.3" } else { "1" },
            total,
            idx,
            client: "tw-ob",
            textlen: chunk.chars().count(),
        };

        debug!("Requesting chunk {}/{} ({} chars)", idx + 1, total, query.textlen);
        let response = self.client.get(self.endpoint()).query(&query).send()?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SpeakeasyError::Cloud(
                "rate limited by the service (HTTP 429); try again later".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(SpeakeasyError::Cloud(format!(
                "request for chunk {} of {} failed with HTTP {}",
                idx + 1,
                total,
                status
            )));
        }

        Ok(response.bytes()?.to_vec())
    }

    #[cfg(not(feature = "cloud"))]
    fn fetch(&self, _chunk: &str, _idx: usize, _total: usize) -> Result<Vec<u8>> {
        Err(SpeakeasyError::CloudUnavailable)
    }
}

impl CloudService for CloudTts {
    fn save(&self, text: &str, path: &Path) -> Result<()> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SpeakeasyError::Cloud("no speakable text".to_string()));
        }

        debug!("Sending {} chunks to {}", chunks.len(), self.endpoint());
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch(chunk, idx, chunks.len())?);
        }

        std::fs::write(path, audio)?;
        Ok(())
    }
}
