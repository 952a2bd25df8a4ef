//! Exporting speech to audio files
//!
//! The local engine only writes WAV and the cloud service only writes MP3.
//! Requests for anything else are coerced with a notice to the user.

pub mod cloud;

pub use cloud::{split_text, CloudService, CloudSettings, CloudTts};

use crate::speech::{SpeakOptions, SpeechSession};
use crate::{Result, SpeakeasyError};
use log::{error, info};
use std::io::Write;
use std::path::PathBuf;

/// Audio container written by an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Wav,
    Mp3,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Wav => "wav",
            ExportFormat::Mp3 => "mp3",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = SpeakeasyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "wav" | "wave" => Ok(Self::Wav),
            "mp3" => Ok(Self::Mp3),
            other => Err(SpeakeasyError::Other(format!("unsupported audio format '{}'", other))),
        }
    }
}

/// Which synthesizer renders the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportService {
    /// Offline local engine, WAV output
    Local,
    /// Network service, MP3 output
    Cloud,
}

impl ExportService {
    /// The only format this service can produce
    pub fn native_format(self) -> ExportFormat {
        match self {
            ExportService::Local => ExportFormat::Wav,
            ExportService::Cloud => ExportFormat::Mp3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ExportService::Local => "local TTS",
            ExportService::Cloud => "cloud TTS",
        }
    }
}

/// One export job
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub text: &'a str,
    /// Filename with or without extension
    pub filename: &'a str,
    pub format: ExportFormat,
    pub rate: Option<u16>,
    pub volume: Option<f32>,
    pub voice_id: Option<String>,
    pub service: ExportService,
}

impl<'a> ExportRequest<'a> {
    pub fn new(text: &'a str, filename: &'a str, format: ExportFormat, service: ExportService) -> Self {
        Self {
            text,
            filename,
            format,
            rate: None,
            volume: None,
            voice_id: None,
            service,
        }
    }
}

/// Append the format's extension unless the name already ends with it
///
/// The comparison ignores case, so "Greeting.WAV" is left alone.
pub fn normalize_filename(filename: &str, format: ExportFormat) -> PathBuf {
    let ext = format.extension();
    let suffix = format!(".{}", ext);
    if filename.to_ascii_lowercase().ends_with(&suffix) {
        PathBuf::from(filename)
    } else {
        PathBuf::from(format!("{}{}", filename, suffix))
    }
}

/// Drop a trailing `.ext` for `format`, ignoring case
fn strip_extension(filename: &str, format: ExportFormat) -> &str {
    let suffix = format!(".{}", format.extension());
    if filename.to_ascii_lowercase().ends_with(&suffix) {
        &filename[..filename.len() - suffix.len()]
    } else {
        filename
    }
}

/// Work out the file the service will actually write
///
/// Returns the path and, when the requested format had to be changed, the
/// notice to show the user. On a change, the requested extension is
/// replaced and one already matching the written format is kept as is.
pub fn resolve_target(
    filename: &str,
    requested: ExportFormat,
    service: ExportService,
) -> (PathBuf, Option<String>) {
    let format = service.native_format();
    if requested == format {
        return (normalize_filename(filename, format), None);
    }

    let notice = match service {
        ExportService::Local => "Local TTS engine only supports WAV format. Saving as WAV.",
        ExportService::Cloud => "Cloud TTS only supports MP3 format. Saving as MP3.",
    };
    let stem = strip_extension(filename, requested);
    (normalize_filename(stem, format), Some(notice.to_string()))
}

/// Export speech to a file, returning the written path
pub fn export(
    session: &mut SpeechSession,
    cloud: Option<&dyn CloudService>,
    request: &ExportRequest<'_>,
    out: &mut dyn Write,
) -> Result<PathBuf> {
    if request.text.trim().is_empty() {
        return Err(SpeakeasyError::Other("No text to save!".to_string()));
    }

    let (path, notice) = resolve_target(request.filename, request.format, request.service);
    if let Some(notice) = notice {
        info!("{}", notice);
        writeln!(out, "{}", notice)?;
    }

    match request.service {
        ExportService::Local => {
            let options = SpeakOptions {
                rate: request.rate,
                volume: request.volume,
                voice_id: request.voice_id.clone(),
                blocking: true,
            };
            session.save_to_file(request.text, &path, &options)?;
        }
        ExportService::Cloud => {
            let cloud = cloud.ok_or(SpeakeasyError::CloudUnavailable)?;
            cloud.save(request.text, &path)?;
        }
    }

    Ok(path)
}

/// Export speech to a file, reporting the outcome to the user
///
/// Never fails: every error is printed and logged and comes back as `false`.
pub fn export_to_file(
    session: &mut SpeechSession,
    cloud: Option<&dyn CloudService>,
    request: &ExportRequest<'_>,
    out: &mut dyn Write,
) -> bool {
    let result = export(session, cloud, request, out);
    let message = match &result {
        Ok(path) => {
            info!("Saved {}", path.display());
            format!("File saved successfully: {}", path.display())
        }
        Err(SpeakeasyError::CloudUnavailable) => {
            error!("Cloud export requested but cloud TTS is not available");
            SpeakeasyError::CloudUnavailable.to_string()
        }
        Err(e) => {
            error!("Export with {} failed: {}", request.service.label(), e);
            format!("Error saving file with {}: {}", request.service.label(), e)
        }
    };

    if let Err(e) = writeln!(out, "{}", message) {
        error!("Could not report export result: {}", e);
    }
    result.is_ok()
}
