//! Configuration file
//!
//! `~/.speakeasy.cfg` supplies startup defaults only. It is read once and
//! never written: changes made during a session die with the process.
//!
//! ```ini
//! [speech]
//! rate = 180
//! volume = 0.8
//! voice = en-gb
//!
//! [engine]
//! backend = auto
//!
//! [cloud]
//! lang = en
//! tld = com
//! slow = false
//! timeout_secs = 30
//! ```

use super::{validate_rate, validate_volume};
use crate::export::CloudSettings;
use crate::speech::BackendPreference;
use crate::{Result, SpeakeasyError};
use ini::Ini;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Startup configuration
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Where the config came from, if a file existed
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ini: Ini::new(),
            path: None,
        }
    }
}

impl Config {
    /// Load `~/.speakeasy.cfg`, or built-in defaults when it does not exist
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                info!("No config file at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => {
                info!("No home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let ini = Ini::load_from_file(path)
            .map_err(|e| SpeakeasyError::IniParse(format!("Failed to load config: {}", e)))?;

        Ok(Self {
            ini,
            path: Some(path.to_path_buf()),
        })
    }

    /// Config file location (~/.speakeasy.cfg)
    fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".speakeasy.cfg"))
    }

    /// The file this config was read from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get_from(Some(section), key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Parse a value, warning about and skipping anything unparseable
    fn get_parsed<T: std::str::FromStr>(&self, section: &str, key: &str) -> Option<T> {
        let raw = self.get_string(section, key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid [{}] {} = {:?}", section, key, raw);
                None
            }
        }
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_parsed(section, key).unwrap_or(default)
    }

    /// Startup speech rate (words per minute), if configured and valid
    pub fn rate(&self) -> Option<u16> {
        let rate = self.get_parsed("speech", "rate")?;
        validate_rate(rate)
            .map_err(|e| warn!("Ignoring configured rate: {}", e))
            .ok()
    }

    /// Startup volume (0.0-1.0), if configured and valid
    pub fn volume(&self) -> Option<f32> {
        let volume = self.get_parsed("speech", "volume")?;
        validate_volume(volume)
            .map_err(|e| warn!("Ignoring configured volume: {}", e))
            .ok()
    }

    /// Startup voice id
    pub fn voice(&self) -> Option<String> {
        self.get_string("speech", "voice")
    }

    /// Which local engine backend to use
    pub fn backend(&self) -> BackendPreference {
        self.get_string("engine", "backend")
            .and_then(|raw| {
                raw.parse()
                    .map_err(|e| warn!("Ignoring configured backend: {}", e))
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Settings for the cloud text-to-speech client
    pub fn cloud_settings(&self) -> CloudSettings {
        let defaults = CloudSettings::default();
        CloudSettings {
            lang: self.get_string("cloud", "lang").unwrap_or(defaults.lang),
            tld: self.get_string("cloud", "tld").unwrap_or(defaults.tld),
            slow: self.get_bool("cloud", "slow", defaults.slow),
            timeout: self
                .get_parsed::<u64>("cloud", "timeout_secs")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.rate(), None);
        assert_eq!(config.volume(), None);
        assert_eq!(config.voice(), None);
        assert_eq!(config.backend(), BackendPreference::Auto);
        assert!(config.path().is_none());

        let cloud = config.cloud_settings();
        assert_eq!(cloud.lang, "en");
        assert_eq!(cloud.tld, "com");
        assert!(!cloud.slow);
    }

    #[test]
    fn test_load_values() {
        let file = write_config(
            "[speech]\nrate = 200\nvolume = 0.5\nvoice = en-gb\n\
             [engine]\nbackend = espeak\n\
             [cloud]\nlang = de\ntld = de\nslow = true\ntimeout_secs = 5\n",
        );
        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.rate(), Some(200));
        assert_eq!(config.volume(), Some(0.5));
        assert_eq!(config.voice().as_deref(), Some("en-gb"));
        assert_eq!(config.backend(), BackendPreference::Espeak);

        let cloud = config.cloud_settings();
        assert_eq!(cloud.lang, "de");
        assert_eq!(cloud.tld, "de");
        assert!(cloud.slow);
        assert_eq!(cloud.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let file = write_config(
            "[speech]\nrate = 999\nvolume = loud\n[engine]\nbackend = sapi\n[cloud]\nslow = maybe\n",
        );
        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.rate(), None);
        assert_eq!(config.volume(), None);
        assert_eq!(config.backend(), BackendPreference::Auto);
        assert!(!config.cloud_settings().slow);
    }
}
