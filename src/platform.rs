//! Platform detection utilities

use std::fs;
use std::io::IsTerminal;

/// Does a /proc/version string belong to a WSL kernel?
fn is_wsl_kernel(version: &str) -> bool {
    let lower = version.to_lowercase();
    lower.contains("microsoft") || lower.contains("wsl")
}

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// WSL needs its PulseAudio server located before espeak-ng can play audio.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        if is_wsl_kernel(&contents) {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

/// Is stdout attached to a terminal (so screen clearing makes sense)?
pub fn stdout_is_terminal() -> bool {
    std::io::stdout().is_terminal()
}
