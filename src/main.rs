//! speakeasy main entry point
//!
//! Sets up logging, picks a local speech engine, applies startup defaults
//! from the config file and hands control to the interactive shell.

use log::{debug, error, info, warn};
use speakeasy::export::{CloudService, CloudTts};
use speakeasy::platform::stdout_is_terminal;
use speakeasy::shell::Shell;
use speakeasy::speech::{create_engine, SpeechSession, VoiceSelector};
use speakeasy::state::config::Config;
use speakeasy::Result;
use std::io;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    if debug_mode {
        // Debug mode: write to speakeasy.log
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("speakeasy.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open speakeasy.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "{} version {} starting (debug mode, logging to speakeasy.log)",
            speakeasy::APP_NAME,
            speakeasy::VERSION
        );
    } else {
        // Normal mode: errors only, unless RUST_LOG asks for more
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .parse_default_env()
            .init();
    }

    if let Err(e) = run() {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Apply startup defaults from the config file
///
/// Bad values are logged and skipped; they never stop the program.
fn apply_config(session: &mut SpeechSession, config: &Config) {
    if let Some(rate) = config.rate() {
        if let Err(e) = session.set_rate(rate) {
            warn!("Could not apply configured rate: {}", e);
        }
    }
    if let Some(volume) = config.volume() {
        if let Err(e) = session.set_volume(volume) {
            warn!("Could not apply configured volume: {}", e);
        }
    }
    if let Some(voice) = config.voice() {
        if !session.select_voice(VoiceSelector::Id(voice.clone())) {
            warn!("Configured voice {} not found; keeping {}", voice, session.current_voice_name());
        }
    }
}

fn run() -> Result<()> {
    debug!("Initializing speakeasy");

    let config = Config::load().unwrap_or_else(|e| {
        warn!("{}; using defaults", e);
        eprintln!("Warning: {}; using defaults", e);
        Config::default()
    });
    if let Some(path) = config.path() {
        info!("Config loaded from {:?}", path);
    }

    let engine = create_engine(config.backend())?;
    let mut session = SpeechSession::new(engine);
    apply_config(&mut session, &config);
    info!("Speech engine ready: {}", session.engine_name());

    let cloud: Option<Box<dyn CloudService>> = match CloudTts::new(config.cloud_settings()) {
        Ok(client) => {
            info!("Cloud TTS enabled (lang {})", client.settings().lang);
            Some(Box::new(client))
        }
        Err(e) => {
            info!("Cloud TTS disabled: {}", e);
            println!("Google Text-to-Speech not available: {}", e);
            None
        }
    };

    let stdin = io::stdin();
    let mut shell = Shell::new(stdin.lock(), io::stdout(), session, cloud)
        .with_clear_screen(stdout_is_terminal());
    shell.run()
}
