//! Menu shell tests
//!
//! Feed scripted keyboard input through the shell and check the resulting
//! session state and printed output.

mod common;

use common::{session, MockState};
use speakeasy::export::CloudService;
use speakeasy::shell::Shell;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

type TestShell = Shell<Cursor<String>, Vec<u8>>;

fn run_script(script: &str) -> (TestShell, Arc<Mutex<MockState>>) {
    run_with_cloud(script, None)
}

fn run_with_cloud(
    script: &str,
    cloud: Option<Box<dyn CloudService>>,
) -> (TestShell, Arc<Mutex<MockState>>) {
    let (session, state) = session(1);
    let mut shell = Shell::new(Cursor::new(script.to_string()), Vec::new(), session, cloud);
    shell.run().expect("shell should finish cleanly");
    (shell, state)
}

fn output(shell: &TestShell) -> String {
    String::from_utf8(shell.output().clone()).unwrap()
}

#[test]
fn test_exit_and_end_of_input() {
    let (shell, _) = run_script("6\n");
    assert!(output(&shell).contains("Goodbye!"));

    let (shell, _) = run_script("");
    assert!(output(&shell).contains("Goodbye!"));
}

#[test]
fn test_status_shows_defaults() {
    let (shell, _) = run_script("6\n");
    let out = output(&shell);
    assert!(out.contains("Text: None"));
    assert!(out.contains("Voice: English (America)"));
    assert!(out.contains("Rate: 150"));
    assert!(out.contains("Volume: 1.0"));
}

#[test]
fn test_enter_multiline_text() {
    let (shell, _) = run_script("1\n1\nHello world\nsecond line\nEND\n6\n");
    assert_eq!(shell.text(), "Hello world\nsecond line");
}

#[test]
fn test_long_text_preview_is_truncated() {
    let long = "a".repeat(60);
    let (shell, _) = run_script(&format!("1\n1\n{}\nEND\n6\n", long));
    assert!(output(&shell).contains(&format!("Text: \"{}...\"", "a".repeat(50))));
}

#[test]
fn test_load_text_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speech.txt");
    std::fs::write(&path, "Four score\nand seven years ago").unwrap();

    let (shell, _) = run_script(&format!("1\n2\n{}\n6\n", path.display()));
    assert_eq!(shell.text(), "Four score\nand seven years ago");
}

#[test]
fn test_missing_file_keeps_text() {
    let script = "1\n1\nkeep me\nEND\n1\n2\n/definitely/not/here.txt\n\n6\n";
    let (shell, _) = run_script(script);

    assert_eq!(shell.text(), "keep me");
    assert!(output(&shell).contains("Error reading file:"));
}

#[test]
fn test_invalid_settings_are_rejected() {
    let (shell, _) = run_script("5\n999\n2.5\n\n6\n");
    let out = output(&shell);

    assert_eq!(shell.session().config().rate(), 150);
    assert_eq!(shell.session().config().volume(), 1.0);
    assert!(out.contains("Invalid rate! Keeping 150."));
    assert!(out.contains("Invalid volume! Keeping 1.0."));
}

#[test]
fn test_non_numeric_settings_are_rejected() {
    let (shell, _) = run_script("5\nfast\nloud\n\n6\n");
    assert_eq!(shell.session().config().rate(), 150);
    assert_eq!(shell.session().config().volume(), 1.0);
}

#[test]
fn test_valid_settings_are_applied() {
    let (shell, _) = run_script("5\n220\n0.5\n\n6\n");
    assert_eq!(shell.session().config().rate(), 220);
    assert_eq!(shell.session().config().volume(), 0.5);
    assert!(output(&shell).contains("Rate: 220"));
}

#[test]
fn test_voice_selection() {
    let (shell, _) = run_script("2\n3\n\n6\n");
    assert_eq!(shell.session().config().voice_id(), Some("de"));
    assert!(output(&shell).contains("Voice set to: German"));
}

#[test]
fn test_invalid_voice_selection() {
    let (shell, _) = run_script("2\n4\n\n2\n0\n\n2\nabc\n\n6\n");
    let out = output(&shell);

    assert_eq!(shell.session().config().voice_id(), Some("en-us"));
    assert_eq!(out.matches("Invalid selection!").count(), 2);
    assert!(out.contains("Invalid input! Please enter a number."));
}

#[test]
fn test_speak_requires_text() {
    let (shell, state) = run_script("3\n\n6\n");
    assert!(output(&shell).contains("No text to speak!"));
    assert!(state.lock().unwrap().spoken().is_empty());
}

#[test]
fn test_speak_current_text() {
    let (shell, state) = run_script("1\n1\nSay this\nEND\n3\n6\n");
    assert!(output(&shell).contains("Speaking..."));
    assert_eq!(state.lock().unwrap().spoken(), vec!["Say this"]);
    assert!(!shell.session().is_speaking());
}

#[test]
fn test_invalid_menu_choice() {
    let (shell, _) = run_script("9\n\n6\n");
    assert!(output(&shell).contains("Invalid choice. Please try again."));
}

#[test]
fn test_save_requires_text() {
    let (shell, _) = run_script("4\n\n6\n");
    assert!(output(&shell).contains("No text to save!"));
}

#[test]
fn test_save_wav_from_menu() {
    let dir = tempfile::tempdir().unwrap();
    let stem = dir.path().join("menu");
    let script = format!("1\n1\nSave me\nEND\n4\n1\n{}\n\n6\n", stem.display());

    let (shell, _) = run_script(&script);
    assert!(dir.path().join("menu.wav").exists());
    assert!(output(&shell).contains("File saved successfully"));
}

#[test]
fn test_save_mp3_without_cloud() {
    let dir = tempfile::tempdir().unwrap();
    let stem = dir.path().join("menu");
    let script = format!("1\n1\nSave me\nEND\n4\n2\n{}\n\n6\n", stem.display());

    let (shell, _) = run_script(&script);
    let out = output(&shell);
    assert!(out.contains("not available"));
    assert!(out.contains("Cloud TTS not available"));
    assert!(!dir.path().join("menu.mp3").exists());
}

#[test]
fn test_save_mp3_with_cloud() {
    struct StubCloud;

    impl CloudService for StubCloud {
        fn save(&self, _text: &str, path: &std::path::Path) -> speakeasy::Result<()> {
            std::fs::write(path, b"ID3")?;
            Ok(())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let stem = dir.path().join("menu");
    let script = format!("1\n1\nSave me\nEND\n4\n2\n{}\n\n6\n", stem.display());

    let (shell, _) = run_with_cloud(&script, Some(Box::new(StubCloud)));
    assert!(dir.path().join("menu.mp3").exists());
    assert!(output(&shell).contains("Internet required"));
}
