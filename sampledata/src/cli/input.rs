//! Terminal input: prompts, masked API key entry and the external editor

use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, Write};
use std::process::Command;

/// Disables raw mode when dropped so an early return cannot leave the
/// terminal unusable
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode().context("Failed to switch the terminal to raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Print `prompt` and read one line.
///
/// Returns `None` at end of input.
pub fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Read an API key without echoing it. Esc or Ctrl-C cancels.
pub fn read_api_key(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let key = {
        let _guard = RawModeGuard::enable()?;
        read_masked()?
    };
    println!();

    match key {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        Some(_) => bail!("No API key entered"),
        None => bail!("API key entry cancelled"),
    }
}

fn read_masked() -> Result<Option<String>> {
    let mut key = String::new();
    loop {
        let Event::Key(KeyEvent { code, modifiers, kind, .. }) = event::read()? else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        match code {
            KeyCode::Enter => return Ok(Some(key)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(None),
            KeyCode::Backspace => {
                if key.pop().is_some() {
                    print!("\u{8} \u{8}");
                    io::stdout().flush()?;
                }
            }
            KeyCode::Char(c) => {
                key.push(c);
                print!("*");
                io::stdout().flush()?;
            }
            _ => {}
        }
    }
}

fn editor_command() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| if cfg!(windows) { "notepad" } else { "vi" }.to_string())
}

/// Open `text` in the user's editor and return what was saved
pub fn edit_in_editor(text: &str) -> Result<String> {
    edit_with(&editor_command(), text)
}

/// Open `text` with `editor` and return what was saved.
///
/// The editor command may carry arguments, e.g. `code --wait`.
pub fn edit_with(editor: &str, text: &str) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("sampledata-edit-")
        .suffix(".py")
        .tempfile()
        .context("Failed to create a temporary file for editing")?;
    file.write_all(text.as_bytes())?;
    file.flush()?;

    let mut parts = editor.split_whitespace();
    let program = parts.next().context("Editor command is empty")?;

    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to start editor '{}'", editor))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}", editor, status);
    }

    std::fs::read_to_string(file.path()).context("Failed to read the edited file")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_edit_with_returns_saved_text() {
        // `true` exits without touching the file
        let edited = edit_with("true", "print('unchanged')\n").unwrap();
        assert_eq!(edited, "print('unchanged')\n");
    }

    #[test]
    fn test_edit_with_failing_editor() {
        let err = edit_with("false", "x = 1\n").unwrap_err();
        assert!(err.to_string().contains("exited with"));
        assert!(edit_with("   ", "x = 1\n").is_err());
    }
}
