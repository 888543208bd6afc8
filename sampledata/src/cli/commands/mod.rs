//! Command handlers and the helpers they share

pub mod generate;
pub mod init;
pub mod program;
pub mod run;
pub mod session;

use crate::cli::{input, render};
use anyhow::{Context, Result, bail};
use sampledata_core::export::{self, SCRIPT_TABLE_FILE_NAME};
use sampledata_core::{AnthropicProvider, AppConfig, ScriptRun, ScriptRunner, Session, Table};
use std::path::Path;
use tracing::debug;

/// API key from the environment, or typed in without echo
pub fn obtain_api_key(config: &AppConfig) -> Result<String> {
    if let Some(key) = config.api_key_from_env() {
        debug!("Using API key from {}", config.api.api_key_env);
        return Ok(key);
    }

    render::info(&format!("{} is not set", config.api.api_key_env));
    input::read_api_key("Enter your Anthropic API key: ")
}

pub fn provider(config: &AppConfig) -> Result<AnthropicProvider> {
    let key = obtain_api_key(config)?;
    let provider =
        AnthropicProvider::new(key, &config.api).context("Failed to set up the API client")?;
    debug!("Using endpoint {}", provider.endpoint());
    Ok(provider)
}

pub fn script_runner(config: &AppConfig) -> ScriptRunner {
    ScriptRunner::from_config(&config.script)
}

/// Run the session's script and show what it produced.
///
/// A script that exits non-zero is shown with its error output and turned
/// into an error so one-shot commands exit non-zero.
pub async fn run_and_report(session: &mut Session, runner: &ScriptRunner) -> Result<Table> {
    render::warning(
        "The program runs on this machine with your permissions. Review it before running.",
    );

    let message = format!("Running the program with {} rows...", session.row_count());
    let run = render::with_spinner(&message, session.run_program(runner)).await?;

    match run {
        ScriptRun::Completed { table, stdout } => {
            if !stdout.trim().is_empty() {
                println!("{}", stdout.trim_end());
            }
            render::success("Program finished");
            println!("\nProgram output:");
            print!("{}", render::format_table(&table));
            Ok(table)
        }
        ScriptRun::Failed { exit_code, stderr, stdout } => {
            if !stdout.trim().is_empty() {
                println!("{}", stdout.trim_end());
            }
            render::error("An error occurred while running the program:");
            eprintln!("{}", stderr.trim_end());
            match exit_code {
                Some(code) => bail!("Program exited with status {}", code),
                None => bail!("Program was terminated by a signal"),
            }
        }
    }
}

/// Save a script's table to `output`, or the default name in the output directory
pub fn save_script_table(table: &Table, output: Option<&Path>, config: &AppConfig) -> Result<()> {
    let path = export::resolve_path(&config.output.directory, output, SCRIPT_TABLE_FILE_NAME);
    export::save_table(&path, table)?;
    render::success(&format!("Saved {}", path.display()));
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_and_report_writes_nothing_to_output_dir() {
        let work = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.output.directory = out.path().to_path_buf();

        let mut session = Session::new();
        session.set_row_count(1).unwrap();
        session.edit_script("printf 'ID\\n1\\n' > generated_data.csv\n");

        let table = run_and_report(&mut session, &ScriptRunner::new("sh", work.path())).await.unwrap();
        assert_eq!(table.rows, vec![vec!["1".to_string()]]);
        assert!(!out.path().join(SCRIPT_TABLE_FILE_NAME).exists());

        save_script_table(&table, None, &config).unwrap();
        assert!(out.path().join(SCRIPT_TABLE_FILE_NAME).exists());
    }
}
