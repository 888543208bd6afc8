//! Interactive form session
//!
//! Reads one command per line and applies it to a [`Session`]. Errors are
//! printed and the loop carries on; only `quit` or end of input leave it.

use super::{provider, run_and_report, script_runner};
use crate::cli::{input, render};
use anyhow::{Context, Result, anyhow, bail};
use sampledata_core::export::{self, SCRIPT_FILE_NAME, SCRIPT_TABLE_FILE_NAME, TABLE_FILE_NAME};
use sampledata_core::{AppConfig, CompletionProvider, ScriptRunner, Session, SessionError};
use std::path::PathBuf;
use tracing::debug;

const HELP: &str = "\
Commands (<col> is a row number or a column name):
  show                        show the column settings
  columns <a, b, ...>         replace the column list
  include <col>               include a column
  exclude <col>               leave a column out
  granularity <col> <text>    set the granularity of a column
  remark <col> <text>         set the remark of a column
  add <name>                  add a column row
  remove <col>                remove a column row
  precondition [text]         set or clear the preconditions
  rows <n>                    number of rows to generate
  generate                    generate sample data
  confirm                     confirm the column settings
  program                     create a generator program from the confirmed settings
  script                      show the current program
  edit                        edit the program in $EDITOR
  run                         run the program
  save-table [path]           save the generated data
  save-script [path]          save the program
  save-output [path]          save the data written by the program
  reset                       discard generated results and confirmation
  help                        show this help
  quit                        leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Help,
    Show,
    Columns(String),
    Include(String),
    Exclude(String),
    Granularity { column: String, text: String },
    Remark { column: String, text: String },
    Add(String),
    Remove(String),
    Precondition(String),
    Rows(u32),
    Generate,
    Confirm,
    Program,
    Script,
    Edit,
    Run,
    SaveTable(Option<PathBuf>),
    SaveScript(Option<PathBuf>),
    SaveOutput(Option<PathBuf>),
    Reset,
    Quit,
}

/// Split off the first argument; a double-quoted argument may contain spaces
fn split_first(rest: &str) -> Option<(String, &str)> {
    let rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }
    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        return Some((quoted[..end].to_string(), quoted[end + 1..].trim()));
    }
    match rest.split_once(char::is_whitespace) {
        Some((first, tail)) => Some((first.to_string(), tail.trim())),
        None => Some((rest.to_string(), "")),
    }
}

fn required(rest: &str, usage: &str) -> Result<String> {
    let rest = rest.trim();
    if rest.is_empty() {
        bail!("Usage: {}", usage);
    }
    Ok(rest.to_string())
}

fn column_and_text(rest: &str, usage: &str) -> Result<(String, String)> {
    let (column, text) = split_first(rest).ok_or_else(|| anyhow!("Usage: {}", usage))?;
    Ok((column, text.to_string()))
}

fn optional_path(rest: &str) -> Option<PathBuf> {
    let rest = rest.trim();
    (!rest.is_empty()).then(|| PathBuf::from(rest))
}

impl SessionCommand {
    /// Parse one input line; a blank line is `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let command = match word.to_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "show" => Self::Show,
            "columns" => Self::Columns(rest.trim().to_string()),
            "include" => Self::Include(required(rest, "include <col>")?),
            "exclude" => Self::Exclude(required(rest, "exclude <col>")?),
            "granularity" => {
                let (column, text) = column_and_text(rest, "granularity <col> <text>")?;
                Self::Granularity { column, text }
            }
            "remark" => {
                let (column, text) = column_and_text(rest, "remark <col> <text>")?;
                Self::Remark { column, text }
            }
            "add" => Self::Add(required(rest, "add <name>")?),
            "remove" => Self::Remove(required(rest, "remove <col>")?),
            "precondition" => Self::Precondition(rest.trim().to_string()),
            "rows" => {
                let rows = required(rest, "rows <n>")?;
                Self::Rows(rows.parse().with_context(|| format!("'{}' is not a row count", rows))?)
            }
            "generate" => Self::Generate,
            "confirm" => Self::Confirm,
            "program" => Self::Program,
            "script" => Self::Script,
            "edit" => Self::Edit,
            "run" => Self::Run,
            "save-table" => Self::SaveTable(optional_path(rest)),
            "save-script" => Self::SaveScript(optional_path(rest)),
            "save-output" => Self::SaveOutput(optional_path(rest)),
            "reset" => Self::Reset,
            "quit" | "exit" => Self::Quit,
            other => bail!("Unknown command '{}'. Type 'help' for the list of commands", other),
        };
        Ok(Some(command))
    }
}

fn show(session: &Session) {
    println!("Columns: {}", session.columns_input());
    print!("{}", render::format_grid(session.grid()));
    println!("{}", render::selection_summary(session.grid()));
    if session.precondition().trim().is_empty() {
        println!("Preconditions: (none)");
    } else {
        println!("Preconditions: {}", session.precondition());
    }
    println!("Rows: {}", session.row_count());
    match session.approved() {
        Some(approved) if session.approval_is_stale() => println!(
            "Confirmed: {} (settings changed since)",
            approved.column_names().join(", ")
        ),
        Some(approved) => println!("Confirmed: {}", approved.column_names().join(", ")),
        None => println!("Confirmed: (not yet)"),
    }
}

async fn dispatch<P>(
    command: SessionCommand,
    session: &mut Session,
    provider: &P,
    runner: &ScriptRunner,
    config: &AppConfig,
) -> Result<()>
where
    P: CompletionProvider + ?Sized,
{
    debug!("Session command: {:?}", command);
    let output_dir = &config.output.directory;

    match command {
        SessionCommand::Help => println!("{}", HELP),
        SessionCommand::Show => show(session),
        SessionCommand::Columns(list) => {
            if let Some(err) = session.set_columns_input(list) {
                render::warning(&format!(
                    "{}. Enter column names separated by commas; using the default columns",
                    err
                ));
            }
            show(session);
        }
        SessionCommand::Include(column) => {
            session.grid_mut().set_include(&column, true)?;
            println!("{}", render::selection_summary(session.grid()));
        }
        SessionCommand::Exclude(column) => {
            session.grid_mut().set_include(&column, false)?;
            println!("{}", render::selection_summary(session.grid()));
        }
        SessionCommand::Granularity { column, text } => {
            session.grid_mut().set_granularity(&column, text)?;
        }
        SessionCommand::Remark { column, text } => {
            session.grid_mut().set_remark(&column, text)?;
        }
        SessionCommand::Add(name) => {
            session.grid_mut().add_row(name);
            println!("{}", render::selection_summary(session.grid()));
        }
        SessionCommand::Remove(column) => {
            let removed = session.grid_mut().remove_row(&column)?;
            render::info(&format!("Removed '{}'", removed.name));
            println!("{}", render::selection_summary(session.grid()));
        }
        SessionCommand::Precondition(text) => session.set_precondition(text),
        SessionCommand::Rows(rows) => session.set_row_count(rows)?,
        SessionCommand::Generate => {
            let outcome =
                render::with_spinner("Generating data...", session.generate_table(provider)).await?;
            render::print_outcome(outcome);
        }
        SessionCommand::Confirm => {
            let approved = session.confirm()?;
            render::success(&format!(
                "Column settings confirmed: {}",
                approved.column_names().join(", ")
            ));
        }
        SessionCommand::Program => {
            if session.approval_is_stale() {
                render::warning(
                    "The settings changed after they were confirmed; the program uses the confirmed settings",
                );
            }
            let script = render::with_spinner(
                "Creating the generator program...",
                session.create_program(provider),
            )
            .await?;
            render::success("Program created");
            println!("\n{}\n", script);
        }
        SessionCommand::Script => {
            let script = session.script().ok_or(SessionError::NoScript)?;
            println!("{}", script);
        }
        SessionCommand::Edit => {
            let script = session.script().ok_or(SessionError::NoScript)?;
            let edited = input::edit_in_editor(script)?;
            session.edit_script(edited);
            render::success("Program updated");
        }
        SessionCommand::Run => {
            run_and_report(session, runner).await?;
            render::info("Use 'save-output' to save this data");
        }
        SessionCommand::SaveTable(path) => {
            let table = session
                .table()
                .and_then(|outcome| outcome.table())
                .ok_or_else(|| anyhow!("No generated table to save"))?;
            let path = export::resolve_path(output_dir, path.as_deref(), TABLE_FILE_NAME);
            export::save_table(&path, table)?;
            render::success(&format!("Saved {}", path.display()));
        }
        SessionCommand::SaveScript(path) => {
            let script = session.script().ok_or(SessionError::NoScript)?;
            let path = export::resolve_path(output_dir, path.as_deref(), SCRIPT_FILE_NAME);
            export::save_script(&path, script)?;
            render::success(&format!("Saved {}", path.display()));
        }
        SessionCommand::SaveOutput(path) => {
            let table = session
                .script_table()
                .ok_or_else(|| anyhow!("The program has not produced any data yet"))?;
            let path = export::resolve_path(output_dir, path.as_deref(), SCRIPT_TABLE_FILE_NAME);
            export::save_table(&path, table)?;
            render::success(&format!("Saved {}", path.display()));
        }
        SessionCommand::Reset => {
            session.reset();
            render::info("Generated results cleared");
        }
        SessionCommand::Quit => {}
    }
    Ok(())
}

pub async fn execute(config: &AppConfig) -> Result<()> {
    let provider = provider(config)?;
    let runner = script_runner(config);
    let mut session = Session::new();

    println!("Sample data generator. Type 'help' for commands.\n");
    show(&session);

    loop {
        let Some(line) = input::read_line("\nsampledata> ")? else {
            break;
        };
        match SessionCommand::parse(&line) {
            Ok(None) => continue,
            Ok(Some(SessionCommand::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(e) = dispatch(command, &mut session, &provider, &runner, config).await {
                    render::error(&format!("{:#}", e));
                }
            }
            Err(e) => render::error(&e.to_string()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> SessionCommand {
        SessionCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(SessionCommand::parse("   ").unwrap(), None);
        assert_eq!(parse("GENERATE"), SessionCommand::Generate);
        assert_eq!(parse("exit"), SessionCommand::Quit);
        assert_eq!(
            parse("columns ID, Name , Email"),
            SessionCommand::Columns("ID, Name , Email".to_string())
        );
        assert_eq!(parse("precondition"), SessionCommand::Precondition(String::new()));
        assert_eq!(parse("rows 25"), SessionCommand::Rows(25));
    }

    #[test]
    fn test_parse_column_and_text() {
        assert_eq!(
            parse("remark 3 between 20 and 60"),
            SessionCommand::Remark { column: "3".to_string(), text: "between 20 and 60".to_string() }
        );
        assert_eq!(
            parse("granularity \"Birth date\" day"),
            SessionCommand::Granularity { column: "Birth date".to_string(), text: "day".to_string() }
        );
        assert_eq!(
            parse("remark Age"),
            SessionCommand::Remark { column: "Age".to_string(), text: String::new() }
        );
    }

    #[test]
    fn test_parse_save_paths() {
        assert_eq!(parse("save-table"), SessionCommand::SaveTable(None));
        assert_eq!(
            parse("save-output out/data.csv"),
            SessionCommand::SaveOutput(Some(PathBuf::from("out/data.csv")))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(SessionCommand::parse("frobnicate").is_err());
        assert!(SessionCommand::parse("rows many").is_err());
        assert!(SessionCommand::parse("include").is_err());
        assert!(SessionCommand::parse("remark").is_err());
    }
}
