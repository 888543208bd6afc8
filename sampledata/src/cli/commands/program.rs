//! Have the model write a generator program, then optionally edit and run it

use super::{provider, run_and_report, save_script_table, script_runner};
use crate::cli::app::ProgramArgs;
use crate::cli::{form, input, render};
use anyhow::{Context, Result};
use sampledata_core::export::{self, SCRIPT_FILE_NAME};
use sampledata_core::{AppConfig, Session};

pub async fn execute(args: ProgramArgs, config: &AppConfig) -> Result<()> {
    let mut session = Session::new();
    for warning in form::apply(&args.form, &mut session)? {
        render::warning(&warning);
    }

    let approved = session.confirm()?;
    render::info(&format!("Columns: {}", approved.column_names().join(", ")));

    let provider = provider(config)?;
    let script = render::with_spinner(
        "Creating the generator program...",
        session.create_program(&provider),
    )
    .await?
    .to_string();
    render::success("Program created");
    println!("\n{}\n", script);

    if args.edit {
        let edited = input::edit_in_editor(&script).context("Failed to edit the program")?;
        session.edit_script(edited);
        render::info("Using the edited program");
    }

    let path = export::resolve_path(&config.output.directory, args.save.as_deref(), SCRIPT_FILE_NAME);
    if let Some(script) = session.script() {
        export::save_script(&path, script)?;
        render::success(&format!("Saved {}", path.display()));
    }

    if args.run {
        let table = run_and_report(&mut session, &script_runner(config)).await?;
        save_script_table(&table, args.output.as_deref(), config)?;
    }

    Ok(())
}
