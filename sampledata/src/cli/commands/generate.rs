//! One-shot table generation

use super::provider;
use crate::cli::app::GenerateArgs;
use crate::cli::{form, render};
use anyhow::Result;
use sampledata_core::export::{self, TABLE_FILE_NAME};
use sampledata_core::{AppConfig, Session, TableOutcome};
use tracing::info;

pub async fn execute(args: GenerateArgs, config: &AppConfig) -> Result<()> {
    let mut session = Session::new();
    for warning in form::apply(&args.form, &mut session)? {
        render::warning(&warning);
    }

    print!("{}", render::format_grid(session.grid()));
    println!("{}", render::selection_summary(session.grid()));

    let provider = provider(config)?;
    let outcome = render::with_spinner(
        "Generating data...",
        session.generate_table(&provider),
    )
    .await?;
    render::print_outcome(outcome);

    if let TableOutcome::Parsed { table, header_replaced } = outcome {
        info!("Header replaced with approved names: {}", header_replaced);
        let path = export::resolve_path(&config.output.directory, args.output.as_deref(), TABLE_FILE_NAME);
        export::save_table(&path, table)?;
        render::success(&format!("Saved {}", path.display()));
    }

    Ok(())
}
