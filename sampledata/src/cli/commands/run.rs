//! Run a generator program that is already on disk

use super::{run_and_report, save_script_table, script_runner};
use crate::cli::app::RunArgs;
use anyhow::{Context, Result};
use sampledata_core::{AppConfig, Session};

pub async fn execute(args: RunArgs, config: &AppConfig) -> Result<()> {
    let source = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("Failed to read {}", args.script.display()))?;

    let mut session = Session::new();
    session.edit_script(source);
    session.set_row_count(args.rows)?;

    let table = run_and_report(&mut session, &script_runner(config)).await?;
    save_script_table(&table, args.output.as_deref(), config)
}
