//! Apply command-line form arguments to a session

use crate::cli::app::FormArgs;
use anyhow::{Context, Result, anyhow};
use regex_utils::assignment;
use sampledata_core::Session;

/// Fill `session` from the form arguments.
///
/// Returns warnings that should be shown but do not stop the command, such
/// as falling back to the default columns.
pub fn apply(form: &FormArgs, session: &mut Session) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if let Some(columns) = &form.columns {
        if let Some(err) = session.set_columns_input(columns.as_str()) {
            warnings.push(format!(
                "{}. Enter column names separated by commas; using the default columns",
                err
            ));
        }
    }

    for column in &form.exclude {
        session.grid_mut().set_include(column, false)?;
    }

    for pair in &form.granularity {
        let (column, text) = split_pair(pair)?;
        session.grid_mut().set_granularity(&column, text)?;
    }

    for pair in &form.remark {
        let (column, text) = split_pair(pair)?;
        session.grid_mut().set_remark(&column, text)?;
    }

    if let Some(precondition) = &form.precondition {
        session.set_precondition(precondition.as_str());
    }

    session.set_row_count(form.rows).context("Invalid --rows")?;

    Ok(warnings)
}

fn split_pair(pair: &str) -> Result<(String, String)> {
    assignment::split(pair).ok_or_else(|| anyhow!("Expected COLUMN=TEXT, got '{}'", pair))
}
