//! Saving tables and scripts for the user to take away

use crate::table::Table;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default file name for a table generated directly by the model
pub const TABLE_FILE_NAME: &str = "sample_data.csv";

/// Default file name for the generator script
pub const SCRIPT_FILE_NAME: &str = "generate_sample_data.py";

/// Default file name for the table produced by running the script
pub const SCRIPT_TABLE_FILE_NAME: &str = "script_output.csv";

/// Explicit path if given, otherwise `default_name` inside `directory`
pub fn resolve_path(directory: &Path, explicit: Option<&Path>, default_name: &str) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => directory.join(default_name),
    }
}

pub fn save_table(path: &Path, table: &Table) -> Result<()> {
    write_text(path, &table.to_csv())
        .with_context(|| format!("Failed to save table to {}", path.display()))?;
    info!("Saved {} rows to {}", table.row_count(), path.display());
    Ok(())
}

pub fn save_script(path: &Path, script: &str) -> Result<()> {
    let mut content = script.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    write_text(path, &content)
        .with_context(|| format!("Failed to save script to {}", path.display()))?;
    info!("Saved script to {}", path.display());
    Ok(())
}

fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}
