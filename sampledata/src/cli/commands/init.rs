//! Write a configuration file with the default settings

use crate::cli::app::InitArgs;
use crate::cli::render;
use anyhow::{Result, bail};
use sampledata_core::AppConfig;

pub fn execute(args: &InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.path.display());
    }

    AppConfig::default().save(&args.path)?;
    render::success(&format!("Wrote {}", args.path.display()));
    Ok(())
}
