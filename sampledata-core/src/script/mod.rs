//! Generator-script stage
//!
//! The model writes a small program, the user may edit it, and the runner
//! executes it as a subprocess and reads back the CSV file it produces.
//!
//! The script is model-generated and user-editable and runs with the full
//! privileges of this process. Nothing here sandboxes it.

pub mod extract;
pub mod runner;

pub use extract::strip_fences;
pub use runner::{ScriptError, ScriptRun, ScriptRunner};

/// File the generated script is told to write, relative to its working directory
pub const SCRIPT_OUTPUT_FILE: &str = "generated_data.csv";
