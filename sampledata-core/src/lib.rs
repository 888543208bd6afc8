//! Core functionality for sampledata
//!
//! This crate contains the logic behind the sample data generator: the
//! column grid, prompt building, the model client, reply parsing, the
//! generator-script stage and the per-session state that ties them together.

pub mod columns;
pub mod config;
pub mod export;
pub mod llm;
pub mod prompt;
pub mod script;
pub mod session;
pub mod table;

pub use columns::{
    ApprovedColumn, ApprovedSettings, Capacity, ColumnGrid, ColumnParse, ColumnSetting,
    DEFAULT_COLUMNS, MAX_SELECTED_COLUMNS, ValidationError,
};
pub use config::AppConfig;
pub use llm::{AnthropicProvider, CompletionProvider, LLMError, ModelProfile};
pub use script::{ScriptError, ScriptRun, ScriptRunner};
pub use session::{Session, SessionError};
pub use table::{Table, TableOutcome, TableParseError};
