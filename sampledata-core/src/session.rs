//! Per-session state
//!
//! Everything the user has entered or generated lives in one [`Session`]
//! value that the front end owns and passes through each interaction.
//! Nothing is shared between sessions or persisted.

use crate::columns::{
    ApprovedSettings, Capacity, ColumnGrid, ColumnParse, ValidationError, default_columns_input,
};
use crate::llm::{CompletionProvider, LLMError, SCRIPT_PROFILE, TABLE_PROFILE};
use crate::prompt::PromptTemplates;
use crate::script::{ScriptError, ScriptRun, ScriptRunner, strip_fences};
use crate::table::{Table, TableOutcome, interpret_reply};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_ROW_COUNT: u32 = 10;

/// Errors surfaced to the user; none of them end the session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Error while generating: {0}")]
    Model(#[from] LLMError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("Confirm the column settings before creating a program")]
    NotApproved,

    #[error("No program has been created yet")]
    NoScript,
}

#[derive(Debug, Clone)]
pub struct Session {
    columns_input: String,
    grid: ColumnGrid,
    precondition: String,
    row_count: u32,
    approved: Option<ApprovedSettings>,
    table: Option<TableOutcome>,
    script: Option<String>,
    script_table: Option<Table>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh session with the default column list
    pub fn new() -> Self {
        let columns_input = default_columns_input();
        let parsed = ColumnParse::from_input(&columns_input);
        Self {
            columns_input,
            grid: ColumnGrid::from_names(&parsed.columns),
            precondition: String::new(),
            row_count: DEFAULT_ROW_COUNT,
            approved: None,
            table: None,
            script: None,
            script_table: None,
        }
    }

    pub fn columns_input(&self) -> &str {
        &self.columns_input
    }

    /// Replace the column list and rebuild the grid.
    ///
    /// Unusable input falls back to the default columns; the error is
    /// returned so it can be shown.
    pub fn set_columns_input(&mut self, input: impl Into<String>) -> Option<ValidationError> {
        self.columns_input = input.into();
        let parsed = ColumnParse::from_input(&self.columns_input);
        self.grid = ColumnGrid::from_names(&parsed.columns);
        debug!("Column grid rebuilt with {} rows", self.grid.len());
        parsed.error
    }

    pub fn grid(&self) -> &ColumnGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut ColumnGrid {
        &mut self.grid
    }

    pub fn capacity(&self) -> Capacity {
        self.grid.capacity()
    }

    pub fn precondition(&self) -> &str {
        &self.precondition
    }

    pub fn set_precondition(&mut self, precondition: impl Into<String>) {
        self.precondition = precondition.into();
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn set_row_count(&mut self, row_count: u32) -> Result<(), ValidationError> {
        if row_count == 0 {
            return Err(ValidationError::InvalidRowCount);
        }
        self.row_count = row_count;
        Ok(())
    }

    pub fn approved(&self) -> Option<&ApprovedSettings> {
        self.approved.as_ref()
    }

    /// True when the grid or precondition changed after the last approval
    pub fn approval_is_stale(&self) -> bool {
        match &self.approved {
            Some(approved) => ApprovedSettings::from_grid(&self.grid, &self.precondition)
                .map(|current| &current != approved)
                .unwrap_or(true),
            None => false,
        }
    }

    pub fn table(&self) -> Option<&TableOutcome> {
        self.table.as_ref()
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn script_table(&self) -> Option<&Table> {
        self.script_table.as_ref()
    }

    /// Freeze the current selection and precondition
    pub fn confirm(&mut self) -> Result<&ApprovedSettings, ValidationError> {
        let approved = ApprovedSettings::from_grid(&self.grid, &self.precondition)?;
        info!("Approved {} columns", approved.columns.len());
        Ok(&*self.approved.insert(approved))
    }

    /// Ask the model for the table itself.
    ///
    /// The selection is approved as part of this. Validation and model
    /// errors leave the previous table in place; an unparsable reply is not
    /// an error and comes back as [`TableOutcome::Raw`].
    pub async fn generate_table<P>(&mut self, provider: &P) -> Result<&TableOutcome, SessionError>
    where
        P: CompletionProvider + ?Sized,
    {
        let approved = ApprovedSettings::from_grid(&self.grid, &self.precondition)?;
        let prompt = PromptTemplates::table_prompt(&approved, self.row_count);
        debug!("Table prompt:\n{}", prompt);

        let reply = provider.complete(&prompt, &TABLE_PROFILE).await?;
        let outcome = interpret_reply(&reply, &approved.column_names());

        self.approved = Some(approved);
        Ok(&*self.table.insert(outcome))
    }

    /// Ask the model for a generator script for the approved settings
    pub async fn create_program<P>(&mut self, provider: &P) -> Result<&str, SessionError>
    where
        P: CompletionProvider + ?Sized,
    {
        let approved = self.approved.as_ref().ok_or(SessionError::NotApproved)?;
        let prompt = PromptTemplates::script_prompt(approved);
        debug!("Script prompt:\n{}", prompt);

        let reply = provider.complete(&prompt, &SCRIPT_PROFILE).await?;
        let script = strip_fences(&reply);
        info!("Received script with {} lines", script.lines().count());

        Ok(self.script.insert(script).as_str())
    }

    /// Replace the script with user-edited text, verbatim
    pub fn edit_script(&mut self, script: impl Into<String>) {
        self.script = Some(script.into());
    }

    /// Run the current script with the session row count.
    ///
    /// A failed run leaves the previous script table untouched.
    pub async fn run_program(&mut self, runner: &ScriptRunner) -> Result<ScriptRun, SessionError> {
        let script = self.script.as_deref().ok_or(SessionError::NoScript)?;
        let run = runner.run(script, self.row_count).await?;

        if let ScriptRun::Completed { table, .. } = &run {
            self.script_table = Some(table.clone());
        }
        Ok(run)
    }

    /// Drop generated results and approvals, keeping the form inputs
    pub fn reset(&mut self) {
        self.approved = None;
        self.table = None;
        self.script = None;
        self.script_table = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockProvider;
    use crate::table::TableParseError;

    #[tokio::test]
    async fn test_generate_table_replaces_header() {
        let provider = MockProvider::with_replies(&["id,name,sex,years\n1,Ann,F,30\n2,Bo,M,41\n"]);
        let mut session = Session::new();
        session.set_row_count(2).unwrap();
        session.set_precondition("Adults only");

        let outcome = session.generate_table(&provider).await.unwrap();
        let table = outcome.table().unwrap();
        assert_eq!(table.headers, vec!["ID", "Name", "Gender", "Age"]);
        assert_eq!(table.row_count(), 2);

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, TABLE_PROFILE);
        assert!(calls[0].0.contains("■ Preconditions\nAdults only"));
        assert!(calls[0].0.contains("2 rows"));
        assert_eq!(session.approved().unwrap().columns.len(), 4);
    }

    #[tokio::test]
    async fn test_too_many_columns_blocks_generation() {
        let provider = MockProvider::with_replies(&["a\n1\n"]);
        let mut session = Session::new();
        let names: Vec<String> = (1..=16).map(|i| format!("c{}", i)).collect();
        session.set_columns_input(names.join(","));

        let err = session.generate_table(&provider).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::TooManyColumns { selected: 16, .. })
        ));
        assert!(provider.calls().is_empty());

        session.grid_mut().set_include("c16", false).unwrap();
        assert!(session.generate_table(&provider).await.is_ok());
    }

    #[tokio::test]
    async fn test_model_error_keeps_previous_table() {
        let provider = MockProvider::with_replies(&["ID,Name,Gender,Age\n1,A,F,20\n"]);
        provider.add_error(LLMError::network("connection reset"));
        let mut session = Session::new();

        session.generate_table(&provider).await.unwrap();
        let err = session.generate_table(&provider).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert!(session.table().and_then(TableOutcome::table).is_some());
    }

    #[tokio::test]
    async fn test_malformed_reply_is_kept_as_raw_text() {
        let provider = MockProvider::with_replies(&["Sure!\nID,Name\n1,Ann\n"]);
        let mut session = Session::new();

        let outcome = session.generate_table(&provider).await.unwrap();
        match outcome {
            TableOutcome::Raw { text, error } => {
                assert!(text.starts_with("Sure!"));
                assert!(matches!(error, TableParseError::TooManyFields { .. }));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_bad_column_input_falls_back() {
        let mut session = Session::new();
        assert_eq!(session.set_columns_input(" , "), Some(ValidationError::NoColumns));
        assert_eq!(session.grid().len(), 4);
        assert_eq!(session.set_columns_input("A, B"), None);
        assert_eq!(session.grid().len(), 2);
        assert_eq!(session.set_row_count(0), Err(ValidationError::InvalidRowCount));
        assert_eq!(session.row_count(), DEFAULT_ROW_COUNT);
    }

    #[tokio::test]
    async fn test_create_program_requires_approval() {
        let provider = MockProvider::with_replies(&["```python\nimport sys\n\nprint(1)\n```"]);
        let mut session = Session::new();

        assert!(matches!(
            session.create_program(&provider).await,
            Err(SessionError::NotApproved)
        ));

        session.confirm().unwrap();
        let script = session.create_program(&provider).await.unwrap();
        assert_eq!(script, "import sys\nprint(1)");
        assert_eq!(provider.calls()[0].1, SCRIPT_PROFILE);
    }

    #[test]
    fn test_approval_is_frozen() {
        let mut session = Session::new();
        assert!(!session.approval_is_stale());
        session.confirm().unwrap();
        assert!(!session.approval_is_stale());

        session.grid_mut().set_include("Age", false).unwrap();
        assert!(session.approval_is_stale());
        assert_eq!(session.approved().unwrap().columns.len(), 4);

        session.reset();
        assert!(session.approved().is_none());
    }

    #[tokio::test]
    async fn test_run_without_script() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut session = Session::new();
        let runner = ScriptRunner::new("sh", dir.path());
        assert!(matches!(session.run_program(&runner).await, Err(SessionError::NoScript)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_program_updates_table_only_on_success() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = ScriptRunner::new("sh", dir.path());
        let mut session = Session::new();
        session.set_row_count(2).unwrap();

        session.edit_script("echo 'Traceback: boom' >&2\nexit 1");
        let run = session.run_program(&runner).await.unwrap();
        assert!(matches!(run, ScriptRun::Failed { ref stderr, .. } if stderr.contains("boom")));
        assert!(session.script_table().is_none());

        session.edit_script(
            "printf 'ID,Name\\n' > generated_data.csv\n\
             i=0\n\
             while [ \"$i\" -lt \"$1\" ]; do echo \"$i,n$i\" >> generated_data.csv; i=$((i+1)); done",
        );
        let run = session.run_program(&runner).await.unwrap();
        assert!(matches!(run, ScriptRun::Completed { .. }));
        let table = session.script_table().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["1", "n1"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_table_is_not_read_back_as_script_output() {
        use crate::export::{TABLE_FILE_NAME, resolve_path, save_table};

        let dir = tempfile::TempDir::new().unwrap();
        let provider = MockProvider::with_replies(&["ID,Name,Gender,Age\n1,FROM_MODEL,F,20\n"]);
        let mut session = Session::new();

        let table = session.generate_table(&provider).await.unwrap().table().unwrap().clone();
        save_table(&resolve_path(dir.path(), None, TABLE_FILE_NAME), &table).unwrap();

        session.edit_script("exit 0\n");
        let err = session.run_program(&ScriptRunner::new("sh", dir.path())).await.unwrap_err();
        assert!(matches!(err, SessionError::Script(ScriptError::OutputMissing { .. })));
        assert!(session.script_table().is_none());
    }
}
