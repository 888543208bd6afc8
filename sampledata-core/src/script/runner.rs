//! Execute a generator script and read back its output

use super::SCRIPT_OUTPUT_FILE;
use crate::config::ScriptConfig;
use crate::table::{Table, TableParseError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Failures around running the script, as opposed to the script failing
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to write temporary script file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("Failed to start '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Script did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Script exited successfully but {path} could not be read: {source}")]
    OutputMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Script output {path} is not a readable table: {source}")]
    OutputUnreadable {
        path: PathBuf,
        #[source]
        source: TableParseError,
    },
}

/// Result of a script that was started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRun {
    /// Exit status zero and the output file parsed
    Completed { table: Table, stdout: String },

    /// Non-zero exit (or killed by a signal); nothing was read back
    Failed { exit_code: Option<i32>, stderr: String, stdout: String },
}

/// Runs script text through an interpreter in a fixed working directory
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: String,
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptRunner {
    pub fn new(interpreter: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self { interpreter: interpreter.into(), working_dir: working_dir.into(), timeout: None }
    }

    pub fn from_config(config: &ScriptConfig) -> Self {
        Self::new(config.interpreter.clone(), config.working_dir.clone())
            .with_timeout(config.timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Path the script is expected to write
    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(SCRIPT_OUTPUT_FILE)
    }

    /// Write `source` verbatim to a temporary file and run it with `row_count`.
    ///
    /// The temporary file is removed when this returns, whatever the outcome.
    pub async fn run(&self, source: &str, row_count: u32) -> Result<ScriptRun, ScriptError> {
        let mut file = tempfile::Builder::new()
            .prefix("sampledata-")
            .suffix(".py")
            .tempfile()
            .map_err(ScriptError::TempFile)?;
        file.write_all(source.as_bytes()).map_err(ScriptError::TempFile)?;
        file.flush().map_err(ScriptError::TempFile)?;
        let script_path = file.into_temp_path();

        info!(
            "Running {} {} {} in {}",
            self.interpreter,
            script_path.display(),
            row_count,
            self.working_dir.display()
        );

        let mut command = Command::new(&self.interpreter);
        command
            .arg(&*script_path)
            .arg(row_count.to_string())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| ScriptError::Timeout(limit))?,
            None => command.output().await,
        }
        .map_err(|source| ScriptError::Spawn { interpreter: self.interpreter.clone(), source })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        debug!("Script exited with {:?}, stdout={}, stderr={}", output.status, stdout, stderr);

        if !output.status.success() {
            warn!("Script failed with {:?}", output.status.code());
            return Ok(ScriptRun::Failed { exit_code: output.status.code(), stderr, stdout });
        }

        let path = self.output_path();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ScriptError::OutputMissing { path: path.clone(), source })?;
        let table = Table::parse(&content)
            .map_err(|source| ScriptError::OutputUnreadable { path: path.clone(), source })?;

        info!("Read {} rows from {}", table.row_count(), path.display());
        Ok(ScriptRun::Completed { table, stdout })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WRITES_ROWS: &str = r#"
n="$1"
printf 'id,value\n' > generated_data.csv
i=1
while [ "$i" -le "$n" ]; do
  printf '%s,v%s\n' "$i" "$i" >> generated_data.csv
  i=$((i + 1))
done
echo "wrote $n rows"
"#;

    fn runner(dir: &TempDir) -> ScriptRunner {
        ScriptRunner::new("sh", dir.path())
    }

    #[tokio::test]
    async fn test_successful_run_reads_output() {
        let dir = TempDir::new().unwrap();
        let run = runner(&dir).run(WRITES_ROWS, 3).await.unwrap();

        match run {
            ScriptRun::Completed { table, stdout } => {
                assert_eq!(table.headers, vec!["id", "value"]);
                assert_eq!(table.row_count(), 3);
                assert_eq!(table.rows[2], vec!["3", "v3"]);
                assert_eq!(stdout.trim(), "wrote 3 rows");
            }
            other => panic!("unexpected run: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_zero_exit_reports_stderr() {
        let dir = TempDir::new().unwrap();
        let run = runner(&dir).run("echo 'NameError: x' >&2\nexit 3\n", 5).await.unwrap();

        assert_eq!(
            run,
            ScriptRun::Failed {
                exit_code: Some(3),
                stderr: "NameError: x\n".to_string(),
                stdout: String::new(),
            }
        );
        assert!(!dir.path().join(SCRIPT_OUTPUT_FILE).exists());
    }

    #[tokio::test]
    async fn test_missing_output_file() {
        let dir = TempDir::new().unwrap();
        let err = runner(&dir).run("exit 0\n", 1).await.unwrap_err();
        assert!(matches!(err, ScriptError::OutputMissing { .. }));
    }

    #[tokio::test]
    async fn test_temporary_script_is_removed() {
        let dir = TempDir::new().unwrap();
        let source = "echo \"$0\"\nexit 1\n";
        let run = runner(&dir).run(source, 1).await.unwrap();

        let ScriptRun::Failed { stdout, .. } = run else {
            panic!("expected failure");
        };
        let script_path = PathBuf::from(stdout.trim());
        assert!(script_path.extension().is_some_and(|e| e == "py"));
        assert!(!script_path.exists());
    }

    #[tokio::test]
    async fn test_unknown_interpreter() {
        let dir = TempDir::new().unwrap();
        let err = ScriptRunner::new("definitely-not-an-interpreter", dir.path())
            .run("", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = TempDir::new().unwrap();
        let err = runner(&dir)
            .with_timeout(Some(Duration::from_millis(200)))
            .run("sleep 5\n", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::Timeout(_)));
    }
}
