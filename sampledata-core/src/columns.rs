//! Column list, per-column settings grid and approved settings
//!
//! The grid is what the user edits; `ApprovedSettings` is the frozen copy a
//! generation run works from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Columns offered when the user gives nothing usable
pub const DEFAULT_COLUMNS: [&str; 4] = ["ID", "Name", "Gender", "Age"];

/// Soft ceiling on the number of included columns
pub const MAX_SELECTED_COLUMNS: usize = 15;

/// Input problems that block generation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No column names were entered")]
    NoColumns,

    #[error("No columns are selected for generation")]
    NoColumnsSelected,

    #[error("{selected} columns selected; the limit is {limit}. Remove some columns")]
    TooManyColumns { selected: usize, limit: usize },

    #[error("Row count must be at least 1")]
    InvalidRowCount,

    #[error("No column matches '{0}'")]
    UnknownColumn(String),
}

/// Split a comma-separated column list
pub fn parse_column_list(input: &str) -> Result<Vec<String>, ValidationError> {
    let columns: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();

    if columns.is_empty() {
        return Err(ValidationError::NoColumns);
    }
    Ok(columns)
}

/// Result of reading the column list, with the default fallback applied
#[derive(Debug, Clone)]
pub struct ColumnParse {
    pub columns: Vec<String>,
    pub error: Option<ValidationError>,
}

impl ColumnParse {
    pub fn from_input(input: &str) -> Self {
        match parse_column_list(input) {
            Ok(columns) => Self { columns, error: None },
            Err(e) => Self {
                columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
                error: Some(e),
            },
        }
    }
}

/// Default text for the column list input
pub fn default_columns_input() -> String {
    DEFAULT_COLUMNS.join(", ")
}

/// One editable row of the settings grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSetting {
    pub name: String,
    pub include: bool,
    pub granularity: String,
    pub remark: String,
}

impl ColumnSetting {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), include: true, granularity: String::new(), remark: String::new() }
    }

    fn is_selected(&self) -> bool {
        self.include && !self.name.trim().is_empty()
    }
}

/// How close the selection is to the ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Within { remaining: usize },
    Exceeded { over: usize },
}

impl Capacity {
    pub fn for_count(selected: usize) -> Self {
        if selected > MAX_SELECTED_COLUMNS {
            Capacity::Exceeded { over: selected - MAX_SELECTED_COLUMNS }
        } else {
            Capacity::Within { remaining: MAX_SELECTED_COLUMNS - selected }
        }
    }
}

/// Gate generation on the number of included columns
pub fn check_selection(selected: usize) -> Result<(), ValidationError> {
    match selected {
        0 => Err(ValidationError::NoColumnsSelected),
        n if n > MAX_SELECTED_COLUMNS => {
            Err(ValidationError::TooManyColumns { selected: n, limit: MAX_SELECTED_COLUMNS })
        }
        _ => Ok(()),
    }
}

/// Ordered, editable per-column settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnGrid {
    rows: Vec<ColumnSetting>,
}

impl ColumnGrid {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self { rows: names.iter().map(|n| ColumnSetting::new(n.as_ref())).collect() }
    }

    pub fn rows(&self) -> &[ColumnSetting] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column name, or failing that a 1-based row number, to a
    /// row index
    pub fn find(&self, column: &str) -> Result<usize, ValidationError> {
        let column = column.trim();
        if let Some(idx) = self.rows.iter().position(|r| r.name == column) {
            return Ok(idx);
        }
        column
            .parse::<usize>()
            .ok()
            .filter(|number| (1..=self.rows.len()).contains(number))
            .map(|number| number - 1)
            .ok_or_else(|| ValidationError::UnknownColumn(column.to_string()))
    }

    pub fn set_include(&mut self, column: &str, include: bool) -> Result<(), ValidationError> {
        let idx = self.find(column)?;
        self.rows[idx].include = include;
        Ok(())
    }

    pub fn set_granularity(
        &mut self,
        column: &str,
        granularity: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let idx = self.find(column)?;
        self.rows[idx].granularity = granularity.into();
        Ok(())
    }

    pub fn set_remark(&mut self, column: &str, remark: impl Into<String>) -> Result<(), ValidationError> {
        let idx = self.find(column)?;
        self.rows[idx].remark = remark.into();
        Ok(())
    }

    pub fn add_row(&mut self, name: impl Into<String>) {
        self.rows.push(ColumnSetting::new(name));
    }

    pub fn remove_row(&mut self, column: &str) -> Result<ColumnSetting, ValidationError> {
        let idx = self.find(column)?;
        Ok(self.rows.remove(idx))
    }

    /// Included rows with a non-blank name, in grid order
    pub fn selected(&self) -> impl Iterator<Item = &ColumnSetting> {
        self.rows.iter().filter(|r| r.is_selected())
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    pub fn capacity(&self) -> Capacity {
        Capacity::for_count(self.selected_count())
    }
}

/// A column as it was approved for generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedColumn {
    pub name: String,
    pub granularity: Option<String>,
    pub remark: Option<String>,
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl From<&ColumnSetting> for ApprovedColumn {
    fn from(setting: &ColumnSetting) -> Self {
        Self {
            name: setting.name.trim().to_string(),
            granularity: non_blank(&setting.granularity),
            remark: non_blank(&setting.remark),
        }
    }
}

/// Frozen column selection and precondition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedSettings {
    pub columns: Vec<ApprovedColumn>,
    pub precondition: Option<String>,
}

impl ApprovedSettings {
    pub fn from_grid(grid: &ColumnGrid, precondition: &str) -> Result<Self, ValidationError> {
        check_selection(grid.selected_count())?;
        Ok(Self {
            columns: grid.selected().map(ApprovedColumn::from).collect(),
            precondition: non_blank(precondition),
        })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}
