//! Tabular view of delimited model output
//!
//! Parsing is best effort: whatever the model returns is either turned into
//! a [`Table`] or handed back untouched as raw text with the parse error.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Reasons delimited text could not be read as a table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableParseError {
    #[error("No columns to parse: the text is empty")]
    Empty,

    #[error("Expected {expected} fields in line {line}, saw {saw}")]
    TooManyFields { line: usize, expected: usize, saw: usize },

    #[error("Unterminated quoted field starting in line {line}")]
    UnterminatedQuote { line: usize },
}

/// Header plus rows of string cells
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse comma-delimited text using the first non-blank record as header.
    ///
    /// Blank lines are skipped and rows shorter than the header are padded
    /// with empty cells. A row longer than the header is an error.
    pub fn parse(text: &str) -> Result<Self, TableParseError> {
        let mut records = split_records(text)?.into_iter();

        let (_, headers) = records.next().ok_or(TableParseError::Empty)?;
        let expected = headers.len();

        let mut rows = Vec::new();
        for (line, mut fields) in records {
            if fields.len() > expected {
                return Err(TableParseError::TooManyFields { line, expected, saw: fields.len() });
            }
            fields.resize(expected, String::new());
            rows.push(fields);
        }

        debug!("Parsed table with {} columns and {} rows", expected, rows.len());
        Ok(Self { headers, rows })
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Replace the header when the column counts agree; returns whether it did
    pub fn apply_header(&mut self, names: &[String]) -> bool {
        if names.len() != self.headers.len() {
            return false;
        }
        self.headers = names.to_vec();
        true
    }

    /// Serialize back to CSV with a header row
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, &self.headers);
        for row in &self.rows {
            write_record(&mut out, row);
        }
        out
    }
}

fn write_record(out: &mut String, fields: &[String]) {
    let escaped: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

fn escape_field(raw: &str) -> String {
    if raw.contains([DELIMITER, QUOTE, '\n', '\r']) {
        format!("\"{}\"", raw.replace(QUOTE, "\"\""))
    } else {
        raw.to_string()
    }
}

/// Split text into records of fields, tagged with the line each record starts on
fn split_records(text: &str) -> Result<Vec<(usize, Vec<String>)>, TableParseError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                QUOTE if chars.peek() == Some(&QUOTE) => {
                    field.push(QUOTE);
                    chars.next();
                }
                QUOTE => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            QUOTE if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            DELIMITER => {
                record.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, record_line, std::mem::take(&mut record), quoted);
                quoted = false;
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(TableParseError::UnterminatedQuote { line: record_line });
    }
    if !field.is_empty() || !record.is_empty() || quoted {
        record.push(field);
        push_record(&mut records, record_line, record, quoted);
    }

    Ok(records)
}

fn push_record(
    records: &mut Vec<(usize, Vec<String>)>,
    line: usize,
    record: Vec<String>,
    last_quoted: bool,
) {
    let blank = record.len() == 1 && !last_quoted && record[0].trim().is_empty();
    if !blank {
        records.push((line, record));
    }
}

/// What the user gets to see for a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// The reply parsed; `header_replaced` tells whether the approved names were applied
    Parsed { table: Table, header_replaced: bool },

    /// The reply could not be parsed and is shown as-is
    Raw { text: String, error: TableParseError },
}

impl TableOutcome {
    pub fn table(&self) -> Option<&Table> {
        match self {
            TableOutcome::Parsed { table, .. } => Some(table),
            TableOutcome::Raw { .. } => None,
        }
    }
}

/// Turn a model reply into a table, falling back to the raw text.
///
/// When the column count matches the approved columns the header is
/// overwritten with the approved names; otherwise the model's own header is
/// kept as it is.
pub fn interpret_reply(reply: &str, approved: &[String]) -> TableOutcome {
    match Table::parse(reply) {
        Ok(mut table) => {
            let header_replaced = table.apply_header(approved);
            if !header_replaced {
                debug!(
                    "Reply has {} columns, {} approved; keeping the reply header",
                    table.column_count(),
                    approved.len()
                );
            }
            TableOutcome::Parsed { table, header_replaced }
        }
        Err(error) => TableOutcome::Raw { text: reply.to_string(), error },
    }
}
