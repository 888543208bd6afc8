//! Terminal output: tables, the settings grid, status lines and the spinner

use indicatif::{ProgressBar, ProgressStyle};
use sampledata_core::{Capacity, ColumnGrid, MAX_SELECTED_COLUMNS, Table, TableOutcome};
use std::future::Future;
use std::time::Duration;

const MAX_CELL_WIDTH: usize = 40;

pub fn success(message: &str) {
    println!("✅ {}", message);
}

pub fn info(message: &str) {
    println!("ℹ️  {}", message);
}

pub fn warning(message: &str) {
    println!("⚠️  {}", message);
}

pub fn error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Await `future` while a spinner with `message` is shown
pub async fn with_spinner<F: Future>(message: &str, future: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = future.await;
    spinner.finish_and_clear();
    output
}

fn display_cell(cell: &str) -> String {
    let flat = cell.replace(['\r', '\n'], " ");
    if flat.chars().count() > MAX_CELL_WIDTH {
        let mut short: String = flat.chars().take(MAX_CELL_WIDTH - 1).collect();
        short.push('…');
        short
    } else {
        flat
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// Column-aligned text rendering of rows under a header
pub fn format_rows(headers: &[String], rows: &[Vec<String>]) -> String {
    let headers: Vec<String> = headers.iter().map(|h| display_cell(h)).collect();
    let rows: Vec<Vec<String>> =
        rows.iter().map(|r| r.iter().map(|c| display_cell(c)).collect()).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| pad(c, *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&headers));
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Table with a row index column, like a data frame view
pub fn format_table(table: &Table) -> String {
    let mut headers = vec![String::new()];
    headers.extend(table.headers.iter().cloned());

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![i.to_string()];
            cells.extend(row.iter().cloned());
            cells
        })
        .collect();

    format_rows(&headers, &rows)
}

/// The editable settings grid
pub fn format_grid(grid: &ColumnGrid) -> String {
    let headers: Vec<String> =
        ["#", "Include", "Column", "Granularity", "Remark"].iter().map(|h| h.to_string()).collect();
    let rows: Vec<Vec<String>> = grid
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            vec![
                (i + 1).to_string(),
                if row.include { "[x]" } else { "[ ]" }.to_string(),
                row.name.clone(),
                row.granularity.clone(),
                row.remark.clone(),
            ]
        })
        .collect();
    format_rows(&headers, &rows)
}

/// Selected-count line plus the remaining capacity or the ceiling message
pub fn selection_summary(grid: &ColumnGrid) -> String {
    let status = match grid.capacity() {
        Capacity::Within { remaining } => format!("🟢 {} more can be added", remaining),
        Capacity::Exceeded { .. } => format!(
            "🔴 The number of columns exceeds the limit ({}). Remove some columns",
            MAX_SELECTED_COLUMNS
        ),
    };
    format!("Selected columns: {}    {}", grid.selected_count(), status)
}

/// Show a model reply: the table when it parsed, the raw text otherwise
pub fn print_outcome(outcome: &TableOutcome) {
    match outcome {
        TableOutcome::Parsed { table, .. } => {
            success("Data generation finished");
            println!("\nGenerated data:");
            print!("{}", format_table(table));
        }
        TableOutcome::Raw { text, error: parse_error } => {
            warning("The generated data could not be converted to a table. Showing the raw text.");
            println!("\n{}\n", text);
            error(&format!("Conversion error: {}", parse_error));
        }
    }
}
