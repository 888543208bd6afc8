//! Prompt templates for table and generator-script requests

use crate::columns::{ApprovedColumn, ApprovedSettings};
use crate::script::SCRIPT_OUTPUT_FILE;

/// Builds the natural-language instructions sent to the model
pub struct PromptTemplates;

impl PromptTemplates {
    /// Prompt asking for the sample data itself as CSV text
    pub fn table_prompt(settings: &ApprovedSettings, row_count: u32) -> String {
        let names = settings.column_names().join(", ");

        let mut prompt = String::from(
            "Generate sample data in CSV format according to the requirements below.\n\n",
        );
        prompt.push_str(&format!("■ Rows\n{} rows\n\n", row_count));
        push_precondition(&mut prompt, settings);
        push_columns(&mut prompt, &settings.columns);

        prompt.push_str("\n■ Output format\n");
        prompt.push_str(&format!("- Use exactly these column names as the header row: {}\n", names));
        prompt.push_str(&format!("- After the header row, output exactly {} data rows\n", row_count));
        prompt.push_str("- Separate values with commas (CSV)\n");
        prompt.push_str(
            "- Output only the CSV text: no explanation before or after it and no code fences\n",
        );
        prompt.push_str("- Make the values realistic and consistent with each other");
        prompt
    }

    /// Prompt asking for a standalone script that generates the data locally
    pub fn script_prompt(settings: &ApprovedSettings) -> String {
        let names = settings.column_names().join(", ");

        let mut prompt = String::from(
            "Write a self-contained Python 3 program that generates sample data \
             according to the requirements below.\n\n",
        );
        push_precondition(&mut prompt, settings);
        push_columns(&mut prompt, &settings.columns);

        prompt.push_str("\n■ Program requirements\n");
        prompt.push_str("- Use only the Python standard library\n");
        prompt.push_str("- Define generate_row() that returns one row of data\n");
        prompt.push_str("- Define generate_data(num_rows) that returns a list of num_rows rows\n");
        prompt.push_str(
            "- Define main() that reads the number of rows from sys.argv[1] \
             (default 10 when absent) and writes the data\n",
        );
        prompt.push_str(&format!(
            "- Write the result to '{}' in the current working directory, UTF-8, \
             with a header row of exactly these column names: {}\n",
            SCRIPT_OUTPUT_FILE, names
        ));
        prompt.push_str("- Call main() under if __name__ == \"__main__\":\n");
        prompt.push_str("- Reply with only the program in a single ```python code block");
        prompt
    }
}

fn push_precondition(prompt: &mut String, settings: &ApprovedSettings) {
    if let Some(precondition) = &settings.precondition {
        prompt.push_str(&format!("■ Preconditions\n{}\n\n", precondition));
    }
}

fn push_columns(prompt: &mut String, columns: &[ApprovedColumn]) {
    prompt.push_str("■ Columns\n");
    for column in columns {
        prompt.push_str(&format!("・{}", column.name));

        let notes: Vec<String> = [
            column.granularity.as_ref().map(|g| format!("granularity: {}", g)),
            column.remark.as_ref().map(|r| format!("remark: {}", r)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !notes.is_empty() {
            prompt.push_str(&format!(" ({})", notes.join("; ")));
        }
        prompt.push('\n');
    }
}
