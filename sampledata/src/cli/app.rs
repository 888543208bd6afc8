use clap::{Args, Parser, Subcommand};
use sampledata_core::session::DEFAULT_ROW_COUNT;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sampledata",
    version,
    about = "Sampledata - generate realistic sample CSV data with Claude",
    long_about = "Sampledata builds a prompt from your column definitions and constraints, asks Claude for sample rows, and shows the result as a table you can save. It can also have Claude write a small generator program that you can edit and run locally."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive form session
    #[command(about = "Edit columns, generate data, create and run a generator program interactively")]
    Session,

    /// Generate a table in one go
    #[command(about = "Generate sample data once and save it as CSV")]
    Generate(GenerateArgs),

    /// Create a generator program
    #[command(about = "Have Claude write a data generator program, optionally edit and run it")]
    Program(ProgramArgs),

    /// Run an existing generator program
    #[command(about = "Run a generator program and show the CSV it writes")]
    Run(RunArgs),

    /// Write a default configuration file
    #[command(about = "Write a configuration file with default settings")]
    Init(InitArgs),
}

/// Column definitions and constraints shared by the one-shot commands
#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Comma-separated column names
    #[arg(long, help = "Comma-separated column names (default: ID, Name, Gender, Age)")]
    pub columns: Option<String>,

    /// Columns to leave out
    #[arg(long, value_name = "COLUMN", help = "Exclude a column (name or 1-based number)")]
    pub exclude: Vec<String>,

    /// Per-column granularity
    #[arg(long, value_name = "COLUMN=TEXT", help = "Granularity for a column, e.g. Age=years")]
    pub granularity: Vec<String>,

    /// Per-column remark
    #[arg(long, value_name = "COLUMN=TEXT", help = "Remark for a column, e.g. \"Age=20-60\"")]
    pub remark: Vec<String>,

    /// Free-text constraints
    #[arg(long, help = "Preconditions for the data, e.g. \"ages 20-60, Japan only\"")]
    pub precondition: Option<String>,

    /// Number of rows to generate
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_ROW_COUNT,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Number of data rows to generate"
    )]
    pub rows: u32,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// Where to save the CSV
    #[arg(short, long, help = "Output CSV path (default: sample_data.csv in the output directory)")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ProgramArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// Where to save the program
    #[arg(long, help = "Program path (default: generate_sample_data.py in the output directory)")]
    pub save: Option<PathBuf>,

    /// Open the program in $EDITOR before saving
    #[arg(long, help = "Edit the generated program before saving and running it")]
    pub edit: bool,

    /// Run the program after saving it
    #[arg(long, help = "Run the program and show the data it writes")]
    pub run: bool,

    /// Where to save the program's CSV
    #[arg(short, long, help = "Output CSV path for --run (default: script_output.csv)")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Program to run
    #[arg(help = "Path to a generator program")]
    pub script: PathBuf,

    /// Row count passed to the program
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_ROW_COUNT,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Number of rows passed to the program"
    )]
    pub rows: u32,

    /// Where to save the program's CSV
    #[arg(short, long, help = "Output CSV path (default: script_output.csv in the output directory)")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Config file to write
    #[arg(help = "Path of the configuration file", default_value = "sampledata.toml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long, help = "Overwrite the file if it already exists")]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "sampledata",
            "-v",
            "generate",
            "--columns",
            "ID, Name, Age",
            "--exclude",
            "Name",
            "--remark",
            "Age=20-60",
            "--rows",
            "25",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.form.columns.as_deref(), Some("ID, Name, Age"));
        assert_eq!(args.form.exclude, vec!["Name"]);
        assert_eq!(args.form.remark, vec!["Age=20-60"]);
        assert_eq!(args.form.rows, 25);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_zero_rows_rejected() {
        assert!(Cli::try_parse_from(["sampledata", "run", "gen.py", "--rows", "0"]).is_err());
        let cli = Cli::try_parse_from(["sampledata", "run", "gen.py"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.rows, DEFAULT_ROW_COUNT);
    }
}
