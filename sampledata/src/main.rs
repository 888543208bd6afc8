use anyhow::Result;
use clap::Parser;
use sampledata_core::AppConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Session => {
            info!("Starting interactive session");
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::session::execute(&config))?;
        }
        Commands::Generate(args) => {
            info!("Generate command: {:?}", args);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::generate::execute(args, &config))?;
        }
        Commands::Program(args) => {
            info!("Program command: {:?}", args);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::program::execute(args, &config))?;
        }
        Commands::Run(args) => {
            info!("Run command: {:?}", args);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::run::execute(args, &config))?;
        }
        Commands::Init(args) => {
            info!("Init command: {:?}", args);
            cli::commands::init::execute(&args)?;
        }
    }

    Ok(())
}
