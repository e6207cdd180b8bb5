mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "starscope", about = "Star-field quality analysis for FITS exposures")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure star count, FWHM, elongation and tracking error
    Analyze(commands::analyze::AnalyzeArgs),
    /// Show FITS geometry and header cards
    Header(commands::header::HeaderArgs),
    /// Print or save the default analysis options as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Header(args) => commands::header::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
