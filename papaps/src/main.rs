//! Point d'entrée CLI pour papaps

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Classer une zone d'intérêt selon la couche thématique PAPAPS
#[derive(Parser)]
#[command(name = "papaps")]
#[command(author, version)]
#[command(about = "Classify an AOI shapefile against the PAPAPS thematic layer and report area per category")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Run {
            input,
            region,
            dataset,
            output,
            geojson,
            report,
            layer,
        } => {
            info!(input = %input.display(), region = ?region, "Classify AOI");
            cli::cmd_run(
                &input,
                region.as_deref(),
                dataset.as_deref(),
                &output,
                geojson,
                report.as_deref(),
                &layer,
            )?;
        }
        Commands::Batch {
            path,
            region,
            dataset,
            output,
            geojson,
            jobs,
            layer,
        } => {
            info!(path = %path.display(), output = %output.display(), "Classify directory");
            cli::cmd_batch(
                &path,
                region.as_deref(),
                dataset.as_deref(),
                &output,
                geojson,
                jobs,
                &layer,
            )?;
        }
        Commands::Regions { regions } => {
            cli::cmd_regions(regions.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
