//! Point d'entrée CLI pour gk-convert

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

/// Convertir des coordonnées cadastrales entre Gauss-Krüger et WGS84
#[derive(Parser)]
#[command(name = "gk-convert")]
#[command(author, version)]
#[command(about = "Convert cadastral coordinates between Gauss-Krüger zone 5 and WGS84")]
#[command(long_about = "Convert cadastral coordinates between Gauss-Krüger zone 5 (EPSG:22195) and WGS84.\n\nCSV input is validated row by row: bad rows are reported in <OUTPUT_BASE>_errors.log and never stop the batch.\nKML/KMZ input yields polygon vertices and point placemarks.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux (pas de progression par ligne)
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

    let (mode, args) = cli.command.into_parts();
    info!(
        mode = %mode,
        input = %args.input.display(),
        output = %args.output_base.display(),
        "Starting conversion"
    );
    cli::cmd_convert(mode, args, cli.quiet)?;

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
