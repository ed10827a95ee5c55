//! Définition et implémentation des commandes CLI
//!
//! Une sous-commande par mode, toutes avec les mêmes arguments :
//! `<INPUT> <OUTPUT_BASE> [--profile] [--utm-zone] [--report]`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::info;

use gauss_kruger::{BatchConverter, ConversionResult, ProjectionDefinition, Transformer};

use gk_convert::config::{Profile, DEFAULT_PROFILE};
use gk_convert::pipeline::{self, Mode};
use gk_convert::report::ConversionReport;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a Gauss-Krüger CSV to WGS84 (CSV, KML, KMZ, GeoJSON)
    #[command(name = "gk-to-wgs84")]
    GkToWgs84(ConvertArgs),

    /// Convert a WGS84 CSV (lat/lng) to Gauss-Krüger (CSV)
    #[command(name = "wgs84-to-gk")]
    Wgs84ToGk(ConvertArgs),

    /// Convert the vertices of a KML/KMZ to Gauss-Krüger (CSV)
    #[command(name = "kml-to-gk")]
    KmlToGk(ConvertArgs),

    /// Export the vertices of a KML/KMZ as WGS84 (CSV, KML, KMZ, GeoJSON)
    #[command(name = "kml-to-wgs84")]
    KmlToWgs84(ConvertArgs),
}

impl Commands {
    pub fn into_parts(self) -> (Mode, ConvertArgs) {
        match self {
            Commands::GkToWgs84(args) => (Mode::GkToWgs84, args),
            Commands::Wgs84ToGk(args) => (Mode::Wgs84ToGk, args),
            Commands::KmlToGk(args) => (Mode::KmlToGk, args),
            Commands::KmlToWgs84(args) => (Mode::KmlToWgs84, args),
        }
    }
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input file (CSV, or KML/KMZ for kml-to-* modes)
    pub input: PathBuf,

    /// Output base name; the extension is stripped and .csv/.kml/.kmz/.geojson appended
    pub output_base: PathBuf,

    /// Profile preset (canonico/simple) or path to a JSON profile (défaut : env GK_PROFILE / canonico)
    #[arg(long)]
    pub profile: Option<String>,

    /// Use a WGS84 UTM zone (e.g. 20S) instead of Gauss-Krüger zone 5 (défaut : env GK_UTM_ZONE)
    #[arg(long)]
    pub utm_zone: Option<String>,

    /// Write a JSON conversion report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Exécute une conversion
pub fn cmd_convert(mode: Mode, args: ConvertArgs, quiet: bool) -> Result<()> {
    let started_at = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let profile_name = args
        .profile
        .or_else(|| std::env::var("GK_PROFILE").ok())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
    let profile = Profile::resolve(&profile_name)
        .with_context(|| format!("Cannot load profile '{}'", profile_name))?;

    let utm_zone = args
        .utm_zone
        .or_else(|| std::env::var("GK_UTM_ZONE").ok())
        .filter(|zone| !zone.trim().is_empty());
    let transformer = build_transformer(utm_zone.as_deref())?;
    let projection = transformer.definition().name.clone();

    let base = pipeline::output_base(&args.output_base);
    pipeline::prepare_output_dir(&base)?;

    println!("=== {} ===", mode);
    println!("Input: {}", args.input.display());
    println!("Output base: {}", base.display());
    println!("Projection: {}", projection);
    println!("Profile: {}", profile_name);

    let converter = BatchConverter::new(transformer);
    let result = pipeline::convert_input(mode, &args.input, &converter, &profile)?;

    if !quiet {
        print_progress(mode, &result);
    }

    let mut report = ConversionReport::new(mode.token(), &args.input, &projection);
    report.record_result(&result);

    let name = pipeline::polygon_name(&args.input);
    for path in pipeline::write_outputs(mode, &base, &name, &result, &profile)? {
        report.record_output(&path);
    }
    if let Some(path) = pipeline::write_error_log(&base, &result.errors)? {
        report.record_output(&path);
    }

    report.set_duration(started_at.elapsed());
    report.finalize();
    report.display();

    if let Some(path) = &args.report {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }

    info!("Conversion complete: {}", report.summary());

    Ok(())
}

/// Gauss-Krüger faja 5, ou la zone UTM demandée
fn build_transformer(utm_zone: Option<&str>) -> Result<Transformer> {
    match utm_zone {
        None => Ok(Transformer::gauss_kruger_zone5()),
        Some(label) => {
            let definition = ProjectionDefinition::utm(label)?;
            Transformer::new(definition)
                .with_context(|| format!("Cannot build UTM zone {}", label))
        }
    }
}

/// Une ligne par entrée, dans l'ordre du fichier
fn print_progress(mode: Mode, result: &ConversionResult) {
    let to_planar = matches!(mode, Mode::Wgs84ToGk | Mode::KmlToGk);

    let mut lines: Vec<(usize, String)> = result
        .points
        .iter()
        .map(|p| {
            let line = if to_planar {
                format!(
                    "Converted: {} -> Easting: {:.6}, Northing: {:.6}",
                    p.name, p.planar.easting, p.planar.northing
                )
            } else {
                format!(
                    "Converted: {} -> {:.10}, {:.10}",
                    p.name, p.geographic.lat, p.geographic.lng
                )
            };
            (p.line, line)
        })
        .chain(
            result
                .errors
                .iter()
                .map(|e| (e.line, format!("Error on line {}: {}", e.line, e.message()))),
        )
        .collect();
    lines.sort_by_key(|(line, _)| *line);

    for (_, line) in lines {
        println!("{}", line);
    }
}
