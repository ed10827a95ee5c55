//! Enchaînement lecture → conversion → écriture pour chaque mode
//!
//! - `gk-to-wgs84` : CSV plan → CSV `name,lat,lng` + KML/KMZ/GeoJSON
//! - `wgs84-to-gk` : CSV WGS84 → CSV `name,lat,lng,easting,northing`
//! - `kml-to-gk`   : KML/KMZ → CSV `name,lat,lng,easting,northing`
//! - `kml-to-wgs84`: KML/KMZ → CSV `name,lat,lng` + KML/KMZ/GeoJSON

use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use gauss_kruger::{BatchConverter, ConversionResult, Direction, RowFailure};

use crate::config::Profile;
use crate::export::csv::CsvLayout;
use crate::export::{csv, geojson, kml, kmz};

/// Mode de conversion choisi en ligne de commande
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    GkToWgs84,
    Wgs84ToGk,
    KmlToGk,
    KmlToWgs84,
}

/// Nature du fichier d'entrée d'un mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Tableau CSV dans le sens donné
    Csv(Direction),
    /// Document KML ou archive KMZ (WGS84)
    Kml,
}

impl Mode {
    pub fn token(self) -> &'static str {
        match self {
            Mode::GkToWgs84 => "gk-to-wgs84",
            Mode::Wgs84ToGk => "wgs84-to-gk",
            Mode::KmlToGk => "kml-to-gk",
            Mode::KmlToWgs84 => "kml-to-wgs84",
        }
    }

    pub fn input(self) -> InputKind {
        match self {
            Mode::GkToWgs84 => InputKind::Csv(Direction::PlanarToGeographic),
            Mode::Wgs84ToGk => InputKind::Csv(Direction::GeographicToPlanar),
            Mode::KmlToGk | Mode::KmlToWgs84 => InputKind::Kml,
        }
    }

    pub fn csv_layout(self) -> CsvLayout {
        match self {
            Mode::GkToWgs84 | Mode::KmlToWgs84 => CsvLayout::Geographic,
            Mode::Wgs84ToGk | Mode::KmlToGk => CsvLayout::GeographicAndPlanar,
        }
    }

    /// Vrai si le mode produit aussi le polygone (KML, KMZ, GeoJSON)
    pub fn writes_polygon(self) -> bool {
        matches!(self, Mode::GkToWgs84 | Mode::KmlToWgs84)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Base de sortie : extension retirée (`out/parcela.csv` → `out/parcela`)
pub fn output_base(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// `<base><suffix>` sans toucher aux points déjà présents dans la base
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub fn error_log_path(base: &Path) -> PathBuf {
    with_suffix(base, "_errors.log")
}

/// Crée le répertoire parent de la base de sortie
pub fn prepare_output_dir(base: &Path) -> Result<()> {
    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Nom donné au polygone : le nom du fichier d'entrée sans extension
pub fn polygon_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Polígono")
        .to_string()
}

/// Lit l'entrée et convertit toutes ses lignes / sommets
pub fn convert_input(
    mode: Mode,
    input: &Path,
    converter: &BatchConverter,
    profile: &Profile,
) -> Result<ConversionResult> {
    match mode.input() {
        InputKind::Csv(direction) => {
            let data = std::fs::read(input)
                .with_context(|| format!("Failed to read input file: {}", input.display()))?;
            gauss_kruger::convert_csv(&data, direction, &profile.aliases(), converter)
                .with_context(|| format!("Failed to convert {}", input.display()))
        }
        InputKind::Kml => {
            let data = read_vector_input(input)?;
            let vertices = gauss_kruger::extract_kml(&data)
                .with_context(|| format!("Failed to extract geometry from {}", input.display()))?;
            info!(vertices = vertices.len(), "KML vertices extracted");
            Ok(converter.convert_vertices(&vertices))
        }
    }
}

/// Bytes du document KML (décompressé si l'entrée est un `.kmz`)
fn read_vector_input(input: &Path) -> Result<Vec<u8>> {
    let is_kmz = input
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("kmz"));

    if is_kmz {
        debug!(path = %input.display(), "Reading KMZ archive");
        kmz::read_kml_file(input)
    } else {
        std::fs::read(input)
            .with_context(|| format!("Failed to read input file: {}", input.display()))
    }
}

/// Écrit les fichiers de sortie du mode et renvoie leurs chemins
///
/// Le CSV est toujours écrit (en-tête seul si aucun point). Le polygone
/// n'est écrit que s'il y a au moins un point converti.
pub fn write_outputs(
    mode: Mode,
    base: &Path,
    name: &str,
    result: &ConversionResult,
    profile: &Profile,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let csv_path = with_suffix(base, ".csv");
    csv::write_csv_file(&csv_path, &result.points, mode.csv_layout(), profile)?;
    written.push(csv_path);

    if mode.writes_polygon() {
        if result.points.is_empty() {
            warn!("No converted points, skipping KML/KMZ/GeoJSON outputs");
        } else {
            let document = kml::render_kml(name, &result.points, &profile.kml);

            let kml_path = with_suffix(base, ".kml");
            std::fs::write(&kml_path, &document)
                .with_context(|| format!("Failed to write KML: {}", kml_path.display()))?;
            written.push(kml_path);

            let kmz_path = with_suffix(base, ".kmz");
            kmz::write_kmz_file(&kmz_path, &document)?;
            written.push(kmz_path);

            let geojson_path = with_suffix(base, ".geojson");
            geojson::write_geojson_file(&geojson_path, name, &result.points)?;
            written.push(geojson_path);
        }
    }

    debug!(files = written.len(), "Outputs written");
    Ok(written)
}

/// Écrit `<base>_errors.log` (une ligne `line <n>: <message>` par erreur)
///
/// Rien n'est écrit quand il n'y a aucune erreur.
pub fn write_error_log(base: &Path, errors: &[RowFailure]) -> Result<Option<PathBuf>> {
    if errors.is_empty() {
        return Ok(None);
    }

    let path = error_log_path(base);
    let mut content = Vec::new();
    for failure in errors {
        writeln!(content, "line {}: {}", failure.line, failure.message())?;
    }
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write error log: {}", path.display()))?;

    Ok(Some(path))
}
