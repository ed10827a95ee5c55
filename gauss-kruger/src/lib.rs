//! # gauss-kruger
//!
//! Conversion de coordonnées cadastrales entre WGS84 et Gauss-Krüger
//! Argentine faja 5 (EPSG:22195, datum Campo Inchauspe), ou une zone UTM.
//!
//! ## Features
//!
//! - Transverse Mercator en Rust pur (série de Krüger d'ordre 6) avec
//!   translation de datum Campo Inchauspe → WGS84
//! - Validation ligne par ligne des CSV : une ligne invalide devient une
//!   erreur de lot, jamais un arrêt
//! - Extraction des sommets de polygones et des points d'un document KML
//! - Feature `proj` : contrôle croisé avec PROJ dans les tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gauss_kruger::{convert_csv, BatchConverter, ColumnAliases, Direction};
//!
//! let data = std::fs::read("mojones.csv")?;
//! let converter = BatchConverter::default();
//! let result = convert_csv(&data, Direction::GeographicToPlanar, &ColumnAliases::default(), &converter)?;
//!
//! for point in &result.points {
//!     println!("{} -> {:.3}, {:.3}", point.name, point.planar.easting, point.planar.northing);
//! }
//! for failure in &result.errors {
//!     eprintln!("line {}: {}", failure.line, failure.message());
//! }
//! ```

pub mod batch;
pub mod error;
pub mod parser;
pub mod projection;
pub mod types;
pub mod validate;

pub use batch::BatchConverter;
pub use error::{
    GeometryParseError, GkError, ProjectionError, RowError, SchemaError, ValidationError,
};
pub use projection::{Ellipsoid, Helmert3, ProjectionDefinition, ProjectionKind, Transformer};
pub use types::{
    ConversionResult, ConvertedPoint, CoordinatePoint, Coordinates, Direction, GeoPoint,
    PlanarPoint, RawRecord, RowFailure, Vertex,
};
pub use validate::{ColumnAliases, CsvSchema, RowValidator};

use tracing::debug;

/// Lit, valide et convertit un fichier CSV complet
///
/// # Errors
///
/// Erreurs de document uniquement (en-tête absent ou incomplet, CSV illisible) :
/// les erreurs de ligne sont dans `ConversionResult::errors`.
pub fn convert_csv(
    data: &[u8],
    direction: Direction,
    aliases: &ColumnAliases,
    converter: &BatchConverter,
) -> Result<ConversionResult, GkError> {
    let text = parser::decode(data);
    let table = parser::csv::read_table(&text)?;
    let validator = RowValidator::from_header(&table.header, direction, aliases)?;
    debug!(schema = ?validator.schema(), rows = table.records.len(), "CSV schema detected");

    Ok(converter.convert(&validator, &table.records))
}

/// Extrait les sommets d'un document KML brut
pub fn extract_kml(data: &[u8]) -> Result<Vec<Vertex>, GkError> {
    let text = parser::decode(data);
    Ok(parser::kml::extract(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_only_csv() {
        let result = convert_csv(
            b"nombre,lat,lng\n",
            Direction::GeographicToPlanar,
            &ColumnAliases::default(),
            &BatchConverter::default(),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_missing_columns_is_document_error() {
        let err = convert_csv(
            b"nombre,foo\nA,1\n",
            Direction::GeographicToPlanar,
            &ColumnAliases::default(),
            &BatchConverter::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GkError::Schema(SchemaError::MissingColumns { .. })));
    }

    #[test]
    fn test_projection_failure_stays_row_level() {
        let result = convert_csv(
            b"nombre,coordenadas_gauss_kruger_easting,coordenadas_gauss_kruger_northing\n\
              V1,5439229.95,6355430.75\n\
              Sur,5500000,-50000\n",
            Direction::PlanarToGeographic,
            &ColumnAliases::default(),
            &BatchConverter::default(),
        )
        .unwrap();
        assert_eq!(result.points.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 3);
        assert!(matches!(result.errors[0].error, RowError::Projection(_)));
    }

    #[test]
    fn test_error_lines_count_blank_lines() {
        let result = convert_csv(
            b"nombre,lat,lng\nA,-32,-60\n\nB,95,-60\n",
            Direction::GeographicToPlanar,
            &ColumnAliases::default(),
            &BatchConverter::default(),
        )
        .unwrap();
        assert_eq!(result.points[0].line, 2);
        assert_eq!(result.errors[0].line, 4);
    }

    #[test]
    fn test_windows_1252_names() {
        let result = convert_csv(
            b"nombre,lat,lng\nMoj\xF3n 1,-32.9442,-60.6505\n",
            Direction::GeographicToPlanar,
            &ColumnAliases::default(),
            &BatchConverter::default(),
        )
        .unwrap();
        assert_eq!(result.points[0].name, "Mojón 1");
    }

    #[test]
    fn test_extract_kml_bytes() {
        let kml = b"<kml><Placemark><name>A</name><Point><coordinates>-60,-32</coordinates></Point></Placemark></kml>";
        let vertices = extract_kml(kml).unwrap();
        assert_eq!(vertices, vec![Vertex::new("A", -32.0, -60.0)]);
    }
}
