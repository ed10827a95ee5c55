//! Conversion par lot
//!
//! Chaque ligne produit une issue (succès ou échec) ; une ligne en échec ne
//! stoppe jamais le lot. Les issues sont réparties à la fin, dans l'ordre
//! d'entrée, en `points` et `errors`.

use tracing::{debug, info};

use crate::error::RowError;
use crate::projection::Transformer;
use crate::types::{
    ConversionRecord, ConversionResult, ConvertedPoint, CoordinatePoint, Coordinates, RawRecord,
    RowFailure, RowOutcome, Vertex,
};
use crate::validate::RowValidator;

/// Convertisseur de lots, propriétaire de sa projection
#[derive(Debug, Clone, Default)]
pub struct BatchConverter {
    transformer: Transformer,
}

impl BatchConverter {
    pub fn new(transformer: Transformer) -> Self {
        Self { transformer }
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Valide puis convertit des lignes CSV brutes
    ///
    /// Le sens de conversion est celui du schéma du validateur.
    pub fn convert<'a>(
        &self,
        validator: &RowValidator,
        records: impl IntoIterator<Item = &'a RawRecord>,
    ) -> ConversionResult {
        self.convert_records(records.into_iter().map(|r| validator.validate(r)))
    }

    /// Convertit des lignes déjà validées
    pub fn convert_records(
        &self,
        records: impl IntoIterator<Item = ConversionRecord>,
    ) -> ConversionResult {
        let result =
            ConversionResult::from_outcomes(records.into_iter().map(|r| self.convert_one(r)));

        info!(
            projection = %self.transformer.definition().name,
            converted = result.points.len(),
            failed = result.errors.len(),
            "Batch converted"
        );
        result
    }

    /// Convertit les sommets extraits d'un KML (WGS84 → plan)
    ///
    /// Le numéro de ligne est le rang 1-based du sommet.
    pub fn convert_vertices(&self, vertices: &[Vertex]) -> ConversionResult {
        let records = vertices.iter().enumerate().map(|(idx, vertex)| ConversionRecord {
            line: idx + 1,
            raw: format!(
                "{},{},{}",
                vertex.name, vertex.position.lat, vertex.position.lng
            ),
            outcome: Ok(CoordinatePoint {
                name: vertex.name.clone(),
                coords: Coordinates::Geographic(vertex.position),
            }),
        });
        self.convert_records(records)
    }

    fn convert_one(&self, record: ConversionRecord) -> RowOutcome {
        let ConversionRecord { line, raw, outcome } = record;

        let converted = outcome.map_err(RowError::from).and_then(|point| {
            let (geographic, planar) = match point.coords {
                Coordinates::Geographic(geo) => {
                    (geo, self.transformer.forward(geo.lng, geo.lat)?)
                }
                Coordinates::Planar(planar) => (
                    self.transformer.inverse(planar.easting, planar.northing)?,
                    planar,
                ),
            };
            Ok(ConvertedPoint {
                line,
                name: point.name,
                geographic,
                planar,
            })
        });

        match converted {
            Ok(point) => RowOutcome::Converted(point),
            Err(error) => {
                debug!(line, error = %error, "Row rejected");
                RowOutcome::Failed(RowFailure { line, raw, error })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProjectionError, ValidationError};
    use crate::types::Direction;
    use crate::validate::ColumnAliases;

    fn records(rows: &[&[&str]]) -> Vec<RawRecord> {
        rows.iter()
            .enumerate()
            .map(|(idx, values)| RawRecord {
                line: idx + 2,
                values: values.iter().map(|v| v.to_string()).collect(),
            })
            .collect()
    }

    fn validator(cols: &[&str], direction: Direction) -> RowValidator {
        let header: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
        RowValidator::from_header(&header, direction, &ColumnAliases::default()).unwrap()
    }

    #[test]
    fn test_rosario_geographic_to_planar() {
        let converter = BatchConverter::default();
        let v = validator(&["nombre", "lat", "lng"], Direction::GeographicToPlanar);
        let rows = records(&[&["Centro de Rosario", "-32.9442", "-60.6505"]]);

        let result = converter.convert(&v, &rows);
        assert!(result.errors.is_empty());
        assert_eq!(result.points.len(), 1);

        let p = &result.points[0];
        assert_eq!(p.name, "Centro de Rosario");
        assert_eq!(p.line, 2);
        assert_eq!(p.planar.easting.round(), 5439230.0);
        assert_eq!(p.planar.northing.round(), 6355431.0);
    }

    #[test]
    fn test_partial_failure_isolation() {
        let converter = BatchConverter::default();
        let v = validator(&["nombre", "lat", "lng"], Direction::GeographicToPlanar);
        let rows = records(&[
            &["A", "-32.9", "-60.6"],
            &["B", "95", "-60.6"],
            &["C", "-33.0", "-60.7"],
            &["", "-33.1", "-60.8"],
            &["E", "-33.2", "-60.9"],
        ]);

        let result = converter.convert(&v, &rows);
        let names: Vec<&str> = result.points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "E"]);

        let lines: Vec<usize> = result.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 5]);
        assert_eq!(result.errors[0].raw, "B,95,-60.6");
        assert!(matches!(
            result.errors[0].error,
            RowError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(
            result.errors[1].error,
            RowError::Validation(ValidationError::MissingName)
        );
    }

    #[test]
    fn test_projection_failure_is_row_error() {
        let converter = BatchConverter::default();
        let v = validator(
            &["nombre", "easting", "northing"],
            Direction::PlanarToGeographic,
        );
        let rows = records(&[&["ok", "5500000", "6000000"], &["south", "5500000", "-1000"]]);

        let result = converter.convert(&v, &rows);
        assert_eq!(result.points.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 3);
        assert!(matches!(
            result.errors[0].error,
            RowError::Projection(ProjectionError::OutsideDomain { .. })
        ));
        assert!(result.errors[0].message().starts_with("projection failed"));
    }

    #[test]
    fn test_planar_to_geographic_keeps_both_representations() {
        let converter = BatchConverter::default();
        let v = validator(
            &[
                "nombre",
                "coordenadas_gauss_kruger_easting",
                "coordenadas_gauss_kruger_northing",
            ],
            Direction::PlanarToGeographic,
        );
        let rows = records(&[&["P1", "5439229.945", "6355430.748"]]);

        let result = converter.convert(&v, &rows);
        let p = &result.points[0];
        assert_eq!(p.planar.easting, 5439229.945);
        assert!((p.geographic.lat - (-32.9442)).abs() < 1e-7);
        assert!((p.geographic.lng - (-60.6505)).abs() < 1e-7);
    }

    #[test]
    fn test_empty_input() {
        let converter = BatchConverter::default();
        let v = validator(&["nombre", "lat", "lng"], Direction::GeographicToPlanar);
        let result = converter.convert(&v, &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_convert_vertices() {
        let converter = BatchConverter::default();
        let vertices = vec![
            Vertex::new("Polygon_1_Vertex_1", -32.9442, -60.6505),
            Vertex::new("Polygon_1_Vertex_2", -32.9442, -60.6500),
        ];
        let result = converter.convert_vertices(&vertices);
        assert_eq!(result.points.len(), 2);
        assert_eq!(result.points[1].line, 2);
        assert_eq!(result.points[0].geographic.lat, -32.9442);
        assert!(result.points[1].planar.easting > result.points[0].planar.easting);
    }
}
