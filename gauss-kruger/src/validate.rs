//! Validation des lignes CSV
//!
//! Le schéma est détecté une fois depuis l'en-tête (noms de colonnes, ordre
//! indifférent, casse ignorée) puis chaque ligne est validée dans l'ordre :
//! 1. nom non vide
//! 2. champs de coordonnées présents et non vides
//! 3. champs numériques finis
//! 4. plages lat/lng (entrée géographique uniquement)

use crate::error::{SchemaError, ValidationError};
use crate::types::{
    ConversionRecord, CoordinatePoint, Coordinates, Direction, GeoPoint, PlanarPoint, RawRecord,
};

/// Noms de colonnes acceptés pour chaque rôle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAliases {
    pub name: Vec<String>,
    pub lat: Vec<String>,
    pub lng: Vec<String>,
    /// Cellule unique "lat,lng"
    pub combined: Vec<String>,
    pub easting: Vec<String>,
    pub northing: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let owned =
            |names: &[&str]| -> Vec<String> { names.iter().map(|s| s.to_string()).collect() };
        Self {
            name: owned(&["nombre", "name"]),
            lat: owned(&["lat", "latitud"]),
            lng: owned(&["lng", "lon", "longitud"]),
            combined: owned(&["coordenadas", "coordenadas_google_maps"]),
            easting: owned(&["coordenadas_gauss_kruger_easting", "easting", "x"]),
            northing: owned(&["coordenadas_gauss_kruger_northing", "northing", "y"]),
        }
    }
}

impl ColumnAliases {
    /// Index de la première colonne de l'en-tête portant un des alias
    fn find(header: &[String], aliases: &[String]) -> Option<Column> {
        header.iter().enumerate().find_map(|(index, label)| {
            let label = label.trim();
            aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(label))
                .then(|| Column {
                    index,
                    label: label.to_string(),
                })
        })
    }

    fn first(aliases: &[String]) -> &str {
        aliases.first().map(String::as_str).unwrap_or("?")
    }
}

/// Colonne résolue dans l'en-tête
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    /// Libellé tel qu'il apparaît dans l'en-tête
    pub label: String,
}

/// Schéma d'entrée détecté
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvSchema {
    /// `name, lat, lng`
    Geographic {
        name: Column,
        lat: Column,
        lng: Column,
    },
    /// `name, coordenadas` avec "lat,lng" dans une seule cellule
    GeographicCombined { name: Column, coords: Column },
    /// `name, easting, northing`
    Planar {
        name: Column,
        easting: Column,
        northing: Column,
    },
}

impl CsvSchema {
    /// Détecte le schéma depuis l'en-tête pour un sens de conversion
    ///
    /// Les colonnes séparées lat/lng priment sur la cellule combinée.
    pub fn detect(
        header: &[String],
        direction: Direction,
        aliases: &ColumnAliases,
    ) -> Result<Self, SchemaError> {
        if header.is_empty() {
            return Err(SchemaError::MissingHeader);
        }

        let name = ColumnAliases::find(header, &aliases.name);

        let schema = match direction {
            Direction::GeographicToPlanar => {
                let lat = ColumnAliases::find(header, &aliases.lat);
                let lng = ColumnAliases::find(header, &aliases.lng);
                let combined = ColumnAliases::find(header, &aliases.combined);
                match (name, lat, lng, combined) {
                    (Some(name), Some(lat), Some(lng), _) => {
                        Some(Self::Geographic { name, lat, lng })
                    }
                    (Some(name), _, _, Some(coords)) => {
                        Some(Self::GeographicCombined { name, coords })
                    }
                    _ => None,
                }
            }
            Direction::PlanarToGeographic => {
                let easting = ColumnAliases::find(header, &aliases.easting);
                let northing = ColumnAliases::find(header, &aliases.northing);
                match (name, easting, northing) {
                    (Some(name), Some(easting), Some(northing)) => Some(Self::Planar {
                        name,
                        easting,
                        northing,
                    }),
                    _ => None,
                }
            }
        };

        schema.ok_or_else(|| SchemaError::MissingColumns {
            expected: Self::expected_columns(direction, aliases),
            found: header.join(", "),
        })
    }

    fn expected_columns(direction: Direction, aliases: &ColumnAliases) -> String {
        let name = ColumnAliases::first(&aliases.name);
        match direction {
            Direction::GeographicToPlanar => format!(
                "{}, {}, {} (or {}, {})",
                name,
                ColumnAliases::first(&aliases.lat),
                ColumnAliases::first(&aliases.lng),
                name,
                ColumnAliases::first(&aliases.combined),
            ),
            Direction::PlanarToGeographic => format!(
                "{}, {}, {}",
                name,
                ColumnAliases::first(&aliases.easting),
                ColumnAliases::first(&aliases.northing),
            ),
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Geographic { .. } | Self::GeographicCombined { .. } => {
                Direction::GeographicToPlanar
            }
            Self::Planar { .. } => Direction::PlanarToGeographic,
        }
    }

    fn name_column(&self) -> &Column {
        match self {
            Self::Geographic { name, .. }
            | Self::GeographicCombined { name, .. }
            | Self::Planar { name, .. } => name,
        }
    }
}

/// Validateur de lignes pour un schéma donné
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowValidator {
    schema: CsvSchema,
}

impl RowValidator {
    pub fn new(schema: CsvSchema) -> Self {
        Self { schema }
    }

    /// Détecte le schéma depuis l'en-tête et construit le validateur
    pub fn from_header(
        header: &[String],
        direction: Direction,
        aliases: &ColumnAliases,
    ) -> Result<Self, SchemaError> {
        CsvSchema::detect(header, direction, aliases).map(Self::new)
    }

    pub fn schema(&self) -> &CsvSchema {
        &self.schema
    }

    pub fn direction(&self) -> Direction {
        self.schema.direction()
    }

    /// Valide une ligne ; la première règle en échec l'emporte
    pub fn validate(&self, record: &RawRecord) -> ConversionRecord {
        ConversionRecord {
            line: record.line,
            raw: record.raw_content(),
            outcome: self.parse_point(record),
        }
    }

    fn parse_point(&self, record: &RawRecord) -> Result<CoordinatePoint, ValidationError> {
        let name = cell(record, self.schema.name_column());
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let coords = match &self.schema {
            CsvSchema::Geographic { lat, lng, .. } => {
                let lat_raw = required(record, lat)?;
                let lng_raw = required(record, lng)?;
                let point = GeoPoint::new(
                    parse_number(&lat.label, lat_raw)?,
                    parse_number(&lng.label, lng_raw)?,
                );
                Coordinates::Geographic(check_range(point)?)
            }
            CsvSchema::GeographicCombined { coords, .. } => {
                let raw = required(record, coords)?;
                let point = parse_combined(&coords.label, raw)?;
                Coordinates::Geographic(check_range(point)?)
            }
            CsvSchema::Planar {
                easting, northing, ..
            } => {
                let easting_raw = required(record, easting)?;
                let northing_raw = required(record, northing)?;
                Coordinates::Planar(PlanarPoint::new(
                    parse_number(&easting.label, easting_raw)?,
                    parse_number(&northing.label, northing_raw)?,
                ))
            }
        };

        Ok(CoordinatePoint {
            name: name.to_string(),
            coords,
        })
    }
}

/// Valeur d'une cellule, sans espaces ("" si la ligne est trop courte)
fn cell<'a>(record: &'a RawRecord, column: &Column) -> &'a str {
    record.get(column.index).map(str::trim).unwrap_or("")
}

fn required<'a>(record: &'a RawRecord, column: &Column) -> Result<&'a str, ValidationError> {
    let value = cell(record, column);
    if value.is_empty() {
        return Err(ValidationError::missing_field(&column.label));
    }
    Ok(value)
}

/// Parse un nombre fini (fast-float, sans NaN ni infini)
fn parse_number(field: &str, value: &str) -> Result<f64, ValidationError> {
    fast_float::parse::<f64, _>(value)
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::invalid_number(field, value))
}

/// Parse une cellule "lat,lng" (espaces tolérés)
fn parse_combined(field: &str, value: &str) -> Result<GeoPoint, ValidationError> {
    let invalid = || ValidationError::InvalidCombined {
        field: field.to_string(),
        value: value.to_string(),
    };

    let mut parts = value.split(',').map(str::trim);
    let (Some(lat), Some(lng), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let lat = parse_number(field, lat).map_err(|_| invalid())?;
    let lng = parse_number(field, lng).map_err(|_| invalid())?;
    Ok(GeoPoint::new(lat, lng))
}

fn check_range(point: GeoPoint) -> Result<GeoPoint, ValidationError> {
    if point.in_range() {
        Ok(point)
    } else {
        Err(ValidationError::OutOfRange {
            lat: point.lat,
            lng: point.lng,
        })
    }
}
