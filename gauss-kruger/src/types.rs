//! Types de données pour le crate gauss-kruger

use crate::error::{RowError, ValidationError};

/// Sens de conversion d'un lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// WGS84 (lat/lng) vers coordonnées planes
    GeographicToPlanar,
    /// Coordonnées planes vers WGS84
    PlanarToGeographic,
}

/// Position géographique WGS84 en degrés décimaux
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Vrai si la position respecte lat ∈ [-90, 90] et lng ∈ [-180, 180]
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Position plane (mètres)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub easting: f64,
    pub northing: f64,
}

impl PlanarPoint {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }
}

/// Représentation active d'un point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinates {
    Geographic(GeoPoint),
    Planar(PlanarPoint),
}

/// Point nommé dans une seule représentation
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatePoint {
    pub name: String,
    pub coords: Coordinates,
}

/// Ligne brute d'un tableau d'entrée
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Numéro de ligne 1-based (l'en-tête est la ligne 1)
    pub line: usize,
    /// Valeurs dans l'ordre des colonnes de l'en-tête
    pub values: Vec<String>,
}

impl RawRecord {
    /// Contenu brut pour le rapport d'erreurs, re-sérialisé en CSV
    ///
    /// Les cellules contenant virgule, guillemet ou retour à la ligne sont
    /// citées, la ligne se relit donc sans ambiguïté.
    pub fn raw_content(&self) -> String {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let serialized = writer
            .write_record(&self.values)
            .map_err(|e| e.to_string())
            .and_then(|_| writer.into_inner().map_err(|e| e.to_string()))
            .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()));

        match serialized {
            Ok(mut line) => {
                if line.ends_with('\n') {
                    line.pop();
                }
                line
            }
            Err(_) => self.values.join(","),
        }
    }

    /// Valeur d'une colonne par index (None si la ligne est trop courte)
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

/// Ligne validée : point parsé ou raison de l'échec
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRecord {
    pub line: usize,
    pub raw: String,
    pub outcome: Result<CoordinatePoint, ValidationError>,
}

/// Point converti, avec ses deux représentations
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedPoint {
    /// Numéro de ligne (ou rang du sommet pour une entrée KML)
    pub line: usize,
    pub name: String,
    pub geographic: GeoPoint,
    pub planar: PlanarPoint,
}

/// Ligne en échec dans un lot
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub line: usize,
    pub raw: String,
    pub error: RowError,
}

impl RowFailure {
    /// Message lisible pour le journal d'erreurs
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Issue d'une ligne : un seul résultat discriminé par ligne
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Converted(ConvertedPoint),
    Failed(RowFailure),
}

/// Résultat d'un lot : succès et échecs, chacun dans l'ordre d'entrée
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionResult {
    pub points: Vec<ConvertedPoint>,
    pub errors: Vec<RowFailure>,
}

impl ConversionResult {
    /// Répartit des issues de lignes en succès / échecs sans les réordonner
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = RowOutcome>) -> Self {
        let mut result = Self::default();
        for outcome in outcomes {
            match outcome {
                RowOutcome::Converted(point) => result.points.push(point),
                RowOutcome::Failed(failure) => result.errors.push(failure),
            }
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.errors.is_empty()
    }

    /// Nombre total de lignes traitées
    pub fn total(&self) -> usize {
        self.points.len() + self.errors.len()
    }
}

/// Sommet nommé extrait d'un document KML
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub name: String,
    pub position: GeoPoint,
}

impl Vertex {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            position: GeoPoint::new(lat, lng),
        }
    }
}
