//! Types d'erreurs pour le crate gauss-kruger
//!
//! Deux familles bien distinctes :
//! - erreurs de ligne (`ValidationError`, `ProjectionError`, regroupées dans
//!   `RowError`) : ce sont des données, accumulées par le `BatchConverter` ;
//! - erreurs de document (`SchemaError`, `GeometryParseError`, I/O) : elles
//!   interrompent l'opération en cours et remontent à l'appelant.

use thiserror::Error;

/// Échec d'une transformation de coordonnées
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// Entrée NaN ou infinie
    #[error("non-finite coordinate ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    /// Coordonnée hors du domaine de validité de la projection
    #[error("coordinate ({x}, {y}) outside the domain of {projection}: {reason}")]
    OutsideDomain {
        projection: String,
        x: f64,
        y: f64,
        reason: &'static str,
    },

    /// Paramètres de projection incohérents
    #[error("invalid projection definition {name}: {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// Libellé de zone UTM non reconnu
    #[error("unknown UTM zone '{0}' (expected 1-60 followed by N or S, e.g. 20S)")]
    UnknownZone(String),
}

/// Ligne CSV rejetée par le validateur
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Colonne `name` absente ou vide
    #[error("the 'name' field is empty")]
    MissingName,

    /// Champ de coordonnée requis absent ou vide
    #[error("required field '{field}' is empty")]
    MissingField { field: String },

    /// Champ non numérique (ou NaN / inf)
    #[error("field '{field}' is not a finite number: '{value}'")]
    InvalidNumber { field: String, value: String },

    /// Cellule combinée "lat,lng" mal formée
    #[error("field '{field}' must be formatted as 'lat,lng', got '{value}'")]
    InvalidCombined { field: String, value: String },

    /// Latitude / longitude hors plage
    #[error("coordinates out of range: lat={lat} (must be within [-90, 90]), lng={lng} (must be within [-180, 180])")]
    OutOfRange { lat: f64, lng: f64 },
}

/// Erreur attachée à une ligne : validation ou transformation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("projection failed: {0}")]
    Projection(#[from] ProjectionError),
}

/// L'en-tête CSV ne permet pas de satisfaire le schéma demandé
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Fichier vide (pas même un en-tête)
    #[error("the CSV input is empty or has no header row")]
    MissingHeader,

    /// Colonnes requises absentes
    #[error("the CSV header must contain the columns: {expected} (found: {found})")]
    MissingColumns { expected: String, found: String },
}

/// Erreurs fatales lors de l'extraction KML
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryParseError {
    /// Document XML mal formé
    #[error("malformed KML at byte {position}: {reason}")]
    Malformed { position: u64, reason: String },

    /// Fin de document avec des éléments encore ouverts
    #[error("malformed KML: element <{0}> is never closed")]
    UnclosedElement(String),

    /// Aucun élément racine
    #[error("malformed KML: no root element")]
    NoRootElement,

    /// Document valide mais sans aucun sommet exploitable
    #[error("no polygon vertex or point placemark found in the KML document")]
    NoGeometry,
}

/// Erreurs de niveau document pouvant survenir dans le pipeline
#[derive(Debug, Error)]
pub enum GkError {
    /// Erreur du lecteur CSV sur l'en-tête
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Geometry(#[from] GeometryParseError),
}

impl GeometryParseError {
    /// Crée une erreur de document mal formé avec contexte
    pub fn malformed(position: u64, reason: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            reason: reason.into(),
        }
    }
}

impl ValidationError {
    /// Crée une erreur de champ manquant
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Crée une erreur de valeur non numérique
    pub fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            field: field.into(),
            value: value.into(),
        }
    }
}
