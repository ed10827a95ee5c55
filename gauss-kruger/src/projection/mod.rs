//! Transformation WGS84 ↔ coordonnées planes Transverse Mercator
//!
//! Définitions supportées :
//! - Gauss-Krüger Argentine faja 5 (EPSG:22195) - Campo Inchauspe, défaut
//! - UTM 1..60 N/S sur WGS84 (ex. `20S` pour le centre de l'Argentine)
//!
//! Une [`ProjectionDefinition`] est une valeur immuable et inspectable ; le
//! [`Transformer`] pré-calcule la série une fois et se partage entre threads.

mod datum;
mod ellipsoid;
mod tmerc;

pub use datum::Helmert3;
pub use ellipsoid::Ellipsoid;

use crate::error::ProjectionError;
use crate::types::{GeoPoint, PlanarPoint};
use tmerc::TransverseMercator;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub(crate) struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés (lon, lat)
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Famille de projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    TransverseMercator,
}

/// Jeu de paramètres complet d'un système plan
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionDefinition {
    /// Nom lisible (journaux, messages d'erreur)
    pub name: String,
    pub kind: ProjectionKind,
    pub ellipsoid: Ellipsoid,
    /// Latitude d'origine en degrés
    pub lat_0: f64,
    /// Méridien central en degrés
    pub lon_0: f64,
    /// Facteur d'échelle sur le méridien central
    pub k_0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Unité des coordonnées planes
    pub units: &'static str,
    /// Translation vers WGS84 (None si le datum est déjà WGS84)
    pub to_wgs84: Option<Helmert3>,
}

impl ProjectionDefinition {
    /// Gauss-Krüger Argentine faja 5 (EPSG:22195)
    pub fn gauss_kruger_zone5() -> Self {
        Self {
            name: "Gauss-Krüger zone 5 (EPSG:22195)".to_string(),
            kind: ProjectionKind::TransverseMercator,
            ellipsoid: Ellipsoid::INTERNATIONAL_1924,
            lat_0: -90.0,
            lon_0: -60.0,
            k_0: 1.0,
            false_easting: 5500000.0,
            false_northing: 0.0,
            units: "m",
            to_wgs84: Some(Helmert3::CAMPO_INCHAUSPE),
        }
    }

    /// Zone UTM WGS84 à partir d'un libellé `"20S"`, `"utm 19s"`, `"21N"`...
    pub fn utm(label: &str) -> Result<Self, ProjectionError> {
        let (zone, south) = parse_utm_label(label)?;
        let lon_0 = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;

        Ok(Self {
            name: format!("UTM {}{} (WGS84)", zone, if south { 'S' } else { 'N' }),
            kind: ProjectionKind::TransverseMercator,
            ellipsoid: Ellipsoid::WGS84,
            lat_0: 0.0,
            lon_0,
            k_0: 0.9996,
            false_easting: 500000.0,
            false_northing: if south { 10000000.0 } else { 0.0 },
            units: "m",
            to_wgs84: None,
        })
    }

    /// Chaîne PROJ équivalente
    pub fn proj_string(&self) -> String {
        let ellps = match self.ellipsoid.name {
            "WGS84" => "WGS84",
            _ => "intl",
        };
        let mut s = format!(
            "+proj=tmerc +lat_0={} +lon_0={} +k={} +x_0={} +y_0={} +ellps={}",
            self.lat_0, self.lon_0, self.k_0, self.false_easting, self.false_northing, ellps
        );
        if let Some(shift) = self.to_wgs84 {
            s.push_str(&format!(
                " +towgs84={},{},{},0,0,0,0",
                shift.dx, shift.dy, shift.dz
            ));
        }
        s.push_str(&format!(" +units={} +no_defs", self.units));
        s
    }

    fn validate(&self) -> Result<(), ProjectionError> {
        let invalid = |reason: &str| ProjectionError::InvalidDefinition {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if !(self.k_0.is_finite() && self.k_0 > 0.0) {
            return Err(invalid("scale factor must be a positive finite number"));
        }
        if !(-90.0..=90.0).contains(&self.lat_0) {
            return Err(invalid("latitude of origin must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&self.lon_0) {
            return Err(invalid("central meridian must be within [-180, 180]"));
        }
        if !(self.false_easting.is_finite() && self.false_northing.is_finite()) {
            return Err(invalid("false easting/northing must be finite"));
        }
        if !(self.ellipsoid.a > 0.0 && (0.0..1.0).contains(&self.ellipsoid.f)) {
            return Err(invalid("degenerate ellipsoid"));
        }
        Ok(())
    }
}

impl Default for ProjectionDefinition {
    fn default() -> Self {
        Self::gauss_kruger_zone5()
    }
}

/// Décode un libellé de zone UTM en (numéro, hémisphère sud)
fn parse_utm_label(label: &str) -> Result<(u32, bool), ProjectionError> {
    let unknown = || ProjectionError::UnknownZone(label.to_string());

    let trimmed = label.trim();
    let body = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("utm") => trimmed[3..].trim_start(),
        _ => trimmed,
    };

    let hemisphere = body.chars().last().ok_or_else(unknown)?;
    let south = match hemisphere.to_ascii_uppercase() {
        'S' => true,
        'N' => false,
        _ => return Err(unknown()),
    };

    let digits = &body[..body.len() - hemisphere.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unknown());
    }
    let zone: u32 = digits.parse().map_err(|_| unknown())?;
    if !(1..=60).contains(&zone) {
        return Err(unknown());
    }

    Ok((zone, south))
}

/// Transformation directe/inverse pour une définition donnée
///
/// Sans état mutable : `Send + Sync`, réutilisable entre lots.
#[derive(Debug, Clone)]
pub struct Transformer {
    definition: ProjectionDefinition,
    tmerc: TransverseMercator,
}

impl Transformer {
    /// Pré-calcule la projection (échoue si la définition est incohérente)
    pub fn new(definition: ProjectionDefinition) -> Result<Self, ProjectionError> {
        definition.validate()?;
        Ok(Self::build(definition))
    }

    /// Transformer Gauss-Krüger faja 5
    pub fn gauss_kruger_zone5() -> Self {
        Self::build(ProjectionDefinition::gauss_kruger_zone5())
    }

    fn build(definition: ProjectionDefinition) -> Self {
        let tmerc = match definition.kind {
            ProjectionKind::TransverseMercator => TransverseMercator::new(
                &definition.name,
                &definition.ellipsoid,
                definition.lat_0.to_radians(),
                definition.lon_0.to_radians(),
                definition.k_0,
                definition.false_easting,
                definition.false_northing,
            ),
        };
        Self { definition, tmerc }
    }

    pub fn definition(&self) -> &ProjectionDefinition {
        &self.definition
    }

    /// WGS84 (degrés) → (easting, northing) en mètres
    pub fn forward(&self, lng: f64, lat: f64) -> Result<PlanarPoint, ProjectionError> {
        if !(lng.is_finite() && lat.is_finite()) {
            return Err(ProjectionError::NonFinite { x: lng, y: lat });
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(self.outside(lng, lat, "geographic coordinate out of range"));
        }

        let wgs = Geographic::from_degrees(lng, lat);
        let local = match &self.definition.to_wgs84 {
            Some(shift) => shift.wgs84_to_local(&self.definition.ellipsoid, wgs),
            None => wgs,
        };

        let (easting, northing) = self.tmerc.forward(local)?;
        Ok(PlanarPoint::new(easting, northing))
    }

    /// (easting, northing) en mètres → WGS84 (degrés)
    pub fn inverse(&self, easting: f64, northing: f64) -> Result<GeoPoint, ProjectionError> {
        if !(easting.is_finite() && northing.is_finite()) {
            return Err(ProjectionError::NonFinite {
                x: easting,
                y: northing,
            });
        }

        let local = self.tmerc.inverse(easting, northing)?;
        let wgs = match &self.definition.to_wgs84 {
            Some(shift) => shift.local_to_wgs84(&self.definition.ellipsoid, local),
            None => local,
        };

        let (lng, lat) = wgs.to_degrees();
        Ok(GeoPoint::new(lat, lng))
    }

    fn outside(&self, x: f64, y: f64, reason: &'static str) -> ProjectionError {
        ProjectionError::OutsideDomain {
            projection: self.definition.name.clone(),
            x,
            y,
            reason,
        }
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::gauss_kruger_zone5()
    }
}
