//! Formats de sortie (CSV, KML, KMZ, GeoJSON)
//!
//! Tous les writers sont sans état : ils reçoivent les points convertis et
//! le profil, et n'arrondissent qu'au moment d'écrire.

pub mod csv;
pub mod geojson;
pub mod kml;
pub mod kmz;

use geo::LineString;

use gauss_kruger::ConvertedPoint;

/// Anneau (lng, lat) dans l'ordre des points, sans point de fermeture
pub fn ring(points: &[ConvertedPoint]) -> LineString<f64> {
    points
        .iter()
        .map(|p| (p.geographic.lng, p.geographic.lat))
        .collect()
}

/// Arrondi décimal exact (même résultat que l'affichage à `decimals` chiffres)
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}
