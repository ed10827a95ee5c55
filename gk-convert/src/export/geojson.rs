//! Export GeoJSON : FeatureCollection d'un seul polygone en CRS84

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use serde_json::json;

use gauss_kruger::ConvertedPoint;

use super::round_to;

/// Décimales des positions
const COORD_DECIMALS: usize = 15;

pub const CRS84: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

const DESCRIPTION: &str = "Polígono generado automáticamente";

/// Construit la collection : le premier sommet est répété en fin d'anneau
/// seulement au-delà de 2 sommets
pub fn feature_collection(name: &str, points: &[ConvertedPoint]) -> FeatureCollection {
    let ring = super::ring(points);

    let mut positions: Vec<Vec<f64>> = ring
        .coords()
        .map(|c| vec![round_to(c.x, COORD_DECIMALS), round_to(c.y, COORD_DECIMALS)])
        .collect();
    if positions.len() > 2 {
        positions.push(positions[0].clone());
    }

    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(name));
    properties.insert("description".to_string(), JsonValue::from(DESCRIPTION));

    let feature = Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![positions]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    };

    let mut members = JsonObject::new();
    members.insert("name".to_string(), JsonValue::from(name));
    members.insert(
        "crs".to_string(),
        json!({ "type": "name", "properties": { "name": CRS84 } }),
    );

    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: Some(members),
    }
}

/// Écrit la collection en JSON indenté
pub fn write_geojson_file(path: &Path, name: &str, points: &[ConvertedPoint]) -> Result<()> {
    let file =
        File::create(path).context(format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &feature_collection(name, points))
        .context(format!("Failed to write GeoJSON: {}", path.display()))?;
    writer.flush()?;

    Ok(())
}
