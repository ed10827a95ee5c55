//! Profils de conversion
//!
//! Un profil regroupe les alias de colonnes reconnus en entrée, les noms de
//! colonnes écrits en sortie, la précision décimale du CSV et le style du
//! polygone KML. Deux presets sont embarqués (`canonico`, `simple`) ; tout
//! autre nom est lu comme un chemin vers un fichier JSON.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use gauss_kruger::ColumnAliases;

/// Preset utilisé quand ni `--profile` ni `GK_PROFILE` ne sont fournis
pub const DEFAULT_PROFILE: &str = "canonico";

/// Profil complet
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    pub input: InputColumns,
    pub output: OutputColumns,
    pub precision: Precision,
    pub kml: KmlStyle,
}

/// Alias acceptés pour chaque rôle de colonne (casse ignorée)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InputColumns {
    pub name: Vec<String>,
    pub lat: Vec<String>,
    pub lng: Vec<String>,
    pub combined: Vec<String>,
    pub easting: Vec<String>,
    pub northing: Vec<String>,
}

impl Default for InputColumns {
    fn default() -> Self {
        let aliases = ColumnAliases::default();
        Self {
            name: aliases.name,
            lat: aliases.lat,
            lng: aliases.lng,
            combined: aliases.combined,
            easting: aliases.easting,
            northing: aliases.northing,
        }
    }
}

impl InputColumns {
    pub fn to_aliases(&self) -> ColumnAliases {
        ColumnAliases {
            name: self.name.clone(),
            lat: self.lat.clone(),
            lng: self.lng.clone(),
            combined: self.combined.clone(),
            easting: self.easting.clone(),
            northing: self.northing.clone(),
        }
    }
}

/// En-têtes du CSV de sortie
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputColumns {
    pub name: String,
    pub lat: String,
    pub lng: String,
    pub easting: String,
    pub northing: String,
}

impl Default for OutputColumns {
    fn default() -> Self {
        Self {
            name: "nombre".to_string(),
            lat: "lat".to_string(),
            lng: "lng".to_string(),
            easting: "coordenadas_gauss_kruger_easting".to_string(),
            northing: "coordenadas_gauss_kruger_northing".to_string(),
        }
    }
}

/// Nombre de décimales écrites dans le CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Precision {
    /// Mètres : 6 décimales (sub-millimétrique)
    pub planar: usize,
    /// Degrés : 10 décimales (~1 cm)
    pub geographic: usize,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            planar: 6,
            geographic: 10,
        }
    }
}

/// Style du polygone KML (couleurs au format KML `aabbggrr`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KmlStyle {
    pub line_color: String,
    pub line_width: f64,
    pub fill_color: String,
}

impl Default for KmlStyle {
    fn default() -> Self {
        Self {
            line_color: "ff0000ff".to_string(),
            line_width: 2.0,
            fill_color: "7f00ff00".to_string(),
        }
    }
}

impl Profile {
    /// Charge un profil depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read profile file: {}", path.display()))?;

        let profile: Self = serde_json::from_str(&content)
            .context(format!("Failed to parse profile JSON: {}", path.display()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Charge un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "canonico" => Self::load_embedded(include_str!("presets/canonico.json")),
            "simple" => Self::load_embedded(include_str!("presets/simple.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: canonico, simple", preset),
        }
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        match name_or_path {
            "canonico" | "simple" => Self::from_preset(name_or_path),
            _ => Self::load(Path::new(name_or_path)),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        let profile: Self =
            serde_json::from_str(json).context("Failed to parse embedded profile")?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn aliases(&self) -> ColumnAliases {
        self.input.to_aliases()
    }

    /// Vérifie les couleurs KML, la largeur du trait et les en-têtes de sortie
    pub fn validate(&self) -> Result<()> {
        let color = Regex::new(r"^[0-9a-fA-F]{8}$").context("Invalid color pattern")?;

        for (field, value) in [
            ("kml.line_color", &self.kml.line_color),
            ("kml.fill_color", &self.kml.fill_color),
        ] {
            if !color.is_match(value) {
                anyhow::bail!(
                    "Invalid {}: '{}'. Expected 8 hex digits (aabbggrr)",
                    field,
                    value
                );
            }
        }

        if !(self.kml.line_width.is_finite() && self.kml.line_width > 0.0) {
            anyhow::bail!("Invalid kml.line_width: {}", self.kml.line_width);
        }

        let output = &self.output;
        for (field, value) in [
            ("output.name", &output.name),
            ("output.lat", &output.lat),
            ("output.lng", &output.lng),
            ("output.easting", &output.easting),
            ("output.northing", &output.northing),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("Empty output column name: {}", field);
            }
        }

        let input = &self.input;
        for (field, aliases) in [
            ("input.name", &input.name),
            ("input.lat", &input.lat),
            ("input.lng", &input.lng),
            ("input.easting", &input.easting),
            ("input.northing", &input.northing),
        ] {
            if aliases.is_empty() {
                anyhow::bail!("No column alias configured for {}", field);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_load() {
        let canonico = Profile::from_preset("canonico").unwrap();
        assert_eq!(canonico, Profile::default());
        assert_eq!(canonico.aliases(), ColumnAliases::default());

        let simple = Profile::from_preset("simple").unwrap();
        assert_eq!(simple.output.easting, "easting");
        assert_eq!(simple.precision, Precision::default());
    }

    #[test]
    fn test_unknown_preset() {
        let err = Profile::from_preset("full").unwrap_err();
        assert!(err.to_string().contains("Unknown preset"));
    }

    #[test]
    fn test_resolve_missing_file() {
        let err = Profile::resolve("/nonexistent/profile.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read profile file"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let profile: Profile =
            serde_json::from_str(r#"{"output": {"name": "parcela"}}"#).unwrap();
        assert_eq!(profile.output.name, "parcela");
        assert_eq!(profile.output.lat, "lat");
        assert_eq!(profile.precision.planar, 6);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_invalid_kml_color() {
        let mut profile = Profile::default();
        profile.kml.fill_color = "green".to_string();
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("kml.fill_color"));

        profile.kml.fill_color = "7F00FF00".to_string();
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_invalid_line_width() {
        let mut profile = Profile::default();
        profile.kml.line_width = 0.0;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_empty_aliases_rejected() {
        let mut profile = Profile::default();
        profile.input.easting.clear();
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("input.easting"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("gk-profile-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"kml": {"line_color": "ffff0000", "line_width": 3.5}}"#)
            .unwrap();

        let profile = Profile::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(profile.kml.line_color, "ffff0000");
        assert_eq!(profile.kml.line_width, 3.5);
        assert_eq!(profile.kml.fill_color, "7f00ff00");

        std::fs::remove_file(&path).ok();
    }
}
