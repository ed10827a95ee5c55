//! # gk-convert
//!
//! Conversion de fichiers de coordonnées cadastrales entre Gauss-Krüger
//! faja 5 (ou une zone UTM) et WGS84.
//!
//! ## Features
//!
//! - Entrées CSV (plan ou WGS84) et KML/KMZ
//! - Sorties CSV, KML, KMZ et GeoJSON
//! - Journal `<base>_errors.log` des lignes rejetées
//! - Profils de colonnes et de style (presets `canonico`, `simple` ou JSON)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Gauss-Krüger → WGS84 (CSV + polygone KML/KMZ/GeoJSON)
//! gk-convert gk-to-wgs84 parcela.csv salida/parcela
//!
//! # WGS84 → Gauss-Krüger
//! gk-convert wgs84-to-gk mojones.csv salida/mojones
//!
//! # Sommets d'un KML/KMZ → Gauss-Krüger, en UTM 20S
//! gk-convert kml-to-gk lote.kmz salida/lote --utm-zone 20S
//! ```

pub mod config;
pub mod export;
pub mod pipeline;
pub mod report;

pub use config::Profile;
pub use pipeline::Mode;
pub use report::{ConversionReport, ConversionStatus};
