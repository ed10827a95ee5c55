//! Rapport de conversion
//!
//! Ce module collecte les résultats d'une conversion (lignes converties,
//! lignes en erreur, fichiers générés) et les affiche en fin d'exécution.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use gauss_kruger::{ConversionResult, RowFailure};

/// Nombre d'erreurs affichées sur la console
const DISPLAYED_ERRORS: usize = 20;

/// Statut global de la conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionStatus {
    /// Toutes les lignes converties (ou entrée vide)
    Success,
    /// Des lignes converties et des lignes en erreur
    PartialSuccess,
    /// Aucune ligne convertie, au moins une erreur
    Failed,
}

/// Ligne en erreur, telle qu'écrite dans le journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowErrorEntry {
    pub line: usize,
    pub raw: String,
    pub message: String,
}

impl From<&RowFailure> for RowErrorEntry {
    fn from(failure: &RowFailure) -> Self {
        Self {
            line: failure.line,
            raw: failure.raw.clone(),
            message: failure.message(),
        }
    }
}

/// Rapport complet d'une conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Mode (`gk-to-wgs84`, ...)
    pub mode: String,
    /// Fichier d'entrée
    pub input: String,
    /// Projection plane utilisée
    pub projection: String,
    pub duration_secs: f64,
    pub status: ConversionStatus,

    pub rows_converted: usize,
    pub rows_failed: usize,

    /// Fichiers générés, dans l'ordre d'écriture
    pub outputs: Vec<String>,
    pub errors: Vec<RowErrorEntry>,
}

impl ConversionReport {
    pub fn new(mode: &str, input: &Path, projection: &str) -> Self {
        Self {
            mode: mode.to_string(),
            input: input.display().to_string(),
            projection: projection.to_string(),
            duration_secs: 0.0,
            status: ConversionStatus::Success,
            rows_converted: 0,
            rows_failed: 0,
            outputs: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Reprend les compteurs et les erreurs d'un lot
    pub fn record_result(&mut self, result: &ConversionResult) {
        self.rows_converted += result.points.len();
        self.rows_failed += result.errors.len();
        self.errors.extend(result.errors.iter().map(RowErrorEntry::from));
    }

    /// Enregistre un fichier généré
    pub fn record_output(&mut self, path: &Path) {
        self.outputs.push(path.display().to_string());
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = match (self.rows_converted, self.rows_failed) {
            (_, 0) => ConversionStatus::Success,
            (0, _) => ConversionStatus::Failed,
            _ => ConversionStatus::PartialSuccess,
        };
    }

    pub fn total_rows(&self) -> usize {
        self.rows_converted + self.rows_failed
    }

    /// Affiche le rapport et le manifeste des fichiers générés
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONVERSION REPORT - {}", self.mode);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Input: {}", self.input);
        println!("Projection: {}", self.projection);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Rows: {} total, {} converted, {} failed",
            self.total_rows(),
            self.rows_converted,
            self.rows_failed
        );

        println!("\n--- GENERATED FILES ({}) ---", self.outputs.len());
        for output in &self.outputs {
            println!("- {}", output);
        }

        if !self.errors.is_empty() {
            println!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(DISPLAYED_ERRORS) {
                println!("  line {}: {}", e.line, e.message);
            }
            if self.errors.len() > DISPLAYED_ERRORS {
                println!("  ... and {} more", self.errors.len() - DISPLAYED_ERRORS);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} converted, {} errors",
            self.mode, self.rows_converted, self.rows_failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauss_kruger::{
        ConvertedPoint, GeoPoint, PlanarPoint, ProjectionError, RowError, ValidationError,
    };

    fn result(converted: usize, failed: &[usize]) -> ConversionResult {
        ConversionResult {
            points: (0..converted)
                .map(|i| ConvertedPoint {
                    line: i + 2,
                    name: format!("P{}", i),
                    geographic: GeoPoint::new(-32.9, -60.6),
                    planar: PlanarPoint::new(5439229.9, 6355430.7),
                })
                .collect(),
            errors: failed
                .iter()
                .map(|&line| RowFailure {
                    line,
                    raw: format!("row {}", line),
                    error: RowError::Validation(ValidationError::MissingName),
                })
                .collect(),
        }
    }

    fn report() -> ConversionReport {
        ConversionReport::new("wgs84-to-gk", Path::new("mojones.csv"), "EPSG:22195")
    }

    #[test]
    fn test_default_status() {
        let report = report();
        assert_eq!(report.status, ConversionStatus::Success);
        assert_eq!(report.total_rows(), 0);
    }

    #[test]
    fn test_finalize_success() {
        let mut report = report();
        report.record_result(&result(3, &[]));
        report.finalize();
        assert_eq!(report.status, ConversionStatus::Success);
    }

    #[test]
    fn test_finalize_empty_input_is_success() {
        let mut report = report();
        report.record_result(&ConversionResult::default());
        report.finalize();
        assert_eq!(report.status, ConversionStatus::Success);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = report();
        report.record_result(&result(2, &[5]));
        report.finalize();
        assert_eq!(report.status, ConversionStatus::PartialSuccess);
        assert_eq!(report.errors[0].line, 5);
        assert_eq!(report.errors[0].message, "the 'name' field is empty");
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = report();
        report.record_result(&result(0, &[2, 3]));
        report.finalize();
        assert_eq!(report.status, ConversionStatus::Failed);
    }

    #[test]
    fn test_projection_error_entry() {
        let failure = RowFailure {
            line: 4,
            raw: "sur,5500000,-1000".to_string(),
            error: RowError::Projection(ProjectionError::NonFinite {
                x: f64::NAN,
                y: 0.0,
            }),
        };
        let entry = RowErrorEntry::from(&failure);
        assert_eq!(entry.line, 4);
        assert!(entry.message.starts_with("projection failed"));
    }

    #[test]
    fn test_outputs_and_summary() {
        let mut report = report();
        report.record_result(&result(4, &[6, 7]));
        report.record_output(Path::new("out/parcela.csv"));
        report.record_output(Path::new("out/parcela_errors.log"));

        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.summary(), "wgs84-to-gk: 4 converted, 2 errors");
    }

    #[test]
    fn test_save_to_file() {
        let mut report = report();
        report.record_result(&result(1, &[3]));
        report.finalize();

        let path = std::env::temp_dir().join(format!("gk-report-{}.json", std::process::id()));
        report.save_to_file(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["status"], "PartialSuccess");
        assert_eq!(value["rows_converted"], 1);
        assert_eq!(value["errors"][0]["line"], 3);

        std::fs::remove_file(&path).ok();
    }
}
