//! Lecture d'un tableau CSV avec en-tête
//!
//! Le nombre de colonnes peut varier d'une ligne à l'autre : une ligne trop
//! courte est un problème de validation, pas une erreur de lecture.

use csv::ReaderBuilder;

use crate::error::{GkError, SchemaError};
use crate::types::RawRecord;

/// Tableau lu : en-tête + lignes avec leur numéro de ligne d'origine
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub records: Vec<RawRecord>,
}

/// Lit un tableau CSV depuis un texte déjà décodé
///
/// Erreurs : `SchemaError::MissingHeader` si le texte est vide.
pub fn read_table(text: &str) -> Result<CsvTable, GkError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if header.is_empty() || header.iter().all(String::is_empty) {
        return Err(SchemaError::MissingHeader.into());
    }

    // Le lecteur saute les lignes vides et ne compte pas les retours à la
    // ligne des cellules entre guillemets : on recompte depuis l'offset.
    let mut lines = LineCounter::new(text.as_bytes());
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = match record.position() {
            Some(position) => lines.line_at(position.byte() as usize),
            None => records.len() + 2,
        };

        records.push(RawRecord {
            line,
            values: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(CsvTable { header, records })
}

/// Numéro de ligne physique d'un offset, calculé incrémentalement
struct LineCounter<'a> {
    bytes: &'a [u8],
    scanned: usize,
    newlines: usize,
}

impl<'a> LineCounter<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            scanned: 0,
            newlines: 0,
        }
    }

    /// Ligne 1-based du premier octet utile à partir de `offset`
    ///
    /// Les offsets doivent être croissants. Les terminateurs et lignes vides
    /// qui précèdent l'enregistrement sont sautés.
    fn line_at(&mut self, offset: usize) -> usize {
        let mut start = offset.clamp(self.scanned, self.bytes.len());
        while start < self.bytes.len() && matches!(self.bytes[start], b'\r' | b'\n') {
            start += 1;
        }

        self.newlines += self.bytes[self.scanned..start]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.scanned = start;
        self.newlines + 1
    }
}
