//! Lecture des entrées : décodage, tableaux CSV, documents KML

pub mod csv;
pub mod kml;

use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Décode les bytes d'un fichier d'entrée
///
/// UTF-8 (BOM retiré) si valide, sinon Windows-1252 : les exports de tableur
/// contiennent souvent des noms accentués ("Mojón") en encodage Windows.
pub fn decode(data: &[u8]) -> String {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    match simdutf8::basic::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("Input is not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(data);
            decoded.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_with_bom() {
        let data = b"\xEF\xBB\xBFnombre,lat,lng\n";
        assert_eq!(decode(data), "nombre,lat,lng\n");
    }

    #[test]
    fn test_decode_windows_1252() {
        // "Mojón" avec ó = 0xF3 en Windows-1252
        let data = b"Moj\xF3n 1";
        assert_eq!(decode(data), "Mojón 1");
    }

    #[test]
    fn test_decode_plain_utf8() {
        assert_eq!(decode("Mojón".as_bytes()), "Mojón");
    }
}
