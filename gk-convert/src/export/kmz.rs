//! KMZ : document KML compressé dans une archive zip

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Nom de l'entrée lue en priorité par les clients KML
pub const DOC_KML: &str = "doc.kml";

/// Écrit `kml` comme unique entrée `doc.kml` (deflate)
pub fn write_kmz<W: Write + Seek>(writer: W, kml: &str) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(DOC_KML, options)?;
    zip.write_all(kml.as_bytes())?;
    Ok(zip.finish()?)
}

pub fn write_kmz_file(path: &Path, kml: &str) -> Result<()> {
    let file =
        File::create(path).context(format!("Failed to create file: {}", path.display()))?;
    let mut writer = write_kmz(BufWriter::new(file), kml)
        .context(format!("Failed to write KMZ: {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// Lit le document KML d'une archive : `doc.kml`, sinon la première entrée `.kml`
pub fn read_kml<R: Read + Seek>(reader: R) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(reader).context("Invalid KMZ archive")?;
    let mut data = Vec::new();

    if let Ok(mut entry) = archive.by_name(DOC_KML) {
        entry.read_to_end(&mut data)?;
        return Ok(data);
    }

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_file() && entry.name().to_ascii_lowercase().ends_with(".kml") {
            entry.read_to_end(&mut data)?;
            return Ok(data);
        }
    }

    anyhow::bail!("No .kml document found in KMZ archive")
}

pub fn read_kml_file(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).context(format!("Cannot open {}", path.display()))?;
    read_kml(BufReader::new(file)).context(format!("Failed to read KMZ: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const KML: &str = "<kml><Placemark><name>A</name><Point><coordinates>-60,-32</coordinates></Point></Placemark></kml>";

    #[test]
    fn test_write_then_read_doc_kml() {
        let buffer = write_kmz(Cursor::new(Vec::new()), KML).unwrap().into_inner();

        let mut archive = ZipArchive::new(Cursor::new(&buffer)).unwrap();
        assert_eq!(archive.len(), 1);
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "doc.kml");
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        drop(entry);

        let data = read_kml(Cursor::new(buffer)).unwrap();
        assert_eq!(data, KML.as_bytes());
    }

    #[test]
    fn test_read_first_kml_entry_when_no_doc_kml() {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file("images/logo.png", options).unwrap();
            zip.write_all(b"not a kml").unwrap();
            zip.start_file("Parcela.KML", options).unwrap();
            zip.write_all(KML.as_bytes()).unwrap();
            zip.finish().unwrap();
        }

        let data = read_kml(Cursor::new(buffer)).unwrap();
        assert_eq!(data, KML.as_bytes());
    }

    #[test]
    fn test_archive_without_kml() {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options: FileOptions<'_, ()> = FileOptions::default();
            zip.start_file("readme.txt", options).unwrap();
            zip.write_all(b"hola").unwrap();
            zip.finish().unwrap();
        }

        let err = read_kml(Cursor::new(buffer)).unwrap_err();
        assert!(err.to_string().contains("No .kml document"));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(read_kml(Cursor::new(b"plain text".to_vec())).is_err());
    }
}
