//! Export CSV des points convertis

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use gauss_kruger::ConvertedPoint;

use crate::config::Profile;

/// Colonnes écrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    /// `name, lat, lng`
    Geographic,
    /// `name, lat, lng, easting, northing`
    GeographicAndPlanar,
}

impl CsvLayout {
    pub fn header(self, profile: &Profile) -> Vec<&str> {
        let out = &profile.output;
        match self {
            CsvLayout::Geographic => vec![out.name.as_str(), out.lat.as_str(), out.lng.as_str()],
            CsvLayout::GeographicAndPlanar => vec![
                out.name.as_str(),
                out.lat.as_str(),
                out.lng.as_str(),
                out.easting.as_str(),
                out.northing.as_str(),
            ],
        }
    }
}

/// Écrit l'en-tête (toujours) puis une ligne par point
pub fn write_csv<W: Write>(
    writer: W,
    points: &[ConvertedPoint],
    layout: CsvLayout,
    profile: &Profile,
) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(layout.header(profile))?;

    let geo = profile.precision.geographic;
    let planar = profile.precision.planar;

    for point in points {
        let mut record = vec![
            point.name.clone(),
            format!("{:.*}", geo, point.geographic.lat),
            format!("{:.*}", geo, point.geographic.lng),
        ];
        if layout == CsvLayout::GeographicAndPlanar {
            record.push(format!("{:.*}", planar, point.planar.easting));
            record.push(format!("{:.*}", planar, point.planar.northing));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Écrit le CSV dans un fichier
pub fn write_csv_file(
    path: &Path,
    points: &[ConvertedPoint],
    layout: CsvLayout,
    profile: &Profile,
) -> Result<()> {
    let file =
        File::create(path).context(format!("Failed to create file: {}", path.display()))?;
    write_csv(BufWriter::new(file), points, layout, profile)
        .context(format!("Failed to write CSV: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauss_kruger::{GeoPoint, PlanarPoint};

    fn rosario() -> ConvertedPoint {
        ConvertedPoint {
            line: 2,
            name: "Centro de Rosario".to_string(),
            geographic: GeoPoint::new(-32.9442, -60.6505),
            planar: PlanarPoint::new(5439229.945221, 6355430.748344),
        }
    }

    fn render(points: &[ConvertedPoint], layout: CsvLayout, profile: &Profile) -> String {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, points, layout, profile).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_geographic_and_planar_layout() {
        let csv = render(&[rosario()], CsvLayout::GeographicAndPlanar, &Profile::default());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "nombre,lat,lng,coordenadas_gauss_kruger_easting,coordenadas_gauss_kruger_northing"
        );
        assert_eq!(
            lines[1],
            "Centro de Rosario,-32.9442000000,-60.6505000000,5439229.945221,6355430.748344"
        );
    }

    #[test]
    fn test_geographic_layout() {
        let csv = render(&[rosario()], CsvLayout::Geographic, &Profile::default());
        assert_eq!(csv, "nombre,lat,lng\nCentro de Rosario,-32.9442000000,-60.6505000000\n");
    }

    #[test]
    fn test_header_only_when_empty() {
        let csv = render(&[], CsvLayout::Geographic, &Profile::default());
        assert_eq!(csv, "nombre,lat,lng\n");
    }

    #[test]
    fn test_profile_names_and_quoting() {
        let mut profile = Profile::from_preset("simple").unwrap();
        profile.precision.planar = 2;

        let mut point = rosario();
        point.name = "Mojón \"A\", norte".to_string();

        let csv = render(&[point], CsvLayout::GeographicAndPlanar, &profile);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "name,lat,lng,easting,northing");
        assert!(lines[1].starts_with("\"Mojón \"\"A\"\", norte\","));
        assert!(lines[1].ends_with(",5439229.95,6355430.75"));
    }
}
