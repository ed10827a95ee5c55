//! Extraction des sommets d'un document KML
//!
//! Parcours événementiel (quick-xml), indépendant des préfixes de namespace.
//! Sont consommés :
//! - `Polygon/outerBoundaryIs/LinearRing/coordinates` (anneaux intérieurs ignorés)
//! - `Placemark/Point/coordinates` + `Placemark/name`
//!
//! Sortie : tous les sommets de polygones (ordre du document, ordre de
//! l'anneau), puis tous les points.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::error::GeometryParseError;
use crate::types::Vertex;

/// Chemin (noms locaux) d'un anneau extérieur
const OUTER_RING_PATH: [&str; 4] = ["Polygon", "outerBoundaryIs", "LinearRing", "coordinates"];

/// Point placemark en cours de lecture
#[derive(Debug, Default)]
struct PlacemarkState {
    name: Option<String>,
    positions: Vec<(f64, f64)>,
}

/// Extrait les sommets nommés d'un document KML
///
/// Erreurs : document mal formé ou sans aucun sommet exploitable.
pub fn extract(document: &str) -> Result<Vec<Vertex>, GeometryParseError> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut seen_root = false;

    let mut polygon_count = 0usize;
    let mut ring_vertex_count = 0usize;
    let mut polygon_vertices: Vec<Vertex> = Vec::new();

    // Un Placemark ne s'imbrique pas dans un autre en KML
    let mut placemark: Option<PlacemarkState> = None;
    let mut points: Vec<(Option<String>, f64, f64)> = Vec::new();

    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            GeometryParseError::malformed(reader.error_position() as u64, e.to_string())
        })?;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                seen_root = true;
                match name.as_str() {
                    "Polygon" => {
                        polygon_count += 1;
                        ring_vertex_count = 0;
                    }
                    "Placemark" => placemark = Some(PlacemarkState::default()),
                    _ => {}
                }
                stack.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                seen_root = true;
                if e.local_name().as_ref() == b"Polygon" {
                    polygon_count += 1;
                }
            }
            Event::Text(e) => {
                let chunk = e.unescape().map_err(|err| {
                    GeometryParseError::malformed(reader.buffer_position() as u64, err.to_string())
                })?;
                push_text(&mut text, &chunk);
            }
            Event::CData(e) => {
                push_text(&mut text, &String::from_utf8_lossy(&e));
            }
            Event::End(_) => {
                let Some(name) = stack.pop() else {
                    return Err(GeometryParseError::malformed(
                        reader.buffer_position() as u64,
                        "unexpected closing tag",
                    ));
                };

                match name.as_str() {
                    "coordinates" if in_outer_ring(&stack) => {
                        let mut ring = parse_coordinates(&text);
                        // La fermeture est une affaire de sortie : on ne la stocke pas
                        if ring.len() > 1 && ring.first() == ring.last() {
                            ring.pop();
                        }
                        for (lng, lat) in ring {
                            ring_vertex_count += 1;
                            polygon_vertices.push(Vertex::new(
                                format!("Polygon_{}_Vertex_{}", polygon_count, ring_vertex_count),
                                lat,
                                lng,
                            ));
                        }
                    }
                    "coordinates" if in_placemark_point(&stack) => {
                        if let Some(state) = placemark.as_mut() {
                            // Un Point n'a qu'une position : la première valide
                            if let Some(position) = parse_coordinates(&text).into_iter().next() {
                                state.positions.push(position);
                            }
                        }
                    }
                    "name" if stack.last().map(String::as_str) == Some("Placemark") => {
                        if let Some(state) = placemark.as_mut() {
                            let trimmed = text.trim();
                            if !trimmed.is_empty() {
                                state.name = Some(trimmed.to_string());
                            }
                        }
                    }
                    "Placemark" => {
                        if let Some(state) = placemark.take() {
                            for (lng, lat) in state.positions {
                                points.push((state.name.clone(), lat, lng));
                            }
                        }
                    }
                    _ => {}
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(GeometryParseError::UnclosedElement(open));
    }
    if !seen_root {
        return Err(GeometryParseError::NoRootElement);
    }

    let polygon_total = polygon_vertices.len();
    let mut vertices = polygon_vertices;
    for (idx, (name, lat, lng)) in points.into_iter().enumerate() {
        let name = name.unwrap_or_else(|| format!("Point_{}", polygon_total + idx + 1));
        vertices.push(Vertex::new(name, lat, lng));
    }

    if vertices.is_empty() {
        return Err(GeometryParseError::NoGeometry);
    }

    debug!(
        polygons = polygon_count,
        vertices = polygon_total,
        points = vertices.len() - polygon_total,
        "KML geometry extracted"
    );

    Ok(vertices)
}

fn push_text(buffer: &mut String, chunk: &str) {
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(chunk);
}

/// Vrai si la pile (après dépilement de `coordinates`) se termine par l'anneau extérieur
fn in_outer_ring(stack: &[String]) -> bool {
    let parents = &OUTER_RING_PATH[..3];
    stack.len() >= parents.len()
        && stack[stack.len() - parents.len()..]
            .iter()
            .zip(parents)
            .all(|(a, b)| a == b)
}

/// Vrai si `coordinates` appartient à un Point d'un Placemark (éventuellement
/// via MultiGeometry)
fn in_placemark_point(stack: &[String]) -> bool {
    stack.last().map(String::as_str) == Some("Point") && stack.iter().any(|s| s == "Placemark")
}

/// Parse un bloc `lng,lat[,alt] lng,lat[,alt] ...`
///
/// Les tuples invalides (arité, nombre, plage) sont ignorés avec un warning.
fn parse_coordinates(text: &str) -> Vec<(f64, f64)> {
    let normalized = tighten_commas(text);
    let mut positions = Vec::new();

    for tuple in normalized.split_whitespace() {
        match parse_tuple(tuple) {
            Some(position) => positions.push(position),
            None => warn!("Skipping malformed KML coordinate tuple '{}'", tuple),
        }
    }

    positions
}

fn parse_tuple(tuple: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = tuple.split(',').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }

    let mut values = [0.0; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        let value: f64 = fast_float::parse(part).ok()?;
        if !value.is_finite() {
            return None;
        }
        *slot = value;
    }

    let (lng, lat) = (values[0], values[1]);
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return None;
    }
    Some((lng, lat))
}

/// Retire les espaces autour des virgules ("-60.1, -32.9" → "-60.1,-32.9")
fn tighten_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && c != ',' && !out.ends_with(',') && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARCEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Lote 12</name>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>
              -60.6505,-32.9442,0
              -60.6500,-32.9442,0
              -60.6500,-32.9438,0
              -60.6505,-32.9438,0
            </coordinates>
          </LinearRing>
        </outerBoundaryIs>
        <innerBoundaryIs>
          <LinearRing>
            <coordinates>-60.6503,-32.9441 -60.6502,-32.9441 -60.6502,-32.9440</coordinates>
          </LinearRing>
        </innerBoundaryIs>
      </Polygon>
    </Placemark>
    <Placemark>
      <name>Mojón Norte</name>
      <Point><coordinates>-60.6510,-32.9430,0</coordinates></Point>
    </Placemark>
  </Document>
</kml>"#;

    #[test]
    fn test_polygon_and_named_point() {
        let vertices = extract(PARCEL).unwrap();
        assert_eq!(vertices.len(), 5);

        let names: Vec<&str> = vertices.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Polygon_1_Vertex_1",
                "Polygon_1_Vertex_2",
                "Polygon_1_Vertex_3",
                "Polygon_1_Vertex_4",
                "Mojón Norte",
            ]
        );
        assert_eq!(vertices[0].position.lat, -32.9442);
        assert_eq!(vertices[0].position.lng, -60.6505);
        assert_eq!(vertices[4].position.lat, -32.9430);
    }

    #[test]
    fn test_closing_vertex_dropped() {
        let kml = r#"<kml><Polygon><outerBoundaryIs><LinearRing>
            <coordinates>-60,-32 -60.1,-32 -60.1,-32.1 -60,-32</coordinates>
        </LinearRing></outerBoundaryIs></Polygon></kml>"#;
        let vertices = extract(kml).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[2].name, "Polygon_1_Vertex_3");
    }

    #[test]
    fn test_unnamed_points_count_polygon_vertices() {
        let kml = r#"<kml><Document>
            <Placemark><Point><coordinates>-60.1,-32.1</coordinates></Point></Placemark>
            <Placemark><Polygon><outerBoundaryIs><LinearRing>
                <coordinates>-60,-32 -60.1,-32 -60.1,-32.1</coordinates>
            </LinearRing></outerBoundaryIs></Polygon></Placemark>
            <Placemark><name>  </name><Point><coordinates>-60.2,-32.2</coordinates></Point></Placemark>
        </Document></kml>"#;

        let vertices = extract(kml).unwrap();
        let names: Vec<&str> = vertices.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Polygon_1_Vertex_1",
                "Polygon_1_Vertex_2",
                "Polygon_1_Vertex_3",
                "Point_4",
                "Point_5",
            ]
        );
    }

    #[test]
    fn test_name_after_point() {
        let kml = r#"<kml><Placemark>
            <Point><coordinates>-60.2,-32.2</coordinates></Point>
            <name>Esquina</name>
        </Placemark></kml>"#;
        let vertices = extract(kml).unwrap();
        assert_eq!(vertices[0].name, "Esquina");
    }

    #[test]
    fn test_multiple_polygons_numbering() {
        let kml = r#"<kml xmlns:k="http://www.opengis.net/kml/2.2"><k:Document>
            <k:Polygon><k:outerBoundaryIs><k:LinearRing>
                <k:coordinates>1,1 2,2</k:coordinates>
            </k:LinearRing></k:outerBoundaryIs></k:Polygon>
            <k:Polygon><k:outerBoundaryIs><k:LinearRing>
                <k:coordinates>3,3</k:coordinates>
            </k:LinearRing></k:outerBoundaryIs></k:Polygon>
        </k:Document></kml>"#;
        let vertices = extract(kml).unwrap();
        let names: Vec<&str> = vertices.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Polygon_1_Vertex_1", "Polygon_1_Vertex_2", "Polygon_2_Vertex_1"]
        );
    }

    #[test]
    fn test_malformed_tuples_skipped() {
        let kml = r#"<kml><Polygon><outerBoundaryIs><LinearRing><coordinates>
            -60,-32,0 abc,-32 -60.1 -60.1,-95 1,2,3,4 -60.2, -32.2
        </coordinates></LinearRing></outerBoundaryIs></Polygon></kml>"#;
        let vertices = extract(kml).unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].name, "Polygon_1_Vertex_1");
        assert_eq!(vertices[1].name, "Polygon_1_Vertex_2");
        assert_eq!(vertices[1].position.lng, -60.2);
        assert_eq!(vertices[1].position.lat, -32.2);
    }

    #[test]
    fn test_mismatched_tags() {
        let kml = "<kml><Document><Placemark></Document></kml>";
        assert!(matches!(
            extract(kml),
            Err(GeometryParseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unclosed_document() {
        let kml = "<kml><Document><Placemark>";
        assert!(matches!(
            extract(kml),
            Err(GeometryParseError::UnclosedElement(_))
        ));
    }

    #[test]
    fn test_not_xml() {
        assert_eq!(
            extract("esto no es un KML"),
            Err(GeometryParseError::NoRootElement)
        );
        assert_eq!(extract(""), Err(GeometryParseError::NoRootElement));
    }

    #[test]
    fn test_no_geometry() {
        let kml = r#"<kml><Document><name>Vacío</name></Document></kml>"#;
        assert_eq!(extract(kml), Err(GeometryParseError::NoGeometry));
    }

    #[test]
    fn test_tighten_commas() {
        assert_eq!(tighten_commas(" -60.1, -32.9  1 ,2 "), "-60.1,-32.9 1,2");
    }
}
