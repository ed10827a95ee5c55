//! Export KML : un document, un style, un polygone

use quick_xml::escape::escape;

use gauss_kruger::ConvertedPoint;

use crate::config::KmlStyle;

/// Décimales des coordonnées du polygone
const COORD_DECIMALS: usize = 15;

/// Indentation des tuples dans `<coordinates>`
const COORD_INDENT: &str = "\n              ";

/// Génère le document KML du polygone formé par les points
///
/// L'anneau est fermé en répétant le premier sommet, sauf s'il l'est déjà.
pub fn render_kml(name: &str, points: &[ConvertedPoint], style: &KmlStyle) -> String {
    let mut ring = super::ring(points);
    ring.close();

    let coordinates = ring
        .coords()
        .map(|c| format!("{:.*},{:.*},0", COORD_DECIMALS, c.x, COORD_DECIMALS, c.y))
        .collect::<Vec<_>>()
        .join(COORD_INDENT);

    let name = escape(name);

    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>{name}</name>
    <Style id="polygonStyle">
      <LineStyle>
        <color>{line_color}</color>
        <width>{line_width}</width>
      </LineStyle>
      <PolyStyle>
        <color>{fill_color}</color>
        <fill>1</fill>
        <outline>1</outline>
      </PolyStyle>
    </Style>
    <Placemark>
      <name>{name}</name>
      <styleUrl>#polygonStyle</styleUrl>
      <Polygon>
        <extrude>1</extrude>
        <altitudeMode>clampToGround</altitudeMode>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>
              {coordinates}
            </coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </Placemark>
  </Document>
</kml>
"##,
        name = name,
        line_color = style.line_color,
        line_width = style.line_width,
        fill_color = style.fill_color,
        coordinates = coordinates,
    )
}
