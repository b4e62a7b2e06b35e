//! Reading `Placemark` elements into map features.

use tracing::debug;

use super::styles::parse_style_element;
use super::xml::{XmlDocument, XmlElement};
use crate::config::RenderConfig;
use crate::models::{Coordinate, Feature, Geometry, Projection, StyleRecords};
use crate::services::resolver::render_records;

/// Placemark children read as properties. Extended data can't override them.
const PLACEMARK_FIELDS: [&str; 3] = ["name", "description", "styleUrl"];

/// Reads every placemark of the document in document order.
///
/// Inline `Style` children become the feature's initial style; shared styles
/// referenced through `styleUrl` are applied later by the resolver.
#[must_use]
pub fn read_features(
    document: &XmlDocument,
    projection: Projection,
    render: &RenderConfig,
) -> Vec<Feature> {
    let Some(root) = document.root() else {
        return Vec::new();
    };

    root.descendants("Placemark")
        .into_iter()
        .map(|placemark| read_feature(placemark, projection, render))
        .collect()
}

fn read_feature(placemark: &XmlElement, projection: Projection, render: &RenderConfig) -> Feature {
    let mut feature = Feature::new();
    feature.id = placemark.attribute("id").map(str::to_string);

    for field in PLACEMARK_FIELDS {
        if let Some(value) = placemark.child_text(field) {
            feature.properties.insert(field.to_string(), value);
        }
    }
    if let Some(extended) = placemark.child("ExtendedData") {
        read_extended_data(extended, &mut feature);
    }

    feature.geometry = read_geometry(placemark, projection);

    if let Some(inline) = placemark.child("Style") {
        let parsed = parse_style_element(inline, "");
        let records = StyleRecords {
            point: parsed.point.as_ref(),
            line: parsed.line.as_ref(),
            polygon: parsed.polygon.as_ref(),
        };
        feature.set_style(render_records(records, feature.name(), render));
    }

    feature
}

fn read_extended_data(extended: &XmlElement, feature: &mut Feature) {
    for data in extended.elements().filter(|e| e.is("Data")) {
        if let Some(name) = data.attribute("name") {
            let value = data.child("value").map(XmlElement::text).unwrap_or_default();
            set_extended(feature, name, &value);
        }
    }

    for simple in extended.descendants("SimpleData") {
        if let Some(name) = simple.attribute("name") {
            set_extended(feature, name, &simple.text());
        }
    }
}

fn set_extended(feature: &mut Feature, name: &str, value: &str) {
    if PLACEMARK_FIELDS.contains(&name) {
        debug!(field = name, "Extended data shadows a placemark field, ignored");
        return;
    }
    feature
        .properties
        .insert(name.to_string(), value.trim().to_string());
}

fn read_geometry(placemark: &XmlElement, projection: Projection) -> Option<Geometry> {
    let geometry = placemark.elements().find(|e| {
        ["Point", "LineString", "LinearRing", "Polygon", "MultiGeometry", "Model", "Track"]
            .iter()
            .any(|kind| e.is(kind))
    })?;

    let coordinates = |element: &XmlElement| -> Vec<Coordinate> {
        element
            .child_text("coordinates")
            .map(|text| parse_coordinates(&text, projection))
            .unwrap_or_default()
    };

    match geometry.local_name() {
        "Point" => coordinates(geometry).into_iter().next().map(Geometry::Point),
        "LineString" => Some(Geometry::LineString(coordinates(geometry))),
        "LinearRing" => Some(Geometry::LinearRing(coordinates(geometry))),
        "Polygon" => {
            let ring = |boundary: &XmlElement| boundary.child("LinearRing").map(&coordinates);
            let outer = geometry.child("outerBoundaryIs").and_then(ring)?;
            let mut rings = vec![outer];
            rings.extend(
                geometry
                    .elements()
                    .filter(|e| e.is("innerBoundaryIs"))
                    .filter_map(ring),
            );
            Some(Geometry::Polygon(rings))
        }
        other => {
            debug!(kind = other, "Unsupported geometry, feature kept without geometry");
            None
        }
    }
}

/// Parses a KML `coordinates` string (`lon,lat[,alt]` tuples separated by
/// whitespace). Malformed tuples are skipped and altitude is dropped.
#[must_use]
pub fn parse_coordinates(text: &str, projection: Projection) -> Vec<Coordinate> {
    text.split_whitespace()
        .filter_map(|tuple| {
            let mut parts = tuple.split(',').map(str::trim);
            let lon = parts.next()?.parse::<f64>().ok()?;
            let lat = parts.next()?.parse::<f64>().ok()?;
            (lon.is_finite() && lat.is_finite()).then(|| projection.project(lon, lat))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"<kml><Document>
      <Placemark id="pm1">
        <name>Harbour</name>
        <styleUrl>#pin</styleUrl>
        <ExtendedData>
          <Data name="depth"><value> 12 </value></Data>
          <SchemaData schemaUrl="#s"><SimpleData name="owner">Port</SimpleData></SchemaData>
        </ExtendedData>
        <Point><coordinates>10,20,5</coordinates></Point>
      </Placemark>
      <Folder>
        <Placemark>
          <name>Lake</name>
          <Style><PolyStyle><color>ff0000ff</color></PolyStyle></Style>
          <Polygon>
            <outerBoundaryIs><LinearRing><coordinates>0,0 1,0 1,1 0,0</coordinates></LinearRing></outerBoundaryIs>
            <innerBoundaryIs><LinearRing><coordinates>0.2,0.2 0.4,0.2 0.2,0.4 0.2,0.2</coordinates></LinearRing></innerBoundaryIs>
          </Polygon>
        </Placemark>
      </Folder>
      <Placemark><name>Multi</name><MultiGeometry><Point><coordinates>1,1</coordinates></Point></MultiGeometry></Placemark>
    </Document></kml>"##;

    fn read(projection: Projection) -> Vec<Feature> {
        let document = XmlDocument::parse(DOC).unwrap();
        read_features(&document, projection, &RenderConfig::default())
    }

    #[test]
    fn test_reads_properties_and_geometry() {
        let features = read(Projection::Geographic);
        assert_eq!(features.len(), 3);

        let harbour = &features[0];
        assert_eq!(harbour.id.as_deref(), Some("pm1"));
        assert_eq!(harbour.name(), Some("Harbour"));
        assert_eq!(harbour.style_url(), Some("#pin"));
        assert_eq!(harbour.get("depth"), Some("12"));
        assert_eq!(harbour.get("owner"), Some("Port"));
        assert_eq!(
            harbour.geometry,
            Some(Geometry::Point(Coordinate { x: 10.0, y: 20.0 }))
        );
        assert!(harbour.style().is_none());
    }

    #[test]
    fn test_polygon_rings_and_inline_style() {
        let features = read(Projection::Geographic);
        let lake = &features[1];
        match lake.geometry.as_ref().unwrap() {
            Geometry::Polygon(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[0].len(), 4);
            }
            other => panic!("expected polygon, got {other:?}"),
        }

        let style = lake.style().unwrap();
        assert_eq!(style.fill.as_ref().unwrap().color, "rgba(255, 0, 0, 1)");
    }

    #[test]
    fn test_extended_data_does_not_shadow_placemark_fields() {
        let document = XmlDocument::parse(
            r##"<kml><Document><Placemark>
                  <name>Harbour</name>
                  <styleUrl>#pin</styleUrl>
                  <ExtendedData>
                    <Data name="name"><value>Override</value></Data>
                    <SchemaData><SimpleData name="styleUrl">#other</SimpleData></SchemaData>
                    <Data name="depth"><value>3</value></Data>
                  </ExtendedData>
                </Placemark></Document></kml>"##,
        )
        .unwrap();
        let features = read_features(&document, Projection::Geographic, &RenderConfig::default());

        assert_eq!(features[0].name(), Some("Harbour"));
        assert_eq!(features[0].style_url(), Some("#pin"));
        assert_eq!(features[0].get("depth"), Some("3"));
    }

    #[test]
    fn test_multi_geometry_is_unsupported() {
        let features = read(Projection::Geographic);
        assert_eq!(features[2].name(), Some("Multi"));
        assert!(features[2].geometry.is_none());
    }

    #[test]
    fn test_projection_is_applied() {
        let features = read(Projection::WebMercator);
        match features[0].geometry.as_ref().unwrap() {
            Geometry::Point(c) => assert!(c.x > 1_000_000.0),
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_coordinates_skips_garbage() {
        let coords = parse_coordinates("1,2 bad 3,x 4,5,6\n7,8", Projection::Geographic);
        assert_eq!(
            coords,
            vec![
                Coordinate { x: 1.0, y: 2.0 },
                Coordinate { x: 4.0, y: 5.0 },
                Coordinate { x: 7.0, y: 8.0 },
            ]
        );
    }
}
