//! Map features read from `Placemark` elements and the store that holds them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

use super::RenderStyle;

/// WGS84 semi-major axis used by Web Mercator.
const EARTH_RADIUS: f64 = 6_378_137.0;
/// Latitude limit of the Web Mercator square.
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// Target projection for feature coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Projection {
    /// Longitude/latitude degrees (EPSG:4326)
    #[serde(rename = "EPSG:4326")]
    Geographic,
    /// Spherical Mercator meters (EPSG:3857)
    #[default]
    #[serde(rename = "EPSG:3857")]
    WebMercator,
}

impl Projection {
    /// Projects a longitude/latitude pair.
    #[must_use]
    pub fn project(self, lon: f64, lat: f64) -> Coordinate {
        match self {
            Self::Geographic => Coordinate { x: lon, y: lat },
            Self::WebMercator => {
                let lat = lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
                Coordinate {
                    x: EARTH_RADIUS * lon.to_radians(),
                    y: EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln(),
                }
            }
        }
    }

    /// EPSG code of the projection.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Geographic => "EPSG:4326",
            Self::WebMercator => "EPSG:3857",
        }
    }
}

/// A projected position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Easting / longitude
    pub x: f64,
    /// Northing / latitude
    pub y: f64,
}

/// Supported geometry kinds. Altitude is dropped on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// Single position
    Point(Coordinate),
    /// Open polyline
    LineString(Vec<Coordinate>),
    /// Closed ring outside a polygon
    LinearRing(Vec<Coordinate>),
    /// Outer boundary followed by inner boundaries
    Polygon(Vec<Vec<Coordinate>>),
}

impl Geometry {
    /// Iterates every coordinate of the geometry.
    pub fn coordinates(&self) -> Box<dyn Iterator<Item = &Coordinate> + '_> {
        match self {
            Self::Point(coordinate) => Box::new(std::iter::once(coordinate)),
            Self::LineString(coordinates) | Self::LinearRing(coordinates) => {
                Box::new(coordinates.iter())
            }
            Self::Polygon(rings) => Box::new(rings.iter().flatten()),
        }
    }

    /// Short kind name for display.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::LinearRing(_) => "LinearRing",
            Self::Polygon(_) => "Polygon",
        }
    }
}

/// Bounding box `[min_x, min_y, max_x, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Smallest x
    pub min_x: f64,
    /// Smallest y
    pub min_y: f64,
    /// Largest x
    pub max_x: f64,
    /// Largest y
    pub max_y: f64,
}

impl Extent {
    fn around(coordinate: Coordinate) -> Self {
        Self {
            min_x: coordinate.x,
            min_y: coordinate.y,
            max_x: coordinate.x,
            max_y: coordinate.y,
        }
    }

    fn extend(&mut self, coordinate: Coordinate) {
        self.min_x = self.min_x.min(coordinate.x);
        self.min_y = self.min_y.min(coordinate.y);
        self.max_x = self.max_x.max(coordinate.x);
        self.max_y = self.max_y.max(coordinate.y);
    }
}

/// One placemark: its properties, geometry, and current style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// `id` attribute of the placemark, if any
    pub id: Option<String>,
    /// `name`, `description`, `styleUrl`, and extended data values
    pub properties: BTreeMap<String, String>,
    /// Geometry, `None` when absent or unsupported
    pub geometry: Option<Geometry>,
    style: Option<RenderStyle>,
}

impl Feature {
    /// Creates a feature without geometry or style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property (builder form).
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Sets the geometry (builder form).
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Reads a property such as `name` or `styleUrl`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Feature name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    /// Raw `styleUrl`, if any.
    #[must_use]
    pub fn style_url(&self) -> Option<&str> {
        self.get("styleUrl")
    }

    /// Style currently applied.
    #[must_use]
    pub const fn style(&self) -> Option<&RenderStyle> {
        self.style.as_ref()
    }

    /// Replaces the applied style.
    pub fn set_style(&mut self, style: Option<RenderStyle>) {
        self.style = style;
    }
}

/// Vector source holding the imported features.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    features: Vec<Feature>,
}

impl FeatureStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every feature.
    pub fn clear(&mut self) {
        self.features.clear();
    }

    /// Appends features.
    pub fn add_features(&mut self, features: Vec<Feature>) {
        self.features.extend(features);
    }

    /// All features in insertion order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Mutable access for restyling.
    pub fn features_mut(&mut self) -> &mut [Feature] {
        &mut self.features
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounding box of every coordinate, `None` without geometry.
    #[must_use]
    pub fn extent(&self) -> Option<Extent> {
        let mut coordinates = self
            .features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .flat_map(Geometry::coordinates);

        let mut extent = Extent::around(*coordinates.next()?);
        for coordinate in coordinates {
            extent.extend(*coordinate);
        }
        Some(extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_web_mercator_projection() {
        let origin = Projection::WebMercator.project(0.0, 0.0);
        assert!(approx(origin.x, 0.0) && approx(origin.y, 0.0));

        let east = Projection::WebMercator.project(180.0, 0.0);
        assert!(approx(east.x, 20_037_508.342_789_244));

        let pole = Projection::WebMercator.project(0.0, 90.0);
        assert!(pole.y.is_finite());
        assert!((pole.y - 20_037_508.34).abs() < 1.0);
    }

    #[test]
    fn test_geographic_projection_is_identity() {
        let c = Projection::Geographic.project(12.5, -45.0);
        assert!(approx(c.x, 12.5) && approx(c.y, -45.0));
    }

    #[test]
    fn test_store_extent() {
        let mut store = FeatureStore::new();
        assert!(store.extent().is_none());

        store.add_features(vec![
            Feature::new().with_geometry(Geometry::Point(Coordinate { x: 1.0, y: 5.0 })),
            Feature::new(),
            Feature::new().with_geometry(Geometry::LineString(vec![
                Coordinate { x: -2.0, y: 0.0 },
                Coordinate { x: 3.0, y: 1.0 },
            ])),
        ]);

        let extent = store.extent().unwrap();
        assert_eq!(
            extent,
            Extent {
                min_x: -2.0,
                min_y: 0.0,
                max_x: 3.0,
                max_y: 5.0
            }
        );

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_feature_properties() {
        let mut feature = Feature::new()
            .with_property("name", "Cafe")
            .with_property("styleUrl", "#pin");
        assert_eq!(feature.name(), Some("Cafe"));
        assert_eq!(feature.style_url(), Some("#pin"));
        assert!(feature.style().is_none());

        feature.set_style(Some(RenderStyle::default()));
        assert!(feature.style().is_some_and(RenderStyle::is_blank));
    }
}
