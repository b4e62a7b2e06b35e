//! Data models for KML styles, style maps, features, and render styles.
//!
//! This module contains the core data structures used throughout the application.
//! Models are independent of XML handling and of any UI.

pub mod feature;
pub mod kml_color;
pub mod render;
pub mod rgb;
pub mod style;
pub mod style_map;
pub mod style_model;

// Re-export all model types
pub use feature::{Coordinate, Extent, Feature, FeatureStore, Geometry, Projection};
pub use render::{FillSymbol, IconSymbol, RenderStyle, StrokeSymbol, TextSymbol};
pub use rgb::RgbColor;
pub use style::{LineStyle, PointStyle, PolygonStyle};
pub use style_map::{StyleMapEntry, StyleMapTable};
pub use style_model::{StyleModel, StyleRecords};
