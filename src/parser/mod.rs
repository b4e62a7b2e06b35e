//! Parsing for KML documents.
//!
//! This module owns the XML element tree, extracts styles and style maps
//! into the style model, and reads placemarks into map features.

pub mod features;
pub mod styles;
pub mod xml;

// Re-export commonly used functions
pub use features::read_features;
pub use styles::parse_styles;
pub use xml::{XmlDocument, XmlElement, XmlNode};
