//! Renderer-facing style primitives.
//!
//! These mirror the icon/text/fill/stroke constructors of a vector map
//! renderer. Colors are `rgba(...)` strings ready for the canvas.

use serde::{Deserialize, Serialize};

/// Icon image for point geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconSymbol {
    /// Image URL
    pub src: String,
    /// Scale factor
    pub scale: f64,
    /// Rotation in radians, clockwise
    pub rotation: f64,
    /// Tint color
    pub color: String,
}

/// Text label drawn next to a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSymbol {
    /// Label text (the feature name)
    pub text: String,
    /// CSS font shorthand, e.g. `18px Arial`
    pub font: String,
    /// Text color
    pub fill_color: String,
    /// Halo color around the glyphs
    pub halo_color: String,
    /// Halo width in pixels
    pub halo_width: f64,
    /// Vertical offset in pixels
    pub offset_y: f64,
}

/// Area fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillSymbol {
    /// Fill color
    pub color: String,
}

/// Line or outline stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSymbol {
    /// Stroke color
    pub color: String,
    /// Stroke width in pixels
    pub width: f64,
}

/// Concrete style applied to one feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    /// Point icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<IconSymbol>,
    /// Point label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextSymbol>,
    /// Polygon fill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillSymbol>,
    /// Line or polygon outline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeSymbol>,
}

impl RenderStyle {
    /// True when nothing would be drawn.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.image.is_none() && self.text.is_none() && self.fill.is_none() && self.stroke.is_none()
    }
}
