//! Typed style records extracted from KML `Style` elements.
//!
//! A single `Style` element can contribute up to one record of each kind; the
//! records keep the element's id so they can be resolved and regenerated.

use serde::{Deserialize, Serialize};

use super::RgbColor;

/// Smallest line width the editor accepts.
pub const MIN_LINE_WIDTH: u8 = 1;
/// Largest line width the editor accepts.
pub const MAX_LINE_WIDTH: u8 = 10;

/// Icon and label appearance for point features (`IconStyle` + `LabelStyle`).
///
/// `label_color` and `label_scale` only matter while `label_enabled` is set.
/// Disabling a label keeps them so that re-enabling restores the old look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    /// Style id (explicit or synthetic)
    pub id: String,
    /// Icon image URL from `Icon/href`
    pub icon_url: String,
    /// Icon scale, always > 0
    pub icon_scale: f64,
    /// Icon heading in degrees, normalized into `[0, 360)`
    pub icon_heading: f64,
    /// Icon tint (always written fully opaque)
    pub icon_color: RgbColor,
    /// Whether the feature name is drawn next to the icon
    pub label_enabled: bool,
    /// Label text color (always fully opaque)
    pub label_color: RgbColor,
    /// Label scale, always > 0
    pub label_scale: f64,
}

impl PointStyle {
    /// Creates a point style with KML defaults and the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            icon_url: String::new(),
            icon_scale: 1.0,
            icon_heading: 0.0,
            icon_color: RgbColor::WHITE,
            label_enabled: false,
            label_color: RgbColor::BLACK,
            label_scale: 1.0,
        }
    }
}

/// Stroke appearance for line features (`LineStyle` without a `PolyStyle`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Style id (explicit or synthetic)
    pub id: String,
    /// Stroke color
    pub line_color: RgbColor,
    /// Stroke opacity in `[0, 1]`
    pub line_opacity: f64,
    /// Stroke width in `[1, 10]`
    pub line_width: u8,
}

impl LineStyle {
    /// Creates a line style with KML defaults and the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            line_color: RgbColor::BLACK,
            line_opacity: 1.0,
            line_width: MIN_LINE_WIDTH,
        }
    }
}

/// Fill and outline appearance for polygon features (`PolyStyle`, plus the
/// sibling `LineStyle` for the outline when there is one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonStyle {
    /// Style id (explicit or synthetic)
    pub id: String,
    /// Fill color
    pub fill_color: RgbColor,
    /// Fill opacity in `[0, 1]`
    pub fill_opacity: f64,
    /// Whether the polygon interior is filled
    pub poly_fill: bool,
    /// Whether the polygon outline is drawn
    pub poly_outline: bool,
    /// Outline color
    pub line_color: RgbColor,
    /// Outline opacity in `[0, 1]`
    pub line_opacity: f64,
    /// Outline width in `[1, 10]`
    pub line_width: u8,
}

impl PolygonStyle {
    /// Creates a polygon style with KML defaults and the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fill_color: RgbColor::WHITE,
            fill_opacity: 1.0,
            poly_fill: true,
            poly_outline: true,
            line_color: RgbColor::BLACK,
            line_opacity: 1.0,
            line_width: MIN_LINE_WIDTH,
        }
    }
}

/// Normalizes a heading in degrees into `[0, 360)`; non-finite input becomes 0.
#[must_use]
pub fn normalize_heading(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Clamps a raw width into `[1, 10]`, truncating any fractional part.
#[must_use]
pub fn clamp_line_width(width: f64) -> u8 {
    if width.is_nan() {
        return MIN_LINE_WIDTH;
    }
    width
        .trunc()
        .clamp(f64::from(MIN_LINE_WIDTH), f64::from(MAX_LINE_WIDTH)) as u8
}

/// Returns `scale` when it is a usable positive number, otherwise 1.
#[must_use]
pub fn positive_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}
