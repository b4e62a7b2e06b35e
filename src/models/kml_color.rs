//! KML color codec.
//!
//! KML stores colors as eight hex digits in `aabbggrr` order. The editor works
//! with a separated `(RgbColor, opacity)` pair instead, and the renderer wants
//! CSS-style `rgba(...)` strings.

use super::RgbColor;

/// Opacity assumed when a KML color cannot be decoded.
pub const DEFAULT_OPACITY: f64 = 1.0;

/// Decodes a KML `aabbggrr` color into an RGB color and an opacity in `[0, 1]`.
///
/// Never fails: anything that is not exactly eight hex digits decodes to
/// opaque black.
///
/// # Examples
///
/// ```
/// use kmlstyler::models::{kml_color, RgbColor};
///
/// let (rgb, opacity) = kml_color::decode("7f0000ff");
/// assert_eq!(rgb, RgbColor::new(255, 0, 0));
/// assert!((opacity - 127.0 / 255.0).abs() < f64::EPSILON);
///
/// assert_eq!(kml_color::decode("bogus"), (RgbColor::BLACK, 1.0));
/// ```
#[must_use]
pub fn decode(kml_color: &str) -> (RgbColor, f64) {
    try_decode(kml_color).unwrap_or((RgbColor::BLACK, DEFAULT_OPACITY))
}

/// Decodes a KML color, returning `None` when it is malformed.
#[must_use]
pub fn try_decode(kml_color: &str) -> Option<(RgbColor, f64)> {
    let kml_color = kml_color.trim();
    if kml_color.len() != 8 || !kml_color.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&kml_color[range], 16).ok();
    let alpha = channel(0..2)?;
    let blue = channel(2..4)?;
    let green = channel(4..6)?;
    let red = channel(6..8)?;

    Some((RgbColor::new(red, green, blue), f64::from(alpha) / 255.0))
}

/// Encodes an RGB color and opacity as a KML `aabbggrr` color.
///
/// Opacity is clamped to `[0, 1]` and quantized to `round(opacity * 255)`.
///
/// # Examples
///
/// ```
/// use kmlstyler::models::{kml_color, RgbColor};
///
/// assert_eq!(kml_color::encode(RgbColor::new(0x12, 0x34, 0x56), 1.0), "ff563412");
/// assert_eq!(kml_color::encode(RgbColor::new(255, 0, 0), 0.0), "000000ff");
/// ```
#[must_use]
pub fn encode(rgb: RgbColor, opacity: f64) -> String {
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        alpha_byte(opacity),
        rgb.b,
        rgb.g,
        rgb.r
    )
}

/// Formats a color as `rgba(r, g, b, opacity)` for the renderer.
#[must_use]
pub fn to_rgba_string(rgb: RgbColor, opacity: f64) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        rgb.r,
        rgb.g,
        rgb.b,
        clamp_opacity(opacity)
    )
}

/// Clamps an opacity into `[0, 1]`, mapping NaN to fully opaque.
#[must_use]
pub fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        DEFAULT_OPACITY
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

fn alpha_byte(opacity: f64) -> u8 {
    (clamp_opacity(opacity) * 255.0).round() as u8
}
