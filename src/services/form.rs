//! Bridge between editing controls and the style model.
//!
//! Controls are addressed by `<field>_<index>`, where the index is the
//! record's position within its kind (`lineWidth_0` is the first line style).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::kml_color::clamp_opacity;
use crate::models::style::{clamp_line_width, normalize_heading, positive_scale};
use crate::models::{RgbColor, StyleModel};

/// Read access to control values.
pub trait FormSource {
    /// Text value of a control, `None` when the control does not exist.
    fn value(&self, key: &str) -> Option<String>;

    /// Checked state of a checkbox, `None` when the control does not exist.
    fn checked(&self, key: &str) -> Option<bool>;
}

/// Control values keyed by control name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerates the controls for every record of the model.
    #[must_use]
    pub fn from_model(model: &StyleModel) -> Self {
        let mut form = Self::new();

        for (index, point) in model.points.iter().enumerate() {
            form.set(key("iconUrl", index), &point.icon_url);
            form.set(key("iconScale", index), point.icon_scale.to_string());
            form.set(key("iconHeading", index), point.icon_heading.to_string());
            form.set(key("iconColor", index), point.icon_color.to_hex());
            form.set(key("labelEnabled", index), point.label_enabled.to_string());
            form.set(key("labelColor", index), point.label_color.to_hex());
            form.set(key("labelScale", index), point.label_scale.to_string());
        }

        for (index, line) in model.lines.iter().enumerate() {
            form.set(key("lineColor", index), line.line_color.to_hex());
            form.set(key("lineOpacity", index), line.line_opacity.to_string());
            form.set(key("lineWidth", index), line.line_width.to_string());
        }

        for (index, polygon) in model.polygons.iter().enumerate() {
            form.set(key("fillColor", index), polygon.fill_color.to_hex());
            form.set(key("fillOpacity", index), polygon.fill_opacity.to_string());
            form.set(key("polyFill", index), polygon.poly_fill.to_string());
            form.set(key("polyOutline", index), polygon.poly_outline.to_string());
            form.set(key("polyLineColor", index), polygon.line_color.to_hex());
            form.set(key("polyLineOpacity", index), polygon.line_opacity.to_string());
            form.set(key("polyLineWidth", index), polygon.line_width.to_string());
        }

        form
    }

    /// Sets a control value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw control value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Copies every value of `other` over this form.
    pub fn merge(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Number of controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no controls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Controls in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FormSource for FormValues {
    fn value(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn checked(&self, key: &str) -> Option<bool> {
        self.get(key).map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "on" | "yes" | "checked"
            )
        })
    }
}

fn key(field: &str, index: usize) -> String {
    format!("{field}_{index}")
}

/// Pulls every control value into the model.
///
/// A missing control leaves its field alone, an unparsable number becomes the
/// field's default, and an invalid color is ignored. Label color and scale are
/// only read while the label is enabled.
pub fn apply_form(model: &mut StyleModel, form: &impl FormSource) {
    for (index, point) in model.points.iter_mut().enumerate() {
        if let Some(url) = form.value(&key("iconUrl", index)) {
            point.icon_url = url.trim().to_string();
        }
        if let Some(scale) = number(form, &key("iconScale", index), 1.0) {
            point.icon_scale = positive_scale(scale);
        }
        if let Some(heading) = number(form, &key("iconHeading", index), 0.0) {
            point.icon_heading = normalize_heading(heading);
        }
        if let Some(color) = color(form, &key("iconColor", index)) {
            point.icon_color = color;
        }
        if let Some(enabled) = form.checked(&key("labelEnabled", index)) {
            point.label_enabled = enabled;
        }
        if point.label_enabled {
            if let Some(color) = color(form, &key("labelColor", index)) {
                point.label_color = color;
            }
            if let Some(scale) = number(form, &key("labelScale", index), 1.0) {
                point.label_scale = positive_scale(scale);
            }
        }
    }

    for (index, line) in model.lines.iter_mut().enumerate() {
        if let Some(color) = color(form, &key("lineColor", index)) {
            line.line_color = color;
        }
        if let Some(opacity) = number(form, &key("lineOpacity", index), 1.0) {
            line.line_opacity = clamp_opacity(opacity);
        }
        if let Some(width) = number(form, &key("lineWidth", index), 1.0) {
            line.line_width = clamp_line_width(width);
        }
    }

    for (index, polygon) in model.polygons.iter_mut().enumerate() {
        if let Some(color) = color(form, &key("fillColor", index)) {
            polygon.fill_color = color;
        }
        if let Some(opacity) = number(form, &key("fillOpacity", index), 1.0) {
            polygon.fill_opacity = clamp_opacity(opacity);
        }
        if let Some(fill) = form.checked(&key("polyFill", index)) {
            polygon.poly_fill = fill;
        }
        if let Some(outline) = form.checked(&key("polyOutline", index)) {
            polygon.poly_outline = outline;
        }
        if let Some(color) = color(form, &key("polyLineColor", index)) {
            polygon.line_color = color;
        }
        if let Some(opacity) = number(form, &key("polyLineOpacity", index), 1.0) {
            polygon.line_opacity = clamp_opacity(opacity);
        }
        if let Some(width) = number(form, &key("polyLineWidth", index), 1.0) {
            polygon.line_width = clamp_line_width(width);
        }
    }
}

fn number(form: &impl FormSource, key: &str, default: f64) -> Option<f64> {
    let text = form.value(key)?;
    Some(
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .unwrap_or(default),
    )
}

fn color(form: &impl FormSource, key: &str) -> Option<RgbColor> {
    RgbColor::from_hex(form.value(key)?.trim()).ok()
}

/// One editable record in the control panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlEntry {
    /// Position within its kind, used in control keys
    pub index: usize,
    /// Style id shown as the section caption
    pub id: String,
}

/// Summary of the controls built for a model, one section per style kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControlPanel {
    /// Point style controls
    pub points: Vec<ControlEntry>,
    /// Line style controls
    pub lines: Vec<ControlEntry>,
    /// Polygon style controls
    pub polygons: Vec<ControlEntry>,
}

impl ControlPanel {
    /// Builds the panel for a model.
    #[must_use]
    pub fn from_model(model: &StyleModel) -> Self {
        let entries = |ids: Vec<&String>| {
            ids.into_iter()
                .enumerate()
                .map(|(index, id)| ControlEntry {
                    index,
                    id: id.clone(),
                })
                .collect()
        };

        Self {
            points: entries(model.points.iter().map(|s| &s.id).collect()),
            lines: entries(model.lines.iter().map(|s| &s.id).collect()),
            polygons: entries(model.polygons.iter().map(|s| &s.id).collect()),
        }
    }

    /// True when the document had no styles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty() && self.polygons.is_empty()
    }
}

impl fmt::Display for ControlPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No styles found");
        }

        for (title, entries) in [
            ("Point styles", &self.points),
            ("Line styles", &self.lines),
            ("Polygon styles", &self.polygons),
        ] {
            if entries.is_empty() {
                continue;
            }
            writeln!(f, "{title}:")?;
            for entry in entries {
                writeln!(f, "  [{}] {}", entry.index, entry.id)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineStyle, PointStyle, PolygonStyle};

    fn model() -> StyleModel {
        let mut pin = PointStyle::new("pin");
        pin.label_enabled = true;
        pin.label_scale = 1.2;

        let mut quiet = PointStyle::new("quiet");
        quiet.label_color = RgbColor::new(10, 20, 30);

        let mut model = StyleModel::new();
        model.points.push(pin);
        model.points.push(quiet);
        model.lines.push(LineStyle::new("road"));
        model.polygons.push(PolygonStyle::new("lake"));
        model
    }

    #[test]
    fn test_from_model_round_trips_unchanged() {
        let original = model();
        let mut edited = original.clone();
        apply_form(&mut edited, &FormValues::from_model(&original));
        assert_eq!(edited, original);
    }

    #[test]
    fn test_absent_fields_are_unchanged() {
        let original = model();
        let mut edited = original.clone();
        apply_form(&mut edited, &FormValues::new());
        assert_eq!(edited, original);
    }

    #[test]
    fn test_values_are_applied_and_clamped() {
        let mut model = model();
        let mut form = FormValues::new();
        form.set("iconHeading_0", "-90");
        form.set("iconColor_0", "#FF8000");
        form.set("lineWidth_0", "25");
        form.set("lineOpacity_0", "1.7");
        form.set("fillOpacity_0", "-0.5");
        form.set("polyFill_0", "false");
        form.set("polyLineWidth_0", "3.9");

        apply_form(&mut model, &form);

        let pin = &model.points[0];
        assert!((pin.icon_heading - 270.0).abs() < f64::EPSILON);
        assert_eq!(pin.icon_color, RgbColor::new(255, 128, 0));
        assert_eq!(model.lines[0].line_width, 10);
        assert!((model.lines[0].line_opacity - 1.0).abs() < f64::EPSILON);
        assert!(model.polygons[0].fill_opacity.abs() < f64::EPSILON);
        assert!(!model.polygons[0].poly_fill);
        assert_eq!(model.polygons[0].line_width, 3);
    }

    #[test]
    fn test_unparsable_numbers_use_defaults() {
        let mut model = model();
        model.points[0].icon_scale = 3.0;
        model.points[0].icon_heading = 45.0;
        model.lines[0].line_width = 6;

        let mut form = FormValues::new();
        form.set("iconScale_0", "big");
        form.set("iconHeading_0", "");
        form.set("lineWidth_0", "NaN");

        apply_form(&mut model, &form);
        assert!((model.points[0].icon_scale - 1.0).abs() < f64::EPSILON);
        assert!(model.points[0].icon_heading.abs() < f64::EPSILON);
        assert_eq!(model.lines[0].line_width, 1);
    }

    #[test]
    fn test_invalid_color_is_ignored() {
        let mut model = model();
        let mut form = FormValues::new();
        form.set("lineColor_0", "red");
        apply_form(&mut model, &form);
        assert_eq!(model.lines[0].line_color, RgbColor::BLACK);
    }

    #[test]
    fn test_label_fields_only_read_when_enabled() {
        let mut model = model();
        let mut form = FormValues::new();
        form.set("labelColor_1", "#ffffff");
        form.set("labelScale_1", "2");
        apply_form(&mut model, &form);
        assert_eq!(model.points[1].label_color, RgbColor::new(10, 20, 30));
        assert!((model.points[1].label_scale - 1.0).abs() < f64::EPSILON);

        form.set("labelEnabled_1", "on");
        apply_form(&mut model, &form);
        assert!(model.points[1].label_enabled);
        assert_eq!(model.points[1].label_color, RgbColor::WHITE);
        assert!((model.points[1].label_scale - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_control_panel() {
        let panel = ControlPanel::from_model(&model());
        assert!(!panel.is_empty());
        assert_eq!(panel.points[1].id, "quiet");
        let text = panel.to_string();
        assert!(text.contains("Point styles:\n  [0] pin\n  [1] quiet\n"));
        assert!(text.contains("Line styles:\n  [0] road\n"));

        let empty = ControlPanel::from_model(&StyleModel::new());
        assert!(empty.is_empty());
        assert_eq!(empty.to_string(), "No styles found\n");
    }
}
