//! Style reference resolution.
//!
//! Maps a feature's `styleUrl` onto the style model and builds the concrete
//! [`RenderStyle`] the map draws. Resolution goes through at most one
//! `StyleMap` (its `normal` pair); `highlight` is never rendered.

use tracing::debug;

use crate::config::RenderConfig;
use crate::models::kml_color::to_rgba_string;
use crate::models::style_map::fragment_id;
use crate::models::{
    Feature, FeatureStore, FillSymbol, IconSymbol, RenderStyle, StrokeSymbol, StyleModel,
    StyleRecords, TextSymbol,
};

/// Resolves a raw `styleUrl` to the id of a concrete style.
///
/// Everything up to the last `#` is dropped. When the remaining id names a
/// style map with a `normal` pair, the pair's target is returned instead.
/// A map without a `normal` pair resolves to its own id.
///
/// # Examples
///
/// ```
/// use kmlstyler::models::{StyleMapEntry, StyleModel};
/// use kmlstyler::services::resolver::resolve_style_id;
///
/// let mut model = StyleModel::new();
/// model
///     .style_maps
///     .push(StyleMapEntry::new("pinMap").with_pair("normal", "#pin"));
///
/// assert_eq!(resolve_style_id("#pinMap", &model), "pin");
/// assert_eq!(resolve_style_id("styles.kml#road", &model), "road");
/// ```
#[must_use]
pub fn resolve_style_id<'a>(style_url: &'a str, model: &'a StyleModel) -> &'a str {
    let id = fragment_id(style_url);

    match model.style_maps.get(id).and_then(|entry| entry.normal()) {
        Some(target) => fragment_id(target),
        None => id,
    }
}

/// Builds the render style for one feature.
///
/// Returns `None` when the feature has no `styleUrl` or the reference matches
/// no style; callers keep the feature's current style in that case.
#[must_use]
pub fn resolve(feature: &Feature, model: &StyleModel, render: &RenderConfig) -> Option<RenderStyle> {
    let style_url = feature.style_url()?;
    let id = resolve_style_id(style_url, model);

    let style = render_records(model.records(id), feature.name(), render);
    if style.is_none() {
        debug!(style_url, resolved = id, "styleUrl matches no style");
    }
    style
}

/// Composes the records sharing one id into a render style.
///
/// Points contribute the icon and, when enabled, the label text; lines and
/// polygons contribute stroke and fill. A polygon's outline takes precedence
/// over a line record with the same id.
#[must_use]
pub fn render_records(
    records: StyleRecords<'_>,
    name: Option<&str>,
    render: &RenderConfig,
) -> Option<RenderStyle> {
    if records.is_empty() {
        return None;
    }

    let mut style = RenderStyle::default();

    if let Some(point) = records.point {
        style.image = Some(IconSymbol {
            src: point.icon_url.clone(),
            scale: point.icon_scale,
            rotation: point.icon_heading.to_radians(),
            color: to_rgba_string(point.icon_color, 1.0),
        });

        if point.label_enabled {
            style.text = Some(TextSymbol {
                text: name.unwrap_or_default().to_string(),
                font: format!(
                    "{}px {}",
                    render.label_font_size * point.label_scale,
                    render.label_font_family
                ),
                fill_color: to_rgba_string(point.label_color, 1.0),
                halo_color: render.label_halo_color.clone(),
                halo_width: render.label_halo_width,
                offset_y: render.label_offset_y,
            });
        }
    }

    if let Some(polygon) = records.polygon {
        style.fill = polygon.poly_fill.then(|| FillSymbol {
            color: to_rgba_string(polygon.fill_color, polygon.fill_opacity),
        });
        style.stroke = polygon.poly_outline.then(|| StrokeSymbol {
            color: to_rgba_string(polygon.line_color, polygon.line_opacity),
            width: f64::from(polygon.line_width),
        });
    } else if let Some(line) = records.line {
        style.stroke = Some(StrokeSymbol {
            color: to_rgba_string(line.line_color, line.line_opacity),
            width: f64::from(line.line_width),
        });
    }

    Some(style)
}

/// Re-resolves every feature in the store.
///
/// Features whose reference resolves keep nothing of their previous style;
/// all others are left untouched. Returns the number of restyled features.
pub fn apply_styles(store: &mut FeatureStore, model: &StyleModel, render: &RenderConfig) -> usize {
    let mut applied = 0;

    for feature in store.features_mut() {
        if let Some(style) = resolve(feature, model, render) {
            feature.set_style(Some(style));
            applied += 1;
        }
    }

    debug!(applied, total = store.len(), "Styles applied");
    applied
}
