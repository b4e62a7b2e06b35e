//! Style model to KML, and splicing into a copy of the source document.
//!
//! Elements are built as trees so ids and URLs are escaped on write. The
//! splice replaces the shared styles only: modeled `Style` elements and every
//! `StyleMap` below `Document`, outside placemarks and overlays. New styles
//! go to the head of `Document` and the style maps right after them. Styles
//! with nothing modeled stay where they are, and unmodeled parts of a
//! regenerated style (`BalloonStyle`, `ListStyle`) are carried over.
//! Everything else keeps its content and relative order.

use std::collections::HashMap;

use anyhow::Result;
use tracing::info;

use crate::models::kml_color::encode;
use crate::models::style_map::to_style_url;
use crate::models::{LineStyle, PointStyle, PolygonStyle, StyleMapEntry, StyleModel};
use crate::parser::styles::{is_modeled, shared_styles, style_id, INLINE_STYLE_OWNERS};
use crate::parser::xml::{XmlDocument, XmlElement, XmlNode};

/// One `Style` element per distinct style id, in model order.
#[must_use]
pub fn style_elements(model: &StyleModel) -> Vec<XmlElement> {
    model
        .style_ids()
        .into_iter()
        .map(|id| {
            let records = model.records(id);
            let mut style = XmlElement::new("Style").with_attribute("id", id);

            if let Some(point) = records.point {
                style = style
                    .with_child(icon_style(point))
                    .with_child(label_style(point));
            }
            if let Some(polygon) = records.polygon {
                if polygon.poly_outline {
                    style = style.with_child(outline_style(polygon));
                }
                style = style.with_child(poly_style(polygon));
            } else if let Some(line) = records.line {
                style = style.with_child(line_style(line));
            }

            style
        })
        .collect()
}

/// One `StyleMap` element per table entry, pairs in original order.
#[must_use]
pub fn style_map_elements(model: &StyleModel) -> Vec<XmlElement> {
    model.style_maps.iter().map(style_map).collect()
}

/// Returns a copy of `original` whose styles are regenerated from `model`.
///
/// # Errors
///
/// Fails when the document has no `Document` element.
pub fn splice(original: &XmlDocument, model: &StyleModel) -> Result<XmlDocument> {
    let mut document = original.clone();
    let Some(container) = document.root_mut().and_then(|root| root.find_mut("Document")) else {
        anyhow::bail!("No <Document> element found in the KML file");
    };

    let carried = carried_children(container, model);
    let kept = shared_styles(container)
        .into_iter()
        .filter(|style| !is_modeled(style))
        .count();
    let removed = container.remove_descendants_where(&INLINE_STYLE_OWNERS, &|element| {
        element.is("StyleMap") || (element.is("Style") && is_modeled(element))
    });

    let prefix = prefix_of(&container.name).map(str::to_string);
    let separator = container
        .children
        .iter()
        .find_map(|node| match node {
            XmlNode::Text(text) if text.trim().is_empty() && text.contains('\n') => {
                Some(text.clone())
            }
            _ => None,
        });

    let prefixed = |element: XmlElement| match &prefix {
        Some(prefix) => with_prefix(element, prefix),
        None => element,
    };
    let layout = |elements: Vec<XmlElement>| -> Vec<XmlNode> {
        let mut nodes = Vec::with_capacity(elements.len() * 2);
        for element in elements {
            if let Some(separator) = &separator {
                nodes.push(XmlNode::Text(separator.clone()));
            }
            nodes.push(XmlNode::Element(element));
        }
        nodes
    };

    let styles = layout(
        style_elements(model)
            .into_iter()
            .map(|style| {
                // Carried children are copied as written, prefix included
                let extra = style.attribute("id").and_then(|id| carried.get(id)).cloned();
                let mut style = prefixed(style);
                if let Some(extra) = extra {
                    style.children.extend(extra.into_iter().map(XmlNode::Element));
                }
                style
            })
            .collect(),
    );
    let style_maps = layout(style_map_elements(model).into_iter().map(&prefixed).collect());
    let style_count = styles.iter().filter(|node| node.as_element().is_some()).count();

    let maps_at = if styles.is_empty() {
        container.children.len()
    } else {
        styles.len()
    };
    container.insert_children(0, styles);
    container.insert_children(maps_at, style_maps);

    info!(
        removed,
        kept,
        styles = style_count,
        style_maps = model.style_maps.len(),
        "Regenerated document styles"
    );

    Ok(document)
}

/// Children of modeled source styles that the generated `Style` does not
/// write, keyed by style id (first element per id).
fn carried_children(
    container: &XmlElement,
    model: &StyleModel,
) -> HashMap<String, Vec<XmlElement>> {
    let mut carried = HashMap::new();

    for (index, element) in shared_styles(container).into_iter().enumerate() {
        let id = style_id(element, index);
        if !is_modeled(element) || carried.contains_key(&id) {
            continue;
        }
        let has_label = model.records(&id).point.is_some();
        let extra: Vec<XmlElement> = element
            .elements()
            .filter(|child| {
                !(child.is("IconStyle")
                    || child.is("LineStyle")
                    || child.is("PolyStyle")
                    || (has_label && child.is("LabelStyle")))
            })
            .cloned()
            .collect();
        carried.insert(id, extra);
    }

    carried
}

fn icon_style(point: &PointStyle) -> XmlElement {
    let mut icon = XmlElement::new("IconStyle")
        .with_child(text_element("color", &encode(point.icon_color, 1.0)))
        .with_child(text_element("scale", &point.icon_scale.to_string()))
        .with_child(text_element("heading", &point.icon_heading.to_string()));

    if !point.icon_url.is_empty() {
        icon = icon
            .with_child(XmlElement::new("Icon").with_child(text_element("href", &point.icon_url)));
    }
    icon
}

fn label_style(point: &PointStyle) -> XmlElement {
    // scale 0 hides the label; the color is kept for re-enabling
    let scale = if point.label_enabled {
        point.label_scale.to_string()
    } else {
        "0".to_string()
    };

    XmlElement::new("LabelStyle")
        .with_child(text_element("color", &encode(point.label_color, 1.0)))
        .with_child(text_element("scale", &scale))
}

fn line_style(line: &LineStyle) -> XmlElement {
    XmlElement::new("LineStyle")
        .with_child(text_element(
            "color",
            &encode(line.line_color, line.line_opacity),
        ))
        .with_child(text_element("width", &line.line_width.to_string()))
}

fn outline_style(polygon: &PolygonStyle) -> XmlElement {
    XmlElement::new("LineStyle")
        .with_child(text_element(
            "color",
            &encode(polygon.line_color, polygon.line_opacity),
        ))
        .with_child(text_element("width", &polygon.line_width.to_string()))
}

fn poly_style(polygon: &PolygonStyle) -> XmlElement {
    XmlElement::new("PolyStyle")
        .with_child(text_element(
            "color",
            &encode(polygon.fill_color, polygon.fill_opacity),
        ))
        .with_child(text_element("fill", flag(polygon.poly_fill)))
        .with_child(text_element("outline", flag(polygon.poly_outline)))
}

fn style_map(entry: &StyleMapEntry) -> XmlElement {
    entry.pairs.iter().fold(
        XmlElement::new("StyleMap").with_attribute("id", entry.id.as_str()),
        |map, (key, reference)| {
            map.with_child(
                XmlElement::new("Pair")
                    .with_child(text_element("key", key))
                    .with_child(text_element("styleUrl", &to_style_url(reference))),
            )
        },
    )
}

fn text_element(name: &str, content: &str) -> XmlElement {
    XmlElement::new(name).with_text(content)
}

const fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn prefix_of(name: &str) -> Option<&str> {
    name.split_once(':').map(|(prefix, _)| prefix)
}

fn with_prefix(mut element: XmlElement, prefix: &str) -> XmlElement {
    element.name = format!("{prefix}:{}", element.name);
    element.children = element
        .children
        .into_iter()
        .map(|node| match node {
            XmlNode::Element(child) => XmlNode::Element(with_prefix(child, prefix)),
            other => other,
        })
        .collect();
    element
}
