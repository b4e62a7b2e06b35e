//! Extraction of `Style` and `StyleMap` elements into the style model.
//!
//! Only shared styles are modeled: those below `Document` that do not belong
//! to a single placemark or overlay. Each shared `Style`, in document order,
//! yields up to one point, line, and polygon record. A `Style` with both
//! `LineStyle` and `PolyStyle` produces only a polygon record whose outline
//! comes from the `LineStyle`. A `Style` written inline in a `StyleMap` pair
//! is modeled under its own id, or `<map id>_<key>`. Malformed fields fall
//! back to their defaults; a bad value never fails the document.

use tracing::debug;

use super::xml::{XmlDocument, XmlElement};
use crate::constants::{SYNTHETIC_STYLE_MAP_PREFIX, SYNTHETIC_STYLE_PREFIX};
use crate::models::style::{clamp_line_width, normalize_heading, positive_scale};
use crate::models::{
    kml_color, LineStyle, PointStyle, PolygonStyle, RgbColor, StyleMapEntry, StyleModel,
};

/// Features whose `Style`/`StyleMap` children apply to themselves only.
pub const INLINE_STYLE_OWNERS: [&str; 5] = [
    "Placemark",
    "GroundOverlay",
    "ScreenOverlay",
    "PhotoOverlay",
    "NetworkLink",
];

/// Not searched for shared `Style` elements.
const STYLE_SEARCH_SKIP: [&str; 6] = [
    "Placemark",
    "GroundOverlay",
    "ScreenOverlay",
    "PhotoOverlay",
    "NetworkLink",
    "StyleMap",
];

/// Records produced by a single `Style` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedStyle {
    /// From `IconStyle` (+ `LabelStyle`)
    pub point: Option<PointStyle>,
    /// From `LineStyle` when there is no `PolyStyle`
    pub line: Option<LineStyle>,
    /// From `PolyStyle` (+ `LineStyle` outline)
    pub polygon: Option<PolygonStyle>,
}

/// Builds the style model of a parsed document.
#[must_use]
pub fn parse_styles(document: &XmlDocument) -> StyleModel {
    let mut model = StyleModel::new();
    let Some(root) = document.root() else {
        return model;
    };
    let container = style_container(root);

    for (index, element) in shared_styles(container).into_iter().enumerate() {
        let id = style_id(element, index);
        add_records(&mut model, parse_style_element(element, &id));
    }

    for (index, element) in shared_style_maps(container).into_iter().enumerate() {
        let entry = parse_style_map(element, index, &mut model);
        model.style_maps.push(entry);
    }

    debug!(
        points = model.points.len(),
        lines = model.lines.len(),
        polygons = model.polygons.len(),
        style_maps = model.style_maps.len(),
        "Parsed document styles"
    );
    model
}

/// Element holding the shared styles: the first `Document`, or the root when
/// there is none.
#[must_use]
pub fn style_container(root: &XmlElement) -> &XmlElement {
    if root.is("Document") {
        return root;
    }
    root.first_descendant("Document").unwrap_or(root)
}

/// Shared `Style` elements in document order. Their positions are the
/// indexes used by [`style_id`].
#[must_use]
pub fn shared_styles(container: &XmlElement) -> Vec<&XmlElement> {
    container.descendants_outside("Style", &STYLE_SEARCH_SKIP)
}

/// Shared `StyleMap` elements in document order.
#[must_use]
pub fn shared_style_maps(container: &XmlElement) -> Vec<&XmlElement> {
    container.descendants_outside("StyleMap", &INLINE_STYLE_OWNERS)
}

/// True if the `Style` has a part the model represents (icon, line, or
/// polygon).
#[must_use]
pub fn is_modeled(element: &XmlElement) -> bool {
    ["IconStyle", "LineStyle", "PolyStyle"]
        .iter()
        .any(|local| element.child(local).is_some())
}

fn add_records(model: &mut StyleModel, parsed: ParsedStyle) {
    model.points.extend(parsed.point);
    model.lines.extend(parsed.line);
    model.polygons.extend(parsed.polygon);
}

/// Id of the `index`-th (zero-based) `Style` element: its `id` attribute, or
/// `style_<index + 1>`.
#[must_use]
pub fn style_id(element: &XmlElement, index: usize) -> String {
    explicit_id(element).unwrap_or_else(|| format!("{SYNTHETIC_STYLE_PREFIX}{}", index + 1))
}

fn explicit_id(element: &XmlElement) -> Option<String> {
    element
        .attribute("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Extracts the typed records of one `Style` element.
#[must_use]
pub fn parse_style_element(element: &XmlElement, id: &str) -> ParsedStyle {
    let line_style = element.child("LineStyle");
    let poly_style = element.child("PolyStyle");

    ParsedStyle {
        point: element
            .child("IconStyle")
            .map(|icon| parse_point(id, icon, element.child("LabelStyle"))),
        line: match (line_style, poly_style) {
            (Some(line), None) => Some(parse_line(id, line)),
            _ => None,
        },
        polygon: poly_style.map(|poly| parse_polygon(id, poly, line_style)),
    }
}

fn parse_point(id: &str, icon: &XmlElement, label: Option<&XmlElement>) -> PointStyle {
    let mut style = PointStyle::new(id);

    if let Some(href) = icon.child("Icon").and_then(|i| i.child_text("href")) {
        style.icon_url = href;
    }
    if let Some(scale) = number(icon, "scale", id) {
        style.icon_scale = positive_scale(scale);
    }
    if let Some(heading) = number(icon, "heading", id) {
        style.icon_heading = normalize_heading(heading);
    }
    if let Some((color, _)) = color(icon, id) {
        style.icon_color = color;
    }

    if let Some(label) = label {
        style.label_enabled = true;
        if let Some((color, _)) = color(label, id) {
            style.label_color = color;
        }
        if let Some(scale) = number(label, "scale", id) {
            // scale <= 0 is the KML way of hiding a label
            if scale > 0.0 {
                style.label_scale = scale;
            } else {
                style.label_enabled = false;
            }
        }
    }

    style
}

fn parse_line(id: &str, line: &XmlElement) -> LineStyle {
    let mut style = LineStyle::new(id);
    if let Some((color, opacity)) = color(line, id) {
        style.line_color = color;
        style.line_opacity = opacity;
    }
    if let Some(width) = number(line, "width", id) {
        style.line_width = clamp_line_width(width);
    }
    style
}

fn parse_polygon(id: &str, poly: &XmlElement, line: Option<&XmlElement>) -> PolygonStyle {
    let mut style = PolygonStyle::new(id);

    if let Some((color, opacity)) = color(poly, id) {
        style.fill_color = color;
        style.fill_opacity = opacity;
    }
    if let Some(fill) = flag(poly, "fill", id) {
        style.poly_fill = fill;
    }
    if let Some(outline) = flag(poly, "outline", id) {
        style.poly_outline = outline;
    }

    if let Some(outline) = line.map(|line| parse_line(id, line)) {
        style.line_color = outline.line_color;
        style.line_opacity = outline.line_opacity;
        style.line_width = outline.line_width;
    }

    style
}

fn parse_style_map(element: &XmlElement, index: usize, model: &mut StyleModel) -> StyleMapEntry {
    let id = explicit_id(element)
        .unwrap_or_else(|| format!("{SYNTHETIC_STYLE_MAP_PREFIX}{}", index + 1));
    let mut entry = StyleMapEntry::new(id);

    for pair in element.elements().filter(|child| child.is("Pair")) {
        let Some(key) = pair.child_text("key") else {
            debug!(style_map = %entry.id, "Skipping Pair without key");
            continue;
        };

        if let Some(style_url) = pair.child_text("styleUrl") {
            entry.insert(key, &style_url);
        } else if let Some(inline) = pair.child("Style").filter(|style| is_modeled(style)) {
            let target = explicit_id(inline).unwrap_or_else(|| format!("{}_{key}", entry.id));
            add_records(model, parse_style_element(inline, &target));
            entry.insert(key, &target);
        } else {
            debug!(style_map = %entry.id, key = %key, "Skipping Pair without a usable style");
        }
    }

    entry
}

/// Decoded `color` child, `None` when absent. Malformed values decode to the
/// codec default.
fn color(element: &XmlElement, id: &str) -> Option<(RgbColor, f64)> {
    let raw = element.child_text("color")?;
    let decoded = kml_color::try_decode(&raw);
    if decoded.is_none() {
        debug!(style = id, value = %raw, "Malformed KML color, using default");
    }
    Some(decoded.unwrap_or((RgbColor::BLACK, kml_color::DEFAULT_OPACITY)))
}

/// Numeric child, `None` when absent or unparsable.
fn number(element: &XmlElement, field: &str, id: &str) -> Option<f64> {
    let raw = element.child_text(field)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            debug!(style = id, field, value = %raw, "Unparsable number, using default");
            None
        }
    }
}

/// KML boolean child (`0` is false, any other number is true).
fn flag(element: &XmlElement, field: &str, id: &str) -> Option<bool> {
    let raw = element.child_text(field)?;
    match raw.as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => number(element, field, id).map(|value| value.trunc() != 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(kml: &str) -> StyleModel {
        parse_styles(&XmlDocument::parse(kml).unwrap())
    }

    fn wrap(body: &str) -> String {
        format!(r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>{body}</Document></kml>"#)
    }

    #[test]
    fn test_parse_point_style() {
        let model = parse(&wrap(
            r#"<Style id="pin">
                 <IconStyle>
                   <color>ff0000ff</color>
                   <scale>1.5</scale>
                   <heading>45</heading>
                   <Icon><href>http://maps.example.com/pin.png</href></Icon>
                 </IconStyle>
                 <LabelStyle><color>ff00ff00</color><scale>1.2</scale></LabelStyle>
               </Style>"#,
        ));

        assert_eq!(model.points.len(), 1);
        let pin = &model.points[0];
        assert_eq!(pin.id, "pin");
        assert_eq!(pin.icon_url, "http://maps.example.com/pin.png");
        assert!((pin.icon_scale - 1.5).abs() < f64::EPSILON);
        assert!((pin.icon_heading - 45.0).abs() < f64::EPSILON);
        assert_eq!(pin.icon_color, RgbColor::new(255, 0, 0));
        assert!(pin.label_enabled);
        assert_eq!(pin.label_color, RgbColor::new(0, 255, 0));
        assert!((pin.label_scale - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_point_defaults_when_fields_missing_or_bad() {
        let model = parse(&wrap(
            r#"<Style id="p"><IconStyle><scale>abc</scale><heading></heading></IconStyle></Style>"#,
        ));
        let p = &model.points[0];
        assert!((p.icon_scale - 1.0).abs() < f64::EPSILON);
        assert!(p.icon_heading.abs() < f64::EPSILON);
        assert_eq!(p.icon_color, RgbColor::WHITE);
        assert!(!p.label_enabled);
        assert!(p.icon_url.is_empty());
    }

    #[test]
    fn test_label_scale_zero_disables_label() {
        let model = parse(&wrap(
            r#"<Style id="p"><IconStyle/><LabelStyle><color>ff112233</color><scale>0</scale></LabelStyle></Style>"#,
        ));
        let p = &model.points[0];
        assert!(!p.label_enabled);
        assert_eq!(p.label_color, RgbColor::new(0x33, 0x22, 0x11));
        assert!((p.label_scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_line_style() {
        let model = parse(&wrap(
            r#"<Style id="road"><LineStyle><color>80ff0000</color><width>4</width></LineStyle></Style>"#,
        ));
        assert_eq!(model.lines.len(), 1);
        let road = &model.lines[0];
        assert_eq!(road.line_color, RgbColor::new(0, 0, 255));
        assert!((road.line_opacity - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(road.line_width, 4);
        assert!(model.polygons.is_empty());
    }

    #[test]
    fn test_line_and_poly_make_one_polygon() {
        let model = parse(&wrap(
            r#"<Style id="area">
                 <LineStyle><color>ff00ffff</color><width>3</width></LineStyle>
                 <PolyStyle><color>7f00ff00</color><fill>0</fill><outline>1</outline></PolyStyle>
               </Style>"#,
        ));
        assert!(model.lines.is_empty());
        assert_eq!(model.polygons.len(), 1);

        let area = &model.polygons[0];
        assert_eq!(area.fill_color, RgbColor::new(0, 255, 0));
        assert!((area.fill_opacity - 127.0 / 255.0).abs() < 1e-12);
        assert!(!area.poly_fill);
        assert!(area.poly_outline);
        assert_eq!(area.line_color, RgbColor::new(255, 255, 0));
        assert_eq!(area.line_width, 3);
    }

    #[test]
    fn test_polygon_flags_default_true() {
        let model = parse(&wrap(r#"<Style id="a"><PolyStyle/></Style>"#));
        let a = &model.polygons[0];
        assert!(a.poly_fill && a.poly_outline);
        assert_eq!(a.fill_color, RgbColor::WHITE);
    }

    #[test]
    fn test_malformed_color_uses_codec_default() {
        let model = parse(&wrap(
            r#"<Style id="a"><LineStyle><color>red</color><width>wide</width></LineStyle></Style>"#,
        ));
        let a = &model.lines[0];
        assert_eq!(a.line_color, RgbColor::BLACK);
        assert!((a.line_opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(a.line_width, 1);
    }

    #[test]
    fn test_synthetic_ids_follow_document_position() {
        let body = r#"
            <Style id="one"><LineStyle/></Style>
            <Style id="two"><LineStyle/></Style>
            <Style><LineStyle/></Style>
            <Style id="four"><LineStyle/></Style>
            <Folder><Style id="five"><LineStyle/></Style></Folder>
            <Style id="six"><LineStyle/></Style>
            <Placemark><Style><LineStyle/></Style></Placemark>
            <Style><LineStyle/></Style>"#;

        let first = parse(&wrap(body));
        let second = parse(&wrap(body));
        let ids: Vec<_> = first.lines.iter().map(|l| l.id.as_str()).collect();
        // The placemark's own style is not shared and takes no position
        assert_eq!(
            ids,
            vec!["one", "two", "style_3", "four", "five", "six", "style_7"]
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_inline_feature_styles_are_not_shared() {
        let model = parse(&wrap(
            r#"<Placemark><Style id="own"><PolyStyle/></Style></Placemark>
               <GroundOverlay><Style><IconStyle/></Style></GroundOverlay>
               <Placemark><StyleMap id="pm"><Pair><key>normal</key><styleUrl>#x</styleUrl></Pair></StyleMap></Placemark>"#,
        ));
        assert!(model.is_empty());
        assert!(model.style_maps.is_empty());
    }

    #[test]
    fn test_style_map_pair_with_inline_style() {
        let model = parse(&wrap(
            r##"<StyleMap id="m">
                  <Pair><key>normal</key><Style><LineStyle><width>5</width></LineStyle></Style></Pair>
                  <Pair><key>highlight</key><Style id="hi"><IconStyle><scale>2</scale></IconStyle></Style></Pair>
                  <Pair><key>balloon</key><Style><BalloonStyle/></Style></Pair>
                </StyleMap>
                <Style><LineStyle/></Style>"##,
        ));

        let m = model.style_maps.get("m").unwrap();
        assert_eq!(m.normal(), Some("m_normal"));
        assert_eq!(m.style_for("highlight"), Some("hi"));
        assert_eq!(m.pairs.len(), 2);

        let ids: Vec<_> = model.lines.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["style_1", "m_normal"]);
        assert_eq!(model.lines[1].line_width, 5);
        assert_eq!(model.points[0].id, "hi");
        assert!((model.points[0].icon_scale - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_is_modeled() {
        let doc = XmlDocument::parse(
            r#"<Document><Style id="a"><LabelStyle/><BalloonStyle/></Style><Style id="b"><ListStyle/><PolyStyle/></Style></Document>"#,
        )
        .unwrap();
        let styles = shared_styles(doc.root().unwrap());
        assert!(!is_modeled(styles[0]));
        assert!(is_modeled(styles[1]));
    }

    #[test]
    fn test_parse_style_maps() {
        let model = parse(&wrap(
            r##"<StyleMap id="m">
                  <Pair><key>normal</key><styleUrl>#a</styleUrl></Pair>
                  <Pair><key>highlight</key><styleUrl>#b</styleUrl></Pair>
                  <Pair><key>broken</key></Pair>
                </StyleMap>
                <StyleMap><Pair><key>normal</key><styleUrl>#c</styleUrl></Pair></StyleMap>"##,
        ));

        let m = model.style_maps.get("m").unwrap();
        assert_eq!(m.normal(), Some("a"));
        assert_eq!(m.style_for("highlight"), Some("b"));
        assert_eq!(m.pairs.len(), 2);
        assert!(model.style_maps.get("stylemap_2").is_some());
    }

    #[test]
    fn test_icon_and_line_in_same_style() {
        let model = parse(&wrap(
            r#"<Style id="both"><IconStyle/><LineStyle><width>2</width></LineStyle></Style>"#,
        ));
        assert_eq!(model.points.len(), 1);
        assert_eq!(model.lines.len(), 1);
        assert_eq!(model.points[0].id, model.lines[0].id);
    }
}
