//! Aggregate of every style and style map extracted from one document.

use serde::{Deserialize, Serialize};

use super::{LineStyle, PointStyle, PolygonStyle, StyleMapTable};

/// The editable style state of an imported document.
///
/// Rebuilt wholesale on every import, edited in place, and only read by the
/// resolver and the serializer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleModel {
    /// Point styles in document order
    pub points: Vec<PointStyle>,
    /// Standalone line styles in document order
    pub lines: Vec<LineStyle>,
    /// Polygon styles in document order
    pub polygons: Vec<PolygonStyle>,
    /// StyleMap indirection table
    pub style_maps: StyleMapTable,
}

/// The records that share one style id.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleRecords<'a> {
    /// Point record with this id
    pub point: Option<&'a PointStyle>,
    /// Line record with this id
    pub line: Option<&'a LineStyle>,
    /// Polygon record with this id
    pub polygon: Option<&'a PolygonStyle>,
}

impl StyleRecords<'_> {
    /// Returns true if no record matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.point.is_none() && self.line.is_none() && self.polygon.is_none()
    }
}

impl StyleModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the document had no `Style` elements at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty() && self.polygons.is_empty()
    }

    /// Total number of style records.
    #[must_use]
    pub fn style_count(&self) -> usize {
        self.points.len() + self.lines.len() + self.polygons.len()
    }

    /// Collects every record carrying `id`.
    #[must_use]
    pub fn records(&self, id: &str) -> StyleRecords<'_> {
        StyleRecords {
            point: self.points.iter().find(|style| style.id == id),
            line: self.lines.iter().find(|style| style.id == id),
            polygon: self.polygons.iter().find(|style| style.id == id),
        }
    }

    /// Returns true if any record carries `id`.
    #[must_use]
    pub fn has_style(&self, id: &str) -> bool {
        !self.records(id).is_empty()
    }

    /// Distinct style ids in output order: points, then lines, then polygons,
    /// each id listed once at its first appearance.
    #[must_use]
    pub fn style_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.style_count());
        let all = self
            .points
            .iter()
            .map(|s| s.id.as_str())
            .chain(self.lines.iter().map(|s| s.id.as_str()))
            .chain(self.polygons.iter().map(|s| s.id.as_str()));
        for id in all {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Mutable access to a point style by id.
    pub fn point_mut(&mut self, id: &str) -> Option<&mut PointStyle> {
        self.points.iter_mut().find(|style| style.id == id)
    }

    /// Mutable access to a line style by id.
    pub fn line_mut(&mut self, id: &str) -> Option<&mut LineStyle> {
        self.lines.iter_mut().find(|style| style.id == id)
    }

    /// Mutable access to a polygon style by id.
    pub fn polygon_mut(&mut self, id: &str) -> Option<&mut PolygonStyle> {
        self.polygons.iter_mut().find(|style| style.id == id)
    }
}
