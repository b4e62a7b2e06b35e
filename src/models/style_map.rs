//! `StyleMap` indirection table.

use serde::{Deserialize, Serialize};

use crate::constants::NORMAL_STATE;

/// One `StyleMap` element: an id plus its `(key, style reference)` pairs.
///
/// References to styles in the same document are stored without their
/// leading `#`; references into other documents keep their full URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleMapEntry {
    /// StyleMap id
    pub id: String,
    /// Pairs in document order, e.g. `("normal", "styleA")`
    pub pairs: Vec<(String, String)>,
}

impl StyleMapEntry {
    /// Creates an empty entry.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pairs: Vec::new(),
        }
    }

    /// Adds a pair, stripping one leading `#` from the reference.
    #[must_use]
    pub fn with_pair(mut self, key: impl Into<String>, style_url: &str) -> Self {
        self.insert(key, style_url);
        self
    }

    /// Adds or replaces the pair for `key`.
    pub fn insert(&mut self, key: impl Into<String>, style_url: &str) {
        let key = key.into();
        let reference = strip_local_prefix(style_url).to_string();
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            pair.1 = reference;
        } else {
            self.pairs.push((key, reference));
        }
    }

    /// Returns the style reference stored for a pair key.
    #[must_use]
    pub fn style_for(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, reference)| reference.as_str())
    }

    /// Returns the reference used for rendering (the `normal` pair).
    #[must_use]
    pub fn normal(&self) -> Option<&str> {
        self.style_for(NORMAL_STATE)
    }
}

/// All `StyleMap` elements of a document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMapTable {
    entries: Vec<StyleMapEntry>,
}

impl StyleMapTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. When the id is already present the first entry
    /// keeps answering lookups, but both are written back on export.
    pub fn push(&mut self, entry: StyleMapEntry) {
        self.entries.push(entry);
    }

    /// Looks up a map by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StyleMapEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Returns true if a map with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterates entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = &StyleMapEntry> {
        self.entries.iter()
    }

    /// Number of maps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no maps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strips one leading `#` from a style reference.
#[must_use]
pub fn strip_local_prefix(style_url: &str) -> &str {
    let style_url = style_url.trim();
    style_url.strip_prefix('#').unwrap_or(style_url)
}

/// Returns the fragment id of a style reference: everything after the last
/// `#`, or the whole reference when it has none.
///
/// ```
/// use kmlstyler::models::style_map::fragment_id;
///
/// assert_eq!(fragment_id("#red"), "red");
/// assert_eq!(fragment_id("file:///tmp/doc.kml#red"), "red");
/// assert_eq!(fragment_id("red"), "red");
/// ```
#[must_use]
pub fn fragment_id(style_url: &str) -> &str {
    let style_url = style_url.trim();
    style_url
        .rsplit_once('#')
        .map_or(style_url, |(_, fragment)| fragment)
}

/// Turns a stored reference back into a `styleUrl` value: local ids get their
/// `#` back, external URLs are returned unchanged.
#[must_use]
pub fn to_style_url(reference: &str) -> String {
    if reference.contains('#') {
        reference.to_string()
    } else {
        format!("#{reference}")
    }
}
