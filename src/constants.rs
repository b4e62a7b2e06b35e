//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the config location and the KML export conventions.

/// Directory name used below the platform config directory.
pub const CONFIG_DIR_NAME: &str = "KmlStyler";

/// Environment variable that overrides the config directory (used by tests).
pub const CONFIG_DIR_ENV: &str = "KMLSTYLER_CONFIG_DIR";

/// MIME type of exported documents.
pub const KML_MIME_TYPE: &str = "application/vnd.google-earth.kml+xml";

/// File extension of KML documents, without the leading dot.
pub const KML_EXTENSION: &str = "kml";

/// Prefix of ids assigned to `Style` elements that carry no `id` attribute.
pub const SYNTHETIC_STYLE_PREFIX: &str = "style_";

/// Prefix of ids assigned to `StyleMap` elements that carry no `id` attribute.
pub const SYNTHETIC_STYLE_MAP_PREFIX: &str = "stylemap_";

/// The only `StyleMap` pair key used for rendering.
pub const NORMAL_STATE: &str = "normal";
