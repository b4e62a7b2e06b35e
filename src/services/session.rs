//! Editing session: import, edit, resolve, export.
//!
//! The session owns every piece of mutable state (style model, source
//! snapshot, features, and control values). Imports are two-phase so a slow
//! read can be superseded by a newer one: only the latest ticket is applied,
//! and parsing finishes before any state is replaced.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use super::form::{apply_form, ControlPanel, FormValues};
use super::resolver::apply_styles;
use super::serializer::splice;
use crate::config::{Config, ExportConfig};
use crate::constants::{KML_EXTENSION, KML_MIME_TYPE};
use crate::models::{Extent, Feature, FeatureStore, StyleModel};
use crate::parser::features::read_features;
use crate::parser::styles::parse_styles;
use crate::parser::xml::XmlDocument;

/// Parsed source document kept as the base for every export.
///
/// Never modified; exports splice into a deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalDocument {
    document: XmlDocument,
}

impl OriginalDocument {
    /// Wraps a parsed document.
    #[must_use]
    pub const fn new(document: XmlDocument) -> Self {
        Self { document }
    }

    /// The snapshot.
    #[must_use]
    pub const fn document(&self) -> &XmlDocument {
        &self.document
    }

    /// Serializes a copy of the snapshot carrying the styles of `model`.
    pub fn export(&self, model: &StyleModel) -> Result<String> {
        splice(&self.document, model)?
            .to_xml_string()
            .context("Failed to serialize KML document")
    }
}

/// Handle for an import in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTicket {
    id: u64,
    file_name: Option<String>,
}

/// What happened to a completed import.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// The import replaced the session state.
    Applied(ImportSummary),
    /// A newer import was started; nothing changed.
    Superseded,
}

/// Counts reported after an import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    /// Source file name, if known
    pub file_name: Option<String>,
    /// Point style records
    pub points: usize,
    /// Line style records
    pub lines: usize,
    /// Polygon style records
    pub polygons: usize,
    /// Style map entries
    pub style_maps: usize,
    /// Placemarks read
    pub features: usize,
    /// Features whose `styleUrl` resolved
    pub styled_features: usize,
    /// Bounds of all feature coordinates
    pub extent: Option<Extent>,
}

/// A finished export, ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedKml {
    /// Derived file name (`<stem>_newStyle.kml`)
    pub file_name: String,
    /// Always the KML MIME type
    pub mime_type: String,
    /// Serialized document
    pub contents: String,
}

/// Derives the export file name from the source name.
///
/// A trailing `.kml` is replaced (case-insensitively) and the configured
/// suffix appended; without a source name the fallback stem is used.
///
/// # Examples
///
/// ```
/// use kmlstyler::config::ExportConfig;
/// use kmlstyler::services::session::export_file_name;
///
/// let config = ExportConfig::default();
/// assert_eq!(export_file_name(Some("roads.KML"), &config), "roads_newStyle.kml");
/// assert_eq!(export_file_name(None, &config), "exported_newStyle.kml");
/// ```
#[must_use]
pub fn export_file_name(source: Option<&str>, config: &ExportConfig) -> String {
    let stem = source
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let extension = format!(".{KML_EXTENSION}");
            let split = name.len().saturating_sub(extension.len());
            match name.get(split..) {
                Some(tail) if tail.eq_ignore_ascii_case(&extension) => &name[..split],
                _ => name,
            }
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or(config.fallback_stem.as_str());

    format!("{stem}{}.{KML_EXTENSION}", config.suffix)
}

/// Everything built from one document before it is swapped in.
struct Imported {
    original: OriginalDocument,
    model: StyleModel,
    features: Vec<Feature>,
}

/// Session state for one editor.
#[derive(Debug, Default)]
pub struct EditorSession {
    config: Config,
    model: StyleModel,
    original: Option<OriginalDocument>,
    source_name: Option<String>,
    store: FeatureStore,
    form: FormValues,
    latest_ticket: u64,
}

impl EditorSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Current style model.
    #[must_use]
    pub const fn model(&self) -> &StyleModel {
        &self.model
    }

    /// Features of the imported document.
    #[must_use]
    pub const fn features(&self) -> &FeatureStore {
        &self.store
    }

    /// Current control values.
    #[must_use]
    pub const fn form(&self) -> &FormValues {
        &self.form
    }

    /// Control values, for editing.
    pub fn form_mut(&mut self) -> &mut FormValues {
        &mut self.form
    }

    /// Snapshot of the imported document.
    #[must_use]
    pub const fn original(&self) -> Option<&OriginalDocument> {
        self.original.as_ref()
    }

    /// Name of the imported file.
    #[must_use]
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Controls built for the current model.
    #[must_use]
    pub fn control_panel(&self) -> ControlPanel {
        ControlPanel::from_model(&self.model)
    }

    /// Starts an import; any earlier ticket is superseded.
    pub fn begin_import(&mut self, file_name: Option<&str>) -> ImportTicket {
        self.latest_ticket += 1;
        ImportTicket {
            id: self.latest_ticket,
            file_name: file_name.map(str::to_string),
        }
    }

    /// Finishes an import with the file's text.
    ///
    /// A superseded ticket changes nothing. Otherwise the document is parsed
    /// completely before the model, snapshot, features and controls are
    /// replaced, and the features are resolved once.
    ///
    /// # Errors
    ///
    /// Fails on malformed XML; the session is left untouched.
    pub fn complete_import(&mut self, ticket: ImportTicket, text: &str) -> Result<ImportOutcome> {
        if ticket.id != self.latest_ticket {
            debug!(
                ticket = ticket.id,
                latest = self.latest_ticket,
                "Import superseded by a newer one"
            );
            return Ok(ImportOutcome::Superseded);
        }

        let imported = self.build(text)?;
        self.install(imported);
        self.source_name = ticket.file_name;
        let styled_features = self.update_style();

        let summary = ImportSummary {
            file_name: self.source_name.clone(),
            points: self.model.points.len(),
            lines: self.model.lines.len(),
            polygons: self.model.polygons.len(),
            style_maps: self.model.style_maps.len(),
            features: self.store.len(),
            styled_features,
            extent: self.store.extent(),
        };
        info!(
            file = summary.file_name.as_deref().unwrap_or("<unnamed>"),
            points = summary.points,
            lines = summary.lines,
            polygons = summary.polygons,
            style_maps = summary.style_maps,
            features = summary.features,
            "Imported KML"
        );

        Ok(ImportOutcome::Applied(summary))
    }

    /// Parses `text`, replaces the model and snapshot, and rebuilds controls.
    ///
    /// Features are not touched.
    ///
    /// # Errors
    ///
    /// Fails on malformed XML; the session is left untouched.
    pub fn read_kml_styles(&mut self, text: &str) -> Result<ControlPanel> {
        let document = parse_document(text)?;
        self.model = parse_styles(&document);
        self.original = Some(OriginalDocument::new(document));
        self.form = FormValues::from_model(&self.model);
        Ok(self.control_panel())
    }

    /// Pulls the control values into the model.
    pub fn update_style_data_from_form(&mut self) {
        apply_form(&mut self.model, &self.form);
    }

    /// Re-resolves every feature; returns how many were restyled.
    pub fn update_style(&mut self) -> usize {
        apply_styles(&mut self.store, &self.model, &self.config.render)
    }

    /// Pulls the form, re-resolves, and serializes the edited document.
    ///
    /// # Errors
    ///
    /// Fails when nothing was imported or the document has no `Document`
    /// element; no partial output is produced.
    pub fn export_kml(&mut self) -> Result<ExportedKml> {
        self.update_style_data_from_form();
        self.update_style();

        let original = self
            .original
            .as_ref()
            .context("No KML file has been imported")?;
        let contents = original.export(&self.model)?;
        let file_name = export_file_name(self.source_name.as_deref(), &self.config.export);

        info!(file = %file_name, bytes = contents.len(), "Exported KML");
        Ok(ExportedKml {
            file_name,
            mime_type: KML_MIME_TYPE.to_string(),
            contents,
        })
    }

    fn build(&self, text: &str) -> Result<Imported> {
        let document = parse_document(text)?;
        let model = parse_styles(&document);
        let features = read_features(&document, self.config.map.projection, &self.config.render);

        Ok(Imported {
            original: OriginalDocument::new(document),
            model,
            features,
        })
    }

    fn install(&mut self, imported: Imported) {
        self.form = FormValues::from_model(&imported.model);
        self.model = imported.model;
        self.original = Some(imported.original);
        self.store.clear();
        self.store.add_features(imported.features);
    }
}

fn parse_document(text: &str) -> Result<XmlDocument> {
    XmlDocument::parse(text).context("Failed to parse KML document")
}
