//! Service layer for business logic.
//!
//! This module contains services that encapsulate the style engine's
//! operations and coordinate between parsing, editing, and export.

pub mod documents;
pub mod form;
pub mod resolver;
pub mod serializer;
pub mod session;

// Re-export commonly used types and functions
pub use documents::KmlService;
pub use form::{apply_form, ControlPanel, FormSource, FormValues};
pub use resolver::{apply_styles, resolve, resolve_style_id};
pub use session::{EditorSession, ExportedKml, ImportOutcome, ImportSummary, ImportTicket};
