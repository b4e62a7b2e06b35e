//! CLI command handlers for the KML style editor.
//!
//! This module provides headless, scriptable access to the style engine
//! for automation, testing, and batch restyling.

pub mod common;
pub mod config;
pub mod export;
pub mod features;
pub mod styles;

// Re-export types used by main.rs and tests
pub use common::{CliError, ExitCode};
pub use config::ConfigArgs;
pub use export::ExportArgs;
pub use features::FeaturesArgs;
pub use styles::StylesArgs;
