//! Export command: apply style edits and write a restyled KML file.

use crate::cli::common::{import_file, CliError, CliResult};
use crate::services::{FormValues, KmlService};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Apply style edits and export the KML file
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Path to the KML file
    #[arg(short, long, value_name = "FILE")]
    pub kml: PathBuf,

    /// Control value to apply, e.g. `lineWidth_0=4` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// TOML file of control values (`lineColor_0 = "#ff0000"`)
    #[arg(long, value_name = "FILE")]
    pub edits: Option<PathBuf>,

    /// Output path (defaults to the derived name next to the input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the document to stdout instead of a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub fn execute(&self) -> CliResult<()> {
        let mut edits = FormValues::new();
        if let Some(path) = &self.edits {
            edits.merge(read_edits_file(path)?);
        }
        edits.merge(parse_assignments(&self.set)?);

        let (mut session, _) = import_file(&self.kml)?;
        for (key, _) in edits.iter() {
            if session.form().get(key).is_none() {
                warn!(control = key, "Unknown control, value ignored");
            }
        }
        session.form_mut().merge(edits);

        let exported = session
            .export_kml()
            .map_err(|e| CliError::validation(format!("Export failed: {e:#}")))?;

        if self.stdout {
            print!("{}", exported.contents);
            return Ok(());
        }

        let output_path = match &self.output {
            Some(path) => {
                KmlService::save_to(&exported.contents, path)
                    .map_err(|e| CliError::io(format!("{e:#}")))?;
                path.clone()
            }
            None => {
                let dir = session
                    .config()
                    .export
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| input_dir(&self.kml));
                KmlService::save(&exported, &dir).map_err(|e| CliError::io(format!("{e:#}")))?
            }
        };

        println!("Exported styles to: {}", output_path.display());
        Ok(())
    }
}

fn input_dir(kml: &Path) -> PathBuf {
    kml.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Parses `KEY=VALUE` assignments.
fn parse_assignments(assignments: &[String]) -> CliResult<FormValues> {
    let mut form = FormValues::new();
    for assignment in assignments {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            CliError::validation(format!(
                "Invalid --set value '{assignment}'. Expected KEY=VALUE"
            ))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::validation(format!(
                "Invalid --set value '{assignment}'. Key is empty"
            )));
        }
        form.set(key, value);
    }
    Ok(form)
}

/// Reads a flat TOML table of control values.
fn read_edits_file(path: &Path) -> CliResult<FormValues> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::io(format!("Failed to read edits file {}: {e}", path.display()))
    })?;
    let table: toml::Table = toml::from_str(&content).map_err(|e| {
        CliError::validation(format!("Failed to parse edits file {}: {e}", path.display()))
    })?;

    let mut form = FormValues::new();
    for (key, value) in table {
        let value = match value {
            toml::Value::String(text) => text,
            toml::Value::Integer(number) => number.to_string(),
            toml::Value::Float(number) => number.to_string(),
            toml::Value::Boolean(flag) => flag.to_string(),
            other => {
                return Err(CliError::validation(format!(
                    "Edit '{key}' must be a string, number, or boolean, got {}",
                    other.type_str()
                )))
            }
        };
        form.set(key, value);
    }
    Ok(form)
}
