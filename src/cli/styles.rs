//! Styles command: list the styles and style maps of a KML file.

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::models::StyleModel;
use crate::services::{EditorSession, KmlService};
use clap::Args;
use std::path::PathBuf;

/// List parsed styles and style maps
#[derive(Debug, Clone, Args)]
pub struct StylesArgs {
    /// Path to the KML file
    #[arg(short, long, value_name = "FILE")]
    pub kml: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StylesArgs {
    /// Execute the styles command
    pub fn execute(&self) -> CliResult<()> {
        let text = KmlService::load(&self.kml).map_err(|e| CliError::io(format!("{e:#}")))?;

        let mut session = EditorSession::new(load_config()?);
        let panel = session
            .read_kml_styles(&text)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        if self.json {
            return print_json(session.model());
        }

        if panel.is_empty() && session.model().style_maps.is_empty() {
            print!("{panel}");
            return Ok(());
        }
        print!("{}", describe(session.model()));
        Ok(())
    }
}

fn describe(model: &StyleModel) -> String {
    let mut out = String::new();

    if !model.points.is_empty() {
        out.push_str("Point styles:\n");
        for (index, point) in model.points.iter().enumerate() {
            let label = if point.label_enabled {
                format!("label {} scale {}", point.label_color, point.label_scale)
            } else {
                "label off".to_string()
            };
            let icon = if point.icon_url.is_empty() {
                "(no icon)"
            } else {
                point.icon_url.as_str()
            };
            out.push_str(&format!(
                "  [{index}] {}: icon {icon} {} scale {} heading {}, {label}\n",
                point.id, point.icon_color, point.icon_scale, point.icon_heading
            ));
        }
    }

    if !model.lines.is_empty() {
        out.push_str("Line styles:\n");
        for (index, line) in model.lines.iter().enumerate() {
            out.push_str(&format!(
                "  [{index}] {}: {} opacity {} width {}\n",
                line.id, line.line_color, line.line_opacity, line.line_width
            ));
        }
    }

    if !model.polygons.is_empty() {
        out.push_str("Polygon styles:\n");
        for (index, polygon) in model.polygons.iter().enumerate() {
            let on_off = |flag: bool| if flag { "on" } else { "off" };
            out.push_str(&format!(
                "  [{index}] {}: fill {} {} opacity {}, outline {} {} opacity {} width {}\n",
                polygon.id,
                on_off(polygon.poly_fill),
                polygon.fill_color,
                polygon.fill_opacity,
                on_off(polygon.poly_outline),
                polygon.line_color,
                polygon.line_opacity,
                polygon.line_width
            ));
        }
    }

    if !model.style_maps.is_empty() {
        out.push_str("Style maps:\n");
        for entry in model.style_maps.iter() {
            let pairs = entry
                .pairs
                .iter()
                .map(|(key, reference)| format!("{key} -> {reference}"))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("  {}: {pairs}\n", entry.id));
        }
    }

    out
}
