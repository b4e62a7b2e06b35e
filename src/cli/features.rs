//! Features command: list placemarks with their resolved render styles.

use crate::cli::common::{import_file, print_json, CliResult};
use crate::models::{Extent, Feature, RenderStyle};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// List features and their resolved styles
#[derive(Debug, Clone, Args)]
pub struct FeaturesArgs {
    /// Path to the KML file
    #[arg(short, long, value_name = "FILE")]
    pub kml: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON-serializable feature listing
#[derive(Serialize, Debug)]
struct FeaturesOutput<'a> {
    extent: Option<Extent>,
    features: Vec<FeatureOutput<'a>>,
}

#[derive(Serialize, Debug)]
struct FeatureOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style_url: Option<&'a str>,
    geometry: Option<&'static str>,
    style: Option<&'a RenderStyle>,
}

impl<'a> From<&'a Feature> for FeatureOutput<'a> {
    fn from(feature: &'a Feature) -> Self {
        Self {
            id: feature.id.as_deref(),
            name: feature.name(),
            style_url: feature.style_url(),
            geometry: feature.geometry.as_ref().map(|g| g.kind()),
            style: feature.style(),
        }
    }
}

impl FeaturesArgs {
    /// Execute the features command
    pub fn execute(&self) -> CliResult<()> {
        let (session, summary) = import_file(&self.kml)?;
        let features = session.features().features();

        if self.json {
            return print_json(&FeaturesOutput {
                extent: summary.extent,
                features: features.iter().map(FeatureOutput::from).collect(),
            });
        }

        if features.is_empty() {
            println!("No features found");
            return Ok(());
        }

        for (index, feature) in features.iter().enumerate() {
            println!("{}", describe(index, feature));
        }
        println!();
        println!(
            "{} features, {} styled",
            summary.features, summary.styled_features
        );
        if let Some(extent) = summary.extent {
            println!(
                "Extent ({}): [{}, {}, {}, {}]",
                session.config().map.projection.code(),
                extent.min_x,
                extent.min_y,
                extent.max_x,
                extent.max_y
            );
        }
        Ok(())
    }
}

fn describe(index: usize, feature: &Feature) -> String {
    let name = feature.name().unwrap_or("(unnamed)");
    let geometry = feature.geometry.as_ref().map_or("no geometry", |g| g.kind());
    let style_url = feature.style_url().unwrap_or("-");

    let style = match feature.style() {
        None => "unstyled".to_string(),
        Some(style) if style.is_blank() => "empty style".to_string(),
        Some(style) => {
            let mut parts = Vec::new();
            if let Some(image) = &style.image {
                parts.push(format!("icon {}", image.color));
            }
            if let Some(text) = &style.text {
                parts.push(format!("label \"{}\" {}", text.text, text.font));
            }
            if let Some(fill) = &style.fill {
                parts.push(format!("fill {}", fill.color));
            }
            if let Some(stroke) = &style.stroke {
                parts.push(format!("stroke {} width {}", stroke.color, stroke.width));
            }
            parts.join(", ")
        }
    };

    format!("[{index}] {name} ({geometry}) {style_url}: {style}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrokeSymbol;

    #[test]
    fn test_describe_feature() {
        let mut feature = Feature::new()
            .with_property("name", "Ridge")
            .with_property("styleUrl", "#road");
        assert_eq!(describe(0, &feature), "[0] Ridge (no geometry) #road: unstyled");

        feature.set_style(Some(RenderStyle {
            stroke: Some(StrokeSymbol {
                color: "rgba(0, 0, 0, 1)".to_string(),
                width: 2.0,
            }),
            ..RenderStyle::default()
        }));
        assert_eq!(
            describe(1, &feature),
            "[1] Ridge (no geometry) #road: stroke rgba(0, 0, 0, 1) width 2"
        );
    }
}
