//! Shared test fixtures for library and CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// One point, one line, and one polygon style, a style map, and two
/// placemarks (one through the style map, one with a dangling reference).
pub const SURVEY_KML: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Field Survey</name>
    <description>Sites &amp; routes</description>
    <Style id="sitePin">
      <IconStyle>
        <color>ff00ff00</color>
        <scale>1.2</scale>
        <heading>45</heading>
        <Icon><href>http://maps.google.com/mapfiles/kml/pushpin/ylw-pushpin.png</href></Icon>
      </IconStyle>
      <LabelStyle><color>ff0000ff</color><scale>1.1</scale></LabelStyle>
    </Style>
    <Style id="route">
      <LineStyle><color>7fff0000</color><width>4</width></LineStyle>
    </Style>
    <Style id="zone">
      <LineStyle><color>ff00ffff</color><width>2</width></LineStyle>
      <PolyStyle><color>4d0000ff</color><fill>1</fill><outline>1</outline></PolyStyle>
    </Style>
    <StyleMap id="siteMap">
      <Pair><key>normal</key><styleUrl>#sitePin</styleUrl></Pair>
      <Pair><key>highlight</key><styleUrl>#route</styleUrl></Pair>
    </StyleMap>
    <Placemark>
      <name>Well A</name>
      <styleUrl>#siteMap</styleUrl>
      <ExtendedData>
        <Data name="depth"><value>12</value></Data>
      </ExtendedData>
      <Point><coordinates>-122.084,37.422,0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name>Well B</name>
      <styleUrl>#doesNotExist</styleUrl>
      <ExtendedData>
        <Data name="depth"><value>8</value></Data>
      </ExtendedData>
      <Point><coordinates>-122.090,37.430,0</coordinates></Point>
    </Placemark>
  </Document>
</kml>
"##;

/// Eight styles; the ones at positions 3 and 7 have no `id`.
pub const UNNAMED_STYLES_KML: &str = r##"<kml><Document>
  <Style id="s1"><LineStyle><width>1</width></LineStyle></Style>
  <Style id="s2"><LineStyle><width>2</width></LineStyle></Style>
  <Style><LineStyle><width>3</width></LineStyle></Style>
  <Style id="s4"><LineStyle><width>4</width></LineStyle></Style>
  <Style id="s5"><LineStyle><width>5</width></LineStyle></Style>
  <Style id="s6"><LineStyle><width>6</width></LineStyle></Style>
  <Style><PolyStyle><fill>0</fill></PolyStyle></Style>
  <Style id="s8"><IconStyle><scale>2</scale></IconStyle></Style>
</Document></kml>"##;

/// A placemark with its own style, a style map whose normal pair holds an
/// inline style, and a balloon-only style.
pub const INLINE_STYLED_KML: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Inline</name>
    <Style id="balloon"><BalloonStyle><text>$[name]</text></BalloonStyle></Style>
    <StyleMap id="trailMap">
      <Pair><key>normal</key><Style><LineStyle><color>ff00ff00</color><width>5</width></LineStyle></Style></Pair>
      <Pair><key>highlight</key><styleUrl>#balloon</styleUrl></Pair>
    </StyleMap>
    <Placemark>
      <name>Lake</name>
      <Style><PolyStyle><color>ff0000ff</color></PolyStyle></Style>
      <Point><coordinates>-122.1,37.4,0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name>Trail</name>
      <styleUrl>#trailMap</styleUrl>
      <LineString><coordinates>-122.1,37.4 -122.2,37.5</coordinates></LineString>
    </Placemark>
    <Placemark>
      <name>Info</name>
      <styleUrl>#balloon</styleUrl>
      <Point><coordinates>-122.3,37.6,0</coordinates></Point>
    </Placemark>
  </Document>
</kml>
"##;

/// Valid XML without a `Document` element.
pub const NO_DOCUMENT_KML: &str = r##"<kml xmlns="http://www.opengis.net/kml/2.2">
  <Placemark><name>Loose</name></Placemark>
</kml>"##;

/// Unclosed element.
pub const MALFORMED_KML: &str = "<kml><Document><Style id=\"a\"></Document></kml>";

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture file");
    path
}

/// Temp directory holding `survey.kml`.
pub fn survey_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_file(temp_dir.path(), "survey.kml", SURVEY_KML);
    (temp_dir, path)
}

/// Builds a command for the binary with an isolated config directory.
pub fn kmlstyler_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kmlstyler"));
    cmd.env("KMLSTYLER_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}
