//! End-to-end composition of the fixture project.
//!
//! Loads `fixtures/project.json`, composes it with stock and customized
//! configs, and checks the structure of the generated script and the legend
//! icons written next to it.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use webmap_export::compose::{ExportError, compose};
use webmap_export::config::{CONFIG_FILE, load_config};
use webmap_export::project::{Project, load_project};
use webmap_export::script::ScriptError;

fn fixture_project() -> Project {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project.json");
    load_project(&path).unwrap()
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

fn config_dir(toml: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(CONFIG_FILE), toml).unwrap();
    tmp
}

fn legend_files(output: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(output.join("legend"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

// =========================================================================
// Single remote layer
// =========================================================================

#[test]
fn single_wms_layer_script_shape() {
    let mut project = fixture_project();
    project.layers.truncate(1);
    project.groups.clear();
    let tmp = TempDir::new().unwrap();
    let config = load_config(tmp.path()).unwrap();

    let composed = compose(&project, &config, tmp.path()).unwrap();
    let js = &composed.script;

    assert_eq!(count(js, "L.map('map', {"), 1);
    assert_eq!(count(js, "L.WMS.layer("), 1);
    assert!(js.contains(r#"L.WMS.layer("https://maps.example.org/wms", "ortho", {"#));
    assert!(js.contains("format: 'image/jpeg',"));
    assert!(js.contains("opacity: 0.8,\n            identify: false,"));
    assert_eq!(count(js, "</script>"), 1);
    assert!(js.ends_with("</script>"));
    assert!(!js.contains("<script src="));
    assert!(composed.data_includes.is_empty());
}

#[test]
fn single_raster_layer_script_shape() {
    let project: Project = serde_json::from_str(
        r#"{
            "title": "Elevation",
            "layers": [{ "id": "dem", "name": "DEM", "kind": "raster" }]
        }"#,
    )
    .unwrap();
    let tmp = TempDir::new().unwrap();
    let config = load_config(tmp.path()).unwrap();
    let js = compose(&project, &config, tmp.path()).unwrap().script;

    assert_eq!(count(&js, "L.map('map', {"), 1);
    assert_eq!(count(&js, r#""type": "raster","#), 1);
    assert_eq!(count(&js, "</script>"), 1);
    assert!(!js.contains("<script src="));
    assert!(js.contains("L.ImageOverlay.include({"));
}

// =========================================================================
// Full fixture
// =========================================================================

#[test]
fn fixture_summary() {
    let tmp = TempDir::new().unwrap();
    let config = load_config(tmp.path()).unwrap();
    let composed = compose(&fixture_project(), &config, tmp.path()).unwrap();

    let summary: Vec<(&str, &str)> = composed
        .layers
        .iter()
        .map(|l| (l.id.as_str(), l.kind.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("lyr_Orthophoto_0_0", "wms"),
            ("lyr_Landuse_1_0", "vector"),
            ("lyr_Roads_2_0", "vector"),
            ("lyr_Pointsofinterest_3_0", "vector"),
        ]
    );
    assert_eq!(composed.data_includes.len(), 3);
    assert_eq!(composed.legend_icons(), 4);
}

#[test]
fn fixture_legend_icons_on_disk() {
    let tmp = TempDir::new().unwrap();
    let config = load_config(tmp.path()).unwrap();
    compose(&fixture_project(), &config, tmp.path()).unwrap();

    let names: Vec<String> = legend_files(tmp.path())
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "Landuse_1_Forest0.png",
            "Landuse_1_Residential1.png",
            "Pointsofinterest_3_Pointsofinterest0.png",
            "Roads_2_Roads0.png",
        ]
    );
    let (w, h) = image::image_dimensions(tmp.path().join("legend/Pointsofinterest_3_Pointsofinterest0.png")).unwrap();
    assert_eq!((w, h), (13, 13));
}

#[test]
fn fixture_menu_groups_layers_by_id() {
    let tmp = TempDir::new().unwrap();
    let config = load_config(tmp.path()).unwrap();
    let js = compose(&fixture_project(), &config, tmp.path())
        .unwrap()
        .script;

    assert!(js.contains(
        "var toggleableLayerIds = ['lyr_Pointsofinterest_3_0', 'Points of interest','lyr_Orthophoto_0_0', 'Orthophoto'];"
    ));
    assert!(js.contains(
        r#"var toggleableGroups = {"Base data": ["lyr_Roads_2_0", "Roads", "lyr_Landuse_1_0", "Land use"]};"#
    ));
    assert!(js.contains(r#""lyr_Landuse_1_0": "Zoning as of 2021.\nSource: cantonal survey.""#));
}

#[test]
fn fixture_points_clustered_as_shape_markers() {
    let tmp = TempDir::new().unwrap();
    let config = load_config(tmp.path()).unwrap();
    let js = compose(&fixture_project(), &config, tmp.path())
        .unwrap()
        .script;

    assert!(js.contains("return L.shapeMarker(latlng, style_Pointsofinterest_3_0(feature));"));
    assert!(js.contains("cluster_Pointsofinterest_3.addLayer(layer_Pointsofinterest_3);"));
    assert!(js.contains("function pop_Pointsofinterest_3(feature, layer) {"));
    assert!(js.contains("map.on('click', 'lyr_Landuse_1_0', function (e) {"));
}

#[test]
fn fixture_scale_dependent_roads() {
    let tmp = TempDir::new().unwrap();
    let config = load_config(tmp.path()).unwrap();
    let js = compose(&fixture_project(), &config, tmp.path())
        .unwrap()
        .script;

    assert_eq!(count(&js, "map.addLayer(layer_Roads_2);"), 2);
    assert!(js.contains("if (map.getZoom() <= 18 && map.getZoom() >= 12) {"));
    assert!(js.contains("resetLabels([layer_Roads_2]);"));
    assert!(js.contains("map.getZoom() <= 19 && map.getZoom() >= 14"));
}

// =========================================================================
// Config-driven variations
// =========================================================================

#[test]
fn customized_config() {
    let cfg = config_dir(
        r##"
[map]
extent = "canvas_extent"
measure = "metric"
min_zoom = 3
max_zoom = 18

[interaction]
highlight_color = "#00ffcc"
identify = true
address_search = true
layer_search = "Roads: name"

[controls.scale_bar]
enabled = true
units = "both"
"##,
    );
    let config = load_config(cfg.path()).unwrap();
    let out = TempDir::new().unwrap();
    let js = compose(&fixture_project(), &config, out.path())
        .unwrap()
        .script;

    assert!(js.contains("zoomControl:true, maxZoom:18, minZoom:3"));
    assert!(js.contains("}).fitBounds([[46.01, 8.92], [46.05, 8.98]]);"));
    assert!(js.contains("primaryLengthUnit: 'meters'"));
    assert!(js.contains("fillColor: '#00ffcc',"));
    assert!(!js.contains("identify: false"));
    assert!(js.contains("MapboxGenericGeocoder"));
    assert!(js.contains("metric: true, imperial: true"));
    assert!(js.contains("layer: layer_Roads_2,"));
}

#[test]
fn search_on_missing_layer_fails() {
    let cfg = config_dir("[interaction]\nlayer_search = \"Rivers: name\"\n");
    let config = load_config(cfg.path()).unwrap();
    let out = TempDir::new().unwrap();
    let result = compose(&fixture_project(), &config, out.path());
    assert!(matches!(
        result,
        Err(ExportError::Script(ScriptError::UnknownSearchLayer(ref layer))) if layer == "Rivers"
    ));
}
