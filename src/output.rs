//! CLI output formatting.
//!
//! Output is **layer-centric**: each layer is listed by drawing-order
//! position and display name, with the generated identifiers as secondary
//! context. This makes the output readable as a map inventory while still
//! letting users find each layer in the generated script.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Lakeside district
//!     CRS: EPSG:3857
//!     Abstract: Land use, roads and points of interest around the...
//!
//! Layers
//! 001 Orthophoto (remote)
//! 002 Land use (vector)
//!     Group: Base data
//!
//! Groups
//! Base data (2 layers)
//!
//! Config
//!     webmap.toml
//! ```
//!
//! ## Generate
//!
//! ```text
//! 001 Orthophoto → lyr_Orthophoto_0_0 (wms)
//! 002 Land use → lyr_Landuse_1_0 (vector)
//!     Legend: 2 icons
//!
//! Composed 2 layers, 2 legend icons → dist/map.js
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use std::path::Path;

use crate::compose::ComposedScript;
use crate::project::Project;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the project inventory shown by `check`.
///
/// `config_file` is the config file that was merged over the stock defaults,
/// if any.
pub fn format_check_output(project: &Project, config_file: Option<&Path>) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(project.title.clone());
    lines.push(format!("{}CRS: {}", indent(1), project.crs.auth_id));
    let first_line = project.abstract_text.lines().next().unwrap_or_default();
    if !first_line.is_empty() {
        lines.push(format!(
            "{}Abstract: {}",
            indent(1),
            truncate_desc(first_line, 50)
        ));
    }

    lines.push(String::new());
    lines.push("Layers".to_string());
    for (index, layer) in project.layers.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(index + 1),
            layer.name,
            layer.kind.label()
        ));
        if let Some(group) = project.group_of(&layer.id) {
            lines.push(format!("{}Group: {}", indent(1), group));
        }
    }

    if !project.groups.is_empty() {
        lines.push(String::new());
        lines.push("Groups".to_string());
        for (group, members) in &project.groups {
            lines.push(format!("{} ({})", group, plural(members.len(), "layer")));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    match config_file {
        Some(path) => lines.push(format!("{}{}", indent(1), path.display())),
        None => lines.push(format!("{}stock defaults", indent(1))),
    }

    lines
}

/// Print check output to stdout.
pub fn print_check_output(project: &Project, config_file: Option<&Path>) {
    for line in format_check_output(project, config_file) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format the per-layer summary of a composed script.
pub fn format_export_output(composed: &ComposedScript, script_path: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for layer in &composed.layers {
        lines.push(format!(
            "{} {} → {} ({})",
            format_index(layer.index + 1),
            layer.name,
            layer.id,
            layer.kind
        ));
        if layer.legend_icons > 0 {
            lines.push(format!(
                "{}Legend: {}",
                indent(1),
                plural(layer.legend_icons, "icon")
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Composed {}, {} → {}",
        plural(composed.layers.len(), "layer"),
        plural(composed.legend_icons(), "legend icon"),
        script_path.display()
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_export_output(composed: &ComposedScript, script_path: &Path) {
    for line in format_export_output(composed, script_path) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::LayerSummary;
    use crate::test_helpers::{remote_layer, vector_layer};

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(120), "120");
    }

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_exact() {
        let text = "a".repeat(40);
        assert_eq!(truncate_desc(&text, 40), text);
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        let expected = format!("{}...", "a".repeat(40));
        assert_eq!(truncate_desc(&text, 40), expected);
    }

    #[test]
    fn truncate_desc_multibyte() {
        assert_eq!(truncate_desc("Forêt dense", 4), "Forê...");
    }

    // =========================================================================
    // Check output
    // =========================================================================

    fn sample_project() -> Project {
        let mut project = Project {
            title: "Lakeside".into(),
            abstract_text: "First line\nsecond line".into(),
            layers: vec![
                remote_layer("Ortho", "type=xyz&url=http://t"),
                vector_layer("r", "Roads"),
            ],
            ..Project::default()
        };
        project.groups.insert("Base".into(), vec!["r".into()]);
        project
    }

    #[test]
    fn check_output_lists_layers_and_groups() {
        let lines = format_check_output(&sample_project(), Some(Path::new("cfg/webmap.toml")));
        assert_eq!(
            lines,
            vec![
                "Lakeside",
                "    CRS: EPSG:4326",
                "    Abstract: First line",
                "",
                "Layers",
                "001 Ortho (remote)",
                "002 Roads (vector)",
                "    Group: Base",
                "",
                "Groups",
                "Base (1 layer)",
                "",
                "Config",
                "    cfg/webmap.toml",
            ]
        );
    }

    #[test]
    fn check_output_without_config_file() {
        let lines = format_check_output(&sample_project(), None);
        assert_eq!(lines.last().unwrap(), "    stock defaults");
    }

    // =========================================================================
    // Generate output
    // =========================================================================

    #[test]
    fn export_output_lines() {
        let composed = ComposedScript {
            layers: vec![
                LayerSummary {
                    index: 0,
                    name: "Roads".into(),
                    id: "lyr_Roads_0_0".into(),
                    kind: "wms".into(),
                    legend_icons: 0,
                },
                LayerSummary {
                    index: 1,
                    name: "Land use".into(),
                    id: "lyr_Landuse_1_0".into(),
                    kind: "vector".into(),
                    legend_icons: 2,
                },
            ],
            ..ComposedScript::default()
        };
        let lines = format_export_output(&composed, Path::new("dist/map.js"));
        assert_eq!(
            lines,
            vec![
                "001 Roads → lyr_Roads_0_0 (wms)",
                "002 Land use → lyr_Landuse_1_0 (vector)",
                "    Legend: 2 icons",
                "",
                "Composed 2 layers, 2 legend icons → dist/map.js",
            ]
        );
    }
}
