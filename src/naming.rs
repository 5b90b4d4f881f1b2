//! Centralized naming conventions for generated identifiers.
//!
//! Every JavaScript variable, DOM id and legend filename in the generated
//! script is derived from a layer's human-readable name. This module holds the
//! handful of rules that turn names into identifiers so all emitters agree:
//!
//! - [`safe_name`]: `"Roads (2024)"` → `"Roads2024"` (variable fragments)
//! - [`layer_id`]: `("Roads", 3)` → `"lyr_Roads_3_0"` (style layer ids)
//! - [`layer_var`]: `("Roads", 3)` → `"Roads_3"` (suffix of `layer_`, `style_`, ...)
//! - [`safe_label`]: `"Main road #1"` → `"Mainroad1"` (legend icon filenames)
//!
//! ## Zoom Levels
//!
//! Desktop projects express visibility as map-scale denominators; web maps
//! use integer zoom levels. [`scale_to_zoom`] maps one onto the other with a
//! fixed threshold ladder.

/// Sanitize a name into an identifier fragment.
///
/// Keeps ASCII letters, digits and underscores; drops everything else.
///
/// - `"Roads"` → `"Roads"`
/// - `"Land use 2020"` → `"Landuse2020"`
/// - `"Bâtiments"` → `"Btiments"`
pub fn safe_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Sanitize a legend category label for use in a filename.
///
/// Unlike [`safe_name`], non-ASCII letters and digits survive, but
/// underscores do not: only alphanumeric characters are kept.
pub fn safe_label(label: &str) -> String {
    label.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Variable suffix for a layer: `<safeName>_<index>`.
pub fn layer_var(name: &str, index: usize) -> String {
    format!("{}_{}", safe_name(name), index)
}

/// Synthetic style-layer id for a layer: `lyr_<safeName>_<index>_0`.
pub fn layer_id(name: &str, index: usize) -> String {
    format!("lyr_{}_{}_0", safe_name(name), index)
}

/// Scale denominators at which each zoom level stops applying, from zoom 19
/// (largest scale) down to zoom 1. Anything beyond the last entry is zoom 0.
const ZOOM_THRESHOLDS: [f64; 19] = [
    1_000.0,
    2_000.0,
    4_000.0,
    8_000.0,
    15_000.0,
    35_000.0,
    70_000.0,
    150_000.0,
    250_000.0,
    500_000.0,
    1_000_000.0,
    2_000_000.0,
    4_000_000.0,
    10_000_000.0,
    15_000_000.0,
    35_000_000.0,
    70_000_000.0,
    150_000_000.0,
    250_000_000.0,
];

/// Convert a map-scale denominator to a web-map zoom level (0-19).
///
/// Larger denominators (more zoomed out) give smaller zoom levels. A scale of
/// `0` means "unbounded" in desktop projects and maps to the deepest zoom.
pub fn scale_to_zoom(scale: f64) -> u8 {
    ZOOM_THRESHOLDS
        .iter()
        .position(|&limit| scale < limit)
        .map(|pos| 19 - pos as u8)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_name_keeps_identifier_chars() {
        assert_eq!(safe_name("Roads"), "Roads");
        assert_eq!(safe_name("roads_primary"), "roads_primary");
    }

    #[test]
    fn safe_name_drops_spaces_and_punctuation() {
        assert_eq!(safe_name("Land use (2020)"), "Landuse2020");
        assert_eq!(safe_name("a-b.c"), "abc");
    }

    #[test]
    fn safe_name_drops_non_ascii() {
        assert_eq!(safe_name("Bâtiments"), "Btiments");
    }

    #[test]
    fn safe_label_drops_underscores() {
        assert_eq!(safe_label("Main_road #1"), "Mainroad1");
    }

    #[test]
    fn safe_label_keeps_unicode_letters() {
        assert_eq!(safe_label("Forêt dense"), "Forêtdense");
    }

    #[test]
    fn layer_id_convention() {
        assert_eq!(layer_id("Roads", 0), "lyr_Roads_0_0");
        assert_eq!(layer_id("Land use", 12), "lyr_Landuse_12_0");
    }

    #[test]
    fn layer_var_convention() {
        assert_eq!(layer_var("Land use", 3), "Landuse_3");
    }

    #[test]
    fn scale_to_zoom_ladder() {
        assert_eq!(scale_to_zoom(0.0), 19);
        assert_eq!(scale_to_zoom(500.0), 19);
        assert_eq!(scale_to_zoom(1_000.0), 18);
        assert_eq!(scale_to_zoom(25_000.0), 14);
        assert_eq!(scale_to_zoom(1_000_000.0), 8);
        assert_eq!(scale_to_zoom(249_999_999.0), 1);
        assert_eq!(scale_to_zoom(250_000_000.0), 0);
        assert_eq!(scale_to_zoom(1e12), 0);
    }

    #[test]
    fn scale_to_zoom_is_monotonic() {
        let mut previous = scale_to_zoom(0.0);
        for step in 1..2_000 {
            let zoom = scale_to_zoom(step as f64 * 200_000.0);
            assert!(zoom <= previous);
            previous = zoom;
        }
    }
}
