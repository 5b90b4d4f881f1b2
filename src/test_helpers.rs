//! Shared test utilities for the webmap-export test suite.
//!
//! Provides layer builders with sensible defaults and a substring counter
//! for asserting on generated script fragments.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut roads = vector_layer("r1", "Roads");
//! roads.popup_fields = vec!["name".into()];
//!
//! let js = popup_script("lyr_Roads_0_0", "''");
//! assert_eq!(count(&js, "lyr_Roads_0_0"), 4);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::project::{
    GeometryKind, LayerDescriptor, LayerKind, MarkerShape, Renderer, Symbol, SymbolLayer,
};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    for entry in std::fs::read_dir(&fixtures).unwrap() {
        let entry = entry.unwrap();
        if entry.path().is_file() {
            std::fs::copy(entry.path(), tmp.path().join(entry.file_name())).unwrap();
        }
    }
    tmp
}

// =========================================================================
// Script assertions
// =========================================================================

/// Non-overlapping occurrences of `needle` in `haystack`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// =========================================================================
// Layer builders
// =========================================================================

/// Polygon vector layer without renderer, labels or popups.
pub fn vector_layer(id: &str, name: &str) -> LayerDescriptor {
    LayerDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        kind: LayerKind::Vector,
        geometry: Some(GeometryKind::Polygon),
        source: String::new(),
        opacity: 1.0,
        scale_visibility: None,
        labeling: None,
        renderer: None,
        abstract_text: String::new(),
        cluster: false,
        popup_fields: Vec::new(),
        map_unit_sizing: false,
        vt_style_group: None,
        vt_rules: Vec::new(),
        vt_label: None,
    }
}

/// Point layer with a single red circle symbol.
pub fn point_layer(id: &str, name: &str) -> LayerDescriptor {
    let mut marker = symbol("#ff0000", Some(2.0));
    marker.layers = vec![SymbolLayer::SimpleMarker {
        shape: Some(MarkerShape::Circle),
    }];
    LayerDescriptor {
        geometry: Some(GeometryKind::Point),
        renderer: Some(Renderer::Single { symbol: marker }),
        ..vector_layer(id, name)
    }
}

/// Remote layer with the given connection string; the id is the name.
pub fn remote_layer(name: &str, source: &str) -> LayerDescriptor {
    LayerDescriptor {
        kind: LayerKind::Remote,
        geometry: None,
        source: source.to_string(),
        ..vector_layer(name, name)
    }
}

/// Fill-only symbol.
pub fn symbol(fill: &str, size: Option<f64>) -> Symbol {
    Symbol {
        fill: Some(fill.to_string()),
        stroke: None,
        size,
        layers: Vec::new(),
    }
}
