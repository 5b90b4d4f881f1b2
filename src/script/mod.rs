//! Script fragment emitters.
//!
//! Every emitter is a pure function returning a `String` fragment of the
//! map's inline `<script>`. Fragments are concatenated by [`crate::compose`]
//! in a fixed order; none of them reads global state or touches the disk.
//!
//! | Module | Emits |
//! |--------|-------|
//! | [`bootstrap`] | CRS, `L.map`, bounds group, `setBounds()`, scale bar, title data |
//! | [`sources`] | XYZ / WMS / WMTS / raster sources and data includes |
//! | [`layers`] | point factories, clusters, scale-dependent visibility, vector-tile styles |
//! | [`interaction`] | popups, highlight, address search |
//! | [`menu`] | the layer menu with groups, legends and abstracts |
//! | [`finalize`] | end-of-document helpers and the closing `</script>` |
//!
//! Templates are whitespace-exact: output is meant to be diffable against
//! maps exported before.

pub mod bootstrap;
pub mod finalize;
pub mod interaction;
pub mod json;
pub mod layers;
pub mod menu;
pub mod sources;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Layer '{layer}': connection string has no '{key}'")]
    MissingConnectionField { layer: String, key: &'static str },
    #[error("Invalid layer search '{0}', expected '<layer>: <field>'")]
    InvalidLayerSearch(String),
    #[error("Layer search refers to unknown vector layer '{0}'")]
    UnknownSearchLayer(String),
    #[error("Layer search name '{layer}' matches {count} vector layers")]
    AmbiguousSearchLayer { layer: String, count: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
