//! # webmap-export
//!
//! Script generation for exporting a desktop GIS project to a browser map.
//! A project's layers, symbology and layer tree go in; the inline JavaScript
//! that builds the Leaflet / Mapbox GL map comes out, together with legend
//! icons and the tags that load exported layer data.
//!
//! # Pipeline
//!
//! ```text
//! project.json ─┐
//!               ├─ compose ─→ map_script.html, data_includes.html, legend/*.png
//! webmap.toml ──┘
//! ```
//!
//! Composition visits layers once, in drawing order. Everything a layer
//! contributes to later parts of the script (menu entries, legends,
//! scale-dependent toggles, labels, search target) is accumulated during that
//! pass and emitted afterwards in a fixed order.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`project`] | Project model loaded from JSON: layers, symbology, groups |
//! | [`config`] | `webmap.toml` loading, merging over stock defaults, validation |
//! | [`script`] | Pure emitters for every script fragment |
//! | [`legend`] | Legend swatch rendering (PNG) and legend table rows |
//! | [`compose`] | Orders the emitters over a project into one script |
//! | [`naming`] | Identifier conventions and the scale → zoom ladder |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Whitespace-Exact Templates
//!
//! Emitters build their fragments with `format!` over raw string literals
//! whose indentation matches previously exported maps. Regenerating a map
//! therefore produces a reviewable diff instead of a wall of whitespace
//! changes. The JSON data blocks follow the same rule: they are written with
//! `", "` / `": "` separators and ASCII-only escapes.
//!
//! ## Emitters Are Pure
//!
//! Only [`legend`] touches the filesystem. Every emitter in [`script`] is a
//! function from typed inputs to a `String`, so each fragment is unit-tested
//! on its own.
//!
//! ## Stable Ids for Groups
//!
//! Layer-tree groups list member layers by project layer id. Display names
//! are not unique, so matching on them would file layers under the wrong
//! group.

pub mod compose;
pub mod config;
pub mod legend;
pub mod naming;
pub mod output;
pub mod project;
pub mod script;

#[cfg(test)]
pub(crate) mod test_helpers;
