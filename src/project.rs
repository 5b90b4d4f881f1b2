//! Project description consumed by the exporter.
//!
//! A project is the serializable stand-in for a desktop GIS project: an
//! ordered list of layers (drawing order, top to bottom), their symbology,
//! the project CRS and extent, and the layer-tree groups. It is loaded from a
//! JSON file and never mutated afterwards.
//!
//! ```json
//! {
//!   "title": "City map",
//!   "crs": { "auth_id": "EPSG:3857" },
//!   "bounds": "[[51.4, -0.2], [51.6, 0.1]]",
//!   "layers": [
//!     { "id": "roads_7c1", "name": "Roads", "kind": "vector", "geometry": "line" }
//!   ],
//!   "groups": { "Transport": ["roads_7c1"] }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::naming;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Group '{group}' references unknown layer id '{layer}'")]
    UnknownGroupMember { group: String, layer: String },
    #[error("Layer '{layer}' is listed in both '{first}' and '{second}'")]
    LayerInSeveralGroups {
        layer: String,
        first: String,
        second: String,
    },
}

/// The project CRS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crs {
    /// Authority id, e.g. `EPSG:4326`.
    pub auth_id: String,
    /// Proj4 definition, required only when the map is reprojected.
    #[serde(default)]
    pub proj4: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self {
            auth_id: crate::script::bootstrap::GEOGRAPHIC_CRS.to_string(),
            proj4: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub crs: Crs,
    /// Canvas extent as a Leaflet bounds literal, e.g. `[[s, w], [n, e]]`.
    #[serde(default)]
    pub bounds: String,
    pub layers: Vec<LayerDescriptor>,
    /// Group name → ids of member layers, in layer-tree order.
    #[serde(default)]
    pub groups: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Vector layer with data exported to `data/<name>.js`.
    Vector,
    /// Vector layer served by a WFS endpoint (loaded asynchronously).
    Wfs,
    /// Local raster drawn as an image overlay.
    Raster,
    /// Remote tiles: XYZ, WMS or WMTS, described by `source`.
    Remote,
    /// Vector tiles styled through `style_<group>` objects.
    VectorTile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

/// Scale-based visibility as desktop scale denominators.
///
/// `min_scale` is the most zoomed-out scale the layer shows at (largest
/// denominator), `max_scale` the most zoomed-in one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min_scale: f64,
    pub max_scale: f64,
}

/// Closed zoom interval a layer or label is visible in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    /// Most zoomed-out level (smallest number).
    pub min_zoom: u8,
    /// Most zoomed-in level (largest number).
    pub max_zoom: u8,
}

impl ZoomRange {
    pub fn contains(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom && zoom <= self.max_zoom
    }
}

impl From<ScaleRange> for ZoomRange {
    /// A non-positive `min_scale` has no zoom-out limit and starts at zoom 0.
    fn from(range: ScaleRange) -> Self {
        let min_zoom = if range.min_scale > 0.0 {
            naming::scale_to_zoom(range.min_scale)
        } else {
            0
        };
        Self {
            min_zoom,
            max_zoom: naming::scale_to_zoom(range.max_scale),
        }
    }
}

/// Label settings of a vector layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Labeling {
    /// Whether labels follow their own scale range.
    #[serde(default)]
    pub scale_visibility: bool,
    #[serde(default)]
    pub min_scale: f64,
    #[serde(default)]
    pub max_scale: f64,
}

impl Labeling {
    /// Zoom interval for labels, or `None` when they are always shown.
    pub fn zoom_range(&self) -> Option<ZoomRange> {
        self.scale_visibility.then(|| {
            ZoomRange::from(ScaleRange {
                min_scale: self.min_scale,
                max_scale: self.max_scale,
            })
        })
    }
}

/// Shape of a simple marker symbol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Square,
    Diamond,
    Pentagon,
    Hexagon,
    Triangle,
    EquilateralTriangle,
    Star,
    Arrow,
    Circle,
    Cross,
}

/// One layer of a symbol, as far as marker selection cares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SymbolLayer {
    /// SVG image marker.
    SvgMarker,
    /// Simple marker; `shape` is absent when the exporter could not read it.
    SimpleMarker {
        #[serde(default)]
        shape: Option<MarkerShape>,
    },
    /// Line, fill or any other symbol layer type.
    Other,
}

/// A renderable symbol: colors and size drive the legend swatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Fill color as `#rrggbb` or `#rrggbbaa`.
    #[serde(default)]
    pub fill: Option<String>,
    /// Stroke color as `#rrggbb` or `#rrggbbaa`.
    #[serde(default)]
    pub stroke: Option<String>,
    /// Symbol size in millimetres; absent for symbols without a size.
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub layers: Vec<SymbolLayer>,
}

/// A category of a categorized renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    pub symbol: Symbol,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Renderer {
    Single { symbol: Symbol },
    Categorized { categories: Vec<Category> },
    Heatmap,
}

impl Renderer {
    /// Symbol whose layers decide the marker kind for point layers.
    pub fn primary_symbol(&self) -> Option<&Symbol> {
        match self {
            Renderer::Single { symbol } => Some(symbol),
            Renderer::Categorized { categories } => categories.first().map(|c| &c.symbol),
            Renderer::Heatmap => None,
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Stable project layer id; groups refer to layers by this id.
    pub id: String,
    pub name: String,
    pub kind: LayerKind,
    #[serde(default)]
    pub geometry: Option<GeometryKind>,
    /// Connection string (query-string encoded) for remote layers, or the
    /// script URL for WFS layers.
    #[serde(default)]
    pub source: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub scale_visibility: Option<ScaleRange>,
    #[serde(default)]
    pub labeling: Option<Labeling>,
    #[serde(default)]
    pub renderer: Option<Renderer>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub cluster: bool,
    /// Attribute fields shown in the popup; no popup when empty.
    #[serde(default)]
    pub popup_fields: Vec<String>,
    /// Symbol sizes are in map units and must be rescaled on zoom.
    #[serde(default)]
    pub map_unit_sizing: bool,
    /// Vector-tile style group this layer belongs to.
    #[serde(default)]
    pub vt_style_group: Option<String>,
    /// Pre-serialized style rules of a vector-tile sub-layer.
    #[serde(default)]
    pub vt_rules: Vec<String>,
    /// Body of the vector-tile label callback.
    #[serde(default)]
    pub vt_label: Option<String>,
}

impl LayerKind {
    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Vector => "vector",
            LayerKind::Wfs => "wfs",
            LayerKind::Raster => "raster",
            LayerKind::Remote => "remote",
            LayerKind::VectorTile => "vector tile",
        }
    }
}

impl LayerDescriptor {
    pub fn safe_name(&self) -> String {
        naming::safe_name(&self.name)
    }

    pub fn is_point(&self) -> bool {
        self.geometry == Some(GeometryKind::Point)
    }

    pub fn is_heatmap(&self) -> bool {
        matches!(self.renderer, Some(Renderer::Heatmap))
    }

    /// Zoom interval from the layer's scale range, if it has one.
    pub fn zoom_range(&self) -> Option<ZoomRange> {
        self.scale_visibility.map(ZoomRange::from)
    }
}

impl Project {
    /// Check that every group member exists and belongs to one group only.
    pub fn validate(&self) -> Result<(), ProjectError> {
        let mut owner: IndexMap<&str, &str> = IndexMap::new();
        for (group, members) in &self.groups {
            for member in members {
                if !self.layers.iter().any(|l| &l.id == member) {
                    return Err(ProjectError::UnknownGroupMember {
                        group: group.clone(),
                        layer: member.clone(),
                    });
                }
                if let Some(first) = owner.insert(member, group) {
                    return Err(ProjectError::LayerInSeveralGroups {
                        layer: member.clone(),
                        first: first.to_string(),
                        second: group.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Group a layer belongs to, matched on its stable id.
    pub fn group_of(&self, layer_id: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, members)| members.iter().any(|m| m == layer_id))
            .map(|(group, _)| group.as_str())
    }
}

/// Load and validate a project description from a JSON file.
pub fn load_project(path: &Path) -> Result<Project, ProjectError> {
    let content = fs::read_to_string(path)?;
    let project: Project = serde_json::from_str(&content)?;
    project.validate()?;
    Ok(project)
}
