//! Vector and point layer emitters.
//!
//! Point layers become Leaflet markers through a per-layer factory function;
//! clustered layers are wrapped in a marker-cluster group; layers and labels
//! with a scale range get `zoomend` visibility toggles; vector-tile layers are
//! styled by object literals reassembled from pre-serialized rule fragments.

use indexmap::IndexMap;
use tracing::debug;

use crate::naming::safe_name;
use crate::project::{Labeling, MarkerShape, SymbolLayer, ZoomRange};

/// Vector-tile style group → sub-layer → style rule fragments.
pub type VtStyles = IndexMap<String, IndexMap<String, Vec<String>>>;

/// Vector-tile label function name → function body.
pub type VtLabels = IndexMap<String, String>;

/// Leaflet constructor used for a point feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `L.marker`, for SVG image markers.
    Marker,
    /// `L.circleMarker`.
    CircleMarker,
    /// `L.shapeMarker`, for every other simple-marker shape.
    ShapeMarker,
}

impl MarkerKind {
    /// Pick the constructor for a symbol layer.
    ///
    /// A simple marker whose shape could not be read, or a symbol layer that
    /// has no shape at all, falls back to [`MarkerKind::CircleMarker`].
    pub fn for_symbol_layer(layer: &SymbolLayer) -> Self {
        match layer {
            SymbolLayer::SvgMarker => MarkerKind::Marker,
            SymbolLayer::SimpleMarker {
                shape: Some(MarkerShape::Circle),
            } => MarkerKind::CircleMarker,
            SymbolLayer::SimpleMarker { shape: Some(_) } => MarkerKind::ShapeMarker,
            SymbolLayer::SimpleMarker { shape: None } | SymbolLayer::Other => {
                debug!("marker shape unavailable, using circleMarker");
                MarkerKind::CircleMarker
            }
        }
    }

    pub fn constructor(self) -> &'static str {
        match self {
            MarkerKind::Marker => "marker",
            MarkerKind::CircleMarker => "circleMarker",
            MarkerKind::ShapeMarker => "shapeMarker",
        }
    }
}

/// `pointToLayer_<layer>_<n>`, building a marker styled by `style_<layer>_<n>`.
pub fn point_to_layer_script(layer_var: &str, symbol_layer: usize, kind: MarkerKind) -> String {
    format!(
        r#"
        function pointToLayer_{layer_var}_{symbol_layer}(feature, latlng) {{
            var context = {{
                feature: feature,
                variables: {{}}
            }};
            return L.{marker}(latlng, style_{layer_var}_{symbol_layer}(feature));
        }}"#,
        marker = kind.constructor(),
    )
}

/// Marker-cluster group wrapping `layer_<layer>`.
pub fn cluster_script(layer_var: &str) -> String {
    format!(
        r#"
        var cluster_{layer_var} = new L.MarkerClusterGroup({{showCoverageOnHover: false,
            spiderfyDistanceMultiplier: 2}});
        cluster_{layer_var}.addLayer(layer_{layer_var});
"#
    )
}

/// Add the layer (or its cluster) inside the zoom range, remove it outside.
pub fn scale_dependent_layer_script(layer_var: &str, zooms: ZoomRange, cluster: bool) -> String {
    let prefix = if cluster { "cluster" } else { "layer" };
    let ZoomRange { min_zoom, max_zoom } = zooms;
    format!(
        r#"
            if (map.getZoom() <= {max_zoom} && map.getZoom() >= {min_zoom}) {{
                map.addLayer({prefix}_{layer_var});
            }} else if (map.getZoom() > {max_zoom} || map.getZoom() < {min_zoom}) {{
                map.removeLayer({prefix}_{layer_var});
            }}"#
    )
}

/// Open tooltips inside the label zoom range, close them outside.
///
/// Empty when the layer has no labeling or its labels ignore scale.
pub fn scale_dependent_label_script(layer_var: &str, labeling: Option<&Labeling>) -> String {
    let Some(ZoomRange { min_zoom, max_zoom }) = labeling.and_then(Labeling::zoom_range) else {
        return String::new();
    };
    format!(
        r#"
                if (map.hasLayer(layer_{layer_var})) {{
                    if (map.getZoom() <= {max_zoom} && map.getZoom() >= {min_zoom}) {{
                        layer_{layer_var}.eachLayer(function (layer) {{
                            layer.openTooltip();
                        }});
                    }} else {{
                        layer_{layer_var}.eachLayer(function (layer) {{
                            layer.closeTooltip();
                        }});
                    }}
                }}"#
    )
}

/// Run the collected visibility snippets on every `zoomend`, and once now.
pub fn scale_dependent_script(snippets: &str) -> String {
    format!(
        r#"
        map.on("zoomend", function(e) {{{snippets}
        }});{snippets}"#
    )
}

/// Reassemble vector-tile style objects: `style_<group> = { sub: [...], }`.
///
/// Empty fragments stand for `{}`. No `,]` survives in the output.
pub fn vt_styles_script(styles: &VtStyles) -> String {
    let mut script = String::new();
    for (group, sub_layers) in styles {
        script.push_str(&format!(
            r#"
        style_{} = {{"#,
            safe_name(group)
        ));
        for (sub_layer, rules) in sub_layers {
            script.push_str(&format!(
                r#"
            {sub_layer}: ["#
            ));
            for rule in rules {
                let rule = if rule.is_empty() { "{}" } else { rule.as_str() };
                script.push_str(rule);
                script.push(',');
            }
            script.push_str("],");
        }
        script.push('}');
    }
    while script.contains(",]") {
        script = script.replace(",]", "]");
    }
    script
}

/// Label callbacks `label_<name>(feature, featureLayer, vtLayer, tileCoords)`.
pub fn vt_labels_script(labels: &VtLabels) -> String {
    labels
        .iter()
        .map(|(name, body)| {
            format!(
                r#"
    function label_{}(feature, featureLayer, vtLayer, tileCoords) {{
        var context = {{
            feature: feature,
            variables: {{}}
        }};
        {}
    }}"#,
                safe_name(name),
                body
            )
        })
        .collect()
}
