//! Script composition.
//!
//! Walks a project's layers in drawing order and concatenates the emitter
//! fragments into the map's inline script:
//!
//! ```text
//! CRS → map → bounds group → title data
//!   → per layer: source / point factories, cluster, legend icons, popups,
//!                scale-dependent snippets, WFS and data includes
//!   → highlight → address search → scale bar → setBounds()
//!   → menu → vector-tile styles and labels → zoomend wrapper → end script
//! ```
//!
//! Legend icons are the only side effect: they are written under
//! `<output>/legend/` as layers are visited.

use indexmap::IndexMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::legend::{LegendError, layer_legend};
use crate::naming::{layer_id, layer_var, safe_name};
use crate::project::{LayerDescriptor, LayerKind, Project};
use crate::script::ScriptError;
use crate::script::bootstrap::{
    MapOptions, TitleData, crs_script, extent_script, feature_groups_script, map_script,
    scale_bar_script, title_script, uses_custom_crs,
};
use crate::script::finalize::{Finalization, LayerSearch, end_script};
use crate::script::interaction::{
    address_search_script, highlight_script, pop_funcs_script, popup_content, popup_script,
};
use crate::script::layers::{
    MarkerKind, VtLabels, VtStyles, cluster_script, point_to_layer_script,
    scale_dependent_label_script, scale_dependent_layer_script, scale_dependent_script,
    vt_labels_script, vt_styles_script,
};
use crate::script::menu::MenuTree;
use crate::script::sources::{Connection, json_script, raster_script, remote_layer_script, wfs_script};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
    #[error("Legend error: {0}")]
    Legend(#[from] LegendError),
}

/// One line of the export summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    /// Drawing-order position.
    pub index: usize,
    pub name: String,
    /// Synthetic menu id, `lyr_<safe>_<index>_0`.
    pub id: String,
    /// `wms`, `xyz`, `vector`, ...
    pub kind: String,
    pub legend_icons: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ComposedScript {
    /// Inline script body, ending with `</script>` and any WFS includes.
    pub script: String,
    /// `<script>` tags for exported vector data, for the document head.
    pub data_includes: Vec<String>,
    pub layers: Vec<LayerSummary>,
}

impl ComposedScript {
    pub fn legend_icons(&self) -> usize {
        self.layers.iter().map(|l| l.legend_icons).sum()
    }
}

/// Per-layer state gathered for the fragments emitted after the layer loop.
#[derive(Default)]
struct Accumulated {
    end: Finalization,
    legends: IndexMap<String, String>,
    scale_snippets: String,
    label_layers: Vec<String>,
    vt_styles: VtStyles,
    vt_labels: VtLabels,
}

pub fn compose(
    project: &Project,
    config: &ExportConfig,
    output_dir: &Path,
) -> Result<ComposedScript, ExportError> {
    info!(
        "composing map '{}' with {} layers",
        project.title,
        project.layers.len()
    );
    let map = &config.map;
    let interaction = &config.interaction;
    let mut script = String::new();

    if uses_custom_crs(map.match_crs, &project.crs.auth_id) {
        script.push_str(&crs_script(&project.crs.auth_id, &project.crs.proj4));
    }
    script.push_str(&map_script(&MapOptions {
        extent: map.extent,
        match_crs: map.match_crs,
        crs_auth_id: &project.crs.auth_id,
        measure: map.measure,
        min_zoom: map.min_zoom,
        max_zoom: map.max_zoom,
        bounds: &project.bounds,
        locate: map.locate,
        attribution: &map.attribution,
    }));
    script.push_str(&feature_groups_script());
    script.push_str("\n        ");
    script.push_str(&title_script(&TitleData {
        title: &project.title,
        abstract_text: &project.abstract_text,
    })?);

    let layer_search = LayerSearch::parse(&interaction.layer_search)?;
    let mut acc = Accumulated::default();
    if let Some(search) = &layer_search {
        acc.end.search_layer = search_target(project, search)?;
    }
    let mut composed = ComposedScript::default();

    for (index, layer) in project.layers.iter().enumerate() {
        let var = layer_var(&layer.name, index);
        let kind = emit_layer(layer, index, &var, config, &mut script, &mut acc, &mut composed)?;

        let legend_icons = match layer_legend(layer, &var, output_dir)? {
            Some(legend) => {
                acc.legends.insert(var.clone(), legend.html);
                legend.icons
            }
            None => 0,
        };

        debug!("{} → {} ({kind})", layer.name, layer_id(&layer.name, index));
        composed.layers.push(LayerSummary {
            index,
            name: layer.name.clone(),
            id: layer_id(&layer.name, index),
            kind,
            legend_icons,
        });
    }

    acc.end.layer_search = layer_search;

    if interaction.highlight || interaction.popups_on_hover {
        script.push_str(&highlight_script(
            interaction.highlight,
            interaction.popups_on_hover,
            &interaction.highlight_color,
        ));
    }
    if interaction.address_search {
        script.push_str(&address_search_script());
    }
    if config.controls.scale_bar.enabled {
        script.push_str("\n        ");
        script.push_str(&scale_bar_script(&config.controls.scale_bar.options()));
    }
    script.push_str(&extent_script(map.extent, map.restrict_to_extent));
    if config.controls.layers_list {
        script.push_str(&MenuTree::build(project, &acc.legends).render()?);
    }
    script.push_str(&vt_styles_script(&acc.vt_styles));
    script.push_str(&vt_labels_script(&acc.vt_labels));
    if !acc.scale_snippets.is_empty() {
        script.push_str(&scale_dependent_script(&acc.scale_snippets));
    }

    acc.end.labels_list = acc.label_layers.join(",");
    script.push_str(&end_script(&acc.end));

    composed.script = script;
    info!(
        "composed {} layers, {} legend icons",
        composed.layers.len(),
        composed.legend_icons()
    );
    Ok(composed)
}

/// Variable of the single vector or WFS layer named by the search setting.
fn search_target(project: &Project, search: &LayerSearch) -> Result<String, ScriptError> {
    let matches: Vec<String> = project
        .layers
        .iter()
        .enumerate()
        .filter(|(_, l)| matches!(l.kind, LayerKind::Vector | LayerKind::Wfs))
        .filter(|(_, l)| l.name == search.layer)
        .map(|(index, l)| format!("layer_{}", layer_var(&l.name, index)))
        .collect();
    match matches.as_slice() {
        [target] => Ok(target.clone()),
        [] => Err(ScriptError::UnknownSearchLayer(search.layer.clone())),
        _ => Err(ScriptError::AmbiguousSearchLayer {
            layer: search.layer.clone(),
            count: matches.len(),
        }),
    }
}

/// Emit the layer's own fragments and return its kind label.
fn emit_layer(
    layer: &LayerDescriptor,
    index: usize,
    var: &str,
    config: &ExportConfig,
    script: &mut String,
    acc: &mut Accumulated,
    composed: &mut ComposedScript,
) -> Result<String, ExportError> {
    match layer.kind {
        LayerKind::Remote => {
            script.push_str(&remote_layer_script(
                layer,
                index,
                config.interaction.identify,
            )?);
            Ok(Connection::parse(&layer.source).kind().label().to_string())
        }
        LayerKind::Raster => {
            script.push_str(&raster_script(&layer.safe_name(), index));
            acc.end.use_raster = true;
            Ok(layer.kind.label().to_string())
        }
        LayerKind::VectorTile => {
            let group = layer
                .vt_style_group
                .clone()
                .unwrap_or_else(|| layer.name.clone());
            acc.vt_styles
                .entry(group)
                .or_default()
                .entry(layer.safe_name())
                .or_default()
                .extend(layer.vt_rules.iter().cloned());
            if let Some(body) = &layer.vt_label {
                acc.vt_labels.insert(var.to_string(), body.clone());
            }
            Ok(layer.kind.label().to_string())
        }
        LayerKind::Vector | LayerKind::Wfs => {
            emit_vector_layer(layer, index, var, script, acc);
            match layer.kind {
                LayerKind::Wfs => acc.end.wfs_layers.push_str(&wfs_script(&layer.source)),
                _ => composed.data_includes.push(json_script(var)),
            }
            Ok(layer.kind.label().to_string())
        }
    }
}

fn emit_vector_layer(
    layer: &LayerDescriptor,
    index: usize,
    var: &str,
    script: &mut String,
    acc: &mut Accumulated,
) {
    let clustered = layer.cluster && layer.is_point();
    if layer.is_heatmap() {
        acc.end.use_heat = true;
    } else if layer.is_point() {
        let symbol_layers = layer
            .renderer
            .as_ref()
            .and_then(|r| r.primary_symbol())
            .map(|s| s.layers.as_slice())
            .unwrap_or_default();
        if symbol_layers.is_empty() {
            script.push_str(&point_to_layer_script(var, 0, MarkerKind::CircleMarker));
        }
        for (n, symbol_layer) in symbol_layers.iter().enumerate() {
            script.push_str(&point_to_layer_script(
                var,
                n,
                MarkerKind::for_symbol_layer(symbol_layer),
            ));
        }
        if clustered {
            script.push_str(&cluster_script(var));
        }
    }

    if !layer.popup_fields.is_empty() {
        if layer.is_point() {
            let content = popup_content(&layer.popup_fields, "feature.properties");
            script.push_str(&format!(
                r#"
        function pop_{var}(feature, layer) {{{}
        }}"#,
                pop_funcs_script(&content)
            ));
        } else {
            let content = popup_content(&layer.popup_fields, "e.features[0].properties");
            script.push_str(&popup_script(&layer_id(&layer.name, index), &content));
        }
    }

    if let Some(range) = layer.zoom_range() {
        acc.scale_snippets
            .push_str(&scale_dependent_layer_script(var, range, clustered));
    }
    if let Some(labeling) = &layer.labeling {
        acc.end
            .labels
            .push_str(&scale_dependent_label_script(var, Some(labeling)));
        acc.label_layers.push(format!("layer_{var}"));
    }
    if layer.map_unit_sizing {
        acc.end.map_unit_layers.push(var.to_string());
    }
    debug!("emitted vector layer {}", safe_name(&layer.name));
}
