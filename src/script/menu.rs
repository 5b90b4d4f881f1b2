//! Layer menu: toggle links, group headers, legends and abstracts.
//!
//! The menu is folded from the project's drawing-order layer list. Each layer
//! is recorded under its synthetic id (`lyr_<safe>_<index>_0`) with its legend
//! and abstract, then placed either in its group's `[id, name, ...]` list or in
//! the top-level toggle list. Both lists receive layers at the front, so the
//! menu reads in reverse discovery order, which matches the layer tree
//! (drawing order is bottom-up).
//!
//! ```text
//! layers: [A, B(Transport), C, D(Transport)]
//!
//! toggleableLayerIds = ['lyr_C_2_0', 'C','lyr_A_0_0', 'A']
//! toggleableGroups   = {"Transport": ["lyr_D_3_0", "D", "lyr_B_1_0", "B"]}
//! ```
//!
//! Group membership is matched on the layer's stable project id, never on
//! names, so two layers sharing a display name stay apart.

use indexmap::IndexMap;
use maud::{PreEscaped, html};
use tracing::debug;

use super::ScriptError;
use super::json::{escape_single_quoted, to_json};
use crate::naming::{layer_id, layer_var};
use crate::project::{LayerDescriptor, Project};

const MENU_RUNTIME: &str = include_str!("../../static/layers_menu.js");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuTree {
    /// `'id', 'name'` items for ungrouped layers.
    toggleable: Vec<String>,
    grouped: IndexMap<String, Vec<String>>,
    legends: IndexMap<String, String>,
    abstracts: IndexMap<String, String>,
}

impl MenuTree {
    /// Empty tree with every group present, in project order, even if no
    /// layer ends up in it.
    pub fn with_groups<'a>(groups: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            grouped: groups.into_iter().map(|g| (g.clone(), Vec::new())).collect(),
            ..Self::default()
        }
    }

    /// Fold the whole project. `legends` maps `<safe>_<index>` to the
    /// layer's legend rows; layers without an entry get an empty legend.
    pub fn build(project: &Project, legends: &IndexMap<String, String>) -> Self {
        project.layers.iter().enumerate().fold(
            Self::with_groups(project.groups.keys()),
            |tree, (index, layer)| {
                let key = layer_var(&layer.name, index);
                let legend = legends.get(&key).map(String::as_str).unwrap_or_else(|| {
                    debug!("no legend for {key}");
                    ""
                });
                tree.add_layer(index, layer, project.group_of(&layer.id), legend)
            },
        )
    }

    /// Record one layer; `group` is the group owning the layer's id.
    pub fn add_layer(
        mut self,
        index: usize,
        layer: &LayerDescriptor,
        group: Option<&str>,
        legend: &str,
    ) -> Self {
        let id = layer_id(&layer.name, index);
        let legend_html = html! {
            div class="menu-legend" { (PreEscaped(legend)) }
        };
        self.legends.insert(id.clone(), legend_html.into_string());
        self.abstracts
            .insert(id.clone(), layer.abstract_text.clone());

        match group {
            Some(group) => {
                debug!("layer found in group {group}: {}", layer.name);
                let members = self.grouped.entry(group.to_string()).or_default();
                members.insert(0, layer.name.clone());
                members.insert(0, id);
            }
            None => {
                let item = format!("'{}', '{}'", id, escape_single_quoted(&layer.name));
                self.toggleable.insert(0, item);
            }
        }
        self
    }

    pub fn toggleable(&self) -> &[String] {
        &self.toggleable
    }

    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.grouped.get(name).map(Vec::as_slice)
    }

    pub fn legend(&self, id: &str) -> Option<&str> {
        self.legends.get(id).map(String::as_str)
    }

    pub fn abstract_text(&self, id: &str) -> Option<&str> {
        self.abstracts.get(id).map(String::as_str)
    }

    /// The `map.on('load', ...)` script building the menu at runtime.
    pub fn render(&self) -> Result<String, ScriptError> {
        Ok(format!(
            r#"
    map.on('load', function(){{
        var toggleableLayerIds = [{}];
        var toggleableGroups = {};
        var layerLegends = {};
        var layerAbstracts = {};

{}"#,
            self.toggleable.join(","),
            to_json(&self.grouped)?,
            to_json(&self.legends)?,
            to_json(&self.abstracts)?,
            MENU_RUNTIME.trim_end(),
        ))
    }
}
