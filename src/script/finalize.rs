//! End-of-document script: everything emitted after the last layer.

use super::ScriptError;
use super::json::escape_single_quoted;

/// Attribute search over one layer, configured as `"<layer name>: <field>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSearch {
    pub layer: String,
    pub field: String,
}

impl LayerSearch {
    /// Parse a search setting. An empty string or `None` disables search.
    pub fn parse(setting: &str) -> Result<Option<Self>, ScriptError> {
        let setting = setting.trim();
        if setting.is_empty() || setting == "None" {
            return Ok(None);
        }
        match setting.split_once(": ") {
            Some((layer, field)) if !layer.is_empty() && !field.is_empty() => Ok(Some(Self {
                layer: layer.to_string(),
                field: field.to_string(),
            })),
            _ => Err(ScriptError::InvalidLayerSearch(setting.to_string())),
        }
    }
}

/// Inputs collected while emitting layers.
#[derive(Debug, Clone, Default)]
pub struct Finalization {
    /// WFS `<script>` includes; when present, `setBounds()` runs from their
    /// callbacks instead of here.
    pub wfs_layers: String,
    pub labels: String,
    /// Layer variables whose symbols are sized in map units.
    pub map_unit_layers: Vec<String>,
    pub layer_search: Option<LayerSearch>,
    /// Variable holding the searched layer, e.g. `layer_Roads_0`.
    pub search_layer: String,
    pub use_heat: bool,
    pub use_raster: bool,
    /// Comma-separated label layer variables for `resetLabels`.
    pub labels_list: String,
}

pub fn end_script(end: &Finalization) -> String {
    let mut script = String::new();
    if !end.labels.is_empty() {
        script.push_str(&format!(
            r#"
        map.on("zoomend", function(){{
{}
        }});"#,
            end.labels
        ));
    }
    if end.wfs_layers.is_empty() {
        script.push_str(
            r#"
        setBounds();
        "#,
        );
        script.push_str(&end.labels);
    }
    if !end.map_unit_layers.is_empty() {
        let restyle: String = end
            .map_unit_layers
            .iter()
            .map(|layer| {
                format!(
                    r#"
            layer_{layer}.setStyle(style_{layer}_0);"#
                )
            })
            .collect();
        script.push_str(&format!(
            r#"
        newM2px();
{restyle}
        map.on("zoomend", function(){{
            newM2px();
{restyle}
        }});"#
        ));
    }
    if let Some(search) = &end.layer_search {
        script.push_str(&format!(
            r#"
        map.addControl(new L.Control.Search({{
            layer: {},
            initial: false,
            hideMarkerOnCollapse: true,
            propertyName: '{}'}}));
        document.getElementsByClassName('search-button')[0].className +=
         ' fa fa-binoculars';
            "#,
            end.search_layer,
            escape_single_quoted(&search.field)
        ));
    }
    if end.use_heat {
        script.push_str(
            r#"
        function geoJson2heat(geojson, weight) {
          return geojson.features.map(function(feature) {
            return [
              feature.geometry.coordinates[1],
              feature.geometry.coordinates[0],
              feature.properties[weight]
            ];
          });
        }"#,
        );
    }
    if end.use_raster {
        script.push_str(
            r#"
        L.ImageOverlay.include({
            getBounds: function () {
                return this._bounds;
            }
        });"#,
        );
    }
    if !end.labels_list.is_empty() {
        let list = &end.labels_list;
        script.push_str(&format!(
            r#"
        resetLabels([{list}]);
        map.on("zoomend", function(){{
            resetLabels([{list}]);
        }});
        map.on("layeradd", function(){{
            resetLabels([{list}]);
        }});
        map.on("layerremove", function(){{
            resetLabels([{list}]);
        }});"#
        ));
    }
    script.push_str(&format!(
        r#"
        </script>{}"#,
        end.wfs_layers
    ));
    script
}
