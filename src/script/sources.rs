//! Layer source emitters: remote tiles, raster overlays and data includes.
//!
//! Remote layers carry their connection as a URL-query string, e.g.
//! `url=https%3A%2F%2Fx%2Fwms&layers=roads&format=image/png`. The string is
//! percent-decoded with [`url::form_urlencoded`] and classified:
//!
//! | Condition | Emitter |
//! |---|---|
//! | `type=xyz` | [`xyz_script`] (Mapbox raster layer object) |
//! | has `tileMatrixSet` | [`wmts_script`] (`L.tileLayer.wmts`) |
//! | otherwise | [`wms_script`] (`L.WMS.layer`) |
//!
//! Required keys that are missing abort generation with
//! [`ScriptError::MissingConnectionField`].

use indexmap::IndexMap;
use url::form_urlencoded;

use super::ScriptError;
use super::json::js_number;
use crate::project::LayerDescriptor;

/// Decoded connection parameters, first non-empty value per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connection {
    params: IndexMap<String, String>,
}

impl Connection {
    pub fn parse(source: &str) -> Self {
        let mut params = IndexMap::new();
        for (key, value) in form_urlencoded::parse(source.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    fn require(&self, layer: &str, key: &'static str) -> Result<&str, ScriptError> {
        self.get(key)
            .ok_or_else(|| ScriptError::MissingConnectionField {
                layer: layer.to_string(),
                key,
            })
    }

    pub fn kind(&self) -> RemoteKind {
        if self.get("type") == Some("xyz") {
            RemoteKind::Xyz
        } else if self.get("tileMatrixSet").is_some() {
            RemoteKind::Wmts
        } else {
            RemoteKind::Wms
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    Xyz,
    Wmts,
    Wms,
}

impl RemoteKind {
    pub fn label(self) -> &'static str {
        match self {
            RemoteKind::Xyz => "xyz",
            RemoteKind::Wmts => "wmts",
            RemoteKind::Wms => "wms",
        }
    }
}

/// Source block for a remote layer, dispatched on its connection string.
///
/// `identify` controls WMS GetFeatureInfo on click.
pub fn remote_layer_script(
    layer: &LayerDescriptor,
    index: usize,
    identify: bool,
) -> Result<String, ScriptError> {
    let connection = Connection::parse(&layer.source);
    let safe = layer.safe_name();
    match connection.kind() {
        RemoteKind::Xyz => Ok(xyz_script(&safe, index)),
        RemoteKind::Wmts => wmts_script(&layer.name, &safe, &connection, layer.opacity),
        RemoteKind::Wms => wms_script(&layer.name, &safe, &connection, layer.opacity, identify),
    }
}

/// Mapbox style layer for an XYZ tile source named after the layer.
pub fn xyz_script(safe_name: &str, index: usize) -> String {
    format!(
        r#"
        {{
            "id": "lyr_{safe_name}_{index}",
            "type": "raster",
            "source": "{safe_name}"
        }}"#
    )
}

pub fn wmts_script(
    layer_name: &str,
    safe_name: &str,
    connection: &Connection,
    opacity: f64,
) -> Result<String, ScriptError> {
    let url = connection.require(layer_name, "url")?;
    let layers = connection.require(layer_name, "layers")?;
    let format = connection.require(layer_name, "format")?;
    // Not used by the emitted call, but a WMTS connection without it is broken.
    connection.require(layer_name, "crs")?;
    let style = connection.require(layer_name, "styles")?;
    let matrix_set = connection.require(layer_name, "tileMatrixSet")?;
    Ok(format!(
        r#"
        var overlay_{safe_name} = L.tileLayer.wmts('{url}', {{
            layer: '{layers}',
            tilematrixSet: '{matrix_set}',
            format: '{format}',
            style: '{style}',
            uppercase: true,
            transparent: true,
            continuousWorld : true,
            opacity: {opacity}
        }});"#,
        opacity = js_number(opacity),
    ))
}

pub fn wms_script(
    layer_name: &str,
    safe_name: &str,
    connection: &Connection,
    opacity: f64,
    identify: bool,
) -> Result<String, ScriptError> {
    let url = connection.require(layer_name, "url")?;
    let layers = connection.require(layer_name, "layers")?;
    let format = connection.require(layer_name, "format")?;
    let feature_info = if identify {
        ""
    } else {
        ",
            identify: false,"
    };
    Ok(format!(
        r#"
        var overlay_{safe_name} = L.WMS.layer("{url}", "{layers}", {{
            format: '{format}',
            uppercase: true,
            transparent: true,
            continuousWorld : true,
            tiled: true,
            info_format: 'text/html',
            opacity: {opacity}{feature_info}
        }});"#,
        opacity = js_number(opacity),
    ))
}

/// Mapbox style layer for a local raster source.
pub fn raster_script(safe_name: &str, index: usize) -> String {
    format!(
        r#"
        {{
            "id": "lyr_{safe_name}_{index}",
            "type": "raster",
            "source": "{safe_name}",
            "minzoom": 0,
            "maxzoom": 22
        }}"#
    )
}

/// `<script>` include for an exported data file under `data/`.
pub fn json_script(data_name: &str) -> String {
    format!(
        r#"
        <script src="data/{data_name}.js"></script>"#
    )
}

/// Deferred `<script>` include for a WFS layer's GetFeature callback URL.
pub fn wfs_script(script_url: &str) -> String {
    format!(
        r#"
        <script src='{script_url}'></script>"#
    )
}
