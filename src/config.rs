//! Export configuration module.
//!
//! Handles loading, validating, and merging `webmap.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top of it, so a
//! config file only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [map]
//! extent = "fit_to_layers"   # or "canvas_extent"
//! restrict_to_extent = false
//! match_crs = false          # reproject into the project CRS
//! min_zoom = 1
//! max_zoom = 28
//! measure = "none"           # "metric", "imperial"
//! locate = false
//!
//! [interaction]
//! highlight = true
//! highlight_color = "#ffff00"
//! popups_on_hover = false
//! identify = false           # WMS GetFeatureInfo on click
//! address_search = false
//! layer_search = "None"      # or "<layer name>: <field>"
//!
//! [controls]
//! layers_list = true
//!
//! [controls.scale_bar]
//! enabled = false
//! position = "bottomleft"
//! max_width = 100
//! units = "metric"           # "imperial", "both"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::script::bootstrap::{
    DEFAULT_ATTRIBUTION, ExtentMode, MeasureUnits, ScaleBarOptions, ScaleUnits,
};
use crate::script::finalize::LayerSearch;

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "webmap.toml";

/// Highest zoom level tile services are expected to serve.
pub const MAX_ZOOM_LIMIT: u8 = 28;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Export configuration loaded from `webmap.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Map construction: initial view, zoom limits, always-on controls.
    pub map: MapConfig,
    /// Popups, highlighting and search.
    pub interaction: InteractionConfig,
    /// Optional controls drawn over the map.
    pub controls: ControlsConfig,
}

impl ExportConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.max_zoom > MAX_ZOOM_LIMIT {
            return Err(ConfigError::Validation(format!(
                "map.max_zoom must be at most {MAX_ZOOM_LIMIT}"
            )));
        }
        if self.map.min_zoom > self.map.max_zoom {
            return Err(ConfigError::Validation(
                "map.min_zoom must not exceed map.max_zoom".into(),
            ));
        }
        if !is_hex_color(&self.interaction.highlight_color) {
            return Err(ConfigError::Validation(format!(
                "interaction.highlight_color must be a hex color, got '{}'",
                self.interaction.highlight_color
            )));
        }
        LayerSearch::parse(&self.interaction.layer_search)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        if !POSITIONS.contains(&self.controls.scale_bar.position.as_str()) {
            return Err(ConfigError::Validation(format!(
                "controls.scale_bar.position must be one of {}",
                POSITIONS.join(", ")
            )));
        }
        if self.controls.scale_bar.max_width == 0 {
            return Err(ConfigError::Validation(
                "controls.scale_bar.max_width must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

const POSITIONS: [&str; 4] = ["topleft", "topright", "bottomleft", "bottomright"];

/// `#rgb` or `#rrggbb`.
fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub extent: ExtentMode,
    /// Lock panning to the initial view.
    pub restrict_to_extent: bool,
    /// Render in the project CRS instead of Web Mercator.
    pub match_crs: bool,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub measure: MeasureUnits,
    pub locate: bool,
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            extent: ExtentMode::FitToLayers,
            restrict_to_extent: false,
            match_crs: false,
            min_zoom: 1,
            max_zoom: MAX_ZOOM_LIMIT,
            measure: MeasureUnits::None,
            locate: false,
            attribution: DEFAULT_ATTRIBUTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionConfig {
    pub highlight: bool,
    pub highlight_color: String,
    pub popups_on_hover: bool,
    /// WMS GetFeatureInfo on click.
    pub identify: bool,
    pub address_search: bool,
    /// `"<layer name>: <field>"`, or `"None"` to disable.
    pub layer_search: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            highlight_color: "#ffff00".to_string(),
            popups_on_hover: false,
            identify: false,
            address_search: false,
            layer_search: "None".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsConfig {
    /// Build the layer menu.
    pub layers_list: bool,
    pub scale_bar: ScaleBarConfig,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            layers_list: true,
            scale_bar: ScaleBarConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleBarConfig {
    pub enabled: bool,
    pub position: String,
    pub max_width: u32,
    pub units: ScaleUnits,
}

impl Default for ScaleBarConfig {
    fn default() -> Self {
        let options = ScaleBarOptions::default();
        Self {
            enabled: false,
            position: options.position,
            max_width: options.max_width,
            units: options.units,
        }
    }
}

impl ScaleBarConfig {
    pub fn options(&self) -> ScaleBarOptions {
        ScaleBarOptions {
            position: self.position.clone(),
            max_width: self.max_width,
            units: self.units,
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ExportConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `webmap.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ExportConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ExportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `webmap.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<ExportConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `webmap.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Web map export configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Map
# ---------------------------------------------------------------------------
[map]
# Initial view: "fit_to_layers" zooms to the loaded layers once they are on
# the map, "canvas_extent" uses the project's saved extent.
extent = "fit_to_layers"

# Prevent panning outside the initial view.
restrict_to_extent = false

# Render in the project CRS (needs a proj4 definition in the project).
match_crs = false

# Zoom limits, 0-28.
min_zoom = 1
max_zoom = 28

# Measurement control: "none", "metric" or "imperial".
measure = "none"

# Show a "locate me" button.
locate = false

# Attribution HTML added to the map's attribution control.
attribution = '<a href="https://github.com/tomchadwin/qgis2web" target="_blank">qgis2web</a>'

# ---------------------------------------------------------------------------
# Interaction
# ---------------------------------------------------------------------------
[interaction]
# Recolor features under the pointer.
highlight = true
highlight_color = "#ffff00"

# Open popups on hover instead of click.
popups_on_hover = false

# Query WMS layers with GetFeatureInfo on click.
identify = false

# Nominatim address search box.
address_search = false

# Attribute search as "<layer name>: <field>", or "None".
layer_search = "None"

# ---------------------------------------------------------------------------
# Controls
# ---------------------------------------------------------------------------
[controls]
# Layer menu with groups, legends and abstracts.
layers_list = true

[controls.scale_bar]
enabled = false
# "topleft", "topright", "bottomleft" or "bottomright".
position = "bottomleft"
max_width = 100
# "metric", "imperial" or "both".
units = "metric"
"##
}
