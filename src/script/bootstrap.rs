//! Map bootstrap emitters.
//!
//! Everything that runs before the first layer is added: the optional
//! projected CRS, the `L.map` constructor with its controls, the bounds
//! feature group, the `setBounds()` helper, the scale bar and the title data.

use serde::{Deserialize, Serialize};

use super::ScriptError;
use super::json::{self, escape_single_quoted};

/// Authority id of the default geographic CRS; maps in it need no `L.Proj.CRS`.
pub const GEOGRAPHIC_CRS: &str = "EPSG:4326";

/// Attribution link added to every exported map.
pub const DEFAULT_ATTRIBUTION: &str =
    r#"<a href="https://github.com/tomchadwin/qgis2web" target="_blank">qgis2web</a>"#;

/// How the initial view is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtentMode {
    /// Fit to the desktop canvas bounds literal at construction.
    CanvasExtent,
    /// Fit to the combined bounds of loaded layers in `setBounds()`.
    FitToLayers,
}

/// Unit system of the measurement control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureUnits {
    None,
    Metric,
    Imperial,
}

/// Map-level options for [`map_script`].
#[derive(Debug, Clone)]
pub struct MapOptions<'a> {
    pub extent: ExtentMode,
    pub match_crs: bool,
    pub crs_auth_id: &'a str,
    pub measure: MeasureUnits,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Leaflet bounds literal used with [`ExtentMode::CanvasExtent`].
    pub bounds: &'a str,
    pub locate: bool,
    pub attribution: &'a str,
}

/// Whether the map needs the custom `crs` defined by [`crs_script`].
pub fn uses_custom_crs(match_crs: bool, crs_auth_id: &str) -> bool {
    match_crs && crs_auth_id != GEOGRAPHIC_CRS
}

/// Define `crs` as an `L.Proj.CRS` with the fixed resolution ladder.
pub fn crs_script(crs_auth_id: &str, crs_proj4: &str) -> String {
    format!(
        r#"
        var crs = new L.Proj.CRS('{crs_auth_id}', '{crs_proj4}', {{
            resolutions: [2800, 1400, 700, 350, 175, 84, 42, 21, 11.2, 5.6, 2.8, 1.4, 0.7, 0.35, 0.14, 0.07],
        }});"#
    )
}

/// Construct the map object and its always-on controls.
pub fn map_script(options: &MapOptions) -> String {
    let mut script = String::from(
        r#"
        var map = L.map('map', {"#,
    );
    if uses_custom_crs(options.match_crs, options.crs_auth_id) {
        script.push_str(
            r#"
            crs: crs,
            continuousWorld: false,
            worldCopyJump: false, "#,
        );
    }
    script.push_str(&format!(
        r#"
            zoomControl:true, maxZoom:{}, minZoom:{}
        }})"#,
        options.max_zoom, options.min_zoom
    ));
    if options.extent == ExtentMode::CanvasExtent {
        script.push_str(&format!(".fitBounds({});", options.bounds));
    }
    script.push_str(
        r#"
        var hash = new L.Hash(map);"#,
    );
    script.push_str(&format!(
        r#"
        map.attributionControl.addAttribution('{}');"#,
        escape_single_quoted(options.attribution)
    ));
    if options.locate {
        script.push_str(
            r#"
        L.control.locate().addTo(map);"#,
        );
    }
    if let Some(units) = measure_options(options.measure) {
        script.push_str(&format!(
            r#"
        var measureControl = new L.Control.Measure({units});
        measureControl.addTo(map);
        document.getElementsByClassName('leaflet-control-measure-toggle')[0]
        .innerHTML = '';
        document.getElementsByClassName('leaflet-control-measure-toggle')[0]
        .className += ' fas fa-ruler';
        "#
        ));
    }
    script
}

fn measure_options(measure: MeasureUnits) -> Option<&'static str> {
    match measure {
        MeasureUnits::None => None,
        MeasureUnits::Imperial => Some(
            r#"{
            position: 'topleft',
            primaryLengthUnit: 'feet',
            secondaryLengthUnit: 'miles',
            primaryAreaUnit: 'sqfeet',
            secondaryAreaUnit: 'sqmiles'
        }"#,
        ),
        MeasureUnits::Metric => Some(
            r#"{
            position: 'topleft',
            primaryLengthUnit: 'meters',
            secondaryLengthUnit: 'kilometers',
            primaryAreaUnit: 'sqmeters',
            secondaryAreaUnit: 'hectares'
        }"#,
        ),
    }
}

/// Empty feature group collecting layer bounds for `setBounds()`.
pub fn feature_groups_script() -> String {
    r#"
        var bounds_group = new L.featureGroup([]);"#
        .to_string()
}

/// `setBounds()`, called once all synchronous layers are on the map.
pub fn extent_script(extent: ExtentMode, restrict_to_extent: bool) -> String {
    let mut script = String::from(
        r#"
        function setBounds() {"#,
    );
    if extent == ExtentMode::FitToLayers {
        script.push_str(
            r#"
            if (bounds_group.getLayers().length) {
                map.fitBounds(bounds_group.getBounds());
            }"#,
        );
    }
    if restrict_to_extent {
        script.push_str(
            r#"
            map.setMaxBounds(map.getBounds());"#,
        );
    }
    script.push_str(
        r#"
        }"#,
    );
    script
}

/// Units shown by the scale bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleUnits {
    Metric,
    Imperial,
    Both,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBarOptions {
    /// Leaflet control position, e.g. `bottomleft`.
    pub position: String,
    /// Maximum width in pixels.
    pub max_width: u32,
    pub units: ScaleUnits,
}

impl Default for ScaleBarOptions {
    fn default() -> Self {
        Self {
            position: "bottomleft".to_string(),
            max_width: 100,
            units: ScaleUnits::Metric,
        }
    }
}

pub fn scale_bar_script(options: &ScaleBarOptions) -> String {
    let metric = matches!(options.units, ScaleUnits::Metric | ScaleUnits::Both);
    let imperial = matches!(options.units, ScaleUnits::Imperial | ScaleUnits::Both);
    format!(
        "L.control.scale({{position: '{}', maxWidth: {}, metric: {}, imperial: {}, updateWhenIdle: false}}).addTo(map);",
        options.position, options.max_width, metric, imperial
    )
}

/// Page heading data read by the HTML shell.
#[derive(Debug, Clone, Serialize)]
pub struct TitleData<'a> {
    pub title: &'a str,
    #[serde(rename = "abstract")]
    pub abstract_text: &'a str,
}

/// `var titleData = {...};`, safe to embed in single-quoted contexts.
pub fn title_script(data: &TitleData) -> Result<String, ScriptError> {
    let json = json::to_json(data)?;
    // Backslashes are already JSON-escaped; only quotes need attention.
    Ok(format!("var titleData = {};", json.replace('\'', "\\'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::count;

    fn options() -> MapOptions<'static> {
        MapOptions {
            extent: ExtentMode::FitToLayers,
            match_crs: false,
            crs_auth_id: "EPSG:3857",
            measure: MeasureUnits::None,
            min_zoom: 1,
            max_zoom: 28,
            bounds: "[[0, 0], [1, 1]]",
            locate: false,
            attribution: DEFAULT_ATTRIBUTION,
        }
    }

    #[test]
    fn map_script_zoom_bounds() {
        let js = map_script(&options());
        assert!(js.contains("var map = L.map('map', {"));
        assert!(js.contains("zoomControl:true, maxZoom:28, minZoom:1"));
        assert!(js.contains("var hash = new L.Hash(map);"));
        assert!(js.contains("qgis2web</a>');"));
    }

    #[test]
    fn map_script_custom_crs_only_when_matching() {
        assert!(!map_script(&options()).contains("crs: crs"));

        let mut matched = options();
        matched.match_crs = true;
        assert!(map_script(&matched).contains("crs: crs,"));

        matched.crs_auth_id = GEOGRAPHIC_CRS;
        assert!(!map_script(&matched).contains("crs: crs"));
    }

    #[test]
    fn map_script_fits_canvas_bounds() {
        let mut canvas = options();
        canvas.extent = ExtentMode::CanvasExtent;
        assert!(map_script(&canvas).contains("}).fitBounds([[0, 0], [1, 1]]);"));
        assert!(!map_script(&options()).contains("fitBounds"));
    }

    #[test]
    fn map_script_no_measure_block_for_none() {
        let js = map_script(&options());
        assert!(!js.contains("L.Control.Measure"));
    }

    #[test]
    fn map_script_measure_units() {
        let mut metric = options();
        metric.measure = MeasureUnits::Metric;
        let js = map_script(&metric);
        assert_eq!(count(&js, "new L.Control.Measure("), 1);
        assert!(js.contains("primaryLengthUnit: 'meters'"));
        assert!(js.contains("secondaryAreaUnit: 'hectares'"));

        let mut imperial = options();
        imperial.measure = MeasureUnits::Imperial;
        let js = map_script(&imperial);
        assert!(js.contains("primaryLengthUnit: 'feet'"));
        assert!(js.contains("secondaryAreaUnit: 'sqmiles'"));
        assert!(js.contains("' fas fa-ruler'"));
    }

    #[test]
    fn map_script_locate_control() {
        let mut locate = options();
        locate.locate = true;
        assert!(map_script(&locate).contains("L.control.locate().addTo(map);"));
        assert!(!map_script(&options()).contains("L.control.locate()"));
    }

    #[test]
    fn crs_script_definition() {
        let js = crs_script("EPSG:2056", "+proj=somerc");
        assert!(js.contains("new L.Proj.CRS('EPSG:2056', '+proj=somerc', {"));
        assert!(js.contains("resolutions: [2800, 1400,"));
        assert!(js.contains("0.14, 0.07],"));
    }

    #[test]
    fn extent_script_variants() {
        let fit = extent_script(ExtentMode::FitToLayers, false);
        assert!(fit.contains("map.fitBounds(bounds_group.getBounds());"));
        assert!(!fit.contains("setMaxBounds"));

        let restricted = extent_script(ExtentMode::CanvasExtent, true);
        assert!(!restricted.contains("bounds_group"));
        assert!(restricted.contains("map.setMaxBounds(map.getBounds());"));
        assert!(restricted.trim_end().ends_with('}'));
    }

    #[test]
    fn scale_bar_defaults_match_reference() {
        assert_eq!(
            scale_bar_script(&ScaleBarOptions::default()),
            "L.control.scale({position: 'bottomleft', maxWidth: 100, metric: true, imperial: false, updateWhenIdle: false}).addTo(map);"
        );
    }

    #[test]
    fn scale_bar_both_units() {
        let options = ScaleBarOptions {
            position: "topright".into(),
            max_width: 200,
            units: ScaleUnits::Both,
        };
        let js = scale_bar_script(&options);
        assert!(js.contains("position: 'topright'"));
        assert!(js.contains("metric: true, imperial: true"));
    }

    #[test]
    fn title_script_escapes_quotes() {
        let data = TitleData {
            title: "Jack's map",
            abstract_text: "",
        };
        assert_eq!(
            title_script(&data).unwrap(),
            r#"var titleData = {"title": "Jack\'s map", "abstract": ""};"#
        );
    }
}
