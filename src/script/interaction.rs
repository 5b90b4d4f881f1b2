//! Popups, hover highlighting and address search.

use maud::html;

use super::json::escape_single_quoted;

/// Mapbox click popup for one rendered layer, plus pointer-cursor handlers.
///
/// The click only opens a popup when the topmost rendered feature belongs to
/// `layer_id`, so overlapping layers don't stack popups.
pub fn popup_script(layer_id: &str, content: &str) -> String {
    format!(
        r#"
map.on('click', '{layer_id}', function (e) {{

    let f = map.queryRenderedFeatures(e.point);
    if (f.length) {{
        if(f[0].layer.id != '{layer_id}'){{
            return;
        }}
    }} else {{
        return;
    }}


    var description = {content}

    new mapboxgl.Popup()
        .setLngLat(e.lngLat)
        .setHTML(description)
        .addTo(map);
}});

// Change the cursor to a pointer when the mouse is over the places layer.
map.on('mouseenter', '{layer_id}', function () {{
    map.getCanvas().style.cursor = 'pointer';
}});

// Change it back to a pointer when it leaves.
map.on('mouseleave', '{layer_id}', function () {{
    map.getCanvas().style.cursor = '';
}});

"#
    )
}

/// Leaflet `bindPopup` body for an `onEachFeature` callback.
pub fn pop_funcs_script(content: &str) -> String {
    format!(
        r#"
            var popupContent = {content};
            layer.bindPopup(popupContent, {{maxHeight: 400}});"#
    )
}

/// Popup HTML as a JavaScript string expression.
///
/// `properties` is the expression holding the feature attributes, e.g.
/// `feature.properties` in Leaflet callbacks or `e.features[0].properties`
/// in Mapbox handlers. Null attributes render as empty cells.
pub fn popup_content(fields: &[String], properties: &str) -> String {
    let mut rows = String::new();
    for field in fields {
        let key = escape_single_quoted(field);
        let header = escape_single_quoted(&html! { (field) }.into_string());
        rows.push_str(&format!(
            r#"\
    <tr>\
        <th scope="row">{header}</th>\
        <td>' + ({properties}['{key}'] !== null ? {properties}['{key}'].toLocaleString() : '') + '</td>\
    </tr>"#
        ));
    }
    format!(
        r#"'<table>{rows}\
</table>'"#
    )
}

/// `highlightFeature(e)`: recolors the hovered feature and/or opens its popup.
pub fn highlight_script(highlight: bool, popups_on_hover: bool, color: &str) -> String {
    let mut script = String::from(
        r#"
        var highlightLayer;
        function highlightFeature(e) {
            highlightLayer = e.target;"#,
    );
    if highlight {
        script.push_str(&format!(
            r#"

            if (e.target.feature.geometry.type === 'LineString') {{
              highlightLayer.setStyle({{
                color: '{color}',
              }});
            }} else {{
              highlightLayer.setStyle({{
                fillColor: '{color}',
                fillOpacity: 1
              }});
            }}"#
        ));
    }
    if popups_on_hover {
        script.push_str(
            r#"
            highlightLayer.openPopup();"#,
        );
    }
    script.push_str(
        r#"
        }"#,
    );
    script
}

/// Nominatim geocoder wired into a `MapboxGenericGeocoder` control.
pub fn address_search_script() -> String {
    r#"
        var geocodeNominatimRequest = function(query, mapBounds, options) {
        var params = { format: "json", q: query, limit: options.limit };
        var urlParams = new URLSearchParams(Object.entries(params));

        return fetch("https://nominatim.openstreetmap.org/search?" + urlParams)
            .then(function(response) {
                if(response.ok) {
                    return response.json();
                } else {
                    return [];
                }
            }).then(function(json) {
                return json.map(function(result) {
                    return {
                        name: result.display_name,
                        lat: result.lat,
                        lon: result.lon,
                        bbox: [result.boundingbox[2], result.boundingbox[0],
                               result.boundingbox[3], result.boundingbox[1]]
                    };
                });
            });
        };

        map.addControl(new MapboxGenericGeocoder({}, geocodeNominatimRequest));
"#
    .to_string()
}
