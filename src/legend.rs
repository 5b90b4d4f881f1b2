//! Legend icons and legend table rows.
//!
//! Each legend entry is a small PNG swatch under `<output>/legend/` and an
//! HTML table row pointing at it. Swatches are drawn directly into an
//! `image::RgbaImage`: a disc for points, a horizontal stroke for lines and a
//! bordered box for polygons. Icon size follows the symbol size in
//! millimetres (`size * 4 + 5` px); symbols without a size get 16 px.
//!
//! ```text
//! <output>/legend/Landuse_2_Forest0.png
//! <tr><td style="text-align: center;"><img src="legend/Landuse_2_Forest0.png"></td><td>Forest</td></tr>
//! ```

use image::codecs::png::PngEncoder;
use image::{DynamicImage, Rgba, RgbaImage};
use maud::{Markup, PreEscaped, html};
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::naming::safe_label;
use crate::project::{GeometryKind, LayerDescriptor, Renderer, Symbol};

#[derive(Error, Debug)]
pub enum LegendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Fallback edge length for symbols without a size.
pub const DEFAULT_ICON_SIZE: u32 = 16;
/// Largest edge length a swatch is drawn at.
pub const MAX_ICON_SIZE: u32 = 256;

const FALLBACK_FILL: Rgba<u8> = Rgba([190, 190, 190, 255]);
const FALLBACK_STROKE: Rgba<u8> = Rgba([35, 35, 35, 255]);

/// Legend HTML of one layer and how many icons were written for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerLegend {
    pub html: String,
    pub icons: usize,
}

/// Icon edge length in pixels, at most [`MAX_ICON_SIZE`].
pub fn icon_size(symbol: &Symbol) -> u32 {
    match symbol.size {
        Some(size) if size.is_finite() && size >= 0.0 => {
            let edge = (size * 4.0 + 5.0).round();
            if edge > MAX_ICON_SIZE as f64 {
                debug!("symbol size {size} clamped to a {MAX_ICON_SIZE}px icon");
                MAX_ICON_SIZE
            } else {
                edge as u32
            }
        }
        _ => {
            debug!("symbol has no usable size, using {DEFAULT_ICON_SIZE}px icon");
            DEFAULT_ICON_SIZE
        }
    }
}

/// Parse `#rrggbb` or `#rrggbbaa`.
pub fn parse_color(hex: &str) -> Option<Rgba<u8>> {
    let digits = hex.strip_prefix('#')?;
    if !digits.is_ascii() || !matches!(digits.len(), 6 | 8) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

fn color_or(color: Option<&String>, fallback: Rgba<u8>) -> Rgba<u8> {
    match color {
        Some(hex) => parse_color(hex).unwrap_or_else(|| {
            debug!("unreadable color '{hex}'");
            fallback
        }),
        None => fallback,
    }
}

/// Draw the swatch for a symbol.
pub fn render_swatch(symbol: &Symbol, geometry: Option<GeometryKind>) -> RgbaImage {
    let size = icon_size(symbol).max(1);
    let fill = color_or(symbol.fill.as_ref(), FALLBACK_FILL);
    let stroke = color_or(symbol.stroke.as_ref(), FALLBACK_STROKE);
    let mut img = RgbaImage::new(size, size);

    match geometry {
        Some(GeometryKind::Point) => {
            let center = (size as f64 - 1.0) / 2.0;
            let radius = size as f64 / 2.0;
            for (x, y, px) in img.enumerate_pixels_mut() {
                let d = ((x as f64 - center).powi(2) + (y as f64 - center).powi(2)).sqrt();
                if d <= radius - 1.0 {
                    *px = fill;
                } else if d <= radius {
                    *px = stroke;
                }
            }
        }
        Some(GeometryKind::Line) => {
            let color = symbol.stroke.as_ref().map_or(fill, |_| stroke);
            let thickness = (size / 8).max(2).min(size);
            let top = (size - thickness) / 2;
            for y in top..top + thickness {
                for x in 0..size {
                    img.put_pixel(x, y, color);
                }
            }
        }
        Some(GeometryKind::Polygon) | None => {
            for (x, y, px) in img.enumerate_pixels_mut() {
                let edge = x == 0 || y == 0 || x == size - 1 || y == size - 1;
                *px = if edge { stroke } else { fill };
            }
        }
    }
    img
}

/// File name of a legend icon: `<layer>_<safe label><index>.png`.
pub fn icon_file_name(layer_name: &str, label: &str, index: usize) -> String {
    format!("{}_{}{}.png", layer_name, safe_label(label), index)
}

/// Table row referencing an icon under `legend/`.
pub fn legend_row(file_name: &str, label: &str) -> Markup {
    html! {
        tr {
            td style="text-align: center;" { img src=(format!("legend/{file_name}")); }
            td { (label) }
        }
    }
}

/// Write a legend icon and return its table row.
pub fn write_legend_icon(
    symbol: &Symbol,
    geometry: Option<GeometryKind>,
    output_dir: &Path,
    layer_name: &str,
    label: &str,
    index: usize,
) -> Result<String, LegendError> {
    let legend_dir = output_dir.join("legend");
    fs::create_dir_all(&legend_dir)?;
    let file_name = icon_file_name(layer_name, label, index);

    let swatch = DynamicImage::ImageRgba8(render_swatch(symbol, geometry));
    let file = fs::File::create(legend_dir.join(&file_name))?;
    swatch.write_with_encoder(PngEncoder::new(BufWriter::new(file)))?;
    debug!("wrote legend/{file_name}");

    Ok(legend_row(&file_name, label).into_string())
}

/// Icons and legend table for a layer.
///
/// `layer_var` is the `<safe>_<index>` name icons are prefixed with. Layers
/// without a symbol-based renderer have no legend.
pub fn layer_legend(
    layer: &LayerDescriptor,
    layer_var: &str,
    output_dir: &Path,
) -> Result<Option<LayerLegend>, LegendError> {
    let rows = match &layer.renderer {
        Some(Renderer::Single { symbol }) => vec![write_legend_icon(
            symbol,
            layer.geometry,
            output_dir,
            layer_var,
            &layer.name,
            0,
        )?],
        Some(Renderer::Categorized { categories }) => categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                write_legend_icon(
                    &category.symbol,
                    layer.geometry,
                    output_dir,
                    layer_var,
                    &category.label,
                    index,
                )
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(Renderer::Heatmap) | None => return Ok(None),
    };
    let icons = rows.len();
    let table = html! {
        table {
            @for row in &rows { (PreEscaped(row)) }
        }
    };
    Ok(Some(LayerLegend {
        html: table.into_string(),
        icons,
    }))
}
