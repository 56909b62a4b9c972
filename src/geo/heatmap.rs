use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::info;

use super::GeoPoint;

const LEAFLET_CSS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_HEAT_JS: &str = "https://cdn.jsdelivr.net/npm/leaflet.heat@0.2.0/dist/leaflet-heat.js";
const TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Map view and heat-layer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatmapOptions {
    /// `[lat, lng]` of the initial view.
    pub center: [f64; 2],
    pub zoom: u8,
    pub radius: u32,
    pub blur: u32,
    pub min_opacity: f64,
    pub max_zoom: u8,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            center: [39.8283, -98.5795],
            zoom: 4,
            radius: 10,
            blur: 15,
            min_opacity: 0.5,
            max_zoom: 18,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeatLayerOptions {
    radius: u32,
    blur: u32,
    min_opacity: f64,
    max_zoom: u8,
}

/// A standalone HTML page: OpenStreetMap tiles with the points as a heat layer.
pub fn render_html(points: &[GeoPoint], opts: &HeatmapOptions) -> Result<String> {
    let data = serde_json::to_string(points).context("serializing heat points")?;
    let layer = serde_json::to_string(&HeatLayerOptions {
        radius: opts.radius,
        blur: opts.blur,
        min_opacity: opts.min_opacity,
        max_zoom: opts.max_zoom,
    })
    .context("serializing heat layer options")?;
    let center = serde_json::to_string(&opts.center).context("serializing map center")?;

    let mut html = String::with_capacity(data.len() + 2048);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\" />\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n",
    );
    html.push_str("<title>Accident hotspots</title>\n");
    html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\" />\n", LEAFLET_CSS));
    html.push_str(&format!("<script src=\"{}\"></script>\n", LEAFLET_JS));
    html.push_str(&format!("<script src=\"{}\"></script>\n", LEAFLET_HEAT_JS));
    html.push_str(
        "<style>html, body { width: 100%; height: 100%; margin: 0; padding: 0; } \
         #map { position: absolute; top: 0; bottom: 0; left: 0; right: 0; }</style>\n",
    );
    html.push_str("</head>\n<body>\n<div id=\"map\"></div>\n<script>\n");
    html.push_str(&format!(
        "var map = L.map(\"map\").setView({}, {});\n",
        center, opts.zoom
    ));
    html.push_str(&format!(
        "L.tileLayer(\"{}\", {{ maxZoom: 19, attribution: '{}' }}).addTo(map);\n",
        TILE_URL, TILE_ATTRIBUTION
    ));
    html.push_str(&format!("var points = {};\n", data));
    html.push_str(&format!("L.heatLayer(points, {}).addTo(map);\n", layer));
    html.push_str("</script>\n</body>\n</html>\n");
    Ok(html)
}

#[tracing::instrument(level = "info", skip(points, opts), fields(path = %path.display(), points = points.len()))]
pub fn write_heatmap(path: &Path, points: &[GeoPoint], opts: &HeatmapOptions) -> Result<()> {
    let html = render_html(points, opts)?;
    fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    info!("heat map written");
    Ok(())
}
