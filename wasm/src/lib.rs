use gatemap::{SiteSnapshot, Theme, render_driver_svg, resolve_route, route_overlay};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriverViewOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f64>,
    route_color: Option<String>,
    route_width: Option<f64>,
}

#[derive(Debug, Serialize)]
struct OverlayPoint {
    x: f64,
    y: f64,
}

fn build_theme(options: DriverViewOptions) -> Theme {
    let mut theme = if options.theme.as_deref() == Some("modern") {
        Theme::modern()
    } else {
        Theme::site_default()
    };

    if let Some(font_family) = options.font_family {
        theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        theme.font_size = font_size;
    }
    if let Some(color) = options.route_color {
        theme.driver_route_color = color;
    }
    if let Some(width) = options.route_width {
        theme.driver_route_width = width;
    }

    theme
}

fn parse_options(options_json: Option<String>) -> Result<DriverViewOptions, String> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| error.to_string()),
        None => Ok(DriverViewOptions::default()),
    }
}

fn driver_svg(
    snapshot_json: &str,
    gate: &str,
    destination: &str,
    width: f64,
    height: f64,
    options_json: Option<String>,
) -> Result<String, String> {
    let snapshot = SiteSnapshot::from_json(snapshot_json).map_err(|error| error.to_string())?;
    let theme = build_theme(parse_options(options_json)?);
    render_driver_svg(&snapshot, gate, destination, width, height, &theme)
        .map_err(|error| error.to_string())
}

fn overlay_json(
    snapshot_json: &str,
    gate: &str,
    destination: &str,
    width: f64,
    height: f64,
) -> Result<String, String> {
    let snapshot = SiteSnapshot::from_json(snapshot_json).map_err(|error| error.to_string())?;
    let route = resolve_route(&snapshot, gate, destination).map_err(|error| error.to_string())?;
    let points: Vec<OverlayPoint> = route_overlay(route, width, height)
        .into_iter()
        .map(|p| OverlayPoint { x: p.x, y: p.y })
        .collect();
    serde_json::to_string(&points).map_err(|error| error.to_string())
}

/// SVG of one route over the site image, sized to the image's measured
/// `width` x `height`. Call again whenever the image is resized.
#[wasm_bindgen]
pub fn render_driver_view(
    snapshot_json: &str,
    gate: &str,
    destination: &str,
    width: f64,
    height: f64,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    driver_svg(snapshot_json, gate, destination, width, height, options_json)
        .map_err(|error| JsValue::from_str(&error))
}

/// Pixel polyline `[{x, y}, ...]` for the route; empty while the image is
/// unmeasured.
#[wasm_bindgen]
pub fn overlay_points(
    snapshot_json: &str,
    gate: &str,
    destination: &str,
    width: f64,
    height: f64,
) -> Result<String, JsValue> {
    overlay_json(snapshot_json, gate, destination, width, height)
        .map_err(|error| JsValue::from_str(&error))
}
