use crate::config::RenderConfig;
use crate::overlay::{GateMarker, OverlayScene, RouteStroke, SceneKind, polyline_points};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(scene: &OverlayScene, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = finite_or(scene.width, 1.0).max(1.0);
    let image_height = finite_or(scene.height, 1.0).max(1.0);
    let caption_band = if scene.caption.is_some() {
        theme.font_size * 2.4
    } else {
        0.0
    };
    let height = image_height + caption_band;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    if let Some(image) = &scene.image {
        let href = escape_xml(image);
        svg.push_str(&format!(
            "<image x=\"0\" y=\"0\" width=\"{width}\" height=\"{image_height}\" preserveAspectRatio=\"none\" href=\"{href}\" xlink:href=\"{href}\"/>",
        ));
    }

    if !scene.is_measured() {
        svg.push_str("</svg>");
        return svg;
    }

    for route in &scene.routes {
        svg.push_str(&route_svg(route, &scene.kind, theme));
    }

    if !scene.draft.is_empty() {
        svg.push_str(&format!(
            "<polyline class=\"draft\" points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\" stroke-linecap=\"round\"/>",
            polyline_points(&scene.draft),
            theme.draft_color,
            theme.draft_width
        ));
    }

    for gate in &scene.gates {
        svg.push_str(&gate_svg(gate, theme));
    }

    if let Some(caption) = &scene.caption {
        let x = width / 2.0;
        let y = image_height + caption_band / 2.0 + theme.font_size * 0.35;
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.caption_color,
            escape_xml(caption)
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn route_svg(route: &RouteStroke, kind: &SceneKind, theme: &Theme) -> String {
    let (color, stroke_width) = match kind {
        SceneKind::Editor => (&theme.route_color, theme.route_width),
        SceneKind::Driver => (&theme.driver_route_color, theme.driver_route_width),
    };
    let opacity = if route.emphasized {
        1.0
    } else {
        theme.dimmed_route_opacity
    };
    format!(
        "<polyline class=\"route\" points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\" stroke-linecap=\"round\" opacity=\"{}\"><title>{} → {}</title></polyline>",
        polyline_points(&route.points),
        color,
        stroke_width,
        opacity,
        escape_xml(&route.gate_name),
        escape_xml(&route.destination)
    )
}

fn gate_svg(gate: &GateMarker, theme: &Theme) -> String {
    let (fill, text, border, border_width) = if gate.selected {
        (
            &theme.selected_gate_fill,
            &theme.selected_gate_text_color,
            &theme.selected_gate_border,
            3.0,
        )
    } else {
        (&theme.gate_fill, &theme.gate_text_color, &theme.gate_border, 2.0)
    };
    let cx = gate.at.x;
    let cy = gate.at.y;
    let r = theme.gate_radius;

    let mut out = String::new();
    out.push_str("<g class=\"gate\">");
    out.push_str(&format!("<title>{}</title>", escape_xml(&gate.name)));
    if gate.selected {
        out.push_str(&format!(
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
            r + 4.0,
            theme.selected_gate_halo
        ));
    }
    out.push_str(&format!(
        "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{fill}\" stroke=\"{border}\" stroke-width=\"{border_width}\"/>",
    ));
    let text_y = cy + theme.font_size * 0.35;
    out.push_str(&format!(
        "<text x=\"{cx:.2}\" y=\"{text_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"700\" fill=\"{text}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        escape_xml(&gate.label)
    ));
    out.push_str("</g>");
    out
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

/// Rasterizes `svg`. Relative image references resolve against
/// `resources_dir`.
#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    resources_dir: Option<&Path>,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.resources_dir = resources_dir.map(Path::to_path_buf);
    opt.fontdb_mut().load_system_fonts();
    let fallback = RenderConfig::default();
    opt.default_size = [(render_cfg.width, render_cfg.height), (fallback.width, fallback.height)]
        .into_iter()
        .find_map(|(width, height)| usvg::Size::from_wh(width as f32, height as f32))
        .ok_or_else(|| anyhow::anyhow!("no usable render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("cannot allocate a {}x{} pixmap", size.width(), size.height()))?;
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .save_png(output)
        .map_err(|err| anyhow::anyhow!("{}: {err}", output.display()))
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &RenderConfig,
    _resources_dir: Option<&Path>,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

/// Escapes text and attribute values (gate names, destinations, image refs).
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
