use crate::config::{LayoutConfig, RenderConfig};
use crate::geometry::{ConnectionLayout, ConnectionPath, Emphasis, PathKind};
use crate::ir::Entity;
use crate::layout::normalize::{card_center_x, card_center_y, card_left, card_top};
use crate::text_metrics::fit_label;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const CARD_RADIUS: f32 = 12.0;
const LABEL_INSET: f32 = 12.0;
const MARRIAGE_DOT_RADIUS: f32 = 5.0;
const FILTERED_OPACITY: f32 = 0.2;

/// Draw a laid-out house: connection lines first, then cards on top.
pub fn render_svg(
    entities: &[Entity],
    connections: &[ConnectionLayout],
    theme: &Theme,
    layout: &LayoutConfig,
    render: &RenderConfig,
) -> String {
    let (min_x, min_y, max_x, max_y) = content_bounds(entities, connections, layout, render);
    let view_x = min_x - render.padding;
    let view_y = min_y - render.padding;
    let width = (max_x - min_x) + render.padding * 2.0;
    let height = (max_y - min_y) + render.padding * 2.0;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{view_x:.2} {view_y:.2} {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{view_x:.2}\" y=\"{view_y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\"/>",
        escape_xml(&render.background)
    ));

    for connection in connections {
        for path in &connection.paths {
            svg.push_str(&path_svg(path, connection.emphasis, theme));
        }
        if let Some((x, y)) = connection.marriage_node {
            svg.push_str(&format!(
                "<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{MARRIAGE_DOT_RADIUS}\" fill=\"{}\" opacity=\"{}\"/>",
                theme.line_color,
                opacity(connection.emphasis)
            ));
        }
    }

    for entity in entities {
        let dimmed = render.filter.is_dimmed(entity);
        if dimmed {
            svg.push_str(&format!("<g class=\"dimmed\" opacity=\"{FILTERED_OPACITY}\">"));
        }
        if entity.is_gap() {
            svg.push_str(&gap_svg(entity, theme, layout));
        } else {
            svg.push_str(&card_svg(entity, theme, layout));
        }
        if dimmed {
            svg.push_str("</g>");
        }
    }

    svg.push_str("</svg>");
    svg
}

fn content_bounds(
    entities: &[Entity],
    connections: &[ConnectionLayout],
    layout: &LayoutConfig,
    render: &RenderConfig,
) -> (f32, f32, f32, f32) {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for entity in entities {
        let left = card_left(entity, layout);
        let top = card_top(entity, layout);
        min_x = min_x.min(left);
        min_y = min_y.min(top);
        max_x = max_x.max(left + layout.card_width);
        max_y = max_y.max(top + layout.card_height);
    }
    let points = connections
        .iter()
        .flat_map(|c| c.paths.iter())
        .flat_map(|p| p.points.iter());
    for (x, y) in points {
        min_x = min_x.min(*x);
        min_y = min_y.min(*y);
        max_x = max_x.max(*x);
        max_y = max_y.max(*y);
    }
    if !min_x.is_finite() || !min_y.is_finite() {
        return (0.0, 0.0, render.width, render.height);
    }
    (min_x, min_y, max_x, max_y)
}

fn path_svg(path: &ConnectionPath, emphasis: Emphasis, theme: &Theme) -> String {
    let dash = if path.kind.is_partner() {
        Some("6,4")
    } else if path.dashed {
        Some("8,6")
    } else {
        None
    };
    let stroke_width = if dash.is_some() { 2.0 } else { 3.0 };
    let dash_attr = dash
        .map(|pattern| format!(" stroke-dasharray=\"{pattern}\""))
        .unwrap_or_default();
    let class = match path.kind {
        PathKind::Descent => "descent",
        _ => "partner",
    };
    format!(
        "<path class=\"{class}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{stroke_width}\" stroke-linecap=\"round\" stroke-linejoin=\"round\" opacity=\"{}\"{dash_attr}/>",
        path.d,
        theme.line_color,
        opacity(emphasis)
    )
}

fn opacity(emphasis: Emphasis) -> f32 {
    match emphasis {
        Emphasis::Highlighted => 1.0,
        Emphasis::Normal => 0.7,
        Emphasis::Dimmed => 0.15,
    }
}

fn card_svg(entity: &Entity, theme: &Theme, layout: &LayoutConfig) -> String {
    let x = card_left(entity, layout);
    let y = card_top(entity, layout);
    let mut svg = format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{CARD_RADIUS}\" ry=\"{CARD_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
        layout.card_width, layout.card_height, theme.card_fill, theme.card_border
    );

    let center_x = card_center_x(entity, layout);
    let max_width = (layout.card_width - LABEL_INSET * 2.0).max(0.0);
    let name = fit_label(entity.name(), max_width, theme.font_size, &theme.font_family);
    let name_y = y + layout.card_height - theme.font_size * 3.0;
    svg.push_str(&format!(
        "<text x=\"{center_x:.2}\" y=\"{name_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color,
        escape_xml(&name)
    ));

    if let Some(title) = entity.title() {
        let title_size = theme.font_size * 0.75;
        let title = fit_label(title, max_width, title_size, &theme.font_family);
        let title_y = name_y + theme.font_size * 1.4;
        svg.push_str(&format!(
            "<text x=\"{center_x:.2}\" y=\"{title_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{title_size}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.muted_text_color,
            escape_xml(&title)
        ));
    }
    svg
}

fn gap_svg(entity: &Entity, theme: &Theme, layout: &LayoutConfig) -> String {
    let cx = card_center_x(entity, layout);
    let cy = card_center_y(entity, layout);
    format!(
        "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"4,4\"/>",
        layout.gap_node_size / 2.0,
        theme.line_color
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, svg)?,
        None => print!("{svg}"),
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("failed to allocate a {}x{} pixmap", size.width(), size.height()))?;
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap.save_png(output)?;
    tracing::info!(path = %output.display(), width = size.width(), height = size.height(), "wrote png");
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
