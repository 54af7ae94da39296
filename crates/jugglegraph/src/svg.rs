//! SVG export of a computed layout.

use std::fmt::Write as _;

use jugglegraph_layout::{EdgeKind, LayoutResult, PositionedNode, RoutedEdge};

#[derive(Debug, Clone)]
pub struct SvgOptions {
    pub padding: f32,
    pub font_size: f32,
    pub stroke_width: f32,
    pub corner_radius: f32,
    pub background: &'static str,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            padding: 24.0,
            font_size: 14.0,
            stroke_width: 1.5,
            corner_radius: 6.0,
            background: "#ffffff",
        }
    }
}

struct NodeColors {
    fill: &'static str,
    stroke: &'static str,
    stroke_width_factor: f32,
}

fn node_colors(node: &PositionedNode) -> NodeColors {
    match (node.is_current, node.is_base) {
        (true, _) => NodeColors {
            fill: "#fef3c7",
            stroke: "#d97706",
            stroke_width_factor: 2.0,
        },
        (false, true) => NodeColors {
            fill: "#dbeafe",
            stroke: "#2563eb",
            stroke_width_factor: 2.0,
        },
        (false, false) => NodeColors {
            fill: "#f8fafc",
            stroke: "#64748b",
            stroke_width_factor: 1.0,
        },
    }
}

pub fn render_svg(layout: &LayoutResult, options: &SvgOptions) -> String {
    let bounds = layout.bounds;
    let min_x = bounds.min_x - options.padding;
    let min_y = bounds.min_y - options.padding;
    let width = bounds.width() + options.padding * 2.0;
    let height = bounds.height() + options.padding * 2.0;

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{min_x} {min_y} {width} {height}" width="{width}" height="{height}">"#
    );
    out.push_str(
        r##"  <defs>
    <marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse">
      <path d="M 0 0 L 10 5 L 0 10 z" fill="#94a3b8"/>
    </marker>
  </defs>
"##,
    );
    let _ = writeln!(
        out,
        r#"  <rect x="{min_x}" y="{min_y}" width="{width}" height="{height}" fill="{}"/>"#,
        options.background
    );

    for edge in &layout.edges {
        write_edge(&mut out, edge, options);
    }
    for node in &layout.nodes {
        write_node(&mut out, node, options);
    }

    out.push_str("</svg>\n");
    out
}

fn write_edge(out: &mut String, edge: &RoutedEdge, options: &SvgOptions) {
    let class = match edge.path.kind {
        EdgeKind::Forward => "edge forward",
        EdgeKind::Back => "edge back",
    };
    let _ = writeln!(
        out,
        r##"  <path id="{}" class="{class}" d="{}" fill="none" stroke="#94a3b8" stroke-width="{}" marker-end="url(#arrow)"/>"##,
        escape(&edge.id),
        edge.path.to_svg_path(),
        options.stroke_width
    );
    if let Some(label) = &edge.path.label {
        // Back-edge labels sit right of the detour; forward labels are centred
        // on the curve.
        let anchor = match edge.path.kind {
            EdgeKind::Forward => "middle",
            EdgeKind::Back => "start",
        };
        let _ = writeln!(
            out,
            r##"  <text x="{}" y="{}" text-anchor="{anchor}" dominant-baseline="middle" font-family="monospace" font-size="{}" fill="#475569" stroke="{}" stroke-width="3" paint-order="stroke">{}</text>"##,
            label.anchor.x,
            label.anchor.y,
            options.font_size * 0.9,
            options.background,
            escape(&label.text)
        );
    }
}

fn write_node(out: &mut String, node: &PositionedNode, options: &SvgOptions) {
    let colors = node_colors(node);
    let center = node.center();
    let _ = writeln!(out, r#"  <g class="node" data-state="{}">"#, node.state);
    let _ = writeln!(
        out,
        r#"    <rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
        node.x,
        node.y,
        node.width,
        node.height,
        colors.fill,
        colors.stroke,
        options.stroke_width * colors.stroke_width_factor,
        r = options.corner_radius
    );
    let _ = writeln!(
        out,
        r##"    <text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-family="monospace" font-size="{}" fill="#0f172a">{}</text>"##,
        center.x,
        center.y,
        options.font_size,
        escape(&node.id)
    );
    out.push_str("  </g>\n");
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
