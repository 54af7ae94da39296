//! Edge paths between laid-out nodes.
//!
//! Edges leave the bottom centre of their source and enter the top centre of
//! their target. An edge whose source sits below its target is a back edge
//! and is drawn as a detour around the right-hand side so it does not run
//! through the nodes between its endpoints.

use std::fmt::Write as _;

use serde::Serialize;

/// Horizontal clearance of a back edge with no vertical span.
pub const BACK_EDGE_BASE_OFFSET: f32 = 60.0;
/// Extra clearance per unit of vertical span.
pub const BACK_EDGE_OFFSET_PER_UNIT: f32 = 0.3;
/// Distance between the detour's rightmost point and its label.
pub const BACK_EDGE_LABEL_GAP: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind {
    Forward,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PathSegment {
    MoveTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLabel {
    pub text: String,
    pub anchor: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePath {
    pub kind: EdgeKind,
    pub segments: Vec<PathSegment>,
    pub label: Option<EdgeLabel>,
}

/// Clearance used by the back-edge detour for the given endpoints.
pub fn back_edge_offset(source: Point, target: Point) -> f32 {
    BACK_EDGE_BASE_OFFSET + (source.y - target.y).abs() * BACK_EDGE_OFFSET_PER_UNIT
}

/// Routes an edge from `source` (bottom centre of the source node) to
/// `target` (top centre of the target node).
///
/// The edge is a back edge exactly when `source.y > target.y`. This is a
/// purely geometric test on the computed layout.
pub fn route_edge(source: Point, target: Point, label: Option<&str>) -> EdgePath {
    if source.y > target.y {
        route_back_edge(source, target, label)
    } else {
        route_forward_edge(source, target, label)
    }
}

fn route_forward_edge(source: Point, target: Point, label: Option<&str>) -> EdgePath {
    let bend = (target.y - source.y) * 0.5;
    let c1 = Point::new(source.x, source.y + bend);
    let c2 = Point::new(target.x, target.y - bend);
    let mid = Point::new((source.x + target.x) / 2.0, (source.y + target.y) / 2.0);
    EdgePath {
        kind: EdgeKind::Forward,
        segments: vec![
            PathSegment::MoveTo(source),
            PathSegment::CubicTo { c1, c2, to: target },
        ],
        label: label.map(|text| EdgeLabel {
            text: text.to_string(),
            anchor: mid,
        }),
    }
}

fn route_back_edge(source: Point, target: Point, label: Option<&str>) -> EdgePath {
    let offset = back_edge_offset(source, target);
    let right_x = source.x.max(target.x) + offset;
    let mid_y = (source.y + target.y) / 2.0;
    let apex = Point::new(right_x, mid_y);
    EdgePath {
        kind: EdgeKind::Back,
        segments: vec![
            PathSegment::MoveTo(source),
            PathSegment::CubicTo {
                c1: Point::new(source.x, source.y + offset),
                c2: Point::new(right_x, source.y),
                to: apex,
            },
            PathSegment::CubicTo {
                c1: Point::new(right_x, target.y),
                c2: Point::new(target.x, target.y - offset),
                to: target,
            },
        ],
        label: label.map(|text| EdgeLabel {
            text: text.to_string(),
            anchor: Point::new(right_x + BACK_EDGE_LABEL_GAP, mid_y),
        }),
    }
}

impl EdgePath {
    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|segment| segment.end())
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|segment| segment.end())
    }

    /// SVG path data (`M x y C ...`).
    pub fn to_svg_path(&self) -> String {
        let mut data = String::new();
        for segment in &self.segments {
            if !data.is_empty() {
                data.push(' ');
            }
            // Writing to a String cannot fail.
            let _ = match segment {
                PathSegment::MoveTo(p) => write!(data, "M {} {}", p.x, p.y),
                PathSegment::CubicTo { c1, c2, to } => write!(
                    data,
                    "C {} {}, {} {}, {} {}",
                    c1.x, c1.y, c2.x, c2.y, to.x, to.y
                ),
            };
        }
        data
    }

    /// Approximates the path as a polyline with `steps` points per curve.
    pub fn flatten(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        let mut points = Vec::new();
        let mut cursor: Option<Point> = None;
        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(p) => {
                    points.push(p);
                    cursor = Some(p);
                }
                PathSegment::CubicTo { c1, c2, to } => {
                    let from = cursor.unwrap_or(c1);
                    for i in 1..=steps {
                        let t = i as f32 / steps as f32;
                        points.push(cubic_point(from, c1, c2, to, t));
                    }
                    cursor = Some(to);
                }
            }
        }
        points
    }

    /// Every point the path's geometry depends on, control points included.
    /// The curve stays inside their convex hull.
    pub fn hull_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.segments.iter().flat_map(|segment| match *segment {
            PathSegment::MoveTo(p) => vec![p],
            PathSegment::CubicTo { c1, c2, to } => vec![c1, c2, to],
        })
    }
}

impl PathSegment {
    pub fn end(&self) -> Point {
        match *self {
            PathSegment::MoveTo(p) => p,
            PathSegment::CubicTo { to, .. } => to,
        }
    }
}

fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}
