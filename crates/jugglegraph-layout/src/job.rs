use std::collections::HashMap;

use jugglegraph_state::{GraphDocument, JugglingState, LabelFlags};
use serde::Serialize;

use crate::LayoutStyle;
use crate::layered::{LayeredGraph, LayeredLayout, LayeredNode};
use crate::pipeline::RequestId;
use crate::route::{EdgePath, Point, route_edge};

/// A graph document together with the flags it should be drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutInput {
    pub document: GraphDocument,
    pub flags: LabelFlags,
    /// State to flag as the builder's current position, if any.
    pub current: Option<JugglingState>,
}

impl LayoutInput {
    pub fn new(document: GraphDocument, flags: LabelFlags) -> Self {
        Self {
            document,
            flags,
            current: None,
        }
    }

    #[must_use]
    pub fn with_current(mut self, current: JugglingState) -> Self {
        self.current = Some(current);
        self
    }

    fn label(&self, state: JugglingState) -> String {
        self.flags.label(state, self.document.max_height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    /// Expanded label, unique within a result.
    pub id: String,
    pub state: JugglingState,
    /// Top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub is_base: bool,
    pub is_current: bool,
}

impl PositionedNode {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn bottom_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height)
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedEdge {
    /// `e-{source}-{target}-{throw_height}`, stable across layouts of the
    /// same document.
    pub id: String,
    pub source: String,
    pub target: String,
    pub throw_height: u32,
    pub path: EdgePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(0.0)
    }

    fn include(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub request_id: RequestId,
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<RoutedEdge>,
    /// Extent of nodes and edge paths, including back-edge detours.
    pub bounds: Bounds,
}

impl LayoutResult {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_for_state(&self, state: JugglingState) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.state == state)
    }

    pub fn base_node(&self) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.is_base)
    }
}

/// Runs one layout: expands labels, places nodes, routes edges.
pub fn compute_layout(
    request_id: RequestId,
    input: &LayoutInput,
    layout: &dyn LayeredLayout,
    style: &LayoutStyle,
) -> LayoutResult {
    let document = &input.document;

    let mut labels: Vec<(String, JugglingState)> = Vec::with_capacity(document.nodes.len());
    let mut label_of: HashMap<JugglingState, String> = HashMap::new();
    for &state in &document.nodes {
        if label_of.contains_key(&state) {
            continue;
        }
        let label = input.label(state);
        label_of.insert(state, label.clone());
        labels.push((label, state));
    }

    let edge_labels: Vec<(String, String, u32)> = document
        .edges
        .iter()
        .filter_map(|edge| {
            let from = label_of.get(&edge.from)?;
            let to = label_of.get(&edge.to)?;
            Some((from.clone(), to.clone(), edge.throw_height))
        })
        .collect();

    let graph = LayeredGraph {
        nodes: labels
            .iter()
            .map(|(label, _)| {
                let (width, height) = style.node_size(label);
                LayeredNode {
                    id: label.clone(),
                    width,
                    height,
                }
            })
            .collect(),
        edges: edge_labels
            .iter()
            .map(|(from, to, _)| (from.clone(), to.clone()))
            .collect(),
    };
    let centers = layout.place(&graph);

    let base_label = input.label(document.ground_state);
    let nodes: Vec<PositionedNode> = labels
        .into_iter()
        .zip(&graph.nodes)
        .map(|((label, state), sized)| {
            let center = centers.get(&label).copied().unwrap_or(Point::new(0.0, 0.0));
            PositionedNode {
                is_base: label == base_label,
                is_current: input.current == Some(state),
                x: center.x - sized.width / 2.0,
                y: center.y - sized.height / 2.0,
                width: sized.width,
                height: sized.height,
                id: label,
                state,
            }
        })
        .collect();

    let by_id: HashMap<&str, &PositionedNode> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let edges: Vec<RoutedEdge> = edge_labels
        .into_iter()
        .filter_map(|(source, target, throw_height)| {
            let from = by_id.get(source.as_str())?;
            let to = by_id.get(target.as_str())?;
            let text = throw_height.to_string();
            let path = route_edge(from.bottom_center(), to.top_center(), Some(&text));
            Some(RoutedEdge {
                id: format!("e-{source}-{target}-{throw_height}"),
                source,
                target,
                throw_height,
                path,
            })
        })
        .collect();

    let bounds = compute_bounds(&nodes, &edges);
    LayoutResult {
        request_id,
        nodes,
        edges,
        bounds,
    }
}

fn compute_bounds(nodes: &[PositionedNode], edges: &[RoutedEdge]) -> Bounds {
    let mut points = nodes
        .iter()
        .flat_map(|node| {
            [
                Point::new(node.x, node.y),
                Point::new(node.x + node.width, node.y + node.height),
            ]
        })
        .chain(edges.iter().flat_map(|edge| {
            let label = edge.path.label.as_ref().map(|label| label.anchor);
            edge.path.hull_points().chain(label)
        }));

    let Some(first) = points.next() else {
        return Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        };
    };
    let mut bounds = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for point in points {
        bounds.include(point);
    }
    bounds
}
