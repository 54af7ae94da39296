use std::collections::{HashMap, VecDeque};

use crate::LayoutStyle;
use crate::route::Point;

#[derive(Debug, Clone, PartialEq)]
pub struct LayeredNode {
    pub id: String,
    pub width: f32,
    pub height: f32,
}

/// Input to a layered layout: opaque node ids and directed edges between them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayeredGraph {
    pub nodes: Vec<LayeredNode>,
    pub edges: Vec<(String, String)>,
}

/// Places nodes in top-to-bottom layers.
///
/// Returns the centre of every node in `graph.nodes`, keyed by id. Edges whose
/// endpoints are unknown are ignored.
pub trait LayeredLayout: Send + Sync {
    fn place(&self, graph: &LayeredGraph) -> HashMap<String, Point>;
}

#[derive(Debug, Clone)]
pub struct SugiyamaLayout {
    pub style: LayoutStyle,
    pub crossing_passes: usize,
}

impl SugiyamaLayout {
    pub fn new(style: LayoutStyle) -> Self {
        Self {
            style,
            crossing_passes: 6,
        }
    }
}

impl Default for SugiyamaLayout {
    fn default() -> Self {
        Self::new(LayoutStyle::default())
    }
}

#[derive(Debug, Clone)]
struct WorkNode {
    width: f32,
    height: f32,
    layer: usize,
    order: usize,
    x: f32,
    y: f32,
}

#[derive(Debug, Clone)]
struct EdgeMeta {
    from: usize,
    to: usize,
    reversed: bool,
}

#[derive(Debug, Clone)]
struct UnitEdge {
    from: usize,
    to: usize,
}

impl LayeredLayout for SugiyamaLayout {
    fn place(&self, graph: &LayeredGraph) -> HashMap<String, Point> {
        let mut nodes = Vec::with_capacity(graph.nodes.len());
        let mut node_index = HashMap::new();
        for node in &graph.nodes {
            if node_index.contains_key(&node.id) {
                continue;
            }
            node_index.insert(node.id.clone(), nodes.len());
            nodes.push(WorkNode {
                width: node.width,
                height: node.height,
                layer: 0,
                order: 0,
                x: 0.0,
                y: 0.0,
            });
        }
        let real_count = nodes.len();

        let mut edges = Vec::new();
        for (from, to) in &graph.edges {
            let (Some(&from), Some(&to)) = (node_index.get(from), node_index.get(to)) else {
                continue;
            };
            // Self-loops do not constrain layering.
            if from == to {
                continue;
            }
            edges.push(EdgeMeta {
                from,
                to,
                reversed: false,
            });
        }

        make_acyclic(&mut edges, nodes.len());
        assign_layers(&mut nodes, &edges);
        let unit_edges = insert_dummy_nodes(&mut nodes, &edges);
        let mut layers = build_layers(&mut nodes);
        reduce_crossings(&mut nodes, &mut layers, &unit_edges, self.crossing_passes);
        assign_coordinates(&mut nodes, &layers, &self.style);

        let mut positions = HashMap::with_capacity(real_count);
        for (id, &idx) in &node_index {
            let node = &nodes[idx];
            positions.insert(id.clone(), Point::new(node.x, node.y));
        }
        positions
    }
}

fn make_acyclic(edges: &mut [EdgeMeta], node_count: usize) {
    let mut adjacency = vec![Vec::new(); node_count];
    for (idx, edge) in edges.iter().enumerate() {
        adjacency[edge.from].push(idx);
    }

    // 0 = unvisited, 1 = on the DFS stack, 2 = finished
    let mut state = vec![0u8; node_count];
    for root in 0..node_count {
        if state[root] != 0 {
            continue;
        }
        state[root] = 1;
        let mut stack = vec![(root, 0usize)];
        while let Some((node, cursor)) = stack.last_mut() {
            let node = *node;
            if let Some(&edge_idx) = adjacency[node].get(*cursor) {
                *cursor += 1;
                let to = edges[edge_idx].to;
                match state[to] {
                    0 => {
                        state[to] = 1;
                        stack.push((to, 0));
                    }
                    1 => edges[edge_idx].reversed = true,
                    _ => {}
                }
            } else {
                state[node] = 2;
                stack.pop();
            }
        }
    }

    for edge in edges.iter_mut() {
        if edge.reversed {
            std::mem::swap(&mut edge.from, &mut edge.to);
        }
    }
}

fn assign_layers(nodes: &mut [WorkNode], edges: &[EdgeMeta]) {
    let node_count = nodes.len();
    let mut indegree = vec![0usize; node_count];
    let mut outgoing = vec![Vec::new(); node_count];

    for edge in edges {
        outgoing[edge.from].push(edge.to);
        indegree[edge.to] += 1;
    }

    let mut queue: VecDeque<usize> = (0..node_count).filter(|&i| indegree[i] == 0).collect();

    let mut order = Vec::with_capacity(node_count);
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &next in &outgoing[node] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    for &node in &order {
        let current = nodes[node].layer;
        for &next in &outgoing[node] {
            nodes[next].layer = nodes[next].layer.max(current + 1);
        }
    }
}

fn insert_dummy_nodes(nodes: &mut Vec<WorkNode>, edges: &[EdgeMeta]) -> Vec<UnitEdge> {
    let mut unit_edges = Vec::new();

    for edge in edges {
        let from_layer = nodes[edge.from].layer;
        let to_layer = nodes[edge.to].layer;
        if to_layer <= from_layer + 1 {
            unit_edges.push(UnitEdge {
                from: edge.from,
                to: edge.to,
            });
            continue;
        }

        let mut prev = edge.from;
        for layer in (from_layer + 1)..to_layer {
            let dummy_idx = nodes.len();
            nodes.push(WorkNode {
                width: 1.0,
                height: 1.0,
                layer,
                order: 0,
                x: 0.0,
                y: 0.0,
            });
            unit_edges.push(UnitEdge {
                from: prev,
                to: dummy_idx,
            });
            prev = dummy_idx;
        }
        unit_edges.push(UnitEdge {
            from: prev,
            to: edge.to,
        });
    }

    unit_edges
}

fn build_layers(nodes: &mut [WorkNode]) -> Vec<Vec<usize>> {
    let max_layer = nodes.iter().map(|node| node.layer).max().unwrap_or(0);
    let mut layers = vec![Vec::new(); max_layer + 1];
    for (idx, node) in nodes.iter().enumerate() {
        layers[node.layer].push(idx);
    }
    for layer in &mut layers {
        for (order, &node_idx) in layer.iter().enumerate() {
            nodes[node_idx].order = order;
        }
    }
    layers
}

fn reduce_crossings(
    nodes: &mut [WorkNode],
    layers: &mut [Vec<usize>],
    unit_edges: &[UnitEdge],
    passes: usize,
) {
    let mut down_neighbors = vec![Vec::new(); nodes.len()];
    let mut up_neighbors = vec![Vec::new(); nodes.len()];
    for edge in unit_edges {
        if nodes[edge.to].layer == nodes[edge.from].layer + 1 {
            down_neighbors[edge.from].push(edge.to);
            up_neighbors[edge.to].push(edge.from);
        }
    }

    for pass in 0..passes {
        if pass % 2 == 0 {
            for layer in 1..layers.len() {
                reorder_layer(nodes, layers, layer, &up_neighbors);
            }
        } else {
            for layer in (0..layers.len().saturating_sub(1)).rev() {
                reorder_layer(nodes, layers, layer, &down_neighbors);
            }
        }
    }
}

/// Barycenter ordering; neighbours are read through their current `order`.
fn reorder_layer(
    nodes: &mut [WorkNode],
    layers: &mut [Vec<usize>],
    layer_index: usize,
    neighbor_lists: &[Vec<usize>],
) {
    let mut scored: Vec<(usize, f32)> = layers[layer_index]
        .iter()
        .map(|&node_idx| {
            let neighbors = &neighbor_lists[node_idx];
            if neighbors.is_empty() {
                return (node_idx, nodes[node_idx].order as f32);
            }
            let sum: usize = neighbors.iter().map(|&n| nodes[n].order).sum();
            (node_idx, sum as f32 / neighbors.len() as f32)
        })
        .collect();

    scored.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| nodes[a.0].order.cmp(&nodes[b.0].order))
    });

    layers[layer_index] = scored.iter().map(|(idx, _)| *idx).collect();
    for (order, &node_idx) in layers[layer_index].iter().enumerate() {
        nodes[node_idx].order = order;
    }
}

/// Rows top to bottom, each row centred on the widest one.
fn assign_coordinates(nodes: &mut [WorkNode], layers: &[Vec<usize>], style: &LayoutStyle) {
    let row_width = |layer: &Vec<usize>| -> f32 {
        let total: f32 = layer.iter().map(|&idx| nodes[idx].width).sum();
        total + style.node_gap * layer.len().saturating_sub(1) as f32
    };
    let widths: Vec<f32> = layers.iter().map(row_width).collect();
    let widest = widths.iter().copied().fold(0.0f32, f32::max);

    let mut y = 0.0f32;
    for (layer, width) in layers.iter().zip(widths) {
        let layer_height = layer
            .iter()
            .map(|&idx| nodes[idx].height)
            .fold(0.0f32, f32::max);
        let mut x = (widest - width) / 2.0;
        for &node_idx in layer {
            let node = &mut nodes[node_idx];
            node.x = x + node.width / 2.0;
            node.y = y + layer_height / 2.0;
            x += node.width + style.node_gap;
        }
        y += layer_height + style.layer_gap;
    }
}
