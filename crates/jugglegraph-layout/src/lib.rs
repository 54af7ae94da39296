mod job;
mod layered;
mod pipeline;
mod route;

pub use job::{Bounds, LayoutInput, LayoutResult, PositionedNode, RoutedEdge, compute_layout};
pub use layered::{LayeredGraph, LayeredLayout, LayeredNode, SugiyamaLayout};
pub use pipeline::{
    LayoutDispatch, LayoutJob, LayoutPipeline, LayoutView, RequestId, Subscription, WorkerDispatch,
};
pub use route::{
    BACK_EDGE_BASE_OFFSET, BACK_EDGE_LABEL_GAP, BACK_EDGE_OFFSET_PER_UNIT, EdgeKind, EdgeLabel,
    EdgePath, PathSegment, Point, back_edge_offset, route_edge,
};

#[derive(Debug, Clone)]
pub struct LayoutStyle {
    pub min_width: f32,
    pub min_height: f32,
    pub char_width: f32,
    pub char_height: f32,
    pub node_padding_x: f32,
    pub node_padding_y: f32,
    pub node_gap: f32,
    pub layer_gap: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            min_width: 120.0,
            min_height: 40.0,
            char_width: 7.0,
            char_height: 14.0,
            node_padding_x: 12.0,
            node_padding_y: 8.0,
            node_gap: 50.0,
            layer_gap: 50.0,
        }
    }
}

impl LayoutStyle {
    pub fn node_size(&self, label: &str) -> (f32, f32) {
        let width = (label.chars().count() as f32 * self.char_width + self.node_padding_x * 2.0)
            .max(self.min_width);
        let height = (self.char_height + self.node_padding_y * 2.0).max(self.min_height);
        (width, height)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("failed to spawn layout worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
