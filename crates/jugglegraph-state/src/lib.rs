mod builder;
mod graph;
mod state;

pub use builder::{BuilderAction, BuilderState, BuilderStep, LoopKind};
pub use graph::{GraphDocument, GraphEdge};
pub use state::{
    JugglingState, LabelFlags, MAX_SUPPORTED_HEIGHT, to_abbreviated_label, to_binary_label,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("max_height {max_height} exceeds the supported maximum of {MAX_SUPPORTED_HEIGHT}")]
    HeightTooLarge { max_height: u32 },
    #[error("state {bits:#b} has bits set at or above max_height {max_height}")]
    BitsOutOfRange { bits: u64, max_height: u32 },
    #[error("num_props {num_props} exceeds max_height {max_height}")]
    TooManyProps { num_props: u32, max_height: u32 },
}
