use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{BuilderState, JugglingState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: JugglingState,
    pub to: JugglingState,
    pub throw_height: u32,
}

/// Normalized state graph, in the same shape the engine's compact graph
/// endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<JugglingState>,
    pub edges: Vec<GraphEdge>,
    pub ground_state: JugglingState,
    pub num_nodes: usize,
    pub num_edges: usize,
    pub max_height: u32,
    pub num_props: u32,
}

impl GraphDocument {
    /// Derives the graph walked so far by a builder.
    ///
    /// Nodes are the visited states, ground first and then in order of first
    /// visit. A transition taken more than once yields a single edge.
    pub fn from_builder(state: &BuilderState, max_height: u32, num_props: u32) -> Self {
        let mut nodes = vec![state.ground_state()];
        let mut seen_nodes = HashSet::from([state.ground_state()]);
        for step in state.steps() {
            if seen_nodes.insert(step.destination) {
                nodes.push(step.destination);
            }
        }

        let mut seen_edges = HashSet::new();
        let edges: Vec<GraphEdge> = state
            .steps()
            .iter()
            .map(|step| GraphEdge {
                from: step.origin,
                to: step.destination,
                throw_height: step.throw_height,
            })
            .filter(|edge| seen_edges.insert(*edge))
            .collect();

        Self {
            num_nodes: nodes.len(),
            num_edges: edges.len(),
            nodes,
            edges,
            ground_state: state.ground_state(),
            max_height,
            num_props,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
