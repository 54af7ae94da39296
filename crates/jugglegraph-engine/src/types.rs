use jugglegraph_state::JugglingState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrowOption {
    pub height: u32,
    pub destination: JugglingState,
}

/// Throws available from one state, as listed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrowsResponse {
    pub throws: Vec<ThrowOption>,
    pub state: JugglingState,
    pub max_height: u32,
    pub num_throws: usize,
}

impl ThrowsResponse {
    pub fn destination_for(&self, height: u32) -> Option<JugglingState> {
        self.throws
            .iter()
            .find(|option| option.height == height)
            .map(|option| option.destination)
    }
}

/// State transition table: `cells[i][j]` is the throw taking `states[i]` to
/// `states[j]`, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableResponse {
    pub states: Vec<JugglingState>,
    pub cells: Vec<Vec<Option<u32>>>,
    pub ground_state: JugglingState,
    pub num_states: usize,
    pub max_height: u32,
    pub num_props: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub max_max_height: u32,
}
