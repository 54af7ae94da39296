use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::JugglingState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuilderStep {
    pub origin: JugglingState,
    pub throw_height: u32,
    pub destination: JugglingState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderAction {
    ChooseThrow {
        throw_height: u32,
        destination: JugglingState,
    },
    Undo,
    Reset { ground_state: JugglingState },
}

/// How a step relates to the states visited before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopKind {
    None,
    Loop,
    GroundLoop,
}

impl LoopKind {
    pub fn is_loop(self) -> bool {
        !matches!(self, LoopKind::None)
    }
}

/// An immutable snapshot of a pattern under construction.
///
/// Every transition goes through [`BuilderState::apply`], which returns a new
/// snapshot and leaves `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderState {
    ground_state: JugglingState,
    current_state: JugglingState,
    steps: Vec<BuilderStep>,
    visited_states: BTreeSet<JugglingState>,
}

impl BuilderState {
    pub fn new(ground_state: JugglingState) -> Self {
        Self {
            ground_state,
            current_state: ground_state,
            steps: Vec::new(),
            visited_states: BTreeSet::from([ground_state]),
        }
    }

    pub fn ground_state(&self) -> JugglingState {
        self.ground_state
    }

    pub fn current_state(&self) -> JugglingState {
        self.current_state
    }

    pub fn steps(&self) -> &[BuilderStep] {
        &self.steps
    }

    pub fn visited_states(&self) -> &BTreeSet<JugglingState> {
        &self.visited_states
    }

    pub fn can_undo(&self) -> bool {
        !self.steps.is_empty()
    }

    #[must_use]
    pub fn apply(&self, action: BuilderAction) -> Self {
        match action {
            BuilderAction::ChooseThrow {
                throw_height,
                destination,
            } => self.choose_throw(throw_height, destination),
            BuilderAction::Undo => self.undo(),
            BuilderAction::Reset { ground_state } => Self::new(ground_state),
        }
    }

    fn choose_throw(&self, throw_height: u32, destination: JugglingState) -> Self {
        let mut steps = self.steps.clone();
        steps.push(BuilderStep {
            origin: self.current_state,
            throw_height,
            destination,
        });
        let mut visited_states = self.visited_states.clone();
        visited_states.insert(destination);
        Self {
            ground_state: self.ground_state,
            current_state: destination,
            steps,
            visited_states,
        }
    }

    fn undo(&self) -> Self {
        let Some((_, remaining)) = self.steps.split_last() else {
            return self.clone();
        };
        let current_state = remaining
            .last()
            .map_or(self.ground_state, |step| step.destination);
        // Rebuilt from scratch: the removed step may have been the only visit
        // to its destination.
        let visited_states = std::iter::once(self.ground_state)
            .chain(remaining.iter().map(|step| step.destination))
            .collect();
        Self {
            ground_state: self.ground_state,
            current_state,
            steps: remaining.to_vec(),
            visited_states,
        }
    }

    /// Throw heights of the path so far, separated by single spaces.
    pub fn siteswap(&self) -> String {
        self.steps
            .iter()
            .map(|step| step.throw_height.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// One entry per step: whether its destination had already been visited
    /// by the ground state or an earlier step.
    pub fn loop_annotations(&self) -> Vec<LoopKind> {
        let mut seen = BTreeSet::from([self.ground_state]);
        let mut annotations = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            annotations.push(self.classify(&seen, step.destination));
            seen.insert(step.destination);
        }
        annotations
    }

    /// Marker for a candidate throw landing in `destination` from the
    /// current state.
    pub fn classify_candidate(&self, destination: JugglingState) -> LoopKind {
        self.classify(&self.visited_states, destination)
    }

    fn classify(&self, seen: &BTreeSet<JugglingState>, destination: JugglingState) -> LoopKind {
        if !seen.contains(&destination) {
            LoopKind::None
        } else if destination == self.ground_state {
            LoopKind::GroundLoop
        } else {
            LoopKind::Loop
        }
    }
}
