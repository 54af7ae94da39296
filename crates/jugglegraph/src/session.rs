//! Builder session driven by text tokens.
//!
//! A session owns the current [`BuilderState`] and applies tokens such as
//! `3`, `u` or `r` to it. Throw destinations are never computed here: the
//! caller supplies the engine's [`ThrowsResponse`] for the current state.

use std::fmt::Write as _;

use anyhow::{Context, Result, bail};
use jugglegraph_engine::ThrowsResponse;
use jugglegraph_layout::LayoutInput;
use jugglegraph_state::{
    BuilderAction, BuilderState, GraphDocument, JugglingState, LabelFlags, LoopKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildToken {
    Throw(u32),
    Undo,
    Reset,
    Show,
    Quit,
}

impl BuildToken {
    pub fn parse(token: &str) -> Result<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "u" | "undo" => Ok(Self::Undo),
            "r" | "reset" => Ok(Self::Reset),
            "s" | "show" => Ok(Self::Show),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => other.parse().map(Self::Throw).with_context(|| {
                format!("unknown token `{other}`; expected a throw height, u, r, show or q")
            }),
        }
    }
}

/// Splits a whitespace- or comma-separated token list.
pub fn parse_sequence(sequence: &str) -> Result<Vec<BuildToken>> {
    sequence
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|token| !token.is_empty())
        .map(BuildToken::parse)
        .collect()
}

#[derive(Debug, Clone)]
pub struct BuildSession {
    builder: BuilderState,
    max_height: u32,
    num_props: u32,
}

impl BuildSession {
    pub fn new(num_props: u32, max_height: u32) -> Result<Self> {
        let ground = JugglingState::ground_checked(num_props, max_height)?;
        Ok(Self {
            builder: BuilderState::new(ground),
            max_height,
            num_props,
        })
    }

    pub fn builder(&self) -> &BuilderState {
        &self.builder
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    pub fn current_state(&self) -> JugglingState {
        self.builder.current_state()
    }

    /// Takes the throw of `height` listed in `throws`, which must describe
    /// the current state.
    pub fn choose(&mut self, height: u32, throws: &ThrowsResponse) -> Result<JugglingState> {
        if throws.state != self.current_state() {
            bail!(
                "throws were listed for state {} but the builder is at {}",
                throws.state,
                self.current_state()
            );
        }
        let Some(destination) = throws.destination_for(height) else {
            let available: Vec<String> = throws
                .throws
                .iter()
                .map(|option| option.height.to_string())
                .collect();
            bail!(
                "throw {height} is not available from {}; available: {}",
                self.label(self.current_state(), LabelFlags::PLAIN),
                available.join(" ")
            );
        };
        self.apply(BuilderAction::ChooseThrow {
            throw_height: height,
            destination,
        });
        Ok(destination)
    }

    pub fn undo(&mut self) -> bool {
        if !self.builder.can_undo() {
            return false;
        }
        self.apply(BuilderAction::Undo);
        true
    }

    pub fn reset(&mut self) {
        let ground_state = self.builder.ground_state();
        self.apply(BuilderAction::Reset { ground_state });
    }

    fn apply(&mut self, action: BuilderAction) {
        tracing::debug!(?action, "builder action");
        self.builder = self.builder.apply(action);
    }

    pub fn document(&self) -> GraphDocument {
        GraphDocument::from_builder(&self.builder, self.max_height, self.num_props)
    }

    pub fn layout_input(&self, flags: LabelFlags) -> LayoutInput {
        LayoutInput::new(self.document(), flags).with_current(self.current_state())
    }

    pub fn label(&self, state: JugglingState, flags: LabelFlags) -> String {
        flags.label(state, self.max_height)
    }

    /// Step list with loop markers followed by the siteswap.
    pub fn describe(&self, flags: LabelFlags) -> String {
        let mut out = String::new();
        let steps = self.builder.steps();
        if steps.is_empty() {
            out.push_str("(no throws yet)\n");
        }
        for (index, (step, kind)) in steps
            .iter()
            .zip(self.builder.loop_annotations())
            .enumerate()
        {
            let _ = writeln!(
                out,
                "{:>3}. {} --{}--> {}{}",
                index + 1,
                self.label(step.origin, flags),
                step.throw_height,
                self.label(step.destination, flags),
                loop_marker(kind)
            );
        }
        let _ = writeln!(out, "siteswap: {}", self.builder.siteswap());
        out
    }

    /// Candidate throws from the current state with their loop markers.
    pub fn describe_candidates(&self, throws: &ThrowsResponse, flags: LabelFlags) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "at {}; throws:",
            self.label(self.current_state(), flags)
        );
        for option in &throws.throws {
            let kind = self.builder.classify_candidate(option.destination);
            let _ = writeln!(
                out,
                "  {:>2} -> {}{}",
                option.height,
                self.label(option.destination, flags),
                loop_marker(kind)
            );
        }
        out
    }
}

pub fn loop_marker(kind: LoopKind) -> &'static str {
    match kind {
        LoopKind::None => "",
        LoopKind::Loop => "  (loop)",
        LoopKind::GroundLoop => "  (ground loop)",
    }
}
