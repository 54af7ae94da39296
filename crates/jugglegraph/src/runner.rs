//! Applies build tokens against the engine and keeps the session's layout
//! requested.
//!
//! Layout runs on the pipeline's worker thread. Waiting for it happens on
//! tokio's blocking pool so async callers never park a runtime thread.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use jugglegraph_engine::EngineClient;
use jugglegraph_layout::{
    LayoutInput, LayoutPipeline, LayoutResult, LayoutStyle, LayoutView, RequestId,
};
use jugglegraph_state::LabelFlags;
use tracing::debug;

use crate::session::{BuildSession, BuildToken};

pub const LAYOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// A layout pipeline together with the one view that reads it.
pub struct LayoutRunner {
    pipeline: LayoutPipeline,
    view: Arc<LayoutView>,
}

impl LayoutRunner {
    pub fn spawn() -> Result<Self> {
        let pipeline = LayoutPipeline::spawn(LayoutStyle::default())?;
        let view = Arc::new(LayoutView::attach(&pipeline));
        Ok(Self { pipeline, view })
    }

    pub fn request(&self, input: LayoutInput) -> RequestId {
        self.view.request(&self.pipeline, &Arc::new(input))
    }

    pub fn requested_id(&self) -> Option<RequestId> {
        self.view.requested_id()
    }

    /// Waits for the layout of the latest request.
    pub async fn latest(&self, timeout: Duration) -> Result<Arc<LayoutResult>> {
        let view = Arc::clone(&self.view);
        tokio::task::spawn_blocking(move || view.wait(timeout))
            .await
            .context("layout wait was cancelled")?
            .ok_or_else(|| anyhow!("layout did not finish within {timeout:?}"))
    }
}

/// Applies one token to `session`. Returns whether the builder changed.
///
/// `Show` and `Quit` are left to the caller and change nothing here.
pub async fn apply_token(
    client: &EngineClient,
    session: &mut BuildSession,
    token: BuildToken,
    flags: LabelFlags,
) -> Result<bool> {
    match token {
        BuildToken::Throw(height) => {
            let throws = client
                .throws(session.current_state(), session.max_height())
                .await
                .context("failed to fetch throws")?;
            let destination = session.choose(height, &throws)?;
            debug!(
                height,
                destination = %session.label(destination, flags),
                "took throw"
            );
            Ok(true)
        }
        BuildToken::Undo => Ok(session.undo()),
        BuildToken::Reset => {
            session.reset();
            Ok(true)
        }
        BuildToken::Show | BuildToken::Quit => Ok(false),
    }
}

/// Applies `tokens` in order, stopping at the first `Quit`, and returns the
/// layout of the session as it ends up.
///
/// A new layout is requested after every change, so intermediate requests
/// may still be running when the last one is requested; only the last one is
/// returned.
pub async fn run_sequence(
    client: &EngineClient,
    session: &mut BuildSession,
    runner: &LayoutRunner,
    tokens: &[BuildToken],
    flags: LabelFlags,
) -> Result<Arc<LayoutResult>> {
    runner.request(session.layout_input(flags));
    for &token in tokens {
        if token == BuildToken::Quit {
            break;
        }
        if apply_token(client, session, token, flags).await? {
            runner.request(session.layout_input(flags));
        }
    }
    runner.latest(LAYOUT_TIMEOUT).await
}
