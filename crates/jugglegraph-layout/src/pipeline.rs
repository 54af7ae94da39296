//! Background layout with latest-request-wins presentation.
//!
//! [`LayoutPipeline::request_layout`] tags every new input with a fresh
//! [`RequestId`] and hands the work to a [`LayoutDispatch`]. Completed results
//! are published as the pipeline's current result in whatever order they
//! finish, without any ordering check. Readers filter staleness themselves by
//! comparing the result's id with the id their own last request returned;
//! [`LayoutPipeline::result_for`], [`LayoutPipeline::wait_for`] and
//! [`LayoutView`] do exactly that. In-flight work is never cancelled.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak, mpsc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::job::{LayoutInput, LayoutResult, compute_layout};
use crate::layered::{LayeredLayout, SugiyamaLayout};
use crate::{LayoutError, LayoutStyle};

pub type RequestId = u64;

type Listener = Arc<dyn Fn(&Arc<LayoutResult>) + Send + Sync>;

/// Results for ids newer than a view's own request that it keeps around in
/// case its request turns out to be one of them.
const VIEW_EARLY_RESULTS: usize = 16;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct PipelineState {
    last_input: Option<Arc<LayoutInput>>,
    request_id: RequestId,
    current: Option<Arc<LayoutResult>>,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<PipelineState>,
    listeners: Mutex<Listeners>,
}

impl Shared {
    fn publish(&self, result: LayoutResult) {
        let result = Arc::new(result);
        lock(&self.state).current = Some(Arc::clone(&result));
        debug!(request_id = result.request_id, "published layout");

        // Listeners run without any pipeline lock held so they may call back
        // into the pipeline.
        let listeners: Vec<Listener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&result);
        }
    }
}

/// A unit of layout work for one request.
pub struct LayoutJob {
    id: RequestId,
    input: Arc<LayoutInput>,
    shared: Arc<Shared>,
}

impl LayoutJob {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn input(&self) -> &LayoutInput {
        &self.input
    }

    /// Computes the layout and publishes it as the pipeline's current result.
    pub fn run(self, layout: &dyn LayeredLayout, style: &LayoutStyle) {
        let result = compute_layout(self.id, &self.input, layout, style);
        self.shared.publish(result);
    }
}

/// Where layout jobs go to be executed.
///
/// Implementations must not run the job on the calling thread before
/// returning from `dispatch`.
pub trait LayoutDispatch: Send + Sync {
    fn dispatch(&self, job: LayoutJob);
}

/// Runs jobs one at a time on a dedicated worker thread.
pub struct WorkerDispatch {
    sender: Option<mpsc::Sender<LayoutJob>>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerDispatch {
    pub fn spawn(layout: Box<dyn LayeredLayout>, style: LayoutStyle) -> Result<Self, LayoutError> {
        let (sender, receiver) = mpsc::channel::<LayoutJob>();
        let handle = thread::Builder::new()
            .name("layout-worker".to_string())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    trace!(request_id = job.id(), "layout worker picked up job");
                    job.run(layout.as_ref(), &style);
                }
                debug!("layout worker shutting down");
            })?;
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }
}

impl LayoutDispatch for WorkerDispatch {
    fn dispatch(&self, job: LayoutJob) {
        let id = job.id();
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(job).is_err() {
            warn!(request_id = id, "layout worker is gone; request dropped");
        }
    }
}

impl Drop for WorkerDispatch {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("layout worker panicked");
            }
        }
    }
}

/// Handle returned by [`LayoutPipeline::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            lock(&shared.listeners)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// One layout pipeline per session, shared by reference among its consumers.
pub struct LayoutPipeline {
    shared: Arc<Shared>,
    dispatcher: Box<dyn LayoutDispatch>,
}

impl LayoutPipeline {
    /// Starts a pipeline backed by a worker thread running [`SugiyamaLayout`].
    pub fn spawn(style: LayoutStyle) -> Result<Self, LayoutError> {
        let layout = SugiyamaLayout::new(style.clone());
        Self::spawn_with_layout(Box::new(layout), style)
    }

    pub fn spawn_with_layout(
        layout: Box<dyn LayeredLayout>,
        style: LayoutStyle,
    ) -> Result<Self, LayoutError> {
        let dispatcher = WorkerDispatch::spawn(layout, style)?;
        Ok(Self::with_dispatcher(Box::new(dispatcher)))
    }

    pub fn with_dispatcher(dispatcher: Box<dyn LayoutDispatch>) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            dispatcher,
        }
    }

    /// Asks for a layout of `input` and returns the id its result will carry.
    ///
    /// Passing the same `Arc` as the previous call is a no-op that returns the
    /// previous id; any other input, even an equal one, starts a new request.
    pub fn request_layout(&self, input: &Arc<LayoutInput>) -> RequestId {
        let id = {
            let mut state = lock(&self.shared.state);
            if let Some(last) = &state.last_input {
                if Arc::ptr_eq(last, input) {
                    trace!(request_id = state.request_id, "layout input unchanged");
                    return state.request_id;
                }
            }
            state.request_id += 1;
            state.last_input = Some(Arc::clone(input));
            state.request_id
        };

        debug!(
            request_id = id,
            nodes = input.document.nodes.len(),
            edges = input.document.edges.len(),
            "dispatching layout"
        );
        self.dispatcher.dispatch(LayoutJob {
            id,
            input: Arc::clone(input),
            shared: Arc::clone(&self.shared),
        });
        id
    }

    /// The id handed out by the most recent new request, 0 before any.
    pub fn latest_request_id(&self) -> RequestId {
        lock(&self.shared.state).request_id
    }

    /// The most recently published result, whichever request it belongs to.
    pub fn current_result(&self) -> Option<Arc<LayoutResult>> {
        lock(&self.shared.state).current.clone()
    }

    /// The current result, but only if it belongs to request `id`.
    pub fn result_for(&self, id: RequestId) -> Option<Arc<LayoutResult>> {
        self.current_result()
            .filter(|result| result.request_id == id)
    }

    /// Calls `listener` with every result published from now on.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<LayoutResult>) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.shared.listeners);
        listeners.next_id += 1;
        let id = listeners.next_id;
        listeners.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Blocks until the result for request `id` is published or `timeout`
    /// passes.
    pub fn wait_for(&self, id: RequestId, timeout: Duration) -> Option<Arc<LayoutResult>> {
        let slot = Arc::new((Mutex::new(None::<Arc<LayoutResult>>), Condvar::new()));
        let _subscription = {
            let slot = Arc::clone(&slot);
            self.subscribe(move |result| {
                if result.request_id == id {
                    *lock(&slot.0) = Some(Arc::clone(result));
                    slot.1.notify_all();
                }
            })
        };
        if let Some(result) = self.result_for(id) {
            return Some(result);
        }

        let (found, cvar) = &*slot;
        let guard = lock(found);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |found| found.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }
}

#[derive(Default)]
struct ViewState {
    requested: Option<RequestId>,
    accepted: Option<Arc<LayoutResult>>,
    early: Vec<Arc<LayoutResult>>,
}

/// A consumer of a [`LayoutPipeline`] that only ever shows the layout for its
/// own latest request.
///
/// Once the matching result has arrived it stays visible even if an older
/// request completes afterwards and overwrites the pipeline's current result.
pub struct LayoutView {
    state: Arc<(Mutex<ViewState>, Condvar)>,
    _subscription: Subscription,
}

impl LayoutView {
    pub fn attach(pipeline: &LayoutPipeline) -> Self {
        let state = Arc::new((Mutex::new(ViewState::default()), Condvar::new()));
        let subscription = {
            let state = Arc::clone(&state);
            pipeline.subscribe(move |result| {
                let (view, cvar) = &*state;
                let mut view = lock(view);
                match view.requested {
                    Some(requested) if result.request_id == requested => {
                        view.accepted = Some(Arc::clone(result));
                        cvar.notify_all();
                    }
                    Some(requested) if result.request_id < requested => {
                        trace!(
                            request_id = result.request_id,
                            requested,
                            "ignoring stale layout"
                        );
                    }
                    _ => {
                        view.early.push(Arc::clone(result));
                        if view.early.len() > VIEW_EARLY_RESULTS {
                            view.early.remove(0);
                        }
                    }
                }
            })
        };
        Self {
            state,
            _subscription: subscription,
        }
    }

    /// Requests a layout of `input` through `pipeline` and makes it the one
    /// this view waits for.
    pub fn request(&self, pipeline: &LayoutPipeline, input: &Arc<LayoutInput>) -> RequestId {
        let id = pipeline.request_layout(input);
        let (view, cvar) = &*self.state;
        let mut view = lock(view);
        view.requested = Some(id);
        let already_accepted = view
            .accepted
            .as_ref()
            .is_some_and(|result| result.request_id == id);
        if !already_accepted {
            let early = view
                .early
                .iter()
                .find(|result| result.request_id == id)
                .cloned();
            if let Some(result) = early.or_else(|| pipeline.result_for(id)) {
                view.accepted = Some(result);
                cvar.notify_all();
            }
        }
        view.early.retain(|result| result.request_id > id);
        id
    }

    pub fn requested_id(&self) -> Option<RequestId> {
        lock(&self.state.0).requested
    }

    /// The layout for the latest request, or `None` while it is pending.
    pub fn layout(&self) -> Option<Arc<LayoutResult>> {
        let view = lock(&self.state.0);
        let requested = view.requested?;
        view.accepted
            .clone()
            .filter(|result| result.request_id == requested)
    }

    /// Blocks until the latest request's layout is available or `timeout`
    /// passes.
    pub fn wait(&self, timeout: Duration) -> Option<Arc<LayoutResult>> {
        let (view, cvar) = &*self.state;
        let guard = lock(view);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |view| match view.requested {
                Some(requested) => view
                    .accepted
                    .as_ref()
                    .is_none_or(|result| result.request_id != requested),
                None => false,
            })
            .unwrap_or_else(PoisonError::into_inner);
        let requested = guard.requested?;
        guard
            .accepted
            .clone()
            .filter(|result| result.request_id == requested)
    }
}
