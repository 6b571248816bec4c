//! Debounced reactions to a grid's focused-row changes.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use horizon_gridkit_core::logging::{span_names, targets};
use horizon_gridkit_core::{
    AsyncCancellationToken, AsyncRuntime, AsyncSpawner, AsyncTaskHandle, ConnectionId, DirectDispatcher, Dispatcher,
    Signal,
};
use parking_lot::Mutex;
use tracing::Instrument;

use super::config::{DebounceConfig, clamp_delay_ms};
use crate::busy::{BusyGuard, BusyIndicator, BusyState};
use crate::error::{BoxError, ReactionError, Result};
use crate::grid::GridView;
use crate::model::RowData;

type Projection<T> = Arc<dyn Fn(&RowData) -> Option<T> + Send + Sync>;
type Reaction<T> = Arc<dyn Fn(T) -> BoxFuture<'static, std::result::Result<(), BoxError>> + Send + Sync>;

/// How a scheduled reaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionOutcome {
    /// The callback ran and returned `Ok`.
    Completed,
    /// No row was available after the delay, or the projection declined it.
    Skipped,
    /// A newer notification or disposal superseded the reaction before its callback started.
    Cancelled,
    /// The callback returned an error or panicked.
    Failed,
}

struct PendingReaction {
    generation: u64,
    handle: AsyncTaskHandle<()>,
}

struct DebouncerInner<T> {
    source: Arc<dyn GridView>,
    projection: Projection<T>,
    on_selected: Reaction<T>,
    delay: Mutex<Duration>,
    enabled: AtomicBool,
    disposed: AtomicBool,
    pending: Mutex<Option<PendingReaction>>,
    next_generation: AtomicU64,
    busy: Arc<BusyState>,
    spawner: AsyncSpawner,
    reaction_failed: Signal<ReactionError>,
    reaction_finished: Signal<ReactionOutcome>,
}

impl<T: Send + 'static> DebouncerInner<T> {
    fn notify(self: &Arc<Self>) -> bool {
        if !self.enabled.load(Ordering::Acquire) || self.disposed.load(Ordering::Acquire) {
            tracing::trace!(target: targets::DEBOUNCE, "notification ignored: debouncer inactive");
            return false;
        }
        let focused = self.source.focused_row_handle();
        if !focused.is_valid() {
            tracing::trace!(target: targets::DEBOUNCE, "notification ignored: no focused row");
            return false;
        }
        let delay = *self.delay.lock();

        // Indicator code may call back into the debouncer; it never runs under `pending`.
        let busy = self.busy.acquire();
        let mut pending = self.pending.lock();
        // Disposal may have run between the check above and taking the lock.
        if self.disposed.load(Ordering::Acquire) {
            drop(pending);
            drop(busy);
            return false;
        }
        if let Some(previous) = pending.take() {
            previous.handle.cancel();
            tracing::trace!(target: targets::DEBOUNCE, generation = previous.generation, "pending reaction superseded");
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let inner = self.clone();
        let (handle, _token) = self
            .spawner
            .spawn_cancellable(move |token| inner.run_reaction(generation, delay, token, busy));
        *pending = Some(PendingReaction { generation, handle });

        tracing::trace!(
            target: targets::DEBOUNCE,
            generation,
            row = focused.value(),
            ?delay,
            "reaction scheduled"
        );
        true
    }

    async fn run_reaction(self: Arc<Self>, generation: u64, delay: Duration, token: AsyncCancellationToken, busy: BusyGuard) {
        let span = tracing::debug_span!(target: targets::DEBOUNCE, span_names::REACTION, generation);
        let outcome = self.react(delay, &token).instrument(span).await;

        {
            let mut pending = self.pending.lock();
            if pending.as_ref().is_some_and(|p| p.generation == generation) {
                *pending = None;
            }
        }
        drop(busy);

        tracing::trace!(target: targets::DEBOUNCE, generation, ?outcome, "reaction finished");
        self.reaction_finished.emit(outcome);
    }

    async fn react(&self, delay: Duration, token: &AsyncCancellationToken) -> ReactionOutcome {
        tokio::select! {
            biased;
            _ = token.cancelled() => return ReactionOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => {}
        }
        if token.is_cancelled() {
            return ReactionOutcome::Cancelled;
        }

        let reaction = async {
            let Some(row) = self.source.focused_row() else {
                return Ok(false);
            };
            let Some(value) = (self.projection)(&row) else {
                return Ok(false);
            };
            (self.on_selected)(value).await.map(|()| true)
        };

        let error = match AssertUnwindSafe(reaction).catch_unwind().await {
            Ok(Ok(true)) => return ReactionOutcome::Completed,
            Ok(Ok(false)) => return ReactionOutcome::Skipped,
            Ok(Err(error)) => ReactionError::callback(error),
            Err(payload) => ReactionError::panicked(payload.as_ref()),
        };
        tracing::warn!(target: targets::DEBOUNCE, %error, "row reaction failed");
        self.reaction_failed.emit(error);
        ReactionOutcome::Failed
    }
}

impl<T> DebouncerInner<T> {
    fn cancel_pending(&self) -> bool {
        match self.pending.lock().take() {
            Some(pending) => {
                pending.handle.cancel();
                true
            }
            None => false,
        }
    }
}

/// Coalesces a grid's focused-row changes into one delayed reaction.
///
/// Every focus change cancels the reaction scheduled by the previous one and
/// schedules a new one. When a reaction survives its delay, the focused row
/// is fetched, passed through the projection and, unless the projection
/// returns `None`, handed to the callback. A busy indicator, if configured,
/// stays visible from scheduling until the last outstanding reaction ends.
///
/// Dropping the debouncer disconnects it from the grid and cancels the
/// pending reaction. A callback that has already started is never interrupted.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use horizon_gridkit::{GridDebouncer, GridView, TableGrid, RowData};
///
/// # async fn run() -> horizon_gridkit::Result<()> {
/// let grid: Arc<dyn GridView> = Arc::new(TableGrid::with_rows(vec![RowData::new(42_u32)]));
///
/// let debouncer = GridDebouncer::builder(
///     grid.clone(),
///     |row| row.downcast_ref::<u32>().copied(),
///     |customer_id| async move {
///         println!("loading customer {customer_id}");
///         Ok::<_, std::io::Error>(())
///     },
/// )
/// .delay_ms(300)
/// .build()?;
///
/// grid.set_focused_row_handle(0.into());
/// # drop(debouncer);
/// # Ok(())
/// # }
/// ```
pub struct GridDebouncer<T> {
    inner: Arc<DebouncerInner<T>>,
    connection: Mutex<Option<ConnectionId>>,
}

impl<T: Send + 'static> GridDebouncer<T> {
    /// Creates a debouncer with an explicit delay and optional busy indicator.
    ///
    /// Negative delays are treated as zero. Reactions run on the ambient
    /// Tokio runtime, or on the global [`AsyncRuntime`] outside one.
    pub fn new<P, F, Fut, E>(
        source: Arc<dyn GridView>,
        projection: P,
        on_selected: F,
        delay_ms: i64,
        busy_indicator: Option<Arc<dyn BusyIndicator>>,
    ) -> Result<Self>
    where
        P: Fn(&RowData) -> Option<T> + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let mut builder = Self::builder(source, projection, on_selected).delay_ms(delay_ms);
        if let Some(indicator) = busy_indicator {
            builder = builder.busy_indicator(indicator);
        }
        builder.build()
    }

    /// Starts building a debouncer with default settings.
    pub fn builder<P, F, Fut, E>(source: Arc<dyn GridView>, projection: P, on_selected: F) -> GridDebouncerBuilder<T>
    where
        P: Fn(&RowData) -> Option<T> + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let on_selected: Reaction<T> = Arc::new(move |value| {
            let future = on_selected(value);
            async move { future.await.map_err(Into::into) }.boxed()
        });
        GridDebouncerBuilder {
            source,
            projection: Arc::new(projection),
            on_selected,
            config: DebounceConfig::default(),
            busy_indicator: None,
            dispatcher: None,
            spawner: None,
        }
    }

    /// Reacts to a focus change as if the grid had just signalled one.
    ///
    /// Returns `true` if a reaction was scheduled.
    pub fn notify(&self) -> bool {
        self.inner.notify()
    }

    /// Alias of [`notify`](Self::notify), named after the event it handles.
    pub fn on_selection_changed(&self) -> bool {
        self.notify()
    }
}

impl<T> GridDebouncer<T> {
    /// Whether focus changes are acted on.
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Turns reactions on or off. A reaction already scheduled is unaffected.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Release);
    }

    /// The debounce window used for the next reaction.
    pub fn delay(&self) -> Duration {
        *self.inner.delay.lock()
    }

    /// Changes the debounce window. Applies from the next notification.
    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.lock() = delay;
    }

    /// Changes the debounce window in milliseconds; negatives mean zero.
    pub fn set_delay_ms(&self, delay_ms: i64) {
        self.set_delay(clamp_delay_ms(delay_ms));
    }

    /// Whether a reaction is scheduled or running.
    pub fn is_pending(&self) -> bool {
        self.inner
            .pending
            .lock()
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Emitted when a callback returns an error or panics.
    pub fn reaction_failed(&self) -> &Signal<ReactionError> {
        &self.inner.reaction_failed
    }

    /// Emitted once per scheduled reaction, after its busy hold is released.
    pub fn reaction_finished(&self) -> &Signal<ReactionOutcome> {
        &self.inner.reaction_finished
    }

    /// Disconnects from the grid and cancels the pending reaction.
    ///
    /// Safe to call more than once. Also runs on drop.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(id) = self.connection.lock().take() {
            self.inner.source.focused_row_changed().disconnect(id);
        }
        let cancelled = self.inner.cancel_pending();
        tracing::debug!(target: targets::DEBOUNCE, cancelled, "debouncer disposed");
    }
}

impl<T> Drop for GridDebouncer<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T> std::fmt::Debug for GridDebouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridDebouncer")
            .field("enabled", &self.is_enabled())
            .field("delay", &self.delay())
            .field("pending", &self.is_pending())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Builder for [`GridDebouncer`].
pub struct GridDebouncerBuilder<T> {
    source: Arc<dyn GridView>,
    projection: Projection<T>,
    on_selected: Reaction<T>,
    config: DebounceConfig,
    busy_indicator: Option<Arc<dyn BusyIndicator>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    spawner: Option<AsyncSpawner>,
}

impl<T: Send + 'static> GridDebouncerBuilder<T> {
    /// Sets the debounce window.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_delay(delay);
        self
    }

    /// Sets the debounce window in milliseconds; negatives mean zero.
    pub fn delay_ms(mut self, delay_ms: i64) -> Self {
        self.config = self.config.with_delay_ms(delay_ms);
        self
    }

    /// Sets whether the debouncer starts enabled.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config = self.config.with_enabled(enabled);
        self
    }

    /// Replaces delay and enabled state with `config`.
    pub fn config(mut self, config: DebounceConfig) -> Self {
        self.config = config;
        self
    }

    /// Shows `indicator` while reactions are outstanding.
    pub fn busy_indicator(mut self, indicator: Arc<dyn BusyIndicator>) -> Self {
        self.busy_indicator = Some(indicator);
        self
    }

    /// Routes busy-indicator updates through `dispatcher`.
    ///
    /// Defaults to [`DirectDispatcher`]. Use an
    /// [`AffinityDispatcher`](horizon_gridkit_core::AffinityDispatcher) when
    /// the indicator must only be touched from the UI thread.
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Runs reactions through `spawner` instead of the ambient runtime.
    pub fn spawner(mut self, spawner: AsyncSpawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Creates the debouncer and connects it to the grid's focus signal.
    ///
    /// Fails only when no spawner was given, the caller is outside a Tokio
    /// runtime, and the global runtime cannot be created.
    pub fn build(self) -> Result<GridDebouncer<T>> {
        let spawner = match self.spawner.or_else(AsyncSpawner::current) {
            Some(spawner) => spawner,
            None => AsyncRuntime::try_global()?.spawner(),
        };
        let dispatcher = self.dispatcher.unwrap_or_else(|| Arc::new(DirectDispatcher));

        let inner = Arc::new(DebouncerInner {
            source: self.source,
            projection: self.projection,
            on_selected: self.on_selected,
            delay: Mutex::new(self.config.delay()),
            enabled: AtomicBool::new(self.config.enabled),
            disposed: AtomicBool::new(false),
            pending: Mutex::new(None),
            next_generation: AtomicU64::new(0),
            busy: Arc::new(BusyState::new(self.busy_indicator, dispatcher)),
            spawner,
            reaction_failed: Signal::new(),
            reaction_finished: Signal::new(),
        });

        let weak: Weak<DebouncerInner<T>> = Arc::downgrade(&inner);
        let connection = inner.source.focused_row_changed().connect(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.notify();
            }
        });

        tracing::debug!(
            target: targets::DEBOUNCE,
            delay = ?self.config.delay(),
            enabled = self.config.enabled,
            "debouncer created"
        );
        Ok(GridDebouncer {
            inner,
            connection: Mutex::new(Some(connection)),
        })
    }
}

static_assertions::assert_impl_all!(GridDebouncer<String>: Send, Sync);
