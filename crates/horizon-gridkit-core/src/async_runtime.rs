//! Async runtime integration for Horizon GridKit.
//!
//! This module provides Tokio integration for spawning cancellable async tasks
//! and delivering their results back to a UI context through a
//! [`Dispatcher`](crate::Dispatcher).
//!
//! # Feature Flag
//!
//! This module requires the `tokio` feature to be enabled:
//!
//! ```toml
//! [dependencies]
//! horizon-gridkit-core = { version = "1.0", features = ["tokio"] }
//! ```
//!
//! # Example: Spawning a Cancellable Task
//!
//! ```no_run
//! use horizon_gridkit_core::async_runtime::AsyncRuntime;
//! use std::time::Duration;
//!
//! let runtime = AsyncRuntime::try_global().expect("runtime");
//!
//! let (handle, token) = runtime.spawner().spawn_cancellable(|token| async move {
//!     tokio::select! {
//!         _ = token.cancelled() => None,
//!         _ = tokio::time::sleep(Duration::from_millis(250)) => Some("loaded"),
//!     }
//! });
//!
//! token.cancel();
//! assert_eq!(handle.blocking_wait(), Some(None));
//! ```
//!
//! # Runtime Types
//!
//! - **Multi-threaded** (default): Tokio's multi-threaded scheduler.
//! - **Single-threaded**: a current-thread runtime driven by one dedicated
//!   thread, giving cooperative, deterministic task ordering.
//!
//! Code already running inside a Tokio runtime can use
//! [`AsyncSpawner::current`] instead of creating a runtime.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::oneshot;

use crate::dispatch::Dispatcher;
pub use crate::error::AsyncRuntimeError;
use crate::logging::targets;

/// Global async runtime instance.
static GLOBAL_RUNTIME: OnceLock<AsyncRuntime> = OnceLock::new();

/// Counter for unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// The type of async runtime to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeType {
    /// Multi-threaded runtime using Tokio's default scheduler.
    #[default]
    MultiThreaded,

    /// Single-threaded runtime on a dedicated thread.
    ///
    /// All async tasks run on a single dedicated thread. This matches the
    /// cooperative model of a UI event sequence.
    SingleThreaded,
}

/// Configuration for the async runtime.
#[derive(Debug, Clone)]
pub struct AsyncRuntimeConfig {
    /// The type of runtime to create.
    pub runtime_type: RuntimeType,
    /// Number of worker threads for multi-threaded runtime.
    /// Defaults to the number of CPU cores.
    pub worker_threads: Option<usize>,
    /// Name prefix for runtime threads.
    pub thread_name: String,
}

impl Default for AsyncRuntimeConfig {
    fn default() -> Self {
        Self {
            runtime_type: RuntimeType::MultiThreaded,
            worker_threads: None,
            thread_name: "gridkit-async".to_string(),
        }
    }
}

impl AsyncRuntimeConfig {
    /// Create a configuration for a multi-threaded runtime.
    pub fn multi_threaded() -> Self {
        Self {
            runtime_type: RuntimeType::MultiThreaded,
            ..Default::default()
        }
    }

    /// Create a configuration for a single-threaded runtime.
    pub fn single_threaded() -> Self {
        Self {
            runtime_type: RuntimeType::SingleThreaded,
            ..Default::default()
        }
    }

    /// Set the number of worker threads (multi-threaded runtime only).
    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count);
        self
    }

    /// Set the thread name prefix.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// A handle to a spawned async task.
///
/// Provides methods to wait for the task result, check completion status,
/// and cancel the task cooperatively.
#[derive(Debug)]
pub struct AsyncTaskHandle<T> {
    id: u64,
    receiver: oneshot::Receiver<T>,
    finished: Arc<AtomicBool>,
    cancellation: Option<AsyncCancellationToken>,
}

impl<T> AsyncTaskHandle<T> {
    /// Get the unique task ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Check whether the task has run to completion (or panicked).
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Cancel the task if it has a cancellation token.
    ///
    /// The task must cooperatively check for cancellation.
    pub fn cancel(&self) {
        if let Some(ref token) = self.cancellation {
            token.cancel();
        }
    }

    /// Wait for the task to complete, blocking the current thread.
    ///
    /// Returns `None` if the task panicked or its runtime shut down.
    ///
    /// # Warning
    ///
    /// Do not call this from within an async context or the UI thread
    /// event loop, as it will block and potentially cause deadlocks.
    pub fn blocking_wait(self) -> Option<T> {
        self.receiver.blocking_recv().ok()
    }

    /// Await the task result.
    pub async fn wait(self) -> Option<T> {
        self.receiver.await.ok()
    }
}

/// A cancellation token for async tasks.
///
/// Cloning the token shares the cancellation state. Supports both polling
/// ([`is_cancelled`](Self::is_cancelled)) and async waiting
/// ([`cancelled`](Self::cancelled)).
#[derive(Debug, Clone)]
pub struct AsyncCancellationToken {
    inner: Arc<AsyncCancellationState>,
}

#[derive(Debug)]
struct AsyncCancellationState {
    cancelled: AtomicBool,
    notify: tokio::sync::Notify,
}

impl AsyncCancellationToken {
    /// Create a new cancellation token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AsyncCancellationState {
                cancelled: AtomicBool::new(false),
                notify: tokio::sync::Notify::new(),
            }),
        }
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation.
    ///
    /// Sets the cancellation flag and wakes any waiters. Cancelling an
    /// already-cancelled token is a no-op.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Wait asynchronously until cancellation is requested.
    ///
    /// Returns immediately if already cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel() cannot be missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for AsyncCancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the active task count when a task ends, even by panic.
struct ActiveTaskGuard {
    active_tasks: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
}

impl Drop for ActiveTaskGuard {
    fn drop(&mut self) {
        self.finished.store(true, Ordering::Release);
        self.active_tasks.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A cloneable capability to spawn tasks on a Tokio runtime.
///
/// Obtain one from an [`AsyncRuntime`], from an existing Tokio [`Handle`], or
/// from the ambient runtime with [`AsyncSpawner::current`].
#[derive(Clone)]
pub struct AsyncSpawner {
    handle: Handle,
    active_tasks: Arc<AtomicU64>,
}

impl AsyncSpawner {
    /// Wrap an existing Tokio runtime handle.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            active_tasks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Spawner for the Tokio runtime the caller is running in, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::from_handle)
    }

    /// Get the underlying Tokio handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Get the number of tasks spawned through this spawner still running.
    pub fn active_tasks(&self) -> u64 {
        self.active_tasks.load(Ordering::Acquire)
    }

    fn track(&self) -> (u64, ActiveTaskGuard, Arc<AtomicBool>) {
        let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        let finished = Arc::new(AtomicBool::new(false));
        self.active_tasks.fetch_add(1, Ordering::AcqRel);
        let guard = ActiveTaskGuard {
            active_tasks: self.active_tasks.clone(),
            finished: finished.clone(),
        };
        (id, guard, finished)
    }

    /// Spawn an async task.
    ///
    /// Returns a handle that can be used to wait for the result.
    pub fn spawn<F, T>(&self, future: F) -> AsyncTaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (id, guard, finished) = self.track();
        let (sender, receiver) = oneshot::channel();

        self.handle.spawn(async move {
            let _guard = guard;
            let result = future.await;
            let _ = sender.send(result);
        });

        tracing::trace!(target: targets::RUNTIME, task_id = id, "task spawned");
        AsyncTaskHandle {
            id,
            receiver,
            finished,
            cancellation: None,
        }
    }

    /// Spawn an async task with a cancellation token.
    ///
    /// The task receives a clone of the token and should check
    /// `token.is_cancelled()` periodically or await `token.cancelled()`.
    pub fn spawn_cancellable<F, Fut, T>(&self, f: F) -> (AsyncTaskHandle<T>, AsyncCancellationToken)
    where
        F: FnOnce(AsyncCancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let token = AsyncCancellationToken::new();
        let token_for_task = token.clone();

        let (id, guard, finished) = self.track();
        let (sender, receiver) = oneshot::channel();

        self.handle.spawn(async move {
            let _guard = guard;
            let result = f(token_for_task).await;
            let _ = sender.send(result);
        });

        tracing::trace!(target: targets::RUNTIME, task_id = id, "cancellable task spawned");
        let handle = AsyncTaskHandle {
            id,
            receiver,
            finished,
            cancellation: Some(token.clone()),
        };

        (handle, token)
    }

    /// Spawn an async task and deliver its result through a dispatcher.
    ///
    /// The callback runs wherever `dispatcher` places it, typically the UI
    /// thread.
    pub fn spawn_with_dispatch<F, T, C>(&self, future: F, dispatcher: Arc<dyn Dispatcher>, callback: C)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let (_, guard, _) = self.track();

        self.handle.spawn(async move {
            let _guard = guard;
            let result = future.await;
            dispatcher.dispatch(Box::new(move || callback(result)));
        });
    }
}

impl std::fmt::Debug for AsyncSpawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSpawner")
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}

/// Internal state for the single-threaded runtime.
struct SingleThreadedState {
    /// Handle to the runtime thread.
    thread_handle: Mutex<Option<JoinHandle<()>>>,
    /// Shutdown signal sender.
    shutdown_tx: oneshot::Sender<()>,
}

/// The async runtime manager.
pub struct AsyncRuntime {
    /// The underlying Tokio runtime (for multi-threaded mode).
    /// Kept alive to prevent the runtime from shutting down.
    #[allow(dead_code)]
    runtime: Option<Runtime>,
    /// Spawn capability shared by all callers.
    spawner: AsyncSpawner,
    /// State for single-threaded runtime.
    single_threaded: Option<SingleThreadedState>,
    /// The runtime type.
    runtime_type: RuntimeType,
}

impl AsyncRuntime {
    /// Get the global async runtime, creating it with default settings on
    /// first use.
    pub fn try_global() -> Result<&'static AsyncRuntime, AsyncRuntimeError> {
        if let Some(runtime) = GLOBAL_RUNTIME.get() {
            return Ok(runtime);
        }
        let runtime = AsyncRuntime::new(AsyncRuntimeConfig::default())?;
        // Losing an initialization race is fine; the winner is returned.
        let _ = GLOBAL_RUNTIME.set(runtime);
        GLOBAL_RUNTIME
            .get()
            .ok_or_else(|| AsyncRuntimeError::CreationFailed("global runtime unavailable".to_string()))
    }

    /// Create a new async runtime with the given configuration.
    pub fn new(config: AsyncRuntimeConfig) -> Result<Self, AsyncRuntimeError> {
        tracing::debug!(target: targets::RUNTIME, runtime_type = ?config.runtime_type, "creating async runtime");
        match config.runtime_type {
            RuntimeType::MultiThreaded => Self::new_multi_threaded(config),
            RuntimeType::SingleThreaded => Self::new_single_threaded(config),
        }
    }

    fn new_multi_threaded(config: AsyncRuntimeConfig) -> Result<Self, AsyncRuntimeError> {
        let mut builder = Builder::new_multi_thread();
        builder.thread_name(&config.thread_name).enable_time();

        if let Some(workers) = config.worker_threads {
            builder.worker_threads(workers);
        }

        let runtime = builder
            .build()
            .map_err(|e| AsyncRuntimeError::CreationFailed(e.to_string()))?;

        let spawner = AsyncSpawner::from_handle(runtime.handle().clone());

        Ok(Self {
            runtime: Some(runtime),
            spawner,
            single_threaded: None,
            runtime_type: RuntimeType::MultiThreaded,
        })
    }

    fn new_single_threaded(config: AsyncRuntimeConfig) -> Result<Self, AsyncRuntimeError> {
        let (handle_tx, handle_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread_handle = std::thread::Builder::new()
            .name(format!("{}-main", config.thread_name))
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_time().build() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = handle_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = handle_tx.send(Ok(runtime.handle().clone()));

                // Drive spawned tasks until shutdown is signaled.
                runtime.block_on(async {
                    let _ = shutdown_rx.await;
                });
            })
            .map_err(|e| AsyncRuntimeError::CreationFailed(e.to_string()))?;

        let handle = handle_rx
            .recv()
            .map_err(|_| AsyncRuntimeError::CreationFailed("Failed to get runtime handle".to_string()))?
            .map_err(AsyncRuntimeError::CreationFailed)?;

        Ok(Self {
            runtime: None,
            spawner: AsyncSpawner::from_handle(handle),
            single_threaded: Some(SingleThreadedState {
                thread_handle: Mutex::new(Some(thread_handle)),
                shutdown_tx,
            }),
            runtime_type: RuntimeType::SingleThreaded,
        })
    }

    /// Get the runtime type.
    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }

    /// Get the number of active tasks.
    pub fn active_tasks(&self) -> u64 {
        self.spawner.active_tasks()
    }

    /// Get a spawner for this runtime.
    pub fn spawner(&self) -> AsyncSpawner {
        self.spawner.clone()
    }

    /// Get a handle to the Tokio runtime.
    pub fn handle(&self) -> &Handle {
        self.spawner.handle()
    }

    /// Spawn an async task on the runtime.
    pub fn spawn<F, T>(&self, future: F) -> AsyncTaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.spawner.spawn(future)
    }

    /// Block on a future, running it to completion.
    ///
    /// # Warning
    ///
    /// Do not call this from the UI event loop or from within an async
    /// context. Use it for startup, background threads and tests.
    pub fn block_on<F, T>(&self, future: F) -> T
    where
        F: Future<Output = T>,
    {
        self.spawner.handle().block_on(future)
    }

    /// Shutdown the runtime gracefully.
    ///
    /// For single-threaded runtimes, this stops the runtime thread.
    /// For multi-threaded runtimes, the thread pool shuts down on drop.
    pub fn shutdown(mut self) {
        if let Some(state) = self.single_threaded.take() {
            let _ = state.shutdown_tx.send(());
            if let Some(handle) = state.thread_handle.lock().take() {
                let _ = handle.join();
            }
        }
        tracing::debug!(target: targets::RUNTIME, "async runtime shut down");
    }
}

impl std::fmt::Debug for AsyncRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRuntime")
            .field("runtime_type", &self.runtime_type)
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}
