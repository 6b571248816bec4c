//! Marshaling work onto the context that owns a UI element.
//!
//! A [`Dispatcher`] is the capability to run a closure "where it belongs".
//! Code that mutates UI state from an arbitrary thread or async task (for
//! example, toggling a busy indicator from a timer task) goes through a
//! dispatcher instead of assuming it already runs on the UI thread.
//!
//! Three strategies are provided:
//!
//! - [`DirectDispatcher`]: run inline on the calling thread.
//! - [`QueuedDispatcher`]: always post to an [`InvocationQueue`].
//! - [`AffinityDispatcher`]: run inline on the owning thread, post otherwise.

use std::sync::Arc;

use crate::invocation::{InvocationQueue, QueuedInvocation};
use crate::logging::targets;

/// Runs closures on the execution context that owns some UI state.
pub trait Dispatcher: Send + Sync {
    /// Run `task` on the owning context, now or later.
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>);
}

impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        (**self).dispatch(task)
    }
}

/// Runs every closure immediately on the calling thread.
///
/// Suitable when the UI element is itself thread-safe, or in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectDispatcher;

impl Dispatcher for DirectDispatcher {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}

/// Posts every closure to an [`InvocationQueue`].
///
/// Closures run when the owning thread calls
/// [`InvocationQueue::process_pending`].
#[derive(Debug, Clone)]
pub struct QueuedDispatcher {
    queue: InvocationQueue,
}

impl QueuedDispatcher {
    /// Create a dispatcher that posts to `queue`.
    pub fn new(queue: InvocationQueue) -> Self {
        Self { queue }
    }

    /// The queue this dispatcher posts to.
    pub fn queue(&self) -> &InvocationQueue {
        &self.queue
    }
}

impl Dispatcher for QueuedDispatcher {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        self.queue.post(QueuedInvocation::from_boxed(task));
    }
}

/// Runs closures inline on the queue's owning thread, posts them otherwise.
///
/// This is the usual choice for UI code: calls made from the event loop take
/// effect immediately, while calls from background tasks are marshaled.
#[derive(Debug, Clone)]
pub struct AffinityDispatcher {
    queue: InvocationQueue,
}

impl AffinityDispatcher {
    /// Create a dispatcher bound to the owner of `queue`.
    pub fn new(queue: InvocationQueue) -> Self {
        Self { queue }
    }

    /// The queue used for calls from foreign threads.
    pub fn queue(&self) -> &InvocationQueue {
        &self.queue
    }
}

impl Dispatcher for AffinityDispatcher {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        if self.queue.is_owner_thread() {
            task();
        } else {
            tracing::trace!(target: targets::DISPATCH, "marshaling call to owning thread");
            self.queue.post(QueuedInvocation::from_boxed(task));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> Box<dyn FnOnce() + Send> {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_direct_runs_inline() {
        let counter = Arc::new(AtomicUsize::new(0));
        DirectDispatcher.dispatch(counting_task(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_queued_defers_until_processed() {
        let queue = InvocationQueue::new();
        let dispatcher = QueuedDispatcher::new(queue.clone());
        let counter = Arc::new(AtomicUsize::new(0));

        dispatcher.dispatch(counting_task(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        queue.process_pending();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_affinity_inline_on_owner() {
        let dispatcher = AffinityDispatcher::new(InvocationQueue::new());
        let counter = Arc::new(AtomicUsize::new(0));

        dispatcher.dispatch(counting_task(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.queue().pending_count(), 0);
    }

    #[test]
    fn test_affinity_queues_from_foreign_thread() {
        let queue = InvocationQueue::new();
        let dispatcher = Arc::new(AffinityDispatcher::new(queue.clone()));
        let counter = Arc::new(AtomicUsize::new(0));

        let remote = dispatcher.clone();
        let task = counting_task(&counter);
        std::thread::spawn(move || remote.dispatch(task))
            .join()
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(queue.pending_count(), 1);
        queue.process_pending();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_arc_dyn_dispatcher() {
        let dispatcher: Arc<dyn Dispatcher> = Arc::new(DirectDispatcher);
        let counter = Arc::new(AtomicUsize::new(0));
        dispatcher.dispatch(counting_task(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
