//! Queued invocations for delivering work to an owning thread.
//!
//! UI toolkits usually require widget state to be mutated on the thread that
//! owns the widget. An [`InvocationQueue`] is created on that thread; any
//! thread may [`post`](InvocationQueue::post) closures to it, and the owning
//! thread runs them in FIFO order by calling
//! [`process_pending`](InvocationQueue::process_pending) from its event loop.
//!
//! # How It Works
//!
//! 1. Work that must run on the owning thread is wrapped in a
//!    [`QueuedInvocation`].
//! 2. The invocation is sent over an unbounded channel.
//! 3. The owning thread drains the channel and executes each invocation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::ThreadId;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::logging::targets;

/// Global invocation counter for unique IDs.
static NEXT_INVOCATION_ID: AtomicU64 = AtomicU64::new(1);

/// A type-erased queued invocation that can be executed later.
pub struct QueuedInvocation {
    id: u64,
    invoke: Box<dyn FnOnce() + Send>,
}

impl QueuedInvocation {
    /// Create a new queued invocation.
    pub fn new<F>(invoke: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id: NEXT_INVOCATION_ID.fetch_add(1, Ordering::Relaxed),
            invoke: Box::new(invoke),
        }
    }

    /// Create an invocation from an already boxed closure.
    pub fn from_boxed(invoke: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            id: NEXT_INVOCATION_ID.fetch_add(1, Ordering::Relaxed),
            invoke,
        }
    }

    /// The unique ID of this invocation.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Execute the invocation.
    pub fn execute(self) {
        (self.invoke)();
    }
}

impl std::fmt::Debug for QueuedInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedInvocation").field("id", &self.id).finish()
    }
}

/// A FIFO queue of invocations owned by one thread.
///
/// Cloning the queue yields another handle to the same channel; clones can be
/// moved to other threads to post work back to the owner.
#[derive(Clone)]
pub struct InvocationQueue {
    sender: Sender<QueuedInvocation>,
    receiver: Receiver<QueuedInvocation>,
    owner: ThreadId,
}

impl InvocationQueue {
    /// Create a queue owned by the current thread.
    pub fn new() -> Self {
        Self::for_thread(std::thread::current().id())
    }

    /// Create a queue owned by the given thread.
    pub fn for_thread(owner: ThreadId) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            owner,
        }
    }

    /// The thread expected to drain this queue.
    pub fn owner_thread(&self) -> ThreadId {
        self.owner
    }

    /// Check whether the current thread owns this queue.
    pub fn is_owner_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    /// Post an invocation. Returns its ID.
    pub fn post(&self, invocation: QueuedInvocation) -> u64 {
        let id = invocation.id();
        // Both channel ends live in `self`, so the channel cannot be disconnected here.
        let _ = self.sender.send(invocation);
        tracing::trace!(target: targets::DISPATCH, invocation_id = id, "invocation queued");
        id
    }

    /// Get the number of pending invocations.
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Execute every invocation queued so far.
    ///
    /// Invocations posted while draining (for instance by an invocation
    /// itself) are also executed. Returns the number executed.
    pub fn process_pending(&self) -> usize {
        if !self.is_owner_thread() {
            crate::gridkit_warn!(
                owner = ?self.owner,
                "invocation queue drained from a thread other than its owner"
            );
        }

        let mut executed = 0;
        while let Ok(invocation) = self.receiver.try_recv() {
            tracing::trace!(target: targets::DISPATCH, invocation_id = invocation.id(), "executing invocation");
            invocation.execute();
            executed += 1;
        }
        executed
    }

    /// Drop all pending invocations without running them.
    pub fn clear(&self) -> usize {
        self.receiver.try_iter().count()
    }
}

impl Default for InvocationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InvocationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationQueue")
            .field("owner", &self.owner)
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use parking_lot::Mutex;

    #[test]
    fn test_post_and_process() {
        let queue = InvocationQueue::new();
        let executed = Arc::new(AtomicBool::new(false));

        let executed_clone = executed.clone();
        queue.post(QueuedInvocation::new(move || {
            executed_clone.store(true, Ordering::SeqCst);
        }));
        assert_eq!(queue.pending_count(), 1);
        assert!(!executed.load(Ordering::SeqCst));

        assert_eq!(queue.process_pending(), 1);
        assert_eq!(queue.pending_count(), 0);
        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_fifo_order() {
        let queue = InvocationQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let order = order.clone();
            queue.post(QueuedInvocation::new(move || order.lock().push(i)));
        }

        queue.process_pending();
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_post_from_other_thread() {
        let queue = InvocationQueue::new();
        let ran_on = Arc::new(Mutex::new(None));

        let remote = queue.clone();
        let ran_on_clone = ran_on.clone();
        std::thread::spawn(move || {
            remote.post(QueuedInvocation::new(move || {
                *ran_on_clone.lock() = Some(std::thread::current().id());
            }));
        })
        .join()
        .unwrap();

        assert!(ran_on.lock().is_none());
        queue.process_pending();
        assert_eq!(*ran_on.lock(), Some(std::thread::current().id()));
    }

    #[test]
    fn test_clear_discards() {
        let queue = InvocationQueue::new();
        let executed = Arc::new(AtomicBool::new(false));

        let executed_clone = executed.clone();
        queue.post(QueuedInvocation::new(move || {
            executed_clone.store(true, Ordering::SeqCst);
        }));

        assert_eq!(queue.clear(), 1);
        assert_eq!(queue.process_pending(), 0);
        assert!(!executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_unique_ids() {
        let a = QueuedInvocation::new(|| {});
        let b = QueuedInvocation::new(|| {});
        assert_ne!(a.id(), b.id());
    }
}
