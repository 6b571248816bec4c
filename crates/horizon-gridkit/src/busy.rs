//! Loading indicators shown while a debounced reaction is outstanding.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_gridkit_core::logging::targets;
use horizon_gridkit_core::{Dispatcher, Signal};
use parking_lot::Mutex;

/// Something that can show or hide a "loading" affordance.
///
/// Calls arrive through the debouncer's [`Dispatcher`], so an implementation
/// that touches a widget only needs to be correct on the thread that
/// dispatcher targets.
pub trait BusyIndicator: Send + Sync {
    /// Shows (`true`) or hides (`false`) the indicator.
    fn set_busy_visible(&self, visible: bool);
}

impl<F> BusyIndicator for F
where
    F: Fn(bool) + Send + Sync,
{
    fn set_busy_visible(&self, visible: bool) {
        self(visible)
    }
}

/// A [`BusyIndicator`] backed by a flag.
///
/// Bind [`visibility_changed`](Self::visibility_changed) to a spinner or
/// overlay widget, or poll [`is_visible`](Self::is_visible).
#[derive(Debug, Default)]
pub struct VisibilityFlag {
    visible: AtomicBool,
    /// Emitted with the new visibility whenever it changes.
    pub visibility_changed: Signal<bool>,
}

impl VisibilityFlag {
    /// Creates a hidden flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the indicator is currently shown.
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }
}

impl BusyIndicator for VisibilityFlag {
    fn set_busy_visible(&self, visible: bool) {
        if self.visible.swap(visible, Ordering::AcqRel) != visible {
            self.visibility_changed.emit(visible);
        }
    }
}

// Overlapping reactions share one indicator: show on the first acquire,
// hide on the last release.
pub(crate) struct BusyState {
    indicator: Option<Arc<dyn BusyIndicator>>,
    dispatcher: Arc<dyn Dispatcher>,
    holders: Mutex<usize>,
}

impl BusyState {
    pub(crate) fn new(indicator: Option<Arc<dyn BusyIndicator>>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            indicator,
            dispatcher,
            holders: Mutex::new(0),
        }
    }

    pub(crate) fn acquire(self: &Arc<Self>) -> BusyGuard {
        let mut holders = self.holders.lock();
        *holders += 1;
        if *holders == 1 {
            self.set_visible(true);
        }
        BusyGuard { state: self.clone() }
    }

    fn release(&self) {
        let mut holders = self.holders.lock();
        *holders = holders.saturating_sub(1);
        if *holders == 0 {
            self.set_visible(false);
        }
    }

    // Dispatched while `holders` is locked so show/hide reach the dispatcher in order.
    fn set_visible(&self, visible: bool) {
        let Some(indicator) = self.indicator.clone() else {
            return;
        };
        tracing::trace!(target: targets::DEBOUNCE, visible, "busy indicator toggled");
        self.dispatcher
            .dispatch(Box::new(move || indicator.set_busy_visible(visible)));
    }
}

/// Keeps the busy indicator shown until dropped.
pub(crate) struct BusyGuard {
    state: Arc<BusyState>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.release();
    }
}
