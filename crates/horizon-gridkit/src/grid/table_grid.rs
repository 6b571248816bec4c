//! An in-memory grid.
//!
//! [`TableGrid`] keeps rows, focus, selection and a row-based viewport in
//! memory. Hosts without a widget of their own can drive it directly, and
//! widget adapters can use it as the backing state behind a [`GridView`].

use std::collections::BTreeSet;

use horizon_gridkit_core::logging::targets;
use horizon_gridkit_core::{PerfSpan, Signal};
use parking_lot::RwLock;

use super::view::{FocusedRowChange, GridView};
use crate::model::{RowAppearance, RowData, RowHandle, RowStyleArgs};

/// Default number of rows that fit in the viewport.
const DEFAULT_VISIBLE_ROW_COUNT: usize = 20;

struct GridState {
    rows: Vec<RowData>,
    focused: RowHandle,
    selected: BTreeSet<usize>,
    top_row: usize,
    visible_row_count: usize,
    refresh_count: u64,
}

impl GridState {
    fn normalize(&self, handle: RowHandle) -> RowHandle {
        match handle.index() {
            Some(index) if index < self.rows.len() => handle,
            _ => RowHandle::INVALID,
        }
    }

    fn selection(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }
}

/// A thread-safe, in-memory [`GridView`].
///
/// All signals are emitted after the internal lock is released, so handlers
/// may call back into the grid.
///
/// # Example
///
/// ```
/// use horizon_gridkit::{GridView, RowData, RowHandle, TableGrid};
///
/// let grid = TableGrid::with_rows(vec![RowData::new("Ada"), RowData::new("Grace")]);
/// grid.focused_row_changed().connect(|change| {
///     println!("{} -> {}", change.previous, change.current);
/// });
///
/// grid.set_focused_row_handle(RowHandle::new(1));
/// assert_eq!(grid.focused_row().and_then(|r| r.downcast_ref::<&'static str>().copied()), Some("Grace"));
/// ```
pub struct TableGrid {
    state: RwLock<GridState>,
    focused_row_changed: Signal<FocusedRowChange>,
    /// Emitted with the sorted selected row indices whenever selection changes.
    pub selection_changed: Signal<Vec<usize>>,
    /// Emitted when a row is asked to redraw.
    pub row_refreshed: Signal<RowHandle>,
    row_style: Signal<RowStyleArgs>,
}

impl Default for TableGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TableGrid {
    /// Creates an empty grid.
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Creates a grid holding `rows`. Nothing is focused.
    pub fn with_rows(rows: Vec<RowData>) -> Self {
        Self {
            state: RwLock::new(GridState {
                rows,
                focused: RowHandle::INVALID,
                selected: BTreeSet::new(),
                top_row: 0,
                visible_row_count: DEFAULT_VISIBLE_ROW_COUNT,
                refresh_count: 0,
            }),
            focused_row_changed: Signal::new(),
            selection_changed: Signal::new(),
            row_refreshed: Signal::new(),
            row_style: Signal::new(),
        }
    }

    /// Replaces every row.
    ///
    /// Focus survives if the focused handle is still in range; selection is
    /// cleared and the viewport scrolls back to the top.
    pub fn set_rows(&self, rows: Vec<RowData>) {
        let _span = PerfSpan::new("set_rows");
        let (change, selection_cleared) = {
            let mut state = self.state.write();
            state.rows = rows;
            state.top_row = 0;
            let selection_cleared = !state.selected.is_empty();
            state.selected.clear();

            let previous = state.focused;
            state.focused = state.normalize(previous);
            let change = (state.focused != previous).then_some(FocusedRowChange {
                previous,
                current: state.focused,
            });
            tracing::debug!(target: targets::GRID, row_count = state.rows.len(), "rows replaced");
            (change, selection_cleared)
        };

        if selection_cleared {
            self.selection_changed.emit(Vec::new());
        }
        if let Some(change) = change {
            self.focused_row_changed.emit(change);
        }
    }

    /// Appends a row and returns its handle.
    pub fn push_row(&self, row: RowData) -> RowHandle {
        let mut state = self.state.write();
        state.rows.push(row);
        RowHandle::from_index(state.rows.len() - 1)
    }

    /// Adds a row to the selection. Returns `false` for handles that are not rows.
    pub fn select_row(&self, handle: RowHandle) -> bool {
        let selection = {
            let mut state = self.state.write();
            let Some(index) = state.normalize(handle).index() else {
                return false;
            };
            if !state.selected.insert(index) {
                return true;
            }
            state.selection()
        };
        self.selection_changed.emit(selection);
        true
    }

    /// Sorted indices of the selected rows.
    pub fn selected_rows(&self) -> Vec<usize> {
        self.state.read().selection()
    }

    /// Sets how many rows fit in the viewport (at least one).
    pub fn set_visible_row_count(&self, count: usize) {
        self.state.write().visible_row_count = count.max(1);
    }

    /// Index of the first row in the viewport.
    pub fn top_row(&self) -> usize {
        self.state.read().top_row
    }

    /// Returns `true` if `handle` is a row inside the viewport.
    pub fn is_row_visible(&self, handle: RowHandle) -> bool {
        let state = self.state.read();
        match state.normalize(handle).index() {
            Some(index) => index >= state.top_row && index < state.top_row.saturating_add(state.visible_row_count),
            None => false,
        }
    }

    /// Runs the `row_style` handlers for one row and returns the result.
    ///
    /// Returns `None` for handles that are not rows.
    pub fn row_appearance(&self, handle: RowHandle) -> Option<RowAppearance> {
        let row = self.row(handle)?;
        let args = RowStyleArgs::new(handle, Some(row));
        self.row_style.emit(args.clone());
        Some(args.appearance())
    }

    /// Number of row redraws requested so far.
    pub fn refresh_count(&self) -> u64 {
        self.state.read().refresh_count
    }
}

impl GridView for TableGrid {
    fn row_count(&self) -> usize {
        self.state.read().rows.len()
    }

    fn focused_row_handle(&self) -> RowHandle {
        self.state.read().focused
    }

    fn set_focused_row_handle(&self, handle: RowHandle) {
        let change = {
            let mut state = self.state.write();
            let current = state.normalize(handle);
            if current == state.focused {
                return;
            }
            let previous = std::mem::replace(&mut state.focused, current);
            FocusedRowChange { previous, current }
        };
        tracing::trace!(
            target: targets::GRID,
            previous = change.previous.value(),
            current = change.current.value(),
            "focus moved"
        );
        self.focused_row_changed.emit(change);
    }

    fn row(&self, handle: RowHandle) -> Option<RowData> {
        let state = self.state.read();
        handle.index().and_then(|index| state.rows.get(index).cloned())
    }

    fn clear_selection(&self) {
        {
            let mut state = self.state.write();
            if state.selected.is_empty() {
                return;
            }
            state.selected.clear();
        }
        self.selection_changed.emit(Vec::new());
    }

    fn refresh_row(&self, handle: RowHandle) {
        {
            let mut state = self.state.write();
            if !state.normalize(handle).is_valid() {
                return;
            }
            state.refresh_count += 1;
        }
        self.row_refreshed.emit(handle);
    }

    fn make_row_visible(&self, handle: RowHandle) {
        let mut state = self.state.write();
        let Some(index) = state.normalize(handle).index() else {
            return;
        };
        let bottom = state.top_row.saturating_add(state.visible_row_count);
        if index < state.top_row {
            state.top_row = index;
        } else if index >= bottom {
            state.top_row = index + 1 - state.visible_row_count;
        }
    }

    fn focused_row_changed(&self) -> &Signal<FocusedRowChange> {
        &self.focused_row_changed
    }

    fn row_style(&self) -> &Signal<RowStyleArgs> {
        &self.row_style
    }
}

impl std::fmt::Debug for TableGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("TableGrid")
            .field("row_count", &state.rows.len())
            .field("focused", &state.focused)
            .field("selected", &state.selected)
            .field("top_row", &state.top_row)
            .finish()
    }
}

static_assertions::assert_impl_all!(TableGrid: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::model::Color;

    fn grid_of(n: usize) -> TableGrid {
        TableGrid::with_rows((0..n).map(RowData::new).collect())
    }

    #[test]
    fn test_focus_change_emits_once() {
        let grid = grid_of(3);
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        grid.focused_row_changed()
            .connect(move |change| changes_clone.lock().push(*change));

        grid.set_focused_row_handle(RowHandle::new(1));
        grid.set_focused_row_handle(RowHandle::new(1));
        grid.set_focused_row_handle(RowHandle::new(2));

        assert_eq!(
            *changes.lock(),
            vec![
                FocusedRowChange { previous: RowHandle::INVALID, current: RowHandle::new(1) },
                FocusedRowChange { previous: RowHandle::new(1), current: RowHandle::new(2) },
            ]
        );
    }

    #[test]
    fn test_out_of_range_focus_is_invalid() {
        let grid = grid_of(2);
        grid.set_focused_row_handle(RowHandle::new(0));
        grid.set_focused_row_handle(RowHandle::new(5));
        assert_eq!(grid.focused_row_handle(), RowHandle::INVALID);
        assert!(grid.focused_row().is_none());
    }

    #[test]
    fn test_set_rows_keeps_focus_in_range() {
        let grid = grid_of(5);
        grid.set_focused_row_handle(RowHandle::new(1));
        grid.set_rows((0..3).map(RowData::new).collect());
        assert_eq!(grid.focused_row_handle(), RowHandle::new(1));

        grid.set_focused_row_handle(RowHandle::new(2));
        grid.set_rows(vec![RowData::new(0)]);
        assert_eq!(grid.focused_row_handle(), RowHandle::INVALID);
    }

    #[test]
    fn test_selection() {
        let grid = grid_of(4);
        let emitted = Arc::new(AtomicUsize::new(0));
        let emitted_clone = emitted.clone();
        grid.selection_changed.connect(move |_| {
            emitted_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(grid.select_row(RowHandle::new(3)));
        assert!(grid.select_row(RowHandle::new(1)));
        assert!(grid.select_row(RowHandle::new(1)));
        assert!(!grid.select_row(RowHandle::new(9)));
        assert_eq!(grid.selected_rows(), vec![1, 3]);

        grid.clear_selection();
        grid.clear_selection();
        assert!(grid.selected_rows().is_empty());
        assert_eq!(emitted.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_make_row_visible_scrolls_minimally() {
        let grid = grid_of(100);
        grid.set_visible_row_count(10);

        grid.make_row_visible(RowHandle::new(5));
        assert_eq!(grid.top_row(), 0);

        grid.make_row_visible(RowHandle::new(42));
        assert_eq!(grid.top_row(), 33);
        assert!(grid.is_row_visible(RowHandle::new(42)));

        grid.make_row_visible(RowHandle::new(30));
        assert_eq!(grid.top_row(), 30);

        grid.make_row_visible(RowHandle::INVALID);
        assert_eq!(grid.top_row(), 30);
    }

    #[test]
    fn test_refresh_row() {
        let grid = grid_of(2);
        grid.refresh_row(RowHandle::new(1));
        grid.refresh_row(RowHandle::new(7));
        assert_eq!(grid.refresh_count(), 1);
    }

    #[test]
    fn test_row_appearance_runs_style_handlers() {
        let grid = grid_of(3);
        grid.row_style().connect(|args| {
            if args.row().and_then(|r| r.downcast_ref::<usize>()) == Some(&2) {
                args.set_fore_color(Color::RED);
            }
        });

        assert_eq!(grid.row_appearance(RowHandle::new(0)), Some(RowAppearance::default()));
        assert_eq!(
            grid.row_appearance(RowHandle::new(2)).and_then(|a| a.fore_color),
            Some(Color::RED)
        );
        assert_eq!(grid.row_appearance(RowHandle::new(3)), None);
    }

    #[test]
    fn test_handler_may_reenter_grid() {
        let grid = Arc::new(grid_of(3));
        let weak = Arc::downgrade(&grid);
        grid.focused_row_changed().connect(move |change| {
            if let Some(grid) = weak.upgrade() {
                assert_eq!(grid.focused_row_handle(), change.current);
            }
        });
        grid.set_focused_row_handle(RowHandle::new(2));
    }

    #[test]
    fn test_unbounded_viewport_does_not_overflow() {
        let grid = grid_of(5);
        grid.set_visible_row_count(2);
        grid.make_row_visible(RowHandle::new(4));
        assert_eq!(grid.top_row(), 3);

        grid.set_visible_row_count(usize::MAX);
        assert!(grid.is_row_visible(RowHandle::new(4)));
        assert!(!grid.is_row_visible(RowHandle::new(0)));

        grid.make_row_visible(RowHandle::new(4));
        assert_eq!(grid.top_row(), 3);
        grid.make_row_visible(RowHandle::new(0));
        assert_eq!(grid.top_row(), 0);
        assert!(grid.is_row_visible(RowHandle::new(4)));
    }
}
