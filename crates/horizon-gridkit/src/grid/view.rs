//! The contract a data grid exposes to GridKit helpers.

use horizon_gridkit_core::Signal;

use crate::model::{RowData, RowHandle, RowStyleArgs};

/// Arguments of [`GridView::focused_row_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusedRowChange {
    /// The row that had focus before the change.
    pub previous: RowHandle,
    /// The row that has focus now. Invalid when focus was cleared.
    pub current: RowHandle,
}

/// A data grid as seen by GridKit.
///
/// Rendering, data virtualization and layout stay with the implementor; this
/// trait only covers focus, selection and the per-row hooks the helpers
/// need. Implementations must be shareable across threads since debounced
/// reactions read the focused row from a runtime worker.
pub trait GridView: Send + Sync {
    /// Number of rows currently in the grid.
    fn row_count(&self) -> usize;

    /// The focused row, or [`RowHandle::INVALID`] when nothing has focus.
    fn focused_row_handle(&self) -> RowHandle;

    /// Moves focus. Passing an invalid handle clears focus.
    fn set_focused_row_handle(&self, handle: RowHandle);

    /// The raw value of the focused row.
    fn focused_row(&self) -> Option<RowData> {
        self.row(self.focused_row_handle())
    }

    /// The raw value of `handle`, or `None` if the handle is not a row.
    fn row(&self, handle: RowHandle) -> Option<RowData>;

    /// Deselects every row.
    fn clear_selection(&self);

    /// Asks the grid to redraw one row.
    fn refresh_row(&self, handle: RowHandle);

    /// Scrolls so that `handle` is inside the viewport.
    fn make_row_visible(&self, handle: RowHandle);

    /// Emitted after focus moves to a different row.
    fn focused_row_changed(&self) -> &Signal<FocusedRowChange>;

    /// Emitted for each row the grid is about to paint.
    fn row_style(&self) -> &Signal<RowStyleArgs>;
}
