//! One-shot convenience operations for any [`GridView`].

use horizon_gridkit_core::ConnectionId;
use horizon_gridkit_core::logging::targets;

use super::view::GridView;
use crate::model::{Color, RowData, RowHandle};

/// Convenience operations available on every [`GridView`].
///
/// Each operation is a guarded pass-through: when its precondition does not
/// hold (empty grid, nothing focused) it does nothing.
///
/// # Example
///
/// ```
/// use horizon_gridkit::{GridView, GridViewExt, RowData, TableGrid};
///
/// let grid = TableGrid::with_rows((1..=3).map(RowData::new).collect());
/// grid.focus_last_row();
/// assert_eq!(grid.focused_row_handle().value(), 2);
///
/// grid.clear_selection_safe();
/// assert!(!grid.focused_row_handle().is_valid());
/// ```
pub trait GridViewExt: GridView {
    /// Clears the selection and focus, if the grid has any rows.
    fn clear_selection_safe(&self) {
        if self.row_count() > 0 {
            self.clear_selection();
            self.set_focused_row_handle(RowHandle::INVALID);
        }
    }

    /// Paints rows matching `condition` with `fore` (and `back`, if given).
    ///
    /// Rows the grid has no value for are left alone. The rule stays active
    /// until the returned connection is removed from
    /// [`row_style`](GridView::row_style).
    fn set_row_style_conditionally<F>(&self, condition: F, fore: Color, back: Option<Color>) -> ConnectionId
    where
        F: Fn(&RowData) -> bool + Send + Sync + 'static,
    {
        let id = self.row_style().connect(move |args| {
            let Some(row) = args.row() else {
                return;
            };
            if condition(row) {
                args.set_fore_color(fore);
                if let Some(back) = back {
                    args.set_back_color(back);
                }
            }
        });
        tracing::debug!(target: targets::GRID, ?id, "conditional row style registered");
        id
    }

    /// Focuses the first row, if the grid has any rows.
    fn focus_first_row(&self) {
        if self.row_count() > 0 {
            self.set_focused_row_handle(RowHandle::FIRST);
        }
    }

    /// Focuses the last row, if the grid has any rows.
    fn focus_last_row(&self) {
        let count = self.row_count();
        if count > 0 {
            self.set_focused_row_handle(RowHandle::from_index(count - 1));
        }
    }

    /// Redraws the focused row, if any.
    fn refresh_current_row(&self) {
        let handle = self.focused_row_handle();
        if handle.is_valid() {
            self.refresh_row(handle);
        }
    }

    /// Scrolls the focused row into view, if any.
    fn scroll_to_focused_row(&self) {
        let handle = self.focused_row_handle();
        if handle.is_valid() {
            self.make_row_visible(handle);
        }
    }
}

impl<G: GridView + ?Sized> GridViewExt for G {}
