//! Grid contract, extension operations and an in-memory grid.

mod extensions;
mod table_grid;
mod view;

pub use extensions::GridViewExt;
pub use table_grid::TableGrid;
pub use view::{FocusedRowChange, GridView};
