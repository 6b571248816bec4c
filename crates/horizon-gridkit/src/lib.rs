//! Horizon GridKit - Data-grid helpers built on Horizon GridKit Core.
//!
//! This crate provides two kinds of helpers for any grid implementing
//! [`GridView`]:
//!
//! - **Debounced row reactions** ([`GridDebouncer`]): react once the focused
//!   row settles, with a busy indicator shown while waiting
//! - **Grid extensions** ([`GridViewExt`]): guarded one-liners for clearing
//!   selection, conditional row styling, focusing and scrolling
//!
//! [`TableGrid`] is an in-memory [`GridView`] for hosts without a widget of
//! their own. The core crate is re-exported, so signals, dispatchers and the
//! async runtime are available from here too.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use horizon_gridkit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> horizon_gridkit::Result<()> {
//!     let grid: Arc<dyn GridView> = Arc::new(TableGrid::with_rows(vec![
//!         RowData::new("ALFKI"),
//!         RowData::new("ANATR"),
//!     ]));
//!     let spinner = Arc::new(VisibilityFlag::new());
//!
//!     let _debouncer = GridDebouncer::builder(
//!         grid.clone(),
//!         |row| row.downcast_ref::<&'static str>().map(|id| id.to_string()),
//!         |id| async move {
//!             println!("loading orders for {id}");
//!             Ok::<_, BoxError>(())
//!         },
//!     )
//!     .busy_indicator(spinner)
//!     .build()?;
//!
//!     grid.focus_first_row();
//!     grid.set_row_style_conditionally(|row| row.is::<&'static str>(), Color::BLUE, None);
//!     Ok(())
//! }
//! ```

pub use horizon_gridkit_core::*;

mod busy;
pub mod debounce;
mod error;
pub mod grid;
pub mod model;
pub mod prelude;

pub use busy::{BusyIndicator, VisibilityFlag};
pub use debounce::{DebounceConfig, GridDebouncer, GridDebouncerBuilder, ReactionOutcome};
pub use error::{BoxError, GridKitError, ReactionError, Result};
pub use grid::{FocusedRowChange, GridView, GridViewExt, TableGrid};
pub use model::{Color, RowAppearance, RowData, RowHandle, RowStyleArgs};
