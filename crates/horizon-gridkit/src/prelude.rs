//! Prelude module for Horizon GridKit.
//!
//! ```ignore
//! use horizon_gridkit::prelude::*;
//! ```
//!
//! This provides access to:
//! - Grid contract and extensions (`GridView`, `GridViewExt`, `TableGrid`)
//! - Row types (`RowHandle`, `RowData`, `Color`)
//! - Debouncing (`GridDebouncer`, `DebounceConfig`, `BusyIndicator`)
//! - Signal/slot and dispatch (`Signal`, `ConnectionId`, `Dispatcher`)

// ============================================================================
// Grid
// ============================================================================

pub use crate::grid::{FocusedRowChange, GridView, GridViewExt, TableGrid};
pub use crate::model::{Color, RowAppearance, RowData, RowHandle, RowStyleArgs};

// ============================================================================
// Debouncing
// ============================================================================

pub use crate::busy::{BusyIndicator, VisibilityFlag};
pub use crate::debounce::{DebounceConfig, GridDebouncer, ReactionOutcome};
pub use crate::error::{BoxError, GridKitError, ReactionError};

// ============================================================================
// Signals and Dispatch
// ============================================================================

pub use crate::{AffinityDispatcher, ConnectionId, DirectDispatcher, Dispatcher, InvocationQueue, Signal};
