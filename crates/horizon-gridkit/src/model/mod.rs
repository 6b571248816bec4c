//! Data types shared by grids and grid helpers.
//!
//! # Core Types
//!
//! - [`RowHandle`]: Identifies a row; negative handles mean "no row"
//! - [`RowData`]: Type-erased, cheaply clonable row payload
//! - [`Color`] / [`RowAppearance`]: What a row should be painted with
//! - [`RowStyleArgs`]: Per-row styling request emitted by a grid

mod appearance;
mod row;

pub use appearance::{Color, RowAppearance, RowStyleArgs};
pub use row::{RowData, RowHandle};
