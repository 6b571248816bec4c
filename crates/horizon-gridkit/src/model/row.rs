//! Row identity and row payloads.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Identifies a row in a grid.
///
/// Handles are signed: any negative value means "no row", which is what a
/// grid reports as its focused row when nothing has focus. Use
/// [`RowHandle::INVALID`] to express that explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHandle(i32);

impl RowHandle {
    /// The "no row" sentinel.
    pub const INVALID: Self = Self(-1);

    /// The first row of a grid.
    pub const FIRST: Self = Self(0);

    /// Creates a handle from a raw value. Negative values are invalid handles.
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Creates a handle for a zero-based row index.
    ///
    /// Indices beyond `i32::MAX` saturate.
    pub fn from_index(index: usize) -> Self {
        Self(i32::try_from(index).unwrap_or(i32::MAX))
    }

    /// Returns the raw handle value.
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns `true` if this handle refers to a row.
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Returns the zero-based row index, or `None` for invalid handles.
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl Default for RowHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<i32> for RowHandle {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for RowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "row {}", self.0)
        } else {
            write!(f, "no row")
        }
    }
}

/// The raw, type-erased value a grid holds for one row.
///
/// Cloning is cheap (reference counted). Use [`downcast_ref`](Self::downcast_ref)
/// to recover the host's row type, typically inside a debouncer projection.
///
/// # Example
///
/// ```
/// use horizon_gridkit::RowData;
///
/// #[derive(Debug, PartialEq)]
/// struct Customer { id: u32 }
///
/// let row = RowData::new(Customer { id: 7 });
/// assert_eq!(row.downcast_ref::<Customer>(), Some(&Customer { id: 7 }));
/// assert!(row.downcast_ref::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct RowData(Arc<dyn Any + Send + Sync>);

impl RowData {
    /// Wraps a host value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Attempts to view the row as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if the row holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Returns `true` if both values are the same allocation.
    pub fn ptr_eq(&self, other: &RowData) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RowData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RowData(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_handle_validity() {
        assert!(!RowHandle::INVALID.is_valid());
        assert!(!RowHandle::new(-42).is_valid());
        assert!(RowHandle::FIRST.is_valid());
        assert_eq!(RowHandle::default(), RowHandle::INVALID);
        assert_eq!(RowHandle::new(3).index(), Some(3));
        assert_eq!(RowHandle::new(-3).index(), None);
    }

    #[test]
    fn test_row_handle_from_index_saturates() {
        assert_eq!(RowHandle::from_index(12).value(), 12);
        assert_eq!(RowHandle::from_index(usize::MAX).value(), i32::MAX);
    }

    #[test]
    fn test_row_handle_display() {
        assert_eq!(RowHandle::new(2).to_string(), "row 2");
        assert_eq!(RowHandle::INVALID.to_string(), "no row");
    }

    #[test]
    fn test_row_data_downcast() {
        let row = RowData::new(String::from("Ada"));
        assert!(row.is::<String>());
        assert_eq!(row.downcast_ref::<String>().map(String::as_str), Some("Ada"));
        assert!(row.downcast_ref::<i32>().is_none());

        let copy = row.clone();
        assert!(copy.ptr_eq(&row));
        assert!(!RowData::new(String::from("Ada")).ptr_eq(&row));
    }
}
