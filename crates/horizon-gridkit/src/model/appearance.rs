//! Row colors and per-row styling requests.

use std::sync::Arc;

use parking_lot::Mutex;

use super::row::{RowData, RowHandle};

/// An RGBA color with components in the 0.0-1.0 range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new color from RGBA components (0.0-1.0 range).
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB components (0.0-1.0 range).
    #[inline]
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create an opaque color from 8-bit RGB components.
    #[inline]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::from_rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::from_rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::from_rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::from_rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::from_rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::from_rgb(1.0, 1.0, 0.0);
    pub const GRAY: Self = Self::from_rgb(0.5, 0.5, 0.5);
}

/// Colors a grid should paint a row with. `None` means "grid default".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowAppearance {
    /// Text color.
    pub fore_color: Option<Color>,
    /// Row background color.
    pub back_color: Option<Color>,
}

/// Arguments of a grid's `row_style` signal.
///
/// The grid emits one of these per row it is about to paint; handlers
/// inspect the row and adjust the appearance in place. Once every handler
/// has run, the grid reads back [`appearance`](Self::appearance).
///
/// Clones share the same appearance, so the emitter can keep one copy and
/// hand the other to the signal.
#[derive(Clone)]
pub struct RowStyleArgs {
    row_handle: RowHandle,
    row: Option<RowData>,
    appearance: Arc<Mutex<RowAppearance>>,
}

impl RowStyleArgs {
    /// Creates styling arguments with the default appearance.
    pub fn new(row_handle: RowHandle, row: Option<RowData>) -> Self {
        Self {
            row_handle,
            row,
            appearance: Arc::new(Mutex::new(RowAppearance::default())),
        }
    }

    /// The row being styled.
    pub fn row_handle(&self) -> RowHandle {
        self.row_handle
    }

    /// The raw row value, if the grid has one for this handle.
    pub fn row(&self) -> Option<&RowData> {
        self.row.as_ref()
    }

    /// Sets the text color.
    pub fn set_fore_color(&self, color: Color) {
        self.appearance.lock().fore_color = Some(color);
    }

    /// Sets the background color.
    pub fn set_back_color(&self, color: Color) {
        self.appearance.lock().back_color = Some(color);
    }

    /// The appearance accumulated so far.
    pub fn appearance(&self) -> RowAppearance {
        *self.appearance.lock()
    }
}

impl std::fmt::Debug for RowStyleArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStyleArgs")
            .field("row_handle", &self.row_handle)
            .field("appearance", &self.appearance())
            .finish()
    }
}
