//! Page presets and the geometry derived from them.
//!
//! Sizes are CSS pixels at 96 dpi, the unit the markup engine lays out in.

use serde::{Deserialize, Serialize};

/// Height reserved for rendering-engine measurement slack.
pub const DEFAULT_SAFE_OFFSET: f32 = 200.0;

pub const MIN_MARGIN: f32 = 10.0;
pub const MAX_MARGIN: f32 = 120.0;

/// Named page-size presets offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageSizePreset {
    A4,
    B5,
    Letter,
}

impl PageSizePreset {
    /// `(width, height)` in CSS pixels.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSizePreset::A4 => (794.0, 1123.0),
            PageSizePreset::B5 => (729.0, 1032.0),
            PageSizePreset::Letter => (816.0, 1056.0),
        }
    }
}

impl Default for PageSizePreset {
    fn default() -> Self {
        PageSizePreset::A4
    }
}

/// Geometry of one page: outer size plus a uniform margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub preset: PageSizePreset,
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub safe_offset: f32,
}

impl PageGeometry {
    /// Builds geometry for a preset. The margin is clamped into `MIN_MARGIN..=MAX_MARGIN`.
    pub fn new(preset: PageSizePreset, margin: f32, safe_offset: f32) -> Self {
        let (width, height) = preset.dimensions();
        PageGeometry {
            preset,
            width,
            height,
            margin: clamp_margin(margin),
            safe_offset: safe_offset.max(0.0),
        }
    }

    /// Width available to content inside the margins.
    pub fn printable_width(&self) -> f32 {
        (self.width - 2.0 * self.margin).max(0.0)
    }

    /// Height budget a page's content must not exceed:
    /// `height − 2×margin − safe_offset`.
    pub fn printable_height(&self) -> f32 {
        (self.height - 2.0 * self.margin - self.safe_offset).max(0.0)
    }
}

/// Clamps a user margin into the supported range. Non-finite input falls back to the minimum.
pub fn clamp_margin(margin: f32) -> f32 {
    if margin.is_finite() {
        margin.clamp(MIN_MARGIN, MAX_MARGIN)
    } else {
        MIN_MARGIN
    }
}
