//! Crop selection geometry.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aspect::AspectConstraint;

/// A pixel rectangle selected on the uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CropSelection {
    /// X coordinate of the top-left corner, in pixels
    pub x: u32,
    /// Y coordinate of the top-left corner, in pixels
    pub y: u32,
    /// Selection width in pixels
    pub width: u32,
    /// Selection height in pixels
    pub height: u32,
}

impl CropSelection {
    /// Create a new selection.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A selection covering an entire `width x height` frame.
    pub const fn full_frame(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// True if the selection has no area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check that the selection lies entirely within a source frame.
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        !self.is_empty()
            && self.x as u64 + self.width as u64 <= frame_width as u64
            && self.y as u64 + self.height as u64 <= frame_height as u64
    }

    /// Check the selection against an aspect constraint.
    pub fn conforms_to(&self, constraint: &AspectConstraint) -> bool {
        constraint.conforms(self.width, self.height)
    }

    /// Clamp the selection to a source frame, shrinking width/height as needed.
    ///
    /// Returns `None` if the origin lies outside the frame entirely.
    pub fn clamped_to(&self, frame_width: u32, frame_height: u32) -> Option<CropSelection> {
        if self.x >= frame_width || self.y >= frame_height || self.is_empty() {
            return None;
        }
        let width = self.width.min(frame_width - self.x);
        let height = self.height.min(frame_height - self.y);
        Some(CropSelection {
            x: self.x,
            y: self.y,
            width,
            height,
        })
    }
}
