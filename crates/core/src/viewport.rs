//! Page-space to pixel-space mapping
//!
//! A `Viewport` captures the scale and rotation a page is displayed at and
//! maps rectangles from page coordinates (points, top-left origin) into
//! viewport pixels. This is what positions the text-layer overlay on top of
//! the rendered page image.

use crate::viewer::{PageSize, Rotation};

/// Axis-aligned rectangle with a top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Coordinate mapping between page space and pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    page: PageSize,
    scale: f32,
    rotation: Rotation,
}

impl Viewport {
    /// Create a viewport for an unrotated page size at a scale and rotation
    pub fn new(page: PageSize, scale: f32, rotation: Rotation) -> Self {
        Self { page, scale, rotation }
    }

    /// Viewport width in pixels, after rotation
    pub fn width(&self) -> f32 {
        if self.rotation.swaps_axes() {
            self.page.height * self.scale
        } else {
            self.page.width * self.scale
        }
    }

    /// Viewport height in pixels, after rotation
    pub fn height(&self) -> f32 {
        if self.rotation.swaps_axes() {
            self.page.width * self.scale
        } else {
            self.page.height * self.scale
        }
    }

    /// Map a page-space rectangle into viewport pixels
    pub fn transform_rect(&self, rect: &PageRect) -> PageRect {
        let s = self.scale;
        match self.rotation {
            Rotation::Deg0 => {
                PageRect::new(rect.x * s, rect.y * s, rect.width * s, rect.height * s)
            }
            Rotation::Deg90 => PageRect::new(
                (self.page.height - rect.bottom()) * s,
                rect.x * s,
                rect.height * s,
                rect.width * s,
            ),
            Rotation::Deg180 => PageRect::new(
                (self.page.width - rect.right()) * s,
                (self.page.height - rect.bottom()) * s,
                rect.width * s,
                rect.height * s,
            ),
            Rotation::Deg270 => PageRect::new(
                rect.y * s,
                (self.page.width - rect.right()) * s,
                rect.height * s,
                rect.width * s,
            ),
        }
    }
}
