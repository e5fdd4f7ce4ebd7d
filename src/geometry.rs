use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Size of the rendering surface in pixels, read fresh for every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle given by its origin and size.
///
/// The same type is used for boxes in normalized detector space and for boxes
/// in viewport pixels; which space a value lives in is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from its extents.
    pub fn from_extents(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn min_x(&self) -> f32 {
        self.x
    }

    pub fn min_y(&self) -> f32 {
        self.y
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.mid_x(), self.mid_y())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// True if the point lies inside the box or on its edge.
    pub fn contains(&self, point: &Point2<f32>) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Integer pixel rectangle for rasterizing, `None` when the box covers no pixel.
    pub fn to_pixel_rect(&self) -> Option<imageproc::rect::Rect> {
        let width = self.width.round();
        let height = self.height.round();
        if !self.is_finite() || width < 1.0 || height < 1.0 {
            return None;
        }
        Some(
            imageproc::rect::Rect::at(self.x.round() as i32, self.y.round() as i32)
                .of_size(width as u32, height as u32),
        )
    }
}
