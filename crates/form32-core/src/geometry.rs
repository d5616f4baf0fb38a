//! Pixel-space geometry for rendered form pages.
//!
//! All coordinates are in the rendered raster's pixel space with a top-left
//! origin (y increases downward), matching the coordinate system of the
//! upstream page-conversion step.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page pixel coordinates.
///
/// `l`/`t`/`r`/`b` are the left, top, right, and bottom edges. The origin is
/// the top-left corner of the page raster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left x-coordinate
    pub l: f32,
    /// Top y-coordinate
    pub t: f32,
    /// Right x-coordinate
    pub r: f32,
    /// Bottom y-coordinate
    pub b: f32,
}

impl BoundingBox {
    /// Create a new bounding box from edge coordinates.
    #[inline]
    #[must_use = "bounding box is created but not used"]
    pub const fn new(l: f32, t: f32, r: f32, b: f32) -> Self {
        Self { l, t, r, b }
    }

    /// Width of the box.
    #[inline]
    #[must_use = "box width is computed but not used"]
    pub fn width(&self) -> f32 {
        (self.r - self.l).abs()
    }

    /// Height of the box.
    #[inline]
    #[must_use = "box height is computed but not used"]
    pub fn height(&self) -> f32 {
        (self.b - self.t).abs()
    }

    /// Area of the box.
    #[inline]
    #[must_use = "box area is computed but not used"]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Center point `(x, y)`.
    #[inline]
    #[must_use = "center coordinates are computed but not used"]
    pub fn center(&self) -> (f32, f32) {
        ((self.l + self.r) / 2.0, (self.t + self.b) / 2.0)
    }

    /// Euclidean distance between the centers of two boxes.
    #[inline]
    #[must_use = "center distance is computed but not used"]
    pub fn center_distance(&self, other: &Self) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        (ax - bx).hypot(ay - by)
    }

    /// Whether the two boxes share any vertical extent.
    ///
    /// Used to decide if two text elements sit on the same printed line.
    #[inline]
    #[must_use = "vertical overlap check result is returned but not used"]
    pub fn overlaps_vertically(&self, other: &Self) -> bool {
        !(self.b <= other.t || other.b <= self.t)
    }

    /// Whether the two boxes share any horizontal extent.
    #[inline]
    #[must_use = "horizontal overlap check result is returned but not used"]
    pub fn overlaps_horizontally(&self, other: &Self) -> bool {
        !(self.r <= other.l || other.r <= self.l)
    }

    /// Horizontal gap from this box's right edge to `other`'s left edge.
    ///
    /// Zero when `other` starts at or before this box's right edge.
    #[inline]
    #[must_use = "horizontal gap is computed but not used"]
    pub fn gap_right_to(&self, other: &Self) -> f32 {
        (other.l - self.r).max(0.0)
    }

    /// Vertical gap from this box's bottom edge to `other`'s top edge.
    ///
    /// Zero when `other` starts at or above this box's bottom edge.
    #[inline]
    #[must_use = "vertical gap is computed but not used"]
    pub fn gap_below_to(&self, other: &Self) -> f32 {
        (other.t - self.b).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let bbox = BoundingBox::new(10.0, 20.0, 110.0, 50.0);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 30.0);
        assert_eq!(bbox.area(), 3000.0);
        assert_eq!(bbox.center(), (60.0, 35.0));
    }

    #[test]
    fn test_same_line_detection() {
        let label = BoundingBox::new(10.0, 100.0, 80.0, 115.0);
        let value = BoundingBox::new(90.0, 102.0, 200.0, 117.0);
        let below = BoundingBox::new(10.0, 130.0, 80.0, 145.0);

        assert!(label.overlaps_vertically(&value));
        assert!(!label.overlaps_vertically(&below));
        assert_eq!(label.gap_right_to(&value), 10.0);
        assert_eq!(label.gap_below_to(&below), 15.0);
    }

    #[test]
    fn test_gaps_clamp_to_zero() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 20.0);
        let overlapping = BoundingBox::new(50.0, 0.0, 150.0, 20.0);
        assert_eq!(a.gap_right_to(&overlapping), 0.0);
        assert_eq!(a.gap_below_to(&overlapping), 0.0);
    }

    #[test]
    fn test_center_distance() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(30.0, 40.0, 40.0, 50.0);
        assert_eq!(a.center_distance(&b), 50.0);
    }
}
