use serde::{Deserialize, Serialize};

/// Axis-aligned box in `(x1, y1, x2, y2)` corner form.
///
/// Inverted or zero-sized boxes are accepted as-is; every area computation
/// clamps negative extents to zero.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct RcnnBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl RcnnBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Returns the width of the bounding box, negative when inverted.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Returns the height of the bounding box, negative when inverted.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Returns the bounding box coordinates as `(x1, y1, x2, y2)`.
    pub fn xy1_xy2(&self) -> (f32, f32, f32, f32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Computes the area of the bounding box. Degenerate boxes have area 0.
    pub fn area(&self) -> f32 {
        self.width().max(0.) * self.height().max(0.)
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &RcnnBox) -> f32 {
        let left = self.x1.max(other.x1);
        let right = self.x2.min(other.x2);
        let top = self.y1.max(other.y1);
        let bottom = self.y2.min(other.y2);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &RcnnBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Intersection over union. A zero or non-finite union yields 0.
    pub fn iou(&self, other: &RcnnBox) -> f32 {
        let union = self.union(other);
        if !(union > 0.) || !union.is_finite() {
            return 0.;
        }
        let iou = self.intersect(other) / union;
        if iou.is_finite() {
            iou
        } else {
            0.
        }
    }

    /// Multiplies every coordinate by `factor`.
    pub fn scale(&self, factor: f32) -> Self {
        Self::new(
            self.x1 * factor,
            self.y1 * factor,
            self.x2 * factor,
            self.y2 * factor,
        )
    }

    /// Maps a box from the resized image back to the source image by dividing
    /// each coordinate by the preprocessing scale factor.
    pub fn rescale(&self, scale_factor: f32) -> Self {
        Self::new(
            self.x1 / scale_factor,
            self.y1 / scale_factor,
            self.x2 / scale_factor,
            self.y2 / scale_factor,
        )
    }

    /// Clamps all coordinates into `[0, width - 1] x [0, height - 1]`.
    pub fn clip(&self, width: f32, height: f32) -> Self {
        let max_x = (width - 1.).max(0.);
        let max_y = (height - 1.).max(0.);
        Self::new(
            self.x1.clamp(0., max_x),
            self.y1.clamp(0., max_y),
            self.x2.clamp(0., max_x),
            self.y2.clamp(0., max_y),
        )
    }

    pub fn as_x1y1_x2y2_i32(&self) -> (i32, i32, i32, i32) {
        (self.x1.round() as i32,
         self.y1.round() as i32,
         self.x2.round() as i32,
         self.y2.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = RcnnBox::new(3., 4., 20., 40.);
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn iou_is_symmetric() {
        let a = RcnnBox::new(10., 10., 50., 50.);
        let b = RcnnBox::new(12., 12., 52., 52.);
        let c = RcnnBox::new(-5., 30., 20., 90.);
        assert_eq!(a.iou(&b), b.iou(&a));
        assert_eq!(a.iou(&c), c.iou(&a));
        assert_eq!(b.iou(&c), c.iou(&b));
    }

    #[test]
    fn overlapping_boxes() {
        let a = RcnnBox::new(10., 10., 50., 50.);
        let b = RcnnBox::new(12., 12., 52., 52.);
        // 38 * 38 / (1600 + 1600 - 1444)
        assert_relative_eq!(a.iou(&b), 1444. / 1756., epsilon = 1e-6);
    }

    #[test]
    fn zero_area_boxes_never_overlap() {
        let line = RcnnBox::new(20., 10., 20., 60.);
        let a = RcnnBox::new(10., 10., 50., 50.);
        assert_eq!(line.area(), 0.);
        assert_eq!(line.iou(&a), 0.);
        assert_eq!(a.iou(&line), 0.);
        assert_eq!(line.iou(&line), 0.);
    }

    #[test]
    fn inverted_box_has_no_area() {
        let inverted = RcnnBox::new(50., 50., 10., 10.);
        assert_eq!(inverted.area(), 0.);
        assert_eq!(inverted.iou(&RcnnBox::new(10., 10., 50., 50.)), 0.);
    }

    #[test]
    fn rescale_round_trip() {
        let b = RcnnBox::new(13.5, 7.25, 480.0, 333.3);
        for s in [0.25f32, 0.6, 1.0, 1.6, 3.0] {
            let back = b.rescale(s).scale(s);
            assert_relative_eq!(back.x1, b.x1, max_relative = 1e-5);
            assert_relative_eq!(back.y1, b.y1, max_relative = 1e-5);
            assert_relative_eq!(back.x2, b.x2, max_relative = 1e-5);
            assert_relative_eq!(back.y2, b.y2, max_relative = 1e-5);
        }
    }

    #[test]
    fn clip_keeps_box_inside_image() {
        let b = RcnnBox::new(-10., 5., 700., 900.).clip(640., 480.);
        assert_eq!(b.xy1_xy2(), (0., 5., 639., 479.));
    }
}
