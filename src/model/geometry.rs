//! Coordinate spaces: normalized image coordinates and screen rectangles.

use serde::{Deserialize, Serialize};

/// A point in normalized image coordinates (0..1 relative to image width/height).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormPoint {
    pub x: f32,
    pub y: f32,
}

impl NormPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates into [0, 1].
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }

    /// Offset by a normalized delta (no clamping).
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance in normalized space.
    pub fn distance_to(&self, other: &NormPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned rectangle in screen (canvas pixel) coordinates.
///
/// Also used for the display bounds the background image is drawn into;
/// normalized coordinates map onto this rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from two arbitrary corners.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        Self {
            x: a.0.min(b.0),
            y: a.1.min(b.1),
            width: (a.0 - b.0).abs(),
            height: (a.1 - b.1).abs(),
        }
    }

    /// Fit an image of `image_w` x `image_h` inside a canvas, preserving the
    /// aspect ratio and centering it.
    ///
    /// Degenerate image sizes fall back to the full canvas.
    pub fn fit(image_w: u32, image_h: u32, canvas_w: u32, canvas_h: u32) -> Self {
        let (cw, ch) = (canvas_w as f32, canvas_h as f32);
        if image_w == 0 || image_h == 0 {
            return Self::new(0.0, 0.0, cw, ch);
        }

        let (iw, ih) = (image_w as f32, image_h as f32);
        let scale = (cw / iw).min(ch / ih);
        let width = iw * scale;
        let height = ih * scale;
        Self::new((cw - width) / 2.0, (ch - height) / 2.0, width, height)
    }

    /// Map a normalized point into this rectangle.
    pub fn to_absolute(&self, p: NormPoint) -> (f32, f32) {
        (self.x + p.x * self.width, self.y + p.y * self.height)
    }

    /// Map a screen point into normalized coordinates (unclamped).
    pub fn to_normalized(&self, x: f32, y: f32) -> NormPoint {
        let nx = if self.width > 0.0 {
            (x - self.x) / self.width
        } else {
            0.0
        };
        let ny = if self.height > 0.0 {
            (y - self.y) / self.height
        } else {
            0.0
        };
        NormPoint::new(nx, ny)
    }

    /// The shorter side, used to scale circle radii.
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn expanded(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_image_letterboxes() {
        let bounds = ScreenRect::fit(2000, 1000, 1000, 1000);
        assert_eq!(bounds.width, 1000.0);
        assert_eq!(bounds.height, 500.0);
        assert_eq!(bounds.x, 0.0);
        assert_eq!(bounds.y, 250.0);
    }

    #[test]
    fn test_fit_degenerate_image_uses_canvas() {
        let bounds = ScreenRect::fit(0, 100, 640, 480);
        assert_eq!(bounds, ScreenRect::new(0.0, 0.0, 640.0, 480.0));
    }

    #[test]
    fn test_normalized_round_trip() {
        let bounds = ScreenRect::new(100.0, 50.0, 400.0, 200.0);
        let p = bounds.to_normalized(300.0, 100.0);
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 0.25).abs() < 1e-6);
        assert_eq!(bounds.to_absolute(p), (300.0, 100.0));
    }

    #[test]
    fn test_clamped() {
        let p = NormPoint::new(-0.5, 1.7).clamped();
        assert_eq!(p, NormPoint::new(0.0, 1.0));
    }

    #[test]
    fn test_from_corners_normalizes() {
        let r = ScreenRect::from_corners((50.0, 80.0), (10.0, 20.0));
        assert_eq!(r, ScreenRect::new(10.0, 20.0, 40.0, 60.0));
    }
}
