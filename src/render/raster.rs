//! Software surface drawing into an RGBA image.
//!
//! Used for headless rendering (previews, exports). Glyphs are not shaped:
//! text lines are drawn as baseline rules of the measured width, backgrounds
//! and every other primitive are drawn exactly.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{Blend, draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

use super::{Color, Surface};
use crate::model::ScreenRect;

/// Segments used to approximate a stroked circle.
const CIRCLE_SEGMENTS: usize = 64;

pub struct RasterSurface {
    canvas: Blend<RgbaImage>,
    clear_color: Color,
    dash: Option<[f32; 2]>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Blend(RgbaImage::new(width, height)),
            clear_color: [0, 0, 0, 0],
            dash: None,
        }
    }

    /// Color used by [`Surface::clear`].
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas.0
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas.0
    }

    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.canvas.0.save_with_format(path, image::ImageFormat::Png)
    }

    /// Solid line of the given thickness, drawn as parallel 1px lines.
    fn thick_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let len = (dx * dx + dy * dy).sqrt();
        let passes = width.round().max(1.0) as i32;
        if len == 0.0 || passes == 1 {
            draw_line_segment_mut(&mut self.canvas, from, to, Rgba(color));
            return;
        }

        let (nx, ny) = (-dy / len, dx / len);
        for i in 0..passes {
            let offset = i as f32 - (passes - 1) as f32 / 2.0;
            draw_line_segment_mut(
                &mut self.canvas,
                (from.0 + nx * offset, from.1 + ny * offset),
                (to.0 + nx * offset, to.1 + ny * offset),
                Rgba(color),
            );
        }
    }

    fn polyline(&mut self, points: &[(f32, f32)], color: Color, width: f32) {
        for pair in points.windows(2) {
            self.stroke_line(pair[0], pair[1], color, width);
        }
    }
}

impl Surface for RasterSurface {
    fn clear(&mut self) {
        let color = Rgba(self.clear_color);
        for pixel in self.canvas.0.pixels_mut() {
            *pixel = color;
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: ScreenRect) {
        let width = dest.width.round().max(1.0) as u32;
        let height = dest.height.round().max(1.0) as u32;
        let scaled = imageops::resize(image, width, height, FilterType::Triangle);
        imageops::overlay(
            &mut self.canvas.0,
            &scaled,
            dest.x.round() as i64,
            dest.y.round() as i64,
        );
    }

    fn set_line_dash(&mut self, dash: Option<[f32; 2]>) {
        self.dash = dash.filter(|[on, off]| *on > 0.0 && *off >= 0.0);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        let Some([on, off]) = self.dash else {
            self.thick_line(from, to, color, width);
            return;
        };

        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return;
        }
        let (ux, uy) = (dx / len, dy / len);
        let mut t = 0.0;
        while t < len {
            let end = (t + on).min(len);
            self.thick_line(
                (from.0 + ux * t, from.1 + uy * t),
                (from.0 + ux * end, from.1 + uy * end),
                color,
                width,
            );
            t = end + off;
        }
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color) {
        let mut poly: Vec<Point<i32>> = points
            .iter()
            .map(|(x, y)| Point::new(x.round() as i32, y.round() as i32))
            .collect();
        poly.dedup();
        // imageproc rejects explicitly closed polygons
        if poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }
        if poly.len() < 3 {
            return;
        }
        draw_polygon_mut(&mut self.canvas, &poly, Rgba(color));
    }

    fn stroke_rect(&mut self, rect: ScreenRect, color: Color, width: f32) {
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.x + rect.width, rect.y + rect.height);
        self.polyline(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)], color, width);
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        let width = rect.width.round() as i64;
        let height = rect.height.round() as i64;
        if width < 1 || height < 1 {
            return;
        }
        draw_filled_rect_mut(
            &mut self.canvas,
            Rect::at(rect.x.round() as i32, rect.y.round() as i32).of_size(width as u32, height as u32),
            Rgba(color),
        );
    }

    fn stroke_circle(&mut self, center: (f32, f32), radius: f32, color: Color, width: f32) {
        if radius <= 0.0 {
            return;
        }
        let points: Vec<(f32, f32)> = (0..=CIRCLE_SEGMENTS)
            .map(|i| {
                let theta = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
                (center.0 + radius * theta.cos(), center.1 + radius * theta.sin())
            })
            .collect();
        self.polyline(&points, color, width);
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        draw_filled_circle_mut(
            &mut self.canvas,
            (center.0.round() as i32, center.1.round() as i32),
            radius.round() as i32,
            Rgba(color),
        );
    }

    fn fill_text(&mut self, text: &str, origin: (f32, f32), color: Color, font_size: f32) {
        let width = self.measure_text(text, font_size);
        if width <= 0.0 {
            return;
        }
        let baseline = origin.1 + font_size;
        self.thick_line((origin.0, baseline), (origin.0 + width, baseline), color, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];

    #[test]
    fn test_clear_fills_clear_color() {
        let mut surface = RasterSurface::new(4, 4).with_clear_color([1, 2, 3, 255]);
        surface.clear();
        assert!(surface.image().pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }

    #[test]
    fn test_fill_rect_paints_inside_only() {
        let mut surface = RasterSurface::new(10, 10);
        surface.fill_rect(ScreenRect::new(2.0, 2.0, 3.0, 3.0), RED);
        assert_eq!(surface.image().get_pixel(3, 3).0, RED);
        assert_eq!(surface.image().get_pixel(8, 8).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_dashed_line_leaves_gaps() {
        let mut surface = RasterSurface::new(40, 3);
        surface.set_line_dash(Some([4.0, 4.0]));
        surface.stroke_line((0.0, 1.0), (39.0, 1.0), RED, 1.0);
        assert_eq!(surface.image().get_pixel(1, 1).0, RED);
        assert_eq!(surface.image().get_pixel(6, 1).0, [0, 0, 0, 0]);
        assert_eq!(surface.image().get_pixel(9, 1).0, RED);
    }

    #[test]
    fn test_background_is_scaled_into_bounds() {
        let mut surface = RasterSurface::new(20, 20);
        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        surface.draw_image(&image, ScreenRect::new(5.0, 5.0, 10.0, 10.0));
        let inside = surface.image().get_pixel(10, 10).0;
        assert!(inside[2] > 200 && inside[0] < 50);
        assert_eq!(surface.image().get_pixel(1, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_degenerate_polygon_ignored() {
        let mut surface = RasterSurface::new(5, 5);
        surface.fill_polygon(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)], RED);
        assert!(surface.image().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }
}
