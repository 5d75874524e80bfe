//! Frame rendering.
//!
//! [`render_frame`] draws the background image and every annotation onto a
//! [`Surface`]. It reads state and never mutates it; the surface decides what
//! the drawing calls turn into (recorded commands, pixels, ...).

mod background;
mod raster;
mod recording;
mod text;

pub use background::load_background;
pub use raster::RasterSurface;
pub use recording::{DrawCommand, RecordingSurface};
pub use text::{estimate_width, line_height, wrap_text};

use image::RgbaImage;

use crate::constants::{
    ARROW_HEAD_ANGLE, ARROW_HEAD_BASE, FILL_ALPHA, PIN_RADIUS, SELECTION_DASH, SELECTION_PADDING,
    TEXT_BACKGROUND_PADDING,
};
use crate::error::RenderError;
use crate::hit_test::annotation_bounds;
use crate::model::{Annotation, AnnotationId, ScreenRect, Shape, TextBackground};

/// RGBA color.
pub type Color = [u8; 4];

/// Selection highlight color.
pub const SELECTION_COLOR: Color = [0x0E, 0xA5, 0xE9, 0xFF];

/// Soft text background color.
pub const SOFT_BACKGROUND: Color = [0xFF, 0xFF, 0xFF, 0xB3];

/// A canvas-style 2D drawing target.
pub trait Surface {
    /// Clear the whole surface.
    fn clear(&mut self);

    /// Draw `image` scaled into `dest`.
    fn draw_image(&mut self, image: &RgbaImage, dest: ScreenRect);

    /// Dash pattern (on, off) for subsequent strokes; None for solid.
    fn set_line_dash(&mut self, dash: Option<[f32; 2]>);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32);

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color);

    fn stroke_rect(&mut self, rect: ScreenRect, color: Color, width: f32);

    fn fill_rect(&mut self, rect: ScreenRect, color: Color);

    fn stroke_circle(&mut self, center: (f32, f32), radius: f32, color: Color, width: f32);

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Color);

    /// Draw one line of text with its top-left corner at `origin`.
    fn fill_text(&mut self, text: &str, origin: (f32, f32), color: Color, font_size: f32);

    /// Width of `text` at `font_size`.
    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        estimate_width(text, font_size)
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub annotations: &'a [Annotation],
    pub selected: Option<&'a AnnotationId>,
    /// In-progress shape, drawn on top
    pub preview: Option<&'a Annotation>,
    /// Display bounds of the image
    pub bounds: ScreenRect,
    pub image: Option<&'a RgbaImage>,
    pub font_size: f32,
}

/// Draw a full frame.
///
/// Stops at the first annotation with unusable geometry and returns the error;
/// whatever was drawn before stays on the surface.
pub fn render_frame(surface: &mut dyn Surface, frame: &Frame<'_>) -> Result<(), RenderError> {
    surface.clear();
    surface.set_line_dash(None);

    if let Some(image) = frame.image {
        surface.draw_image(image, frame.bounds);
    }

    for ann in frame.annotations {
        draw_annotation(surface, ann, frame)?;
    }

    let selected = frame
        .selected
        .and_then(|id| frame.annotations.iter().find(|a| &a.id == id));
    if let Some(ann) = selected {
        draw_selection(surface, ann, frame);
    }

    if let Some(preview) = frame.preview {
        draw_annotation(surface, preview, frame)?;
    }

    Ok(())
}

fn draw_annotation(surface: &mut dyn Surface, ann: &Annotation, frame: &Frame<'_>) -> Result<(), RenderError> {
    if !ann.has_finite_geometry() {
        return Err(RenderError::InvalidGeometry {
            id: ann.id.clone(),
            reason: "non-finite coordinate".to_string(),
        });
    }

    let bounds = &frame.bounds;
    let color = ann.color.rgba();
    let width = ann.stroke_width.px();
    let pos = bounds.to_absolute(ann.position);

    match &ann.shape {
        Shape::Pin => {
            surface.fill_circle(pos, PIN_RADIUS, color);
            surface.stroke_circle(pos, PIN_RADIUS, [0xFF, 0xFF, 0xFF, 0xFF], 2.0);
            surface.fill_circle(pos, PIN_RADIUS / 4.0, [0xFF, 0xFF, 0xFF, 0xFF]);
        }
        Shape::Arrow { from, to } => {
            let a = bounds.to_absolute(*from);
            let b = bounds.to_absolute(*to);
            surface.stroke_line(a, b, color, width);
            surface.fill_polygon(&arrow_head(a, b, width), color);
        }
        Shape::Rect {
            width: w,
            height: h,
            fill,
        } => {
            let rect = ScreenRect::new(pos.0, pos.1, w * bounds.width, h * bounds.height);
            if let Some(fill) = fill {
                surface.fill_rect(rect, fill.with_alpha(FILL_ALPHA));
            }
            surface.stroke_rect(rect, color, width);
        }
        Shape::Circle { radius, fill } => {
            let r = radius * bounds.min_side();
            if let Some(fill) = fill {
                surface.fill_circle(pos, r, fill.with_alpha(FILL_ALPHA));
            }
            surface.stroke_circle(pos, r, color, width);
        }
        Shape::Text {
            width: w,
            text,
            text_color,
            background,
        } => {
            let max_width = w * bounds.width;
            let font_size = frame.font_size;
            let lines = wrap_text(text, max_width, |s| surface.measure_text(s, font_size));
            let lh = line_height(font_size);

            if *background == TextBackground::Soft && !lines.is_empty() {
                let pad = TEXT_BACKGROUND_PADDING;
                surface.fill_rect(
                    ScreenRect::new(
                        pos.0 - pad,
                        pos.1 - pad,
                        max_width + pad * 2.0,
                        lines.len() as f32 * lh + pad * 2.0,
                    ),
                    SOFT_BACKGROUND,
                );
            }
            for (i, line) in lines.iter().enumerate() {
                surface.fill_text(line, (pos.0, pos.1 + i as f32 * lh), text_color.rgba(), font_size);
            }
        }
    }
    Ok(())
}

fn draw_selection(surface: &mut dyn Surface, ann: &Annotation, frame: &Frame<'_>) {
    let text_height = match &ann.shape {
        Shape::Text { text, width, .. } => {
            let lines = wrap_text(text, width * frame.bounds.width, |s| {
                surface.measure_text(s, frame.font_size)
            });
            lines.len().max(1) as f32 * line_height(frame.font_size)
        }
        _ => 0.0,
    };
    let rect = annotation_bounds(ann, &frame.bounds, text_height).expanded(SELECTION_PADDING);

    surface.set_line_dash(Some(SELECTION_DASH));
    surface.stroke_rect(rect, SELECTION_COLOR, 2.0);
    surface.set_line_dash(None);
}

/// Triangle for an arrowhead pointing at `to`.
pub fn arrow_head(from: (f32, f32), to: (f32, f32), stroke_width: f32) -> [(f32, f32); 3] {
    let angle = (to.1 - from.1).atan2(to.0 - from.0);
    let len = ARROW_HEAD_BASE + stroke_width * 2.0;
    [
        to,
        (
            to.0 - len * (angle - ARROW_HEAD_ANGLE).cos(),
            to.1 - len * (angle - ARROW_HEAD_ANGLE).sin(),
        ),
        (
            to.0 - len * (angle + ARROW_HEAD_ANGLE).cos(),
            to.1 - len * (angle + ARROW_HEAD_ANGLE).sin(),
        ),
    ]
}
