//! Surface that records drawing calls.
//!
//! Hosts with their own canvas (e.g. a browser 2D context) can replay the
//! recorded commands; the serialized form is plain JSON.

use image::RgbaImage;
use serde::Serialize;

use super::{Color, Surface};
use crate::model::ScreenRect;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear,
    /// Background image of `width` x `height` pixels drawn into `dest`
    Image {
        width: u32,
        height: u32,
        dest: ScreenRect,
    },
    LineDash { dash: Option<[f32; 2]> },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        width: f32,
    },
    Polygon {
        points: Vec<(f32, f32)>,
        color: Color,
    },
    StrokeRect {
        rect: ScreenRect,
        color: Color,
        width: f32,
    },
    FillRect {
        rect: ScreenRect,
        color: Color,
    },
    StrokeCircle {
        center: (f32, f32),
        radius: f32,
        color: Color,
        width: f32,
    },
    FillCircle {
        center: (f32, f32),
        radius: f32,
        color: Color,
    },
    Text {
        text: String,
        origin: (f32, f32),
        color: Color,
        font_size: f32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.commands)
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        // A clear makes everything before it invisible
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: ScreenRect) {
        self.commands.push(DrawCommand::Image {
            width: image.width(),
            height: image.height(),
            dest,
        });
    }

    fn set_line_dash(&mut self, dash: Option<[f32; 2]>) {
        self.commands.push(DrawCommand::LineDash { dash });
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_rect(&mut self, rect: ScreenRect, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeRect { rect, color, width });
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_circle(&mut self, center: (f32, f32), radius: f32, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, origin: (f32, f32), color: Color, font_size: f32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            color,
            font_size,
        });
    }
}
