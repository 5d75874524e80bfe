//! Pointer interaction state machine.
//!
//! Tracks the armed tool, the shape being dragged out, and the annotation
//! being moved. The editor owns the annotation list; this module only builds
//! and measures the in-progress shapes.

use crate::config::EditorSettings;
use crate::model::{Annotation, AnnotationId, NormPoint, ScreenRect, Shape, ShapeStyle, Tool};

/// Current pointer interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    /// No tool armed, pointer up.
    #[default]
    Idle,
    /// Tool armed, waiting for the first press.
    ToolSelected(Tool),
    /// Press with a tool armed; `preview` follows the pointer.
    Drawing {
        tool: Tool,
        start: NormPoint,
        preview: Annotation,
    },
    /// Press on an existing annotation; it follows the pointer.
    Dragging {
        id: AnnotationId,
        /// Pointer position minus annotation position at press time
        grab_offset: (f32, f32),
        /// Whether the annotation actually moved
        moved: bool,
    },
}

impl InteractionState {
    /// The tool that is armed or being drawn with.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            InteractionState::ToolSelected(tool) | InteractionState::Drawing { tool, .. } => {
                Some(*tool)
            }
            InteractionState::Idle | InteractionState::Dragging { .. } => None,
        }
    }

    /// The live preview shape, if a draw is in progress.
    pub fn preview(&self) -> Option<&Annotation> {
        match self {
            InteractionState::Drawing { preview, .. } => Some(preview),
            _ => None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, InteractionState::Drawing { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::Dragging { .. })
    }
}

/// Build the zero-size preview for a press at `start`.
pub fn start_preview(tool: Tool, start: NormPoint, style: &ShapeStyle, default_text: &str) -> Annotation {
    let shape = match tool {
        Tool::Pin => Shape::Pin,
        Tool::Arrow => Shape::Arrow {
            from: start,
            to: start,
        },
        Tool::Rect => Shape::Rect {
            width: 0.0,
            height: 0.0,
            fill: style.fill,
        },
        Tool::Circle => Shape::Circle {
            radius: 0.0,
            fill: style.fill,
        },
        Tool::Text => Shape::Text {
            width: 0.0,
            text: default_text.to_string(),
            text_color: style.text_color,
            background: style.text_background,
        },
    };
    Annotation::new(shape, start, style)
}

/// Reshape `preview` for the pointer at `current` (clamped to the image).
///
/// Rectangles and text boxes are re-anchored at their top-left corner when
/// dragged up or left of the start point.
pub fn update_preview(preview: &mut Annotation, start: NormPoint, current: NormPoint, bounds: &ScreenRect) {
    let current = current.clamped();
    match &mut preview.shape {
        Shape::Pin => preview.position = current,
        Shape::Arrow { from, to } => {
            *from = start;
            *to = current;
            preview.position = start;
        }
        Shape::Rect { width, height, .. } => {
            preview.position = NormPoint::new(start.x.min(current.x), start.y.min(current.y));
            *width = (current.x - start.x).abs();
            *height = (current.y - start.y).abs();
        }
        Shape::Circle { radius, .. } => {
            let dx = (current.x - start.x) * bounds.width;
            let dy = (current.y - start.y) * bounds.height;
            let min_side = bounds.min_side();
            *radius = if min_side > 0.0 {
                ((dx * dx + dy * dy).sqrt() / min_side).clamp(0.0, 1.0)
            } else {
                0.0
            };
            preview.position = start;
        }
        Shape::Text { width, .. } => {
            preview.position = NormPoint::new(start.x.min(current.x), start.y);
            *width = (current.x - start.x).abs();
        }
    }
}

/// Whether a finished shape is large enough to keep.
pub fn meets_minimum_size(ann: &Annotation, settings: &EditorSettings) -> bool {
    match &ann.shape {
        Shape::Pin => true,
        Shape::Arrow { from, to } => from.distance_to(to) >= settings.min_arrow_length,
        Shape::Rect { width, height, .. } => {
            *width >= settings.min_rect_size && *height >= settings.min_rect_size
        }
        Shape::Circle { radius, .. } => *radius >= settings.min_circle_radius,
        Shape::Text { width, .. } => *width >= settings.min_text_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ScreenRect {
        ScreenRect::new(0.0, 0.0, 1000.0, 1000.0)
    }

    fn drawn(tool: Tool, start: (f32, f32), end: (f32, f32)) -> Annotation {
        let start = NormPoint::new(start.0, start.1);
        let mut preview = start_preview(tool, start, &ShapeStyle::default(), "Text");
        update_preview(&mut preview, start, NormPoint::new(end.0, end.1), &bounds());
        preview
    }

    #[test]
    fn test_rect_dragged_up_left_is_reanchored() {
        let rect = drawn(Tool::Rect, (0.6, 0.7), (0.2, 0.3));
        assert!((rect.position.x - 0.2).abs() < 1e-6);
        assert!((rect.position.y - 0.3).abs() < 1e-6);
        let Shape::Rect { width, height, .. } = rect.shape else {
            panic!("Expected Rect shape");
        };
        assert!((width - 0.4).abs() < 1e-6);
        assert!((height - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_circle_radius_is_distance() {
        let circle = drawn(Tool::Circle, (0.3, 0.3), (0.35, 0.35));
        let Shape::Circle { radius, .. } = circle.shape else {
            panic!("Expected Circle shape");
        };
        assert!((radius - 0.0707).abs() < 1e-3);
        assert_eq!(circle.position, NormPoint::new(0.3, 0.3));
    }

    #[test]
    fn test_arrow_follows_pointer_and_clamps() {
        let arrow = drawn(Tool::Arrow, (0.5, 0.5), (1.4, -0.2));
        let Shape::Arrow { from, to } = arrow.shape else {
            panic!("Expected Arrow shape");
        };
        assert_eq!(from, NormPoint::new(0.5, 0.5));
        assert_eq!(to, NormPoint::new(1.0, 0.0));
    }

    #[test]
    fn test_text_width_tracks_horizontal_distance() {
        let text = drawn(Tool::Text, (0.4, 0.4), (0.7, 0.9));
        let Shape::Text { width, .. } = &text.shape else {
            panic!("Expected Text shape");
        };
        assert!((width - 0.3).abs() < 1e-6);
        assert_eq!(text.position.y, 0.4);
    }

    #[test]
    fn test_minimum_sizes() {
        let settings = EditorSettings::default();
        assert!(!meets_minimum_size(&drawn(Tool::Rect, (0.5, 0.5), (0.49, 0.49)), &settings));
        assert!(!meets_minimum_size(&drawn(Tool::Rect, (0.5, 0.5), (0.7, 0.505)), &settings));
        assert!(meets_minimum_size(&drawn(Tool::Rect, (0.5, 0.5), (0.7, 0.7)), &settings));
        assert!(!meets_minimum_size(&drawn(Tool::Circle, (0.5, 0.5), (0.505, 0.5)), &settings));
        assert!(!meets_minimum_size(&drawn(Tool::Text, (0.5, 0.5), (0.52, 0.5)), &settings));
        assert!(meets_minimum_size(&drawn(Tool::Text, (0.5, 0.5), (0.6, 0.5)), &settings));
        assert!(!meets_minimum_size(&drawn(Tool::Arrow, (0.5, 0.5), (0.5, 0.5)), &settings));
    }

    #[test]
    fn test_state_tool_accessor() {
        assert_eq!(InteractionState::Idle.tool(), None);
        assert_eq!(InteractionState::ToolSelected(Tool::Rect).tool(), Some(Tool::Rect));
    }
}
