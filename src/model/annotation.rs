//! Annotation types and data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::NormPoint;

/// Stable identifier for an annotation.
///
/// Newly drawn annotations get a random UUID; identifiers supplied by the
/// host (e.g. loaded from storage) are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnnotationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed stroke/fill palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeColor {
    #[default]
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Black,
    White,
}

impl StrokeColor {
    /// RGBA value used when drawing.
    pub fn rgba(&self) -> [u8; 4] {
        match self {
            StrokeColor::Red => [0xEF, 0x44, 0x44, 0xFF],
            StrokeColor::Orange => [0xF9, 0x73, 0x16, 0xFF],
            StrokeColor::Yellow => [0xEA, 0xB3, 0x08, 0xFF],
            StrokeColor::Green => [0x22, 0xC5, 0x5E, 0xFF],
            StrokeColor::Blue => [0x3B, 0x82, 0xF6, 0xFF],
            StrokeColor::Purple => [0xA8, 0x55, 0xF7, 0xFF],
            StrokeColor::Black => [0x11, 0x18, 0x27, 0xFF],
            StrokeColor::White => [0xFF, 0xFF, 0xFF, 0xFF],
        }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(&self, alpha: u8) -> [u8; 4] {
        let [r, g, b, _] = self.rgba();
        [r, g, b, alpha]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrokeColor::Red => "Red",
            StrokeColor::Orange => "Orange",
            StrokeColor::Yellow => "Yellow",
            StrokeColor::Green => "Green",
            StrokeColor::Blue => "Blue",
            StrokeColor::Purple => "Purple",
            StrokeColor::Black => "Black",
            StrokeColor::White => "White",
        }
    }

    /// Get all palette entries in display order.
    pub fn all() -> &'static [StrokeColor] {
        &[
            StrokeColor::Red,
            StrokeColor::Orange,
            StrokeColor::Yellow,
            StrokeColor::Green,
            StrokeColor::Blue,
            StrokeColor::Purple,
            StrokeColor::Black,
            StrokeColor::White,
        ]
    }
}

/// Stroke thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeWidth {
    Thin,
    #[default]
    Medium,
    Bold,
}

impl StrokeWidth {
    /// Line width in screen pixels.
    pub fn px(&self) -> f32 {
        match self {
            StrokeWidth::Thin => 2.0,
            StrokeWidth::Medium => 4.0,
            StrokeWidth::Bold => 6.0,
        }
    }
}

/// Background drawn behind a text annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBackground {
    #[default]
    None,
    /// Translucent white box behind the text
    Soft,
}

/// Drawing tools. "No tool" (selection/drag mode) is represented as `None`
/// wherever an `Option<Tool>` appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Pin,
    Arrow,
    Rect,
    Circle,
    Text,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pin => "Pin",
            Tool::Arrow => "Arrow",
            Tool::Rect => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Text => "Text",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::Pin, Tool::Arrow, Tool::Rect, Tool::Circle, Tool::Text]
    }

    /// Pins are placed with a single press; every other tool is dragged out.
    pub fn is_single_press(&self) -> bool {
        matches!(self, Tool::Pin)
    }
}

/// Per-variant geometry. All sizes are normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// Point marker at the annotation position.
    Pin,
    /// Arrow from `from` to `to`; `from` coincides with the position when drawn.
    Arrow { from: NormPoint, to: NormPoint },
    /// Rectangle anchored at its top-left corner.
    Rect {
        width: f32,
        height: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<StrokeColor>,
    },
    /// Circle centred on the position; radius is relative to the shorter
    /// image side.
    Circle {
        radius: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<StrokeColor>,
    },
    /// Word-wrapped text box anchored at its top-left corner.
    Text {
        width: f32,
        text: String,
        text_color: StrokeColor,
        #[serde(default)]
        background: TextBackground,
    },
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Pin => "pin",
            Shape::Arrow { .. } => "arrow",
            Shape::Rect { .. } => "rect",
            Shape::Circle { .. } => "circle",
            Shape::Text { .. } => "text",
        }
    }

    /// The tool that draws this shape.
    pub fn tool(&self) -> Tool {
        match self {
            Shape::Pin => Tool::Pin,
            Shape::Arrow { .. } => Tool::Arrow,
            Shape::Rect { .. } => Tool::Rect,
            Shape::Circle { .. } => Tool::Circle,
            Shape::Text { .. } => Tool::Text,
        }
    }
}

/// Style applied to newly drawn annotations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub color: StrokeColor,
    pub stroke_width: StrokeWidth,
    /// Fill for rectangles and circles
    #[serde(default)]
    pub fill: Option<StrokeColor>,
    #[serde(default)]
    pub text_color: StrokeColor,
    #[serde(default)]
    pub text_background: TextBackground,
}

/// A single annotation overlaid on the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    /// Incremented by exactly one every time the annotation is persisted.
    pub version: u32,
    /// Normalized anchor position
    pub position: NormPoint,
    pub color: StrokeColor,
    pub stroke_width: StrokeWidth,
    pub shape: Shape,
}

impl Annotation {
    /// Create a new annotation with a fresh id at version 1.
    pub fn new(shape: Shape, position: NormPoint, style: &ShapeStyle) -> Self {
        Self::with_id(AnnotationId::generate(), shape, position, style)
    }

    pub fn with_id(id: AnnotationId, shape: Shape, position: NormPoint, style: &ShapeStyle) -> Self {
        Self {
            id,
            version: 1,
            position,
            color: style.color,
            stroke_width: style.stroke_width,
            shape,
        }
    }

    /// Copy with the version incremented by one, saturating at `u32::MAX`.
    pub fn bumped(&self) -> Self {
        Self {
            version: self.version.saturating_add(1),
            ..self.clone()
        }
    }

    /// Copy moved by a normalized delta.
    ///
    /// Arrows move both endpoints with the anchor. The delta is limited so every
    /// anchor point stays inside [0, 1], which keeps the shape intact at the
    /// image edges.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let anchors = self.anchor_points();
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in &anchors {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let dx = dx.max(-min_x).min(1.0 - max_x);
        let dy = dy.max(-min_y).min(1.0 - max_y);

        let mut moved = self.clone();
        moved.position = self.position.offset(dx, dy).clamped();
        if let Shape::Arrow { from, to } = &mut moved.shape {
            *from = from.offset(dx, dy).clamped();
            *to = to.offset(dx, dy).clamped();
        }
        moved
    }

    /// Points that move when the annotation is dragged.
    pub fn anchor_points(&self) -> Vec<NormPoint> {
        match &self.shape {
            Shape::Arrow { from, to } => vec![self.position, *from, *to],
            _ => vec![self.position],
        }
    }

    /// Check all geometry for NaN/infinite values.
    pub fn has_finite_geometry(&self) -> bool {
        let sizes_ok = match &self.shape {
            Shape::Pin => true,
            Shape::Arrow { from, to } => from.is_finite() && to.is_finite(),
            Shape::Rect { width, height, .. } => width.is_finite() && height.is_finite(),
            Shape::Circle { radius, .. } => radius.is_finite(),
            Shape::Text { width, .. } => width.is_finite(),
        };
        sizes_ok && self.position.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrow(from: (f32, f32), to: (f32, f32)) -> Annotation {
        let from = NormPoint::new(from.0, from.1);
        let to = NormPoint::new(to.0, to.1);
        Annotation::with_id(
            "a1".into(),
            Shape::Arrow { from, to },
            from,
            &ShapeStyle::default(),
        )
    }

    #[test]
    fn test_translate_arrow_moves_both_endpoints() {
        let moved = arrow((0.2, 0.2), (0.4, 0.5)).translated(0.1, -0.1);
        let Shape::Arrow { from, to } = moved.shape else {
            panic!("Expected Arrow shape");
        };
        assert!((from.x - 0.3).abs() < 1e-6 && (from.y - 0.1).abs() < 1e-6);
        assert!((to.x - 0.5).abs() < 1e-6 && (to.y - 0.4).abs() < 1e-6);
        assert_eq!(moved.position, from);
    }

    #[test]
    fn test_translate_arrow_at_edge_preserves_shape() {
        let original = arrow((0.7, 0.5), (0.9, 0.6));
        let moved = original.translated(0.5, 0.0);
        let Shape::Arrow { from, to } = moved.shape else {
            panic!("Expected Arrow shape");
        };
        assert!((to.x - 1.0).abs() < 1e-6);
        assert!(((to.x - from.x) - 0.2).abs() < 1e-5);
        assert!(((to.y - from.y) - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_translate_clamps_position() {
        let pin = Annotation::with_id(
            "p".into(),
            Shape::Pin,
            NormPoint::new(0.5, 0.5),
            &ShapeStyle::default(),
        );
        let moved = pin.translated(-3.0, 12.0);
        assert_eq!(moved.position, NormPoint::new(0.0, 1.0));
    }

    #[test]
    fn test_bumped_keeps_identity() {
        let pin = Annotation::new(Shape::Pin, NormPoint::new(0.1, 0.1), &ShapeStyle::default());
        let bumped = pin.bumped();
        assert_eq!(bumped.id, pin.id);
        assert_eq!(bumped.version, pin.version + 1);
    }

    #[test]
    fn test_bump_at_max_version_saturates() {
        let mut pin = Annotation::new(Shape::Pin, NormPoint::new(0.1, 0.1), &ShapeStyle::default());
        pin.version = u32::MAX;
        assert_eq!(pin.bumped().version, u32::MAX);
    }

    #[test]
    fn test_shape_json_is_tagged() {
        let rect = Shape::Rect {
            width: 0.2,
            height: 0.1,
            fill: None,
        };
        let json = serde_json::to_string(&rect).expect("serialize");
        assert!(json.contains("\"type\":\"rect\""));
        assert!(!json.contains("fill"));
        let back: Shape = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, rect);
    }
}
