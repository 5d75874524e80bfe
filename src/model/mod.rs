//! Data models for the annotation editor.

mod annotation;
mod document;
mod geometry;

pub use annotation::{
    Annotation, AnnotationId, Shape, ShapeStyle, StrokeColor, StrokeWidth, TextBackground, Tool,
};
pub use document::{AnnotationDocument, DOCUMENT_VERSION};
pub use geometry::{NormPoint, ScreenRect};
