//! JSON document holding the annotations of one image.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::annotation::Annotation;
use crate::error::DocumentError;

/// Current annotation document format version.
/// Increment this when making breaking changes to the document format.
pub const DOCUMENT_VERSION: u32 = 1;

/// The annotation set of a single image, as exchanged with the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    /// Version of the document format
    pub version: u32,
    /// Image the annotations belong to
    pub image_url: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl AnnotationDocument {
    pub fn new(image_url: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            image_url: image_url.into(),
            annotations,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a document, rejecting versions newer than this build understands.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(json)?;
        if doc.version > DOCUMENT_VERSION {
            return Err(DocumentError::VersionTooNew {
                file_version: doc.version,
                supported_version: DOCUMENT_VERSION,
            });
        }
        Ok(doc)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path)?;
        let doc = Self::from_json(&json)?;
        log::debug!(
            "Loaded {} annotations for '{}' from {:?}",
            doc.annotations.len(),
            doc.image_url,
            path
        );
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NormPoint, Shape, ShapeStyle, StrokeColor, TextBackground};

    #[test]
    fn test_document_json() {
        let style = ShapeStyle::default();
        let doc = AnnotationDocument::new(
            "photos/kitchen.jpg",
            vec![
                Annotation::new(Shape::Pin, NormPoint::new(0.1, 0.2), &style),
                Annotation::new(
                    Shape::Text {
                        width: 0.3,
                        text: "Leak under sink".to_string(),
                        text_color: StrokeColor::Black,
                        background: TextBackground::Soft,
                    },
                    NormPoint::new(0.4, 0.4),
                    &style,
                ),
            ],
        );

        let json = doc.to_json().expect("Failed to export JSON");
        assert!(json.contains("photos/kitchen.jpg"));
        assert!(json.contains("\"soft\""));

        let parsed = AnnotationDocument::from_json(&json).expect("Failed to import JSON");
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = r#"{"version": 99, "image_url": "x.png", "annotations": []}"#;
        let err = AnnotationDocument::from_json(json).unwrap_err();
        assert!(matches!(err, DocumentError::VersionTooNew { file_version: 99, .. }));
    }

    #[test]
    fn test_missing_annotations_defaults_empty() {
        let json = r#"{"version": 1, "image_url": "x.png"}"#;
        let doc = AnnotationDocument::from_json(json).expect("parse");
        assert!(doc.annotations.is_empty());
    }
}
