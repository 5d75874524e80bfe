//! Error types for the annotation editor.

use thiserror::Error;

use crate::model::AnnotationId;

/// Errors reported by a save sink when persisting annotations.
#[derive(Error, Debug)]
pub enum SaveError {
    /// The host rejected the save (e.g. backend returned an error)
    #[error("Save rejected: {0}")]
    Rejected(String),

    /// I/O error while writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The save was abandoned before completing (session torn down)
    #[error("Save cancelled")]
    Cancelled,
}

impl SaveError {
    /// Create a rejection error with a message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Errors that abort drawing a single frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Annotation contains geometry that cannot be drawn
    #[error("Invalid geometry on annotation {id}: {reason}")]
    InvalidGeometry {
        /// The offending annotation
        id: AnnotationId,
        /// What was wrong with it
        reason: String,
    },

    /// The drawing surface failed
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Errors loading the background image.
#[derive(Error, Debug)]
pub enum BackgroundError {
    /// Image could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Image file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reading or writing annotation documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document format version is newer than supported
    #[error("Document version {file_version} is newer than supported version {supported_version}")]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },
}
