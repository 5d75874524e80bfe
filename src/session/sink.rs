//! Destinations for saved annotations.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::error::SaveError;
use crate::model::{Annotation, AnnotationDocument};

/// Boxed future returned by [`SaveSink::save`].
pub type SaveFuture = Pin<Box<dyn Future<Output = Result<(), SaveError>> + Send + 'static>>;

/// Persists annotation sets on behalf of an editor session.
///
/// Implementations receive every annotation with its version already
/// incremented. A save that never resolves leaves the session in the saving
/// state; sinks are expected to apply their own timeouts.
pub trait SaveSink: Send + Sync + 'static {
    fn save(&self, annotations: Vec<Annotation>, is_autosave: bool) -> SaveFuture;

    /// The editor should close without further action. Called once the
    /// session decides to close, after any final save has succeeded.
    fn cancel(&self) {}
}

/// Writes the annotation document as pretty JSON to a file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    image_url: String,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>, image_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            image_url: image_url.into(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SaveSink for JsonFileSink {
    fn save(&self, annotations: Vec<Annotation>, is_autosave: bool) -> SaveFuture {
        let path = self.path.clone();
        let document = AnnotationDocument::new(self.image_url.clone(), annotations);
        Box::pin(async move {
            let json = document.to_json()?;
            tokio::fs::write(&path, json).await?;
            log::debug!(
                "Wrote {} annotations to {:?} (autosave: {})",
                document.annotations.len(),
                path,
                is_autosave
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NormPoint, Shape, ShapeStyle};

    #[tokio::test]
    async fn test_json_file_sink_writes_document() {
        let path = std::env::temp_dir().join(format!("filla-sink-{}.json", std::process::id()));
        let sink = JsonFileSink::new(&path, "photos/kitchen.jpg");
        let pin = Annotation::with_id(
            "a".into(),
            Shape::Pin,
            NormPoint::new(0.25, 0.75),
            &ShapeStyle::default(),
        );

        sink.save(vec![pin.clone()], false).await.expect("save");

        let loaded = AnnotationDocument::load(&path).expect("load");
        assert_eq!(loaded.image_url, "photos/kitchen.jpg");
        assert_eq!(loaded.annotations, vec![pin]);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_unwritable_path_is_io_error() {
        let sink = JsonFileSink::new("/definitely/not/a/dir/out.json", "img.png");
        let err = sink.save(Vec::new(), true).await.unwrap_err();
        assert!(matches!(err, SaveError::Io(_)));
    }
}
