//! Filla Annotate - image annotation editor core
//!
//! Pins, arrows, rectangles, circles and text boxes drawn over a photo, with
//! undo/redo, hit-testing and a debounced autosave. The editor is headless:
//! hosts feed it pointer and key events, draw it onto a [`render::Surface`]
//! and persist the [`autosave::SaveRequest`]s it hands out.

pub mod autosave;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod history;
pub mod interaction;
pub mod keybindings;
pub mod model;
pub mod render;
pub mod session;

pub use autosave::{AutoSaveCoordinator, SaveRequest, SaveStatus, SaveTicket};
pub use config::{EditorConfig, EditorSettings};
pub use editor::{AnnotationEditor, CancelChoice, Clock, CancelOutcome, CancelResolution};
pub use error::{BackgroundError, DocumentError, RenderError, SaveError};
pub use model::{Annotation, AnnotationDocument, AnnotationId, NormPoint, ScreenRect, Shape, Tool};
pub use session::{EditorSession, JsonFileSink, SaveSink};
