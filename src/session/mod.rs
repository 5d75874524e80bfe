//! Async editor session.
//!
//! Wraps an [`AnnotationEditor`] for hosts running on tokio. A timer task
//! runs the autosave debounce and a worker task performs saves through a
//! [`SaveSink`] one at a time, so input handling never waits on I/O.

mod sink;

pub use sink::{JsonFileSink, SaveFuture, SaveSink};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::autosave::SaveRequest;
use crate::editor::{AnnotationEditor, CancelChoice, CancelOutcome, CancelResolution};
use crate::error::SaveError;
use crate::model::Annotation;

/// A save handed to the worker task.
struct SaveJob {
    request: SaveRequest,
    /// Set when a caller waits for the outcome
    reply: Option<oneshot::Sender<Result<(), SaveError>>>,
}

/// Shared editor plus the background tasks serving it.
pub struct EditorSession {
    editor: Arc<Mutex<AnnotationEditor>>,
    sink: Arc<dyn SaveSink>,
    /// Signalled whenever the live set changes
    changes: Arc<Notify>,
    jobs: mpsc::UnboundedSender<SaveJob>,
    timer: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl EditorSession {
    /// Start the session tasks on the current tokio runtime.
    pub fn spawn(editor: AnnotationEditor, sink: Arc<dyn SaveSink>) -> Self {
        let delay = editor.debounce_delay();
        let editor = Arc::new(Mutex::new(editor));
        let changes = Arc::new(Notify::new());
        let (jobs, job_rx) = mpsc::unbounded_channel();

        let timer = tokio::spawn(debounce_loop(
            Arc::clone(&editor),
            Arc::clone(&changes),
            jobs.clone(),
            delay,
        ));
        let worker = tokio::spawn(save_worker(
            Arc::clone(&editor),
            Arc::clone(&sink),
            Arc::clone(&changes),
            job_rx,
        ));
        log::info!("Editor session started (autosave debounce {:?})", delay);

        Self {
            editor,
            sink,
            changes,
            jobs,
            timer,
            worker,
        }
    }

    /// Run `f` against the editor. Changes restart the autosave debounce.
    pub async fn apply<R>(&self, f: impl FnOnce(&mut AnnotationEditor) -> R) -> R {
        let mut editor = self.editor.lock().await;
        let before = editor.revision();
        let result = f(&mut editor);
        if editor.revision() != before {
            self.changes.notify_one();
        }
        result
    }

    pub async fn annotations(&self) -> Vec<Annotation> {
        self.editor.lock().await.annotations().to_vec()
    }

    /// Save right away and wait for the outcome.
    ///
    /// Returns `Ok(false)` when there was nothing to save.
    pub async fn save_now(&self) -> Result<bool, SaveError> {
        let request = self.editor.lock().await.save();
        let Some(request) = request else {
            return Ok(false);
        };
        self.dispatch(request).await?;
        Ok(true)
    }

    /// Ask to close. With nothing unsaved the sink is told to close right
    /// away; otherwise the host should prompt and call
    /// [`EditorSession::resolve_cancel`].
    pub async fn request_cancel(&self) -> CancelOutcome {
        let outcome = self.editor.lock().await.request_cancel();
        if outcome == CancelOutcome::Close {
            self.close();
        }
        outcome
    }

    /// Act on the user's answer to the unsaved-changes prompt.
    ///
    /// Returns `Ok(true)` when the editor closes; the sink has then been
    /// told to close. A failed save-and-close returns the error and leaves
    /// the editor open.
    pub async fn resolve_cancel(&self, choice: CancelChoice) -> Result<bool, SaveError> {
        let resolution = self.editor.lock().await.resolve_cancel(choice);
        match resolution {
            CancelResolution::Close => {}
            CancelResolution::SaveThenClose(request) => self.dispatch(request).await?,
            CancelResolution::KeepEditing => return Ok(false),
        }
        self.close();
        Ok(true)
    }

    /// Shared handle to the editor, for hosts that need to hold the lock
    /// across several calls. Call [`EditorSession::notify_changed`] after
    /// editing through it.
    pub fn editor(&self) -> Arc<Mutex<AnnotationEditor>> {
        Arc::clone(&self.editor)
    }

    /// Restart the autosave debounce.
    pub fn notify_changed(&self) {
        self.changes.notify_one();
    }

    fn close(&self) {
        log::debug!("Closing editor session");
        self.sink.cancel();
    }

    async fn dispatch(&self, request: SaveRequest) -> Result<(), SaveError> {
        let (reply, outcome) = oneshot::channel();
        self.jobs
            .send(SaveJob {
                request,
                reply: Some(reply),
            })
            .map_err(|_| SaveError::Cancelled)?;
        outcome.await.map_err(|_| SaveError::Cancelled)?
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        log::debug!("Shutting down editor session");
        self.timer.abort();
        self.worker.abort();
    }
}

/// Wait for a change, then for a quiet period, then start an autosave.
async fn debounce_loop(
    editor: Arc<Mutex<AnnotationEditor>>,
    changes: Arc<Notify>,
    jobs: mpsc::UnboundedSender<SaveJob>,
    delay: Duration,
) {
    loop {
        changes.notified().await;

        // Every further change restarts the quiet period
        loop {
            tokio::select! {
                _ = tokio::time::sleep(delay) => break,
                _ = changes.notified() => {}
            }
        }

        let request = editor.lock().await.take_autosave();
        let Some(request) = request else {
            continue;
        };
        if jobs.send(SaveJob { request, reply: None }).is_err() {
            log::debug!("Save worker gone, debounce timer exiting");
            break;
        }
    }
}

/// Perform queued saves in order and report each outcome to the editor.
async fn save_worker(
    editor: Arc<Mutex<AnnotationEditor>>,
    sink: Arc<dyn SaveSink>,
    changes: Arc<Notify>,
    mut jobs: mpsc::UnboundedReceiver<SaveJob>,
) {
    while let Some(SaveJob { request, reply }) = jobs.recv().await {
        let SaveRequest {
            ticket,
            annotations,
            is_autosave,
        } = request;
        let result = sink.save(annotations, is_autosave).await;

        let retry = {
            let mut editor = editor.lock().await;
            editor.complete_save(ticket, &result);
            editor.autosave_enabled() && editor.has_unsaved_changes()
        };
        // Edits made while saving, or a failed save, need another round
        if retry {
            changes.notify_one();
        }

        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }
    log::debug!("Save queue closed, worker exiting");
}

#[cfg(test)]
mod tests;
