use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::*;
use crate::config::EditorSettings;
use crate::hit_test::HitTolerance;
use crate::model::Tool;

/// In-memory sink that can be told to fail.
#[derive(Default)]
struct MemorySink {
    saved: StdMutex<Vec<(Vec<Annotation>, bool)>>,
    attempts: AtomicUsize,
    fail: AtomicBool,
    closed: AtomicUsize,
}

impl MemorySink {
    fn saves(&self) -> Vec<(Vec<Annotation>, bool)> {
        self.saved.lock().unwrap().clone()
    }
}

impl SaveSink for MemorySink {
    fn save(&self, annotations: Vec<Annotation>, is_autosave: bool) -> SaveFuture {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Box::pin(async { Err(SaveError::rejected("backend offline")) });
        }
        self.saved.lock().unwrap().push((annotations, is_autosave));
        Box::pin(async { Ok(()) })
    }

    fn cancel(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

fn start(sink: &Arc<MemorySink>) -> EditorSession {
    let mut editor = AnnotationEditor::new("img.png", Vec::new(), EditorSettings::default());
    editor.set_canvas_size(1000, 1000);
    let sink: Arc<dyn SaveSink> = sink.clone();
    EditorSession::spawn(editor, sink)
}

fn place_pin(x: f32, y: f32) -> impl FnOnce(&mut AnnotationEditor) {
    move |editor| {
        editor.select_tool(Some(Tool::Pin));
        editor.pointer_down(x, y, HitTolerance::Mouse);
        editor.pointer_up(x, y);
    }
}

/// Let the background tasks run until they block again.
async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

async fn advance(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn test_autosave_after_quiet_period() {
    let sink = Arc::new(MemorySink::default());
    let session = start(&sink);

    session.apply(place_pin(500.0, 500.0)).await;
    settle().await;
    advance(1500).await;
    assert!(sink.saves().is_empty());

    advance(600).await;
    let saves = sink.saves();
    assert_eq!(saves.len(), 1);
    assert!(saves[0].1);
    assert_eq!(saves[0].0[0].version, 2);
    assert!(!session.apply(|e| e.has_unsaved_changes()).await);
}

#[tokio::test(start_paused = true)]
async fn test_changes_restart_the_debounce() {
    let sink = Arc::new(MemorySink::default());
    let session = start(&sink);

    session.apply(place_pin(200.0, 200.0)).await;
    settle().await;
    advance(1500).await;
    session.apply(place_pin(800.0, 800.0)).await;
    settle().await;
    advance(1500).await;
    assert!(sink.saves().is_empty());

    advance(600).await;
    let saves = sink.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].0.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_queries_do_not_trigger_autosave() {
    let sink = Arc::new(MemorySink::default());
    let session = start(&sink);

    session.apply(|e| e.select_tool(Some(Tool::Rect))).await;
    let count = session.annotations().await.len();
    settle().await;
    advance(5000).await;

    assert_eq!(count, 0);
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_save_now() {
    let sink = Arc::new(MemorySink::default());
    let session = start(&sink);

    assert!(!session.save_now().await.expect("nothing to save"));

    session.apply(place_pin(500.0, 500.0)).await;
    assert!(session.save_now().await.expect("saved"));
    let saves = sink.saves();
    assert_eq!(saves.len(), 1);
    assert!(!saves[0].1);

    // The pending debounce finds nothing left to save
    advance(3000).await;
    assert_eq!(sink.saves().len(), 1);
    assert_eq!(session.annotations().await[0].version, 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_autosave_is_retried() {
    let sink = Arc::new(MemorySink::default());
    sink.fail.store(true, Ordering::SeqCst);
    let session = start(&sink);

    session.apply(place_pin(500.0, 500.0)).await;
    settle().await;
    advance(2100).await;
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 1);
    assert!(session.apply(|e| e.has_unsaved_changes()).await);

    sink.fail.store(false, Ordering::SeqCst);
    advance(2100).await;
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(sink.saves().len(), 1);
    assert!(!session.apply(|e| e.has_unsaved_changes()).await);
}

#[tokio::test(start_paused = true)]
async fn test_save_and_close() {
    let sink = Arc::new(MemorySink::default());
    let session = start(&sink);

    session.apply(place_pin(500.0, 500.0)).await;
    assert_eq!(session.request_cancel().await, CancelOutcome::ConfirmUnsaved);
    assert!(session.resolve_cancel(CancelChoice::SaveAndClose).await.expect("saved"));

    let saves = sink.saves();
    assert_eq!(saves.len(), 1);
    assert!(!saves[0].1);
    assert_eq!(sink.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_without_changes_closes_right_away() {
    let sink = Arc::new(MemorySink::default());
    let session = start(&sink);

    assert_eq!(session.request_cancel().await, CancelOutcome::Close);
    assert_eq!(sink.closed.load(Ordering::SeqCst), 1);
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_save_and_close_keeps_editor_open() {
    let sink = Arc::new(MemorySink::default());
    sink.fail.store(true, Ordering::SeqCst);
    let session = start(&sink);

    session.apply(place_pin(500.0, 500.0)).await;
    session.request_cancel().await;
    let err = session.resolve_cancel(CancelChoice::SaveAndClose).await.unwrap_err();

    assert!(matches!(err, SaveError::Rejected(_)));
    assert!(session.apply(|e| e.has_unsaved_changes()).await);
    assert_eq!(sink.closed.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_discard_never_saves() {
    let sink = Arc::new(MemorySink::default());
    let session = start(&sink);

    session.apply(place_pin(500.0, 500.0)).await;
    settle().await;
    assert!(session.resolve_cancel(CancelChoice::Discard).await.expect("closed"));
    assert_eq!(sink.closed.load(Ordering::SeqCst), 1);

    advance(5000).await;
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_keep_editing() {
    let sink = Arc::new(MemorySink::default());
    let session = start(&sink);

    session.apply(place_pin(500.0, 500.0)).await;
    assert!(!session.resolve_cancel(CancelChoice::KeepEditing).await.expect("kept"));
    assert!(session.apply(|e| e.has_unsaved_changes()).await);
    assert_eq!(sink.closed.load(Ordering::SeqCst), 0);
}
