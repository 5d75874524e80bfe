//! The annotation editor.
//!
//! [`AnnotationEditor`] owns the live annotation set and routes pointer and
//! keyboard input through the interaction state machine. Every committed
//! change is recorded in the undo history and re-arms the autosave debounce.
//! Saving itself is left to the host: the editor hands out [`SaveRequest`]s
//! and is told about the outcome through [`AnnotationEditor::complete_save`].

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use web_time::Instant;

use crate::autosave::{AutoSaveCoordinator, SaveRequest, SaveStatus, SaveTicket};
use crate::config::EditorSettings;
use crate::constants::DEFAULT_CANVAS_SIZE;
use crate::error::SaveError;
use crate::hit_test::{HitTolerance, hit_test};
use crate::history::{History, HistoryConfig};
use crate::interaction::{self, InteractionState};
use crate::keybindings::{EditorCommand, Key, KeyBindings, Modifiers};
use crate::model::{
    Annotation, AnnotationId, NormPoint, ScreenRect, Shape, ShapeStyle, StrokeColor, StrokeWidth,
    TextBackground, Tool,
};
use crate::render::{Frame, Surface, load_background, render_frame};


/// Result of asking to close the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Nothing unsaved; the host can close right away.
    Close,
    /// Unsaved changes exist; ask the user what to do.
    ConfirmUnsaved,
}

/// The user's answer to the unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelChoice {
    Discard,
    SaveAndClose,
    KeepEditing,
}

/// What the host should do after the prompt was answered.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelResolution {
    Close,
    /// Perform this save and close once it succeeds.
    SaveThenClose(SaveRequest),
    KeepEditing,
}

/// Time source for autosave deadlines and the saved indicator.
pub type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

/// Annotation editor state for one image.
pub struct AnnotationEditor {
    image_url: String,
    image: Option<RgbaImage>,
    canvas_size: (u32, u32),
    bounds: ScreenRect,

    /// Annotations the editor was opened with
    initial: Vec<Annotation>,
    annotations: Vec<Annotation>,
    selected: Option<AnnotationId>,
    interaction: InteractionState,
    /// Style applied to newly drawn shapes
    style: ShapeStyle,

    history: History<Vec<Annotation>>,
    autosave: AutoSaveCoordinator,
    clock: Clock,
    settings: EditorSettings,
    keybindings: KeyBindings,

    /// Bumped on every change to the live set
    revision: u64,
    confirming_cancel: bool,
}

impl AnnotationEditor {
    pub fn new(image_url: impl Into<String>, initial: Vec<Annotation>, settings: EditorSettings) -> Self {
        let history = History::with_config(
            initial.clone(),
            HistoryConfig {
                max_entries: settings.history_limit,
            },
        );
        let mut autosave = AutoSaveCoordinator::new(initial.clone())
            .with_debounce_delay(settings.autosave_debounce())
            .with_saved_display(settings.saved_status_display());
        autosave.set_enabled(settings.autosave_enabled);

        let (width, height) = DEFAULT_CANVAS_SIZE;
        let image_url = image_url.into();
        log::info!(
            "📝 Opened editor for {} with {} annotations",
            image_url,
            initial.len()
        );

        Self {
            image_url,
            image: None,
            canvas_size: DEFAULT_CANVAS_SIZE,
            bounds: ScreenRect::new(0.0, 0.0, width as f32, height as f32),
            annotations: initial.clone(),
            initial,
            selected: None,
            interaction: InteractionState::Idle,
            style: settings.default_style,
            history,
            autosave,
            clock: Arc::new(Instant::now),
            settings,
            keybindings: KeyBindings::default(),
            revision: 0,
            confirming_cancel: false,
        }
    }

    /// Replace the wall clock, e.g. with a manual one in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> Instant {
        (self.clock)()
    }

    // =========================================================================
    // Image and layout
    // =========================================================================

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, image: RgbaImage) {
        self.image = Some(image);
        self.update_bounds();
    }

    /// Load the background from disk.
    ///
    /// On failure the editor keeps working without a background and the error
    /// is logged. Returns whether an image was loaded.
    pub fn load_image(&mut self, path: &Path) -> bool {
        match load_background(path) {
            Ok(image) => {
                self.set_image(image);
                true
            }
            Err(e) => {
                log::warn!("⚠️ Failed to load background {:?}: {}", path, e);
                self.image = None;
                self.update_bounds();
                false
            }
        }
    }

    /// Resize the drawing area. The image is re-fitted into it.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas_size = (width, height);
        self.update_bounds();
    }

    /// Override the image display bounds for hosts that lay out the image
    /// themselves. Reset by the next canvas resize or image change.
    pub fn set_bounds(&mut self, bounds: ScreenRect) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> ScreenRect {
        self.bounds
    }

    fn update_bounds(&mut self) {
        let (canvas_w, canvas_h) = self.canvas_size;
        let (image_w, image_h) = self
            .image
            .as_ref()
            .map(|img| img.dimensions())
            .unwrap_or((0, 0));
        self.bounds = ScreenRect::fit(image_w, image_h, canvas_w, canvas_h);
    }

    // =========================================================================
    // State queries
    // =========================================================================

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn selected_id(&self) -> Option<&AnnotationId> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&Annotation> {
        let id = self.selected.as_ref()?;
        self.annotations.iter().find(|a| &a.id == id)
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// The armed tool, if any.
    pub fn active_tool(&self) -> Option<Tool> {
        self.interaction.tool()
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        self.keybindings = keybindings;
    }

    /// Counter that increases with every change to the live set.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.autosave.has_unsaved_changes(&self.annotations)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status(self.now())
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave.is_enabled()
    }

    pub fn set_autosave_enabled(&mut self, enabled: bool) {
        self.autosave.set_enabled(enabled);
    }

    /// Whether the unsaved-changes prompt is showing.
    pub fn is_confirming_cancel(&self) -> bool {
        self.confirming_cancel
    }

    // =========================================================================
    // Tools and pointer input
    // =========================================================================

    /// Arm a tool, or disarm with None. Cancels an in-progress draw.
    pub fn select_tool(&mut self, tool: Option<Tool>) {
        if self.interaction.is_drawing() {
            log::trace!("Cancelled in-progress shape");
        }
        self.finish_drag();
        self.interaction = match tool {
            Some(tool) => InteractionState::ToolSelected(tool),
            None => InteractionState::Idle,
        };
        log::debug!("Tool: {:?}", tool.map(|t| t.name()));
    }

    pub fn clear_tool(&mut self) {
        self.select_tool(None);
    }

    /// Pointer pressed at screen position `(x, y)`.
    pub fn pointer_down(&mut self, x: f32, y: f32, pointer: HitTolerance) {
        let point = self.bounds.to_normalized(x, y);
        match self.interaction {
            InteractionState::ToolSelected(tool) if tool.is_single_press() => {
                let pin = Annotation::new(Shape::Pin, point.clamped(), &self.style);
                self.add_annotation(pin);
            }
            InteractionState::ToolSelected(tool) => {
                let start = point.clamped();
                let preview =
                    interaction::start_preview(tool, start, &self.style, &self.settings.default_text);
                self.interaction = InteractionState::Drawing { tool, start, preview };
            }
            InteractionState::Idle => {
                let tolerance = self.tolerance(pointer);
                let hit = hit_test(&self.annotations, x, y, &self.bounds, tolerance)
                    .map(|ann| (ann.id.clone(), ann.position));
                match hit {
                    Some((id, position)) => {
                        log::trace!("Selected annotation {}", id);
                        self.selected = Some(id.clone());
                        self.interaction = InteractionState::Dragging {
                            id,
                            grab_offset: (point.x - position.x, point.y - position.y),
                            moved: false,
                        };
                    }
                    None => self.selected = None,
                }
            }
            // Second press without a release; the gesture in progress wins.
            InteractionState::Drawing { .. } | InteractionState::Dragging { .. } => {}
        }
    }

    /// Pointer moved to screen position `(x, y)`.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let point = self.bounds.to_normalized(x, y);
        let bounds = self.bounds;
        let mut changed = false;

        match &mut self.interaction {
            InteractionState::Drawing { start, preview, .. } => {
                interaction::update_preview(preview, *start, point, &bounds);
            }
            InteractionState::Dragging {
                id,
                grab_offset,
                moved,
            } => {
                let Some(ann) = self.annotations.iter_mut().find(|a| &a.id == id) else {
                    return;
                };
                let dx = point.x - grab_offset.0 - ann.position.x;
                let dy = point.y - grab_offset.1 - ann.position.y;
                let translated = ann.translated(dx, dy);
                if translated != *ann {
                    *ann = translated;
                    *moved = true;
                    changed = true;
                }
            }
            InteractionState::Idle | InteractionState::ToolSelected(_) => {}
        }

        if changed {
            self.note_live_change();
        }
    }

    /// Pointer released at screen position `(x, y)`.
    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.pointer_move(x, y);
        match std::mem::take(&mut self.interaction) {
            InteractionState::Drawing { tool, preview, .. } => {
                if interaction::meets_minimum_size(&preview, &self.settings) {
                    self.add_annotation(preview);
                } else {
                    log::trace!("Discarded {} below minimum size", tool.name());
                    self.interaction = InteractionState::ToolSelected(tool);
                }
            }
            InteractionState::Dragging { moved, .. } => {
                if moved {
                    self.commit();
                }
            }
            other => self.interaction = other,
        }
    }

    fn tolerance(&self, pointer: HitTolerance) -> f32 {
        match pointer {
            HitTolerance::Mouse => self.settings.mouse_hit_tolerance,
            HitTolerance::Touch => self.settings.touch_hit_tolerance,
        }
    }

    /// Append a finished shape, select it and disarm the tool.
    fn add_annotation(&mut self, ann: Annotation) {
        log::debug!("➕ Added {} annotation {}", ann.shape.kind(), ann.id);
        self.selected = Some(ann.id.clone());
        self.annotations.push(ann);
        self.interaction = InteractionState::Idle;
        self.commit();
    }

    /// End a drag, recording it if the annotation moved.
    fn finish_drag(&mut self) {
        if let InteractionState::Dragging { moved: true, .. } = std::mem::take(&mut self.interaction) {
            self.commit();
        }
    }

    /// Finish or drop whatever gesture is in progress before a discrete edit.
    fn settle_interaction(&mut self) {
        match std::mem::take(&mut self.interaction) {
            InteractionState::Dragging { moved, .. } => {
                if moved {
                    self.commit();
                }
            }
            InteractionState::Drawing { tool, .. } => {
                self.interaction = InteractionState::ToolSelected(tool);
            }
            other => self.interaction = other,
        }
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Record the live set as a history step. Returns false if nothing changed.
    fn commit(&mut self) -> bool {
        let recorded = self.history.record(self.annotations.clone());
        if recorded {
            self.note_live_change();
        }
        recorded
    }

    fn note_live_change(&mut self) {
        self.revision += 1;
        let now = self.now();
        self.autosave.note_change(now);
    }

    pub fn undo(&mut self) -> bool {
        self.settle_interaction();
        let Some(state) = self.history.undo() else {
            return false;
        };
        self.annotations = state.clone();
        self.selected = None;
        self.note_live_change();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.settle_interaction();
        let Some(state) = self.history.redo() else {
            return false;
        };
        self.annotations = state.clone();
        self.selected = None;
        self.note_live_change();
        true
    }

    /// Remove the selected annotation.
    pub fn delete_selected(&mut self) -> bool {
        self.settle_interaction();
        let Some(id) = self.selected.take() else {
            return false;
        };
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        if self.annotations.len() == before {
            return false;
        }
        log::debug!("🗑️ Deleted annotation {}", id);
        self.commit()
    }

    /// Restore the annotations the editor was opened with.
    pub fn reset(&mut self) {
        self.settle_interaction();
        self.interaction = InteractionState::Idle;
        self.annotations = self.initial.clone();
        self.selected = None;
        self.commit();
        log::debug!("Reset to {} initial annotations", self.initial.len());
    }

    /// Set the stroke color for new shapes and the selected annotation.
    pub fn set_color(&mut self, color: StrokeColor) {
        self.style.color = color;
        self.update_selected(|ann| ann.color = color);
    }

    pub fn set_stroke_width(&mut self, width: StrokeWidth) {
        self.style.stroke_width = width;
        self.update_selected(|ann| ann.stroke_width = width);
    }

    /// Set the fill for new and selected rectangles and circles.
    pub fn set_fill(&mut self, fill: Option<StrokeColor>) {
        self.style.fill = fill;
        self.update_selected(|ann| {
            if let Shape::Rect { fill: f, .. } | Shape::Circle { fill: f, .. } = &mut ann.shape {
                *f = fill;
            }
        });
    }

    pub fn set_text_color(&mut self, color: StrokeColor) {
        self.style.text_color = color;
        self.update_selected(|ann| {
            if let Shape::Text { text_color, .. } = &mut ann.shape {
                *text_color = color;
            }
        });
    }

    pub fn set_text_background(&mut self, background: TextBackground) {
        self.style.text_background = background;
        self.update_selected(|ann| {
            if let Shape::Text {
                background: bg, ..
            } = &mut ann.shape
            {
                *bg = background;
            }
        });
    }

    /// Replace the content of the selected text annotation.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update_selected(|ann| {
            if let Shape::Text { text: content, .. } = &mut ann.shape {
                *content = text;
            }
        })
    }

    fn update_selected(&mut self, f: impl FnOnce(&mut Annotation)) -> bool {
        self.settle_interaction();
        let Some(id) = &self.selected else {
            return false;
        };
        let Some(ann) = self.annotations.iter_mut().find(|a| &a.id == id) else {
            return false;
        };
        f(ann);
        self.commit()
    }

    // =========================================================================
    // Saving
    // =========================================================================

    /// Explicit save. Returns None when nothing changed since the last save.
    pub fn save(&mut self) -> Option<SaveRequest> {
        self.settle_interaction();
        self.autosave.manual(&self.annotations)
    }

    /// Drive the autosave debounce from the host's frame loop.
    pub fn tick(&mut self) -> Option<SaveRequest> {
        let now = self.now();
        self.autosave.poll(now, &self.annotations)
    }

    /// Start an autosave right away, for hosts that run their own timer.
    pub fn take_autosave(&mut self) -> Option<SaveRequest> {
        self.autosave.fire(&self.annotations)
    }

    pub fn debounce_delay(&self) -> std::time::Duration {
        self.autosave.debounce_delay()
    }

    /// Report the outcome of a save started from a [`SaveRequest`].
    ///
    /// On success the persisted versions are adopted by the live set, the
    /// initial set and the history, so the saved state no longer counts as
    /// unsaved and a later reset keeps counting versions up.
    pub fn complete_save(&mut self, ticket: SaveTicket, result: &Result<(), SaveError>) {
        if let Err(e) = result {
            log::warn!("⚠️ Failed to save annotations: {}", e);
        }
        let now = self.now();
        let Some(saved) = self.autosave.complete(ticket, result.is_ok(), now) else {
            return;
        };
        adopt_versions(&mut self.annotations, &saved);
        adopt_versions(&mut self.initial, &saved);
        self.history.update_entries(|entry| adopt_versions(entry, &saved));
        log::info!("💾 Saved {} annotations", saved.len());
    }

    // =========================================================================
    // Closing
    // =========================================================================

    pub fn request_cancel(&mut self) -> CancelOutcome {
        self.settle_interaction();
        if self.has_unsaved_changes() {
            self.confirming_cancel = true;
            CancelOutcome::ConfirmUnsaved
        } else {
            CancelOutcome::Close
        }
    }

    pub fn resolve_cancel(&mut self, choice: CancelChoice) -> CancelResolution {
        self.confirming_cancel = false;
        match choice {
            CancelChoice::Discard => {
                // The editor is about to close; nothing may be persisted after this.
                self.autosave.cancel();
                self.autosave.set_enabled(false);
                log::debug!("Discarded unsaved changes");
                CancelResolution::Close
            }
            CancelChoice::SaveAndClose => match self.save() {
                Some(request) => CancelResolution::SaveThenClose(request),
                None => CancelResolution::Close,
            },
            CancelChoice::KeepEditing => CancelResolution::KeepEditing,
        }
    }

    // =========================================================================
    // Rendering and keyboard
    // =========================================================================

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            annotations: &self.annotations,
            selected: self.selected.as_ref(),
            preview: self.interaction.preview(),
            bounds: self.bounds,
            image: self.image.as_ref(),
            font_size: self.settings.font_size,
        }
    }

    /// Draw the current state. Rendering errors are logged and the frame is
    /// left partially drawn; returns whether the frame completed.
    pub fn render(&self, surface: &mut dyn Surface) -> bool {
        match render_frame(surface, &self.frame()) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to render frame: {}", e);
                false
            }
        }
    }

    /// Handle a key press. Returns a save request for the save shortcut.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> Option<SaveRequest> {
        let command = self.keybindings.command_for(key, modifiers)?;
        self.apply_command(command)
    }

    pub fn apply_command(&mut self, command: EditorCommand) -> Option<SaveRequest> {
        match command {
            EditorCommand::Undo => {
                self.undo();
            }
            EditorCommand::Redo => {
                self.redo();
            }
            EditorCommand::DeleteSelected => {
                self.delete_selected();
            }
            EditorCommand::Escape => self.escape(),
            EditorCommand::SelectTool(tool) => {
                // Pressing the hotkey of the armed tool disarms it
                if self.active_tool() == Some(tool) {
                    self.select_tool(None);
                } else {
                    self.select_tool(Some(tool));
                }
            }
            EditorCommand::Save => return self.save(),
        }
        None
    }

    fn escape(&mut self) {
        match self.interaction {
            InteractionState::Drawing { .. } | InteractionState::Dragging { .. } => {
                self.settle_interaction()
            }
            InteractionState::ToolSelected(_) => self.interaction = InteractionState::Idle,
            InteractionState::Idle => self.selected = None,
        }
    }

    /// Normalized position of a screen point, unclamped.
    pub fn to_normalized(&self, x: f32, y: f32) -> NormPoint {
        self.bounds.to_normalized(x, y)
    }
}

/// Copy newer persisted versions onto matching annotations.
fn adopt_versions(target: &mut [Annotation], saved: &[Annotation]) {
    for ann in target.iter_mut() {
        if let Some(persisted) = saved.iter().find(|s| s.id == ann.id && s.version > ann.version) {
            ann.version = persisted.version;
        }
    }
}
