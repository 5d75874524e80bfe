//! Autosave coordinator with debouncing.
//!
//! Tracks the last persisted annotation set, decides when a background save
//! is due and hands out [`SaveRequest`]s. The host performs the actual save and
//! reports back through [`AutoSaveCoordinator::complete`].

use std::time::Duration;
use web_time::Instant;

use crate::model::Annotation;

/// Identifies one dispatched save so late completions can be matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveTicket(u64);

/// A save the host should perform.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub ticket: SaveTicket,
    /// Every annotation with its version already incremented
    pub annotations: Vec<Annotation>,
    /// True for debounced background saves, false for explicit saves
    pub is_autosave: bool,
}

/// Save indicator shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
}

/// Manages autosave timing and the saved baseline.
///
/// A change arms a debounce deadline; every further change pushes it back.
/// Once the deadline passes, a save is due if the live set differs from the
/// last saved set and is not empty.
#[derive(Debug)]
pub struct AutoSaveCoordinator {
    /// Debounce delay (wait this long after last change before saving).
    debounce_delay: Duration,

    /// How long `Saved` stays visible.
    saved_display: Duration,

    /// Whether autosave is enabled.
    enabled: bool,

    /// Annotation set as of the last successful save.
    last_saved: Vec<Annotation>,

    /// When the pending autosave becomes due.
    deadline: Option<Instant>,

    /// Save currently with the host, with the set it will persist.
    in_flight: Option<(SaveTicket, Vec<Annotation>)>,

    /// `Saved` indicator expiry.
    saved_until: Option<Instant>,

    next_ticket: u64,
}

impl AutoSaveCoordinator {
    /// Create a coordinator whose baseline is the initial annotation set.
    pub fn new(baseline: Vec<Annotation>) -> Self {
        Self {
            debounce_delay: crate::constants::AUTOSAVE_DEBOUNCE,
            saved_display: crate::constants::SAVED_STATUS_DISPLAY,
            enabled: true,
            last_saved: baseline,
            deadline: None,
            in_flight: None,
            saved_until: None,
            next_ticket: 1,
        }
    }

    /// Set the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Set how long the saved indicator stays up.
    pub fn with_saved_display(mut self, display: Duration) -> Self {
        self.saved_display = display;
        self
    }

    /// Set whether autosave is enabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.deadline = None;
        }
        log::debug!("Autosave: enabled = {}", enabled);
    }

    /// Check if autosave is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debounce_delay
    }

    /// Restart the debounce window after a change.
    pub fn note_change(&mut self, now: Instant) {
        if self.enabled {
            self.deadline = Some(now + self.debounce_delay);
            log::trace!("Autosave: debounce reset");
        }
    }

    pub fn has_unsaved_changes(&self, live: &[Annotation]) -> bool {
        live != self.last_saved.as_slice()
    }

    pub fn last_saved(&self) -> &[Annotation] {
        &self.last_saved
    }

    /// Whether a debounce deadline is armed.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Check the debounce deadline and start an autosave if one is due.
    pub fn poll(&mut self, now: Instant, live: &[Annotation]) -> Option<SaveRequest> {
        if self.saved_until.is_some_and(|until| now >= until) {
            self.saved_until = None;
        }

        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        // Keep the deadline armed until the running save finishes.
        if self.in_flight.is_some() {
            return None;
        }
        self.fire(live)
    }

    /// Start an autosave now, ignoring the deadline.
    ///
    /// Used by hosts that run their own debounce timer.
    pub fn fire(&mut self, live: &[Annotation]) -> Option<SaveRequest> {
        if !self.enabled || self.in_flight.is_some() {
            return None;
        }
        self.deadline = None;

        if live.is_empty() {
            log::trace!("Autosave: skipped, annotation set is empty");
            return None;
        }
        if !self.has_unsaved_changes(live) {
            log::trace!("Autosave: skipped, nothing changed since last save");
            return None;
        }

        log::debug!("Autosave: saving {} annotations", live.len());
        Some(self.begin(live, true))
    }

    /// Start an explicit save. Returns None when there is nothing to save.
    pub fn manual(&mut self, live: &[Annotation]) -> Option<SaveRequest> {
        if !self.has_unsaved_changes(live) {
            log::debug!("Manual save ignored: no unsaved changes");
            return None;
        }
        log::debug!("Manual save: saving {} annotations", live.len());
        Some(self.begin(live, false))
    }

    fn begin(&mut self, live: &[Annotation], is_autosave: bool) -> SaveRequest {
        let ticket = SaveTicket(self.next_ticket);
        self.next_ticket += 1;

        let annotations: Vec<Annotation> = live.iter().map(Annotation::bumped).collect();
        self.in_flight = Some((ticket, annotations.clone()));
        self.saved_until = None;

        SaveRequest {
            ticket,
            annotations,
            is_autosave,
        }
    }

    /// Report the outcome of a save.
    ///
    /// On success returns the persisted set (with bumped versions), which
    /// becomes the new baseline. On failure the baseline is kept, so changes
    /// stay pending and the debounce is re-armed for another attempt.
    /// Completions for anything but the latest dispatched save are ignored.
    pub fn complete(&mut self, ticket: SaveTicket, succeeded: bool, now: Instant) -> Option<Vec<Annotation>> {
        match &self.in_flight {
            Some((current, _)) if *current == ticket => {}
            _ => {
                log::debug!("Autosave: ignoring stale completion {:?}", ticket);
                return None;
            }
        }
        let (_, saved) = self.in_flight.take()?;

        if succeeded {
            self.last_saved = saved.clone();
            self.saved_until = Some(now + self.saved_display);
            log::trace!("Autosave: marked saved");
            Some(saved)
        } else {
            self.note_change(now);
            log::trace!("Autosave: marked save failed");
            None
        }
    }

    /// Current indicator state.
    pub fn status(&self, now: Instant) -> SaveStatus {
        if self.in_flight.is_some() {
            SaveStatus::Saving
        } else if self.saved_until.is_some_and(|until| now < until) {
            SaveStatus::Saved
        } else {
            SaveStatus::Idle
        }
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Drop the pending deadline and any in-flight bookkeeping.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.in_flight = None;
        self.saved_until = None;
    }
}
