//! Change debouncer: coalesces minor edits before writing them to a document.
//!
//! A minor edit (one leaf field, see [`ChangeSize`]) starts a debounce window
//! keyed by its change id. Further edits to the same field restart the
//! window; an edit to a different field flushes the pending write first and
//! opens a new window. Major edits and a zero delay bypass the window
//! entirely. At most one write is pending at any time, and every enqueued
//! minor edit is either extended or flushed, never dropped.
//!
//! Time is passed in explicitly as monotonic milliseconds. The host drives
//! the window by calling [`ChangeDebouncer::poll`] at or after
//! [`ChangeDebouncer::next_deadline`].

use crate::document::TextDocument;
use dlg_core::{ChangeSize, EditorConfig, Scene, emit_dialogue};

/// What happened to the document on a write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nothing was pending, so nothing was written.
    Idle,
    Written,
    /// The write was attempted and failed. It is not retried.
    Failed,
}

/// A scene snapshot waiting for its debounce window to close.
#[derive(Debug)]
struct PendingChange {
    change_id: String,
    scenes: Vec<Scene>,
    flush_at_ms: u64,
}

/// Debounces writes to one document.
pub struct ChangeDebouncer<D: TextDocument> {
    document: D,
    delay_ms: u64,
    tab_size: usize,
    format_version: String,
    pending: Option<PendingChange>,
}

impl<D: TextDocument> ChangeDebouncer<D> {
    /// Bind a debouncer to `document`. Settings are read once, here.
    pub fn new(document: D, config: &EditorConfig) -> Self {
        Self {
            document,
            delay_ms: config.edit_delay_ms,
            tab_size: config.tab_size,
            format_version: config.format_version.clone(),
            pending: None,
        }
    }

    /// Queue `scenes` for writing according to the size of the change that
    /// produced them.
    pub fn enqueue_change(&mut self, scenes: Vec<Scene>, update_info: &ChangeSize, now_ms: u64) {
        // A window that has already closed would have fired by now.
        self.poll(now_ms);

        let change_id = match update_info {
            ChangeSize::None => return,
            ChangeSize::Minor { change_id } if self.delay_ms > 0 => change_id,
            _ => {
                self.clear();
                self.write(&scenes);
                return;
            }
        };

        let same_field = self
            .pending
            .as_ref()
            .is_none_or(|pending| pending.change_id == *change_id);
        if !same_field {
            log::debug!("debounce: {change_id} supersedes pending change, flushing");
            self.flush_changes();
        }

        let flush_at_ms = now_ms.saturating_add(self.delay_ms);
        log::trace!("debounce: {change_id} scheduled for {flush_at_ms}ms");
        self.pending = Some(PendingChange {
            change_id: change_id.clone(),
            scenes,
            flush_at_ms,
        });
    }

    /// Flush the pending change if its window has closed by `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> WriteOutcome {
        match &self.pending {
            Some(pending) if now_ms >= pending.flush_at_ms => self.flush_changes(),
            _ => WriteOutcome::Idle,
        }
    }

    /// Write the pending change now and clear all pending state, whether or
    /// not the write succeeds.
    pub fn flush_changes(&mut self) -> WriteOutcome {
        match self.pending.take() {
            Some(pending) => self.write(&pending.scenes),
            None => WriteOutcome::Idle,
        }
    }

    /// Swap the snapshot of the pending change for `scenes`, keeping its
    /// change id and deadline. Returns `false` if nothing is pending.
    pub fn rebase_pending(&mut self, scenes: Vec<Scene>) -> bool {
        match self.pending.as_mut() {
            Some(pending) => {
                log::trace!("debounce: rebasing pending {}", pending.change_id);
                pending.scenes = scenes;
                true
            }
            None => false,
        }
    }

    /// Drop the pending change without writing it.
    pub fn clear(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::trace!("debounce: discarding pending {}", pending.change_id);
        }
    }

    /// Release the debouncer's pending state; equivalent to [`Self::clear`].
    /// Dropping the debouncer likewise discards anything pending.
    pub fn dispose(&mut self) {
        self.clear();
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_change_id(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.change_id.as_str())
    }

    /// When the pending change is due, if there is one.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.flush_at_ms)
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// Give up the document, discarding anything pending.
    pub fn into_document(self) -> D {
        self.document
    }

    fn write(&mut self, scenes: &[Scene]) -> WriteOutcome {
        let text = match emit_dialogue(scenes, self.tab_size, &self.format_version) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("debounce: could not serialize {} scenes: {e}", scenes.len());
                return WriteOutcome::Failed;
            }
        };

        match self.document.set_text(&text) {
            Ok(()) => {
                log::debug!("debounce: wrote {} scenes ({} bytes)", scenes.len(), text.len());
                WriteOutcome::Written
            }
            Err(e) => {
                log::warn!("debounce: write failed, dropping change: {e}");
                WriteOutcome::Failed
            }
        }
    }
}
