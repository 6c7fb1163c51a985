//! Bidirectional sync engine: text document ↔ scene store ↔ node graph.
//!
//! - **Document → Surface**: when the document text changes, the whole file
//!   is re-parsed and pushed into the store with [`Origin::Document`]. Every
//!   resulting store event is queued as an outbound message for the surface.
//!   A text that no longer parses leaves the store untouched.
//!
//! - **Surface → Document**: scene messages from the surface are applied with
//!   [`Origin::Surface`]. Their store events are folded into one change size
//!   and the store's scene list is handed to the [`ChangeDebouncer`], which
//!   decides when to rewrite the document.
//!
//! Neither direction echoes. Re-reading text the debouncer just wrote yields
//! deep-equal scenes, so the store emits nothing and nothing is scheduled.
//! Scenes with an empty id are refused on the way in, since the document
//! format cannot hold them.
//!
//! A text edit that lands while a surface edit is still inside its debounce
//! window is merged: the scene carrying the pending edit keeps its surface
//! value, every other scene takes the text's value, and the pending write is
//! rebased onto the result.

use std::cell::RefCell;
use std::rc::Rc;

use dlg_core::{ChangeSize, EditorConfig, Scene, SceneId, parse_dialogue};

use crate::debounce::{ChangeDebouncer, WriteOutcome};
use crate::document::TextDocument;
use crate::error::SyncError;
use crate::messages::{Origin, SceneMessage, StoreMessage};
use crate::observer::Subscription;
use crate::store::SceneStore;

/// One open dialogue document and its scene store.
pub struct SyncSession<D: TextDocument> {
    store: SceneStore,
    debouncer: ChangeDebouncer<D>,
    /// Store events in emission order, filled by the store listeners.
    events: Rc<RefCell<Vec<StoreMessage>>>,
    /// Messages waiting to be posted to the surface.
    outbound: Vec<StoreMessage>,
    subscriptions: Vec<Subscription>,
    /// Scene touched by the change waiting in the debouncer.
    pending_scene: Option<SceneId>,
}

impl<D: TextDocument> SyncSession<D> {
    /// Bind a session to `document` without reading it yet.
    pub fn new(document: D, config: &EditorConfig) -> Result<Self, SyncError> {
        config.validate()?;

        let store = SceneStore::new();
        let events: Rc<RefCell<Vec<StoreMessage>>> = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&events);
        let on_create = store.on_scene_create(move |e| sink.borrow_mut().push(e.into()));
        let sink = Rc::clone(&events);
        let on_update = store.on_scene_update(move |e| sink.borrow_mut().push(e.into()));
        let sink = Rc::clone(&events);
        let on_delete = store.on_scene_delete(move |e| sink.borrow_mut().push(e.into()));

        Ok(Self {
            store,
            debouncer: ChangeDebouncer::new(document, config),
            events,
            outbound: Vec::new(),
            subscriptions: vec![on_create, on_update, on_delete],
            pending_scene: None,
        })
    }

    /// Bind a session to `document` and load its scenes.
    pub fn open(document: D, config: &EditorConfig) -> Result<Self, SyncError> {
        let mut session = Self::new(document, config)?;
        session.document_changed()?;
        Ok(session)
    }

    // ─── Document → Surface ──────────────────────────────────────────────

    /// Re-read the document after its text changed.
    ///
    /// # Errors
    /// [`SyncError::Parse`] if the text is not a valid dialogue file. The
    /// store keeps its previous scenes.
    pub fn document_changed(&mut self) -> Result<(), SyncError> {
        let text = self.debouncer.document().text();
        let mut scenes = parse_dialogue(&text)?;
        log::debug!("sync: document holds {} scenes", scenes.len());

        let pending = self.pending_surface_scene();
        if let Some(surface) = &pending
            && let Some(slot) = scenes.iter_mut().find(|s| s.scene_id == surface.scene_id)
        {
            *slot = surface.clone();
        }

        self.store.set_scenes(Origin::Document, scenes);
        // Document-origin events only ever reach the outbound queue.
        let (verdict, _) = self.drain_events();
        debug_assert!(verdict.is_none(), "document read produced surface events");

        if pending.is_some() {
            log::debug!("sync: rebasing pending surface edit onto new document text");
            self.debouncer.rebase_pending(self.store.get_scenes()?);
        }
        Ok(())
    }

    /// Current value of the scene whose surface edit is still unwritten.
    fn pending_surface_scene(&self) -> Option<Scene> {
        if !self.debouncer.has_pending() {
            return None;
        }
        self.pending_scene.and_then(|id| self.store.get(id)).cloned()
    }

    /// Take the messages queued for the surface, oldest first.
    pub fn take_outbound(&mut self) -> Vec<StoreMessage> {
        std::mem::take(&mut self.outbound)
    }

    /// Every scene as a create message, for a surface that needs a full
    /// refresh (e.g. after it was reloaded).
    pub fn refresh_messages(&self) -> Result<Vec<SceneMessage>, SyncError> {
        Ok(self.store.scene_messages()?)
    }

    // ─── Surface → Document ──────────────────────────────────────────────

    /// Apply one scene message from the surface at time `now_ms`.
    ///
    /// Returns the size of the resulting change. An update carrying the value
    /// already stored is [`ChangeSize::None`] and schedules nothing.
    pub fn apply_surface_message(&mut self, message: SceneMessage, now_ms: u64) -> Result<ChangeSize, SyncError> {
        match message {
            SceneMessage::CreateScene { scene_id, scene_data }
            | SceneMessage::UpdateScene {
                scene_id, scene_data, ..
            } => {
                if scene_data.scene_id.as_str().is_empty() {
                    return Err(SyncError::EmptySceneId);
                }
                if scene_id != scene_data.scene_id {
                    return Err(SyncError::SceneIdMismatch {
                        message_id: scene_id,
                        scene_id: scene_data.scene_id,
                    });
                }
                self.store.upsert_scene(Origin::Surface, scene_data);
            }
            SceneMessage::DeleteScene { scene_id } => {
                self.store.delete_scene(Origin::Surface, scene_id);
            }
        }
        self.commit_surface_changes(ChangeSize::None, now_ms)
    }

    /// Replace every scene from the surface at once, in the given order.
    ///
    /// A pure reorder changes no scene but still has to reach the document,
    /// so it counts as [`ChangeSize::Major`].
    pub fn replace_scenes_from_surface(&mut self, scenes: Vec<Scene>, now_ms: u64) -> Result<ChangeSize, SyncError> {
        if scenes.iter().any(|scene| scene.scene_id.as_str().is_empty()) {
            return Err(SyncError::EmptySceneId);
        }
        let order_before = self.store.order().to_vec();
        self.store.set_scenes(Origin::Surface, scenes);

        let reordered = if self.store.order() != order_before.as_slice() {
            ChangeSize::Major
        } else {
            ChangeSize::None
        };
        self.commit_surface_changes(reordered, now_ms)
    }

    /// Fold the queued store events into one verdict and hand the current
    /// scene list to the debouncer.
    fn commit_surface_changes(&mut self, extra: ChangeSize, now_ms: u64) -> Result<ChangeSize, SyncError> {
        let (verdict, touched) = self.drain_events();
        let verdict = verdict.merge(extra);
        if verdict.is_none() {
            return Ok(verdict);
        }

        let scenes = self.store.get_scenes()?;
        self.debouncer.enqueue_change(scenes, &verdict, now_ms);
        self.pending_scene = if self.debouncer.has_pending() { touched } else { None };
        Ok(verdict)
    }

    /// Route queued store events: document-origin ones go out to the surface,
    /// surface-origin ones are merged into the returned verdict, along with
    /// the last scene they touched.
    fn drain_events(&mut self) -> (ChangeSize, Option<SceneId>) {
        let events = std::mem::take(&mut *self.events.borrow_mut());

        let mut verdict = ChangeSize::None;
        let mut touched = None;
        for event in events {
            match event.origin {
                Origin::Document => self.outbound.push(event),
                Origin::Surface => {
                    let size = match &event.message {
                        SceneMessage::UpdateScene {
                            update_info: Some(info),
                            ..
                        } => info.clone(),
                        _ => ChangeSize::Major,
                    };
                    touched = Some(event.message.scene_id());
                    verdict = verdict.merge(size);
                }
            }
        }
        (verdict, touched)
    }

    // ─── Timing ──────────────────────────────────────────────────────────

    /// Advance the clock: writes a pending change whose window has closed.
    pub fn tick(&mut self, now_ms: u64) -> WriteOutcome {
        self.debouncer.poll(now_ms)
    }

    /// When [`Self::tick`] next has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.debouncer.next_deadline()
    }

    /// Write any pending change now (e.g. before the document is saved).
    pub fn flush(&mut self) -> WriteOutcome {
        self.debouncer.flush_changes()
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.has_pending()
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn document(&self) -> &D {
        self.debouncer.document()
    }

    /// Mutable access to the document, for hosts that edit it directly.
    /// Call [`Self::document_changed`] afterwards.
    pub fn document_mut(&mut self) -> &mut D {
        self.debouncer.document_mut()
    }

    /// Close the session and hand back the document. A change still inside
    /// its debounce window is discarded; call [`Self::flush`] first to keep it.
    pub fn close(mut self) -> D {
        self.debouncer.dispose();
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.debouncer.into_document()
    }
}
