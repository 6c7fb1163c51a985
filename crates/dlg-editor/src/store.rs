//! Scene store: the authoritative set of scenes and their declaration order.
//!
//! Both sides of the editor push updates into one store. The store drops
//! no-op updates, classifies real ones with [`dlg_core::classify`], and
//! notifies listeners with the update's [`Origin`] so each consumer can tell
//! whether the change is one it should act on.
//!
//! Declaration order is kept separately from the scene mapping. Single
//! document-origin upserts and deletes leave the order alone: the document
//! reports order in bulk through [`SceneStore::set_scenes`], and re-reading it
//! must not undo an order established on the surface in the meantime.

use crate::error::StoreError;
use crate::messages::{Origin, SceneCreated, SceneDeleted, SceneMessage, SceneUpdated};
use crate::observer::{Registry, Subscription};
use dlg_core::{Scene, SceneId, classify};
use std::collections::{HashMap, HashSet};

pub struct SceneStore {
    scenes: HashMap<SceneId, Scene>,
    /// Declaration order as seen in the document.
    order: Vec<SceneId>,
    created: Registry<SceneCreated>,
    updated: Registry<SceneUpdated>,
    deleted: Registry<SceneDeleted>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self {
            scenes: HashMap::new(),
            order: Vec::new(),
            created: Registry::new(),
            updated: Registry::new(),
            deleted: Registry::new(),
        }
    }

    // ─── Listeners ───────────────────────────────────────────────────────

    pub fn on_scene_create(&self, callback: impl FnMut(&SceneCreated) + 'static) -> Subscription {
        self.created.subscribe(callback)
    }

    pub fn on_scene_update(&self, callback: impl FnMut(&SceneUpdated) + 'static) -> Subscription {
        self.updated.subscribe(callback)
    }

    pub fn on_scene_delete(&self, callback: impl FnMut(&SceneDeleted) + 'static) -> Subscription {
        self.deleted.subscribe(callback)
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Insert or replace a scene.
    ///
    /// Deep-equal values are ignored. A new scene emits a create event and,
    /// unless it came from the document, is appended to the order. A changed
    /// scene emits an update event carrying its change size.
    pub fn upsert_scene(&mut self, origin: Origin, scene: Scene) {
        let scene_id = scene.scene_id;

        match self.scenes.get(&scene_id) {
            Some(existing) if *existing == scene => {}
            Some(existing) => {
                let update_info = classify(existing, &scene);
                log::debug!("store: update {scene_id} from {origin:?} ({update_info:?})");
                self.scenes.insert(scene_id, scene.clone());
                self.updated.emit(&SceneUpdated {
                    origin,
                    scene,
                    update_info,
                });
            }
            None => {
                log::debug!("store: create {scene_id} from {origin:?}");
                self.scenes.insert(scene_id, scene.clone());
                if origin != Origin::Document {
                    self.order.push(scene_id);
                }
                self.created.emit(&SceneCreated { origin, scene });
            }
        }
    }

    /// Remove a scene. Unknown ids are ignored.
    pub fn delete_scene(&mut self, origin: Origin, scene_id: SceneId) {
        if self.scenes.remove(&scene_id).is_none() {
            return;
        }
        log::debug!("store: delete {scene_id} from {origin:?}");

        if origin != Origin::Document {
            self.order.retain(|id| *id != scene_id);
        }
        self.deleted.emit(&SceneDeleted { origin, scene_id });
    }

    /// Replace the whole scene set.
    ///
    /// Each incoming scene is upserted, every stored scene missing from
    /// `scenes` is deleted, and the declaration order is then overwritten with
    /// the incoming order. The order is written last, after all per-scene
    /// bookkeeping, so it always matches what the caller declared.
    pub fn set_scenes(&mut self, origin: Origin, scenes: Vec<Scene>) {
        let mut new_order = Vec::with_capacity(scenes.len());
        let mut incoming = HashSet::with_capacity(scenes.len());
        for scene in scenes {
            if incoming.insert(scene.scene_id) {
                new_order.push(scene.scene_id);
            } else {
                log::warn!("store: scene {} declared twice, keeping its first position", scene.scene_id);
            }
            self.upsert_scene(origin, scene);
        }

        for scene_id in self.stale_ids(&incoming) {
            self.delete_scene(origin, scene_id);
        }

        self.order = new_order;
    }

    /// Stored ids not in `keep`: ordered ones first, in order, then any
    /// unordered ones by tag so deletion events are deterministic.
    fn stale_ids(&self, keep: &HashSet<SceneId>) -> Vec<SceneId> {
        let mut stale: Vec<SceneId> = self
            .order
            .iter()
            .copied()
            .filter(|id| !keep.contains(id) && self.scenes.contains_key(id))
            .collect();

        let ordered: HashSet<SceneId> = self.order.iter().copied().collect();
        let mut unordered: Vec<SceneId> = self
            .scenes
            .keys()
            .copied()
            .filter(|id| !keep.contains(id) && !ordered.contains(id))
            .collect();
        unordered.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        stale.extend(unordered);
        stale
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// All scenes in declaration order.
    ///
    /// # Errors
    /// [`StoreError`] if the order and the mapping disagree. That is a defect,
    /// never an expected outcome.
    pub fn get_scenes(&self) -> Result<Vec<Scene>, StoreError> {
        let mut ordered = Vec::with_capacity(self.order.len());
        for id in &self.order {
            let scene = self.scenes.get(id).ok_or(StoreError::MissingScene(*id))?;
            ordered.push(scene.clone());
        }

        if ordered.len() != self.scenes.len() {
            let ordered_ids: HashSet<&SceneId> = self.order.iter().collect();
            if let Some(orphan) = self.scenes.keys().find(|id| !ordered_ids.contains(id)) {
                return Err(StoreError::UnorderedScene(*orphan));
            }
        }

        Ok(ordered)
    }

    /// Every scene as a create message in declaration order, for a full
    /// refresh of the presentation surface.
    ///
    /// # Errors
    /// The same integrity failures as [`Self::get_scenes`].
    pub fn scene_messages(&self) -> Result<Vec<SceneMessage>, StoreError> {
        Ok(self
            .get_scenes()?
            .into_iter()
            .map(|scene| SceneMessage::CreateScene {
                scene_id: scene.scene_id,
                scene_data: scene,
            })
            .collect())
    }

    pub fn get(&self, scene_id: SceneId) -> Option<&Scene> {
        self.scenes.get(&scene_id)
    }

    /// Declaration order.
    pub fn order(&self) -> &[SceneId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}
