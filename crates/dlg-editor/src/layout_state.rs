//! Persisted layout and docking state for the node graph.
//!
//! Node positions, the viewport transform and the set of docked scenes live
//! in one MessagePack blob in a host-provided [`StateStore`]. The blob is
//! read once in [`LayoutData::load`] and rewritten after every mutation.

use std::collections::HashMap;

use dlg_core::{CommandSlot, NodeKey, Point, Scene, SceneId, group_around_scene};
use serde::{Deserialize, Serialize};

use crate::error::{LayoutStateError, StateError};
use crate::observer::{Registry, Subscription};

/// Opaque key/value blob storage owned by the host (workspace state, a file,
/// a browser storage slot).
pub trait StateStore {
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    fn set(&mut self, key: &str, blob: Vec<u8>);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStateStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.get(key).cloned()
    }

    fn set(&mut self, key: &str, blob: Vec<u8>) {
        self.blobs.insert(key.to_string(), blob);
    }
}

/// Stored positions for one scene's nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_node: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_command_node: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_command_node: Option<Point>,
    #[serde(default)]
    pub button_positions: HashMap<usize, Point>,
}

impl SceneLayout {
    fn position(&self, key: &NodeKey) -> Option<Point> {
        match key {
            NodeKey::Scene(_) => self.scene_node,
            NodeKey::Button(_, slot) => self.button_positions.get(slot).copied(),
            NodeKey::Command(_, CommandSlot::Open) => self.open_command_node,
            NodeKey::Command(_, CommandSlot::Close) => self.close_command_node,
        }
    }

    fn set_position(&mut self, key: &NodeKey, position: Point) {
        match key {
            NodeKey::Scene(_) => self.scene_node = Some(position),
            NodeKey::Button(_, slot) => {
                self.button_positions.insert(*slot, position);
            }
            NodeKey::Command(_, CommandSlot::Open) => self.open_command_node = Some(position),
            NodeKey::Command(_, CommandSlot::Close) => self.close_command_node = Some(position),
        }
    }
}

/// Pan and zoom of the graph view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutSnapshot {
    #[serde(default)]
    scenes: HashMap<SceneId, SceneLayout>,
    #[serde(default)]
    viewport: ViewportTransform,
    #[serde(default)]
    docked_scenes: Vec<SceneId>,
}

/// A scene moved into or out of the dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockEvent {
    Docked(SceneId),
    Undocked(SceneId),
}

pub struct LayoutData<S: StateStore> {
    store: S,
    key: String,
    snapshot: LayoutSnapshot,
    dock_events: Registry<DockEvent>,
}

impl<S: StateStore> LayoutData<S> {
    /// Read the state stored under `key`. A missing blob starts empty; so
    /// does one that no longer decodes, after a warning.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let snapshot = match store.get(&key) {
            None => LayoutSnapshot::default(),
            Some(blob) => match rmp_serde::from_slice::<LayoutSnapshot>(&blob) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    log::warn!("layout state `{key}` is unreadable, starting empty: {e}");
                    LayoutSnapshot::default()
                }
            },
        };
        Self {
            store,
            key,
            snapshot,
            dock_events: Registry::new(),
        }
    }

    pub fn on_dock_change(&self, callback: impl FnMut(&DockEvent) + 'static) -> Subscription {
        self.dock_events.subscribe(callback)
    }

    // ─── Positions ───────────────────────────────────────────────────────

    pub fn node_position(&self, key: &NodeKey) -> Option<Point> {
        self.snapshot.scenes.get(&key.scene_id())?.position(key)
    }

    pub fn scene_layout(&self, scene_id: SceneId) -> Option<&SceneLayout> {
        self.snapshot.scenes.get(&scene_id)
    }

    pub fn set_node_position(&mut self, key: NodeKey, position: Point) -> Result<(), StateError> {
        self.snapshot
            .scenes
            .entry(key.scene_id())
            .or_default()
            .set_position(&key, position);
        self.save()
    }

    /// [`Self::set_node_position`] for a node addressed the way the surface
    /// addresses it: a kind string and an optional slot string.
    pub fn set_node_position_by_parts(
        &mut self,
        scene_id: SceneId,
        kind: &str,
        slot: Option<&str>,
        position: Point,
    ) -> Result<(), LayoutStateError> {
        let key = NodeKey::from_parts(scene_id, kind, slot)?;
        Ok(self.set_node_position(key, position)?)
    }

    /// Place a scene's button and command nodes around its scene node (the
    /// origin if the scene node has no stored position) and store them.
    pub fn auto_arrange(&mut self, scene: &Scene, scale: f32) -> Result<(), StateError> {
        let anchor = self
            .node_position(&NodeKey::Scene(scene.scene_id))
            .unwrap_or(Point::ORIGIN);
        let positions = group_around_scene(scene, anchor, scale);
        log::debug!("auto-arranged {} nodes around {}", positions.len(), scene.scene_id);

        let layout = self.snapshot.scenes.entry(scene.scene_id).or_default();
        for (key, position) in &positions {
            layout.set_position(key, *position);
        }
        self.save()
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn viewport(&self) -> ViewportTransform {
        self.snapshot.viewport
    }

    pub fn set_viewport(&mut self, viewport: ViewportTransform) -> Result<(), StateError> {
        self.snapshot.viewport = viewport;
        self.save()
    }

    // ─── Dock ────────────────────────────────────────────────────────────

    pub fn docked_scenes(&self) -> &[SceneId] {
        &self.snapshot.docked_scenes
    }

    pub fn is_docked(&self, scene_id: SceneId) -> bool {
        self.snapshot.docked_scenes.contains(&scene_id)
    }

    /// Dock a scene. Returns `false` (and notifies no one) if it already was.
    pub fn dock_scene(&mut self, scene_id: SceneId) -> Result<bool, StateError> {
        if self.is_docked(scene_id) {
            return Ok(false);
        }
        self.snapshot.docked_scenes.push(scene_id);
        self.save()?;
        self.dock_events.emit(&DockEvent::Docked(scene_id));
        Ok(true)
    }

    /// Undock a scene. Returns `false` (and notifies no one) if it was not
    /// docked.
    pub fn undock_scene(&mut self, scene_id: SceneId) -> Result<bool, StateError> {
        if !self.is_docked(scene_id) {
            return Ok(false);
        }
        self.snapshot.docked_scenes.retain(|id| *id != scene_id);
        self.save()?;
        self.dock_events.emit(&DockEvent::Undocked(scene_id));
        Ok(true)
    }

    /// Drop everything stored for a deleted scene. Leaving the dock this way
    /// does not notify dock listeners.
    pub fn forget_scene(&mut self, scene_id: SceneId) -> Result<(), StateError> {
        let had_layout = self.snapshot.scenes.remove(&scene_id).is_some();
        let docked_before = self.snapshot.docked_scenes.len();
        self.snapshot.docked_scenes.retain(|id| *id != scene_id);
        if had_layout || docked_before != self.snapshot.docked_scenes.len() {
            self.save()?;
        }
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn save(&mut self) -> Result<(), StateError> {
        let blob = rmp_serde::to_vec_named(&self.snapshot)?;
        log::trace!("layout state `{}`: {} bytes", self.key, blob.len());
        self.store.set(&self.key, blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlg_core::{Button, DEFAULT_SCALE, SlotError};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    const KEY: &str = "dialogue/layout";

    fn id(tag: &str) -> SceneId {
        SceneId::intern(tag)
    }

    #[test]
    fn positions_survive_a_reload() {
        let mut layout = LayoutData::load(MemoryStateStore::new(), KEY);
        layout
            .set_node_position(NodeKey::Scene(id("ls_a")), Point::new(10.0, 20.0))
            .unwrap();
        layout
            .set_node_position(NodeKey::Button(id("ls_a"), 1), Point::new(30.0, 40.0))
            .unwrap();
        layout
            .set_node_position(NodeKey::Command(id("ls_a"), CommandSlot::Close), Point::new(5.0, 6.0))
            .unwrap();
        layout
            .set_viewport(ViewportTransform {
                x: -100.0,
                y: 50.0,
                zoom: 0.5,
            })
            .unwrap();
        layout.dock_scene(id("ls_b")).unwrap();

        let reloaded = LayoutData::load(layout.into_store(), KEY);
        assert_eq!(
            reloaded.node_position(&NodeKey::Scene(id("ls_a"))),
            Some(Point::new(10.0, 20.0))
        );
        assert_eq!(
            reloaded.node_position(&NodeKey::Button(id("ls_a"), 1)),
            Some(Point::new(30.0, 40.0))
        );
        assert_eq!(
            reloaded.node_position(&NodeKey::Command(id("ls_a"), CommandSlot::Close)),
            Some(Point::new(5.0, 6.0))
        );
        assert_eq!(reloaded.node_position(&NodeKey::Button(id("ls_a"), 0)), None);
        assert_eq!(reloaded.viewport().zoom, 0.5);
        assert_eq!(reloaded.docked_scenes(), &[id("ls_b")]);
    }

    #[test]
    fn corrupt_blob_starts_empty() {
        let mut store = MemoryStateStore::new();
        store.set(KEY, vec![0xc1, 0x00, 0xff]);
        let layout = LayoutData::load(store, KEY);
        assert_eq!(layout.viewport(), ViewportTransform::default());
        assert!(layout.docked_scenes().is_empty());
    }

    #[test]
    fn set_by_parts_rejects_unknown_slots() {
        let mut layout = LayoutData::load(MemoryStateStore::new(), KEY);
        let err = layout
            .set_node_position_by_parts(id("ls_parts"), "command", Some("middle"), Point::ORIGIN)
            .unwrap_err();
        assert!(matches!(
            err,
            LayoutStateError::Slot(SlotError::UnknownCommandSlot(ref slot)) if slot == "middle"
        ));

        layout
            .set_node_position_by_parts(id("ls_parts"), "command", Some("open"), Point::new(1.0, 2.0))
            .unwrap();
        assert_eq!(
            layout.node_position(&NodeKey::Command(id("ls_parts"), CommandSlot::Open)),
            Some(Point::new(1.0, 2.0))
        );
    }

    #[test]
    fn dock_is_idempotent_and_notifies_once() {
        let mut layout = LayoutData::load(MemoryStateStore::new(), KEY);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = layout.on_dock_change(move |event| sink.borrow_mut().push(*event));

        assert!(layout.dock_scene(id("ls_dock")).unwrap());
        assert!(!layout.dock_scene(id("ls_dock")).unwrap());
        assert!(layout.undock_scene(id("ls_dock")).unwrap());
        assert!(!layout.undock_scene(id("ls_dock")).unwrap());

        assert_eq!(
            *seen.borrow(),
            vec![DockEvent::Docked(id("ls_dock")), DockEvent::Undocked(id("ls_dock"))]
        );
    }

    #[test]
    fn forget_scene_drops_positions_and_dock_entry_silently() {
        let mut layout = LayoutData::load(MemoryStateStore::new(), KEY);
        layout
            .set_node_position(NodeKey::Scene(id("ls_gone")), Point::new(1.0, 1.0))
            .unwrap();
        layout.dock_scene(id("ls_gone")).unwrap();

        let notified = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&notified);
        let _sub = layout.on_dock_change(move |_| *counter.borrow_mut() += 1);

        layout.forget_scene(id("ls_gone")).unwrap();
        assert_eq!(layout.scene_layout(id("ls_gone")), None);
        assert!(!layout.is_docked(id("ls_gone")));
        assert_eq!(*notified.borrow(), 0);
    }

    #[test]
    fn auto_arrange_stores_child_positions_around_scene_node() {
        let scene = Scene::new(id("ls_arrange"))
            .with_button(Button::new("Yes"))
            .with_button(Button::new("No"))
            .with_open_commands(["say hi"]);

        let mut layout = LayoutData::load(MemoryStateStore::new(), KEY);
        layout
            .set_node_position(NodeKey::Scene(scene.scene_id), Point::new(100.0, 100.0))
            .unwrap();
        layout.auto_arrange(&scene, DEFAULT_SCALE).unwrap();

        let expected = group_around_scene(&scene, Point::new(100.0, 100.0), DEFAULT_SCALE);
        for (key, position) in expected {
            assert_eq!(layout.node_position(&key), Some(position), "{key}");
        }
        // the scene node itself stays where it was
        assert_eq!(
            layout.node_position(&NodeKey::Scene(scene.scene_id)),
            Some(Point::new(100.0, 100.0))
        );

        let reloaded = LayoutData::load(layout.into_store(), KEY);
        assert!(reloaded.node_position(&NodeKey::Button(scene.scene_id, 1)).is_some());
    }
}
