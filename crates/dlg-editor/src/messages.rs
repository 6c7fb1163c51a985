//! Messages exchanged between the scene store, the document side, and the
//! presentation surface.
//!
//! Every store mutation carries an [`Origin`]. Consumers use it to avoid
//! echoing a change back to the side it came from: document-origin changes
//! are forwarded to the surface, surface-origin changes are written to the
//! document, never the other way round.

use dlg_core::{ChangeSize, Scene, SceneId};
use serde::{Deserialize, Serialize};

/// Which side a store mutation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    /// Re-read from the text document. The document is the external
    /// authority for declaration order, which arrives in bulk through
    /// `SceneStore::set_scenes`.
    Document,
    /// Edited on the presentation surface (the node graph).
    Surface,
}

// ─── Wire shapes ─────────────────────────────────────────────────────────

/// Scene messages as they travel to and from the presentation surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "messageType", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SceneMessage {
    CreateScene {
        scene_id: SceneId,
        scene_data: Scene,
    },
    UpdateScene {
        scene_id: SceneId,
        scene_data: Scene,
        /// Filled in by the store; the surface leaves it out.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        update_info: Option<ChangeSize>,
    },
    DeleteScene {
        scene_id: SceneId,
    },
}

impl SceneMessage {
    pub fn scene_id(&self) -> SceneId {
        match self {
            SceneMessage::CreateScene { scene_id, .. }
            | SceneMessage::UpdateScene { scene_id, .. }
            | SceneMessage::DeleteScene { scene_id } => *scene_id,
        }
    }
}

/// A scene message tagged with the origin of the mutation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMessage {
    #[serde(rename = "messageSource")]
    pub origin: Origin,
    #[serde(flatten)]
    pub message: SceneMessage,
}

// ─── Store events ────────────────────────────────────────────────────────

/// A scene was added to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneCreated {
    pub origin: Origin,
    pub scene: Scene,
}

/// A stored scene was replaced by a different value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneUpdated {
    pub origin: Origin,
    pub scene: Scene,
    pub update_info: ChangeSize,
}

/// A scene was removed from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDeleted {
    pub origin: Origin,
    pub scene_id: SceneId,
}

impl From<&SceneCreated> for StoreMessage {
    fn from(event: &SceneCreated) -> Self {
        StoreMessage {
            origin: event.origin,
            message: SceneMessage::CreateScene {
                scene_id: event.scene.scene_id,
                scene_data: event.scene.clone(),
            },
        }
    }
}

impl From<&SceneUpdated> for StoreMessage {
    fn from(event: &SceneUpdated) -> Self {
        StoreMessage {
            origin: event.origin,
            message: SceneMessage::UpdateScene {
                scene_id: event.scene.scene_id,
                scene_data: event.scene.clone(),
                update_info: Some(event.update_info.clone()),
            },
        }
    }
}

impl From<&SceneDeleted> for StoreMessage {
    fn from(event: &SceneDeleted) -> Self {
        StoreMessage {
            origin: event.origin,
            message: SceneMessage::DeleteScene {
                scene_id: event.scene_id,
            },
        }
    }
}
