//! Parser for dialogue files → scenes.
//!
//! A dialogue file is JSON of the shape
//!
//! ```json
//! {
//!   "format_version": "1.14.0",
//!   "minecraft:npc_dialogue": {
//!     "scenes": [
//!       { "scene_tag": "intro", "npc_name": "Guide", "text": "Hello",
//!         "on_open_commands": [], "on_close_commands": [],
//!         "buttons": [{ "name": "Ok", "commands": [] }] }
//!     ]
//!   }
//! }
//! ```
//!
//! Every field except `scene_tag` is optional; missing strings become empty
//! and missing lists become empty lists.

use crate::error::ParseError;
use crate::id::SceneId;
use crate::model::{Button, Scene};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// On-disk shape of a whole dialogue file.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DialogueFile {
    pub format_version: String,
    #[serde(rename = "minecraft:npc_dialogue")]
    pub dialogue: NpcDialogue,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct NpcDialogue {
    #[serde(default)]
    pub scenes: Vec<SceneData>,
}

/// On-disk shape of one scene. Empty values are omitted when emitting.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SceneData {
    pub scene_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npc_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_open_commands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_close_commands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<ButtonData>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ButtonData {
    pub name: String,
    #[serde(default)]
    pub commands: Vec<String>,
}

impl From<SceneData> for Scene {
    fn from(raw: SceneData) -> Self {
        Scene {
            scene_id: SceneId::intern(&raw.scene_tag),
            npc_name: raw.npc_name.unwrap_or_default(),
            scene_text: raw.text.unwrap_or_default(),
            buttons: raw
                .buttons
                .unwrap_or_default()
                .into_iter()
                .map(Button::from)
                .collect(),
            open_commands: raw.on_open_commands.unwrap_or_default(),
            close_commands: raw.on_close_commands.unwrap_or_default(),
        }
    }
}

impl From<ButtonData> for Button {
    fn from(raw: ButtonData) -> Self {
        Button {
            display_name: raw.name,
            commands: raw.commands,
        }
    }
}

/// Parse dialogue file text into scenes, in declaration order.
///
/// # Errors
/// Fails on malformed JSON, an empty `scene_tag`, or a `scene_tag` declared
/// twice (scene tags identify scenes and must be unique).
#[must_use = "parsing result should be used"]
pub fn parse_dialogue(input: &str) -> Result<Vec<Scene>, ParseError> {
    let file: DialogueFile = serde_json::from_str(input)?;
    log::trace!(
        "parsed dialogue v{} with {} scenes",
        file.format_version,
        file.dialogue.scenes.len()
    );

    let mut seen = HashSet::with_capacity(file.dialogue.scenes.len());
    let mut scenes = Vec::with_capacity(file.dialogue.scenes.len());
    for (index, raw) in file.dialogue.scenes.into_iter().enumerate() {
        if raw.scene_tag.is_empty() {
            return Err(ParseError::EmptySceneTag { index });
        }
        if !seen.insert(raw.scene_tag.clone()) {
            return Err(ParseError::DuplicateScene(raw.scene_tag));
        }
        scenes.push(Scene::from(raw));
    }
    Ok(scenes)
}
