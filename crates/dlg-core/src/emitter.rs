//! Emitter: scenes → dialogue file text.
//!
//! Produces pretty-printed JSON that round-trips through the parser. Empty
//! strings and empty lists are omitted so the file only carries what the
//! author wrote.

use crate::error::EmitError;
use crate::model::{Button, Scene};
use crate::parser::{ButtonData, DialogueFile, NpcDialogue, SceneData};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

impl From<&Scene> for SceneData {
    fn from(scene: &Scene) -> Self {
        SceneData {
            scene_tag: scene.scene_id.as_str().to_string(),
            npc_name: non_empty_str(&scene.npc_name),
            text: non_empty_str(&scene.scene_text),
            on_open_commands: non_empty_list(&scene.open_commands),
            on_close_commands: non_empty_list(&scene.close_commands),
            buttons: (!scene.buttons.is_empty())
                .then(|| scene.buttons.iter().map(ButtonData::from).collect()),
        }
    }
}

impl From<&Button> for ButtonData {
    fn from(button: &Button) -> Self {
        ButtonData {
            name: button.display_name.clone(),
            commands: button.commands.clone(),
        }
    }
}

fn non_empty_str(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn non_empty_list(list: &[String]) -> Option<Vec<String>> {
    (!list.is_empty()).then(|| list.to_vec())
}

/// Emit scenes as a dialogue file, indented with `tab_size` spaces and
/// stamped with `format_version`. The output ends with a newline.
pub fn emit_dialogue(scenes: &[Scene], tab_size: usize, format_version: &str) -> Result<String, EmitError> {
    let file = DialogueFile {
        format_version: format_version.to_string(),
        dialogue: NpcDialogue {
            scenes: scenes.iter().map(SceneData::from).collect(),
        },
    };

    let indent = " ".repeat(tab_size.max(1));
    let mut out = Vec::with_capacity(256 + scenes.len() * 256);
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    file.serialize(&mut serializer)?;
    out.push(b'\n');

    Ok(String::from_utf8(out)?)
}
