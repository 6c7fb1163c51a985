//! Change classifier: how big is the difference between two versions of a scene?
//!
//! A change that touches exactly one leaf field (one line of text, one
//! command, one button label, the NPC name) is *minor* and may be debounced.
//! Anything structural (a different scene id, a list growing or shrinking,
//! or two or more leaf fields at once) is *major* and must be written out
//! immediately. Coalescing is keyed on the minor change's dotted path, so a
//! delayed write can never swallow an unrelated edit.

use crate::model::Scene;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Size of the difference between two scene values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "size", rename_all = "camelCase")]
pub enum ChangeSize {
    /// The scenes are deep-equal.
    None,
    /// Exactly one leaf field differs. `change_id` is `<sceneId>.<path>`,
    /// e.g. `intro.sceneText.3` or `intro.button.0.commands.1`.
    Minor {
        #[serde(rename = "changeId")]
        change_id: String,
    },
    /// Structural change, or more than one leaf field differs.
    Major,
}

impl ChangeSize {
    pub fn is_none(&self) -> bool {
        matches!(self, ChangeSize::None)
    }

    pub fn is_major(&self) -> bool {
        matches!(self, ChangeSize::Major)
    }

    /// The dotted path of a minor change.
    pub fn change_id(&self) -> Option<&str> {
        match self {
            ChangeSize::Minor { change_id } => Some(change_id),
            _ => None,
        }
    }

    /// Combine the verdicts of several changes applied together.
    ///
    /// `None` is the identity. Two minors on the same path stay minor; two
    /// minors on different paths are as broad as any structural change.
    pub fn merge(self, other: ChangeSize) -> ChangeSize {
        match (self, other) {
            (ChangeSize::None, other) | (other, ChangeSize::None) => other,
            (ChangeSize::Minor { change_id: a }, ChangeSize::Minor { change_id: b }) if a == b => {
                ChangeSize::Minor { change_id: a }
            }
            _ => ChangeSize::Major,
        }
    }
}

/// Leaf paths recorded while comparing. Anything past the second entry is
/// irrelevant to the verdict, so two inline slots cover the common cases.
type LeafChanges = SmallVec<[String; 2]>;

/// Classify the change from `old` to `new`.
#[must_use]
pub fn classify(old: &Scene, new: &Scene) -> ChangeSize {
    match leaf_changes(old, new) {
        Some(changes) => match changes.as_slice() {
            [] => ChangeSize::None,
            [path] => ChangeSize::Minor {
                change_id: format!("{}.{path}", new.scene_id),
            },
            _ => ChangeSize::Major,
        },
        None => ChangeSize::Major,
    }
}

/// Collect every differing leaf path, or `None` on a structural mismatch.
fn leaf_changes(old: &Scene, new: &Scene) -> Option<LeafChanges> {
    let mut changes = LeafChanges::new();

    if old.scene_id != new.scene_id {
        return None;
    }

    if old.npc_name != new.npc_name {
        changes.push("npcName".to_string());
    }

    if old.scene_text != new.scene_text {
        let old_lines: Vec<&str> = old.scene_text.split('\n').collect();
        let new_lines: Vec<&str> = new.scene_text.split('\n').collect();
        diff_indexed(&old_lines, &new_lines, "sceneText", &mut changes)?;
    }

    diff_indexed(&old.close_commands, &new.close_commands, "closeCommands", &mut changes)?;
    diff_indexed(&old.open_commands, &new.open_commands, "openCommands", &mut changes)?;

    if old.buttons.len() != new.buttons.len() {
        return None;
    }
    for (index, (old_button, new_button)) in old.buttons.iter().zip(&new.buttons).enumerate() {
        if old_button.commands.len() != new_button.commands.len() {
            return None;
        }
        if old_button.display_name != new_button.display_name {
            changes.push(format!("button.{index}.displayName"));
        }
        diff_indexed(
            &old_button.commands,
            &new_button.commands,
            &format!("button.{index}.commands"),
            &mut changes,
        )?;
    }

    Some(changes)
}

/// Record `<prefix>.<i>` for every differing element; `None` if lengths differ.
fn diff_indexed<T: PartialEq>(old: &[T], new: &[T], prefix: &str, changes: &mut LeafChanges) -> Option<()> {
    if old.len() != new.len() {
        return None;
    }
    for (index, (a, b)) in old.iter().zip(new).enumerate() {
        if a != b {
            changes.push(format!("{prefix}.{index}"));
        }
    }
    Some(())
}
