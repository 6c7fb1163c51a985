//! Scene model for dialogue documents.
//!
//! A dialogue document is a flat, ordered list of scenes. Each scene owns its
//! buttons and its open/close command lists; there are no cross-scene
//! references in the model itself. Scenes carry no behaviour; the store,
//! classifier and layout engine operate on them from the outside.

use crate::error::SlotError;
use crate::id::SceneId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

// ─── Scenes ──────────────────────────────────────────────────────────────

/// A button shown under a scene's text. Clicking it runs `commands` in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub display_name: String,
    pub commands: Vec<String>,
}

impl Button {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            commands: Vec::new(),
        }
    }

    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands = commands.into_iter().map(Into::into).collect();
        self
    }
}

/// One dialogue node: NPC name and text, buttons, and commands run when the
/// scene opens or closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub scene_id: SceneId,
    pub npc_name: String,
    /// Newline-delimited; line order is significant.
    pub scene_text: String,
    pub buttons: Vec<Button>,
    pub open_commands: Vec<String>,
    pub close_commands: Vec<String>,
}

impl Scene {
    /// An empty scene with the given tag.
    pub fn new(scene_id: SceneId) -> Self {
        Self {
            scene_id,
            npc_name: String::new(),
            scene_text: String::new(),
            buttons: Vec::new(),
            open_commands: Vec::new(),
            close_commands: Vec::new(),
        }
    }

    pub fn with_npc_name(mut self, npc_name: impl Into<String>) -> Self {
        self.npc_name = npc_name.into();
        self
    }

    pub fn with_text(mut self, scene_text: impl Into<String>) -> Self {
        self.scene_text = scene_text.into();
        self
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn with_open_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.open_commands = commands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_close_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.close_commands = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Command groups that are rendered as their own node, in display order.
    pub fn command_slots(&self) -> impl Iterator<Item = CommandSlot> + '_ {
        [
            (CommandSlot::Open, &self.open_commands),
            (CommandSlot::Close, &self.close_commands),
        ]
        .into_iter()
        .filter(|(_, commands)| !commands.is_empty())
        .map(|(slot, _)| slot)
    }
}

// ─── Graph node keys ─────────────────────────────────────────────────────

/// Which command group a command node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandSlot {
    Open,
    Close,
}

impl CommandSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandSlot::Open => "open",
            CommandSlot::Close => "close",
        }
    }
}

impl std::str::FromStr for CommandSlot {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(CommandSlot::Open),
            "close" => Ok(CommandSlot::Close),
            other => Err(SlotError::UnknownCommandSlot(other.to_string())),
        }
    }
}

/// Identifies one node of the visual graph.
///
/// A scene renders as one scene node, one node per button (addressed by its
/// slot index) and one node per non-empty command group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Scene(SceneId),
    Button(SceneId, usize),
    Command(SceneId, CommandSlot),
}

impl NodeKey {
    /// Build a key from the loosely-typed parts used by the presentation
    /// surface: a node kind (`scene`, `button`, `command`) and an optional slot.
    pub fn from_parts(scene_id: SceneId, kind: &str, slot: Option<&str>) -> Result<Self, SlotError> {
        match (kind, slot) {
            ("scene", None) => Ok(NodeKey::Scene(scene_id)),
            ("button", Some(slot)) => slot
                .parse::<usize>()
                .map(|index| NodeKey::Button(scene_id, index))
                .map_err(|_| SlotError::InvalidButtonSlot(slot.to_string())),
            ("command", Some(slot)) => Ok(NodeKey::Command(scene_id, slot.parse()?)),
            (kind, slot) => Err(SlotError::InvalidCombination {
                kind: kind.to_string(),
                slot: slot.map(str::to_string),
            }),
        }
    }

    pub fn scene_id(&self) -> SceneId {
        match *self {
            NodeKey::Scene(id) | NodeKey::Button(id, _) | NodeKey::Command(id, _) => id,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Scene(id) => write!(f, "{id}"),
            NodeKey::Button(id, slot) => write!(f, "{id}/button/{slot}"),
            NodeKey::Command(id, slot) => write!(f, "{id}/command/{}", slot.as_str()),
        }
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// A world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, scale: f32) -> Point {
        Point::new(self.x * scale, self.y * scale)
    }
}
