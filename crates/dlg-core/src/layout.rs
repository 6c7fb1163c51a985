//! Hierarchical layout of a scene's child nodes.
//!
//! Each scene is drawn with its buttons and command groups hanging below it.
//! Positions are computed from the scene's structure alone, so they do not
//! depend on where the scene sits in the document.
//!
//! Buttons and commands are laid out as two separate trees that share the
//! scene as their root, then stitched back together through that root. Laying
//! them out as one tree would interleave the two groups in a single rank.

use crate::model::{NodeKey, Point, Scene};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::hash::Hash;

/// Default zoom applied to the stitched button/command layers.
pub const DEFAULT_SCALE: f32 = 5.0;

/// Extra vertical gap that pushes the button layer below the command layer.
pub const BUTTON_LAYER_OFFSET: f32 = 60.0;

/// Spacing and footprint for [`layered_layout`].
#[derive(Debug, Clone, Copy)]
pub struct LayeredConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Horizontal gap between neighbouring nodes of one rank.
    pub node_sep: f32,
    /// Vertical gap between ranks.
    pub rank_sep: f32,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            node_width: 10.0,
            node_height: 10.0,
            node_sep: 50.0,
            rank_sep: 50.0,
        }
    }
}

// ─── Trees ───────────────────────────────────────────────────────────────

/// A rooted tree of node keys, edges pointing parent → child.
pub struct Tree<K> {
    graph: DiGraph<K, ()>,
    root: NodeIndex,
}

impl<K: Copy + Eq + Hash> Tree<K> {
    pub fn new(root: K) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(root);
        Self { graph, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Append `key` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, key: K) -> NodeIndex {
        let idx = self.graph.add_node(key);
        self.graph.add_edge(parent, idx, ());
        idx
    }

    /// Children in insertion order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self.graph.neighbors_directed(idx, Direction::Outgoing).collect();
        children.sort();
        children
    }

    pub fn is_leaf(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .next()
            .is_none()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

/// Node centers produced by [`layered_layout`], in the tree's own coordinate
/// space.
#[derive(Debug, Clone)]
pub struct TreeLayout<K> {
    pub root: Point,
    /// Every node, the root included.
    pub positions: HashMap<K, Point>,
}

/// Top-to-bottom layered layout of a rooted tree.
///
/// Rank is depth. Siblings keep insertion order, which is crossing-free for a
/// tree. Leaves are packed left to right at `node_width + node_sep` pitch and
/// each parent is centered over the span of its children, so no two nodes of
/// a rank overlap.
pub fn layered_layout<K: Copy + Eq + Hash>(tree: &Tree<K>, config: &LayeredConfig) -> TreeLayout<K> {
    let mut positions = HashMap::with_capacity(tree.len());
    let mut cursor = config.node_width / 2.0;
    place_subtree(tree, tree.root, 0, config, &mut cursor, &mut positions);

    let root = positions[&tree.graph[tree.root]];
    TreeLayout { root, positions }
}

/// Post-order placement. Returns the x of `idx`.
fn place_subtree<K: Copy + Eq + Hash>(
    tree: &Tree<K>,
    idx: NodeIndex,
    depth: usize,
    config: &LayeredConfig,
    cursor: &mut f32,
    positions: &mut HashMap<K, Point>,
) -> f32 {
    let y = depth as f32 * (config.node_height + config.rank_sep) + config.node_height / 2.0;

    let x = if tree.is_leaf(idx) {
        let x = *cursor;
        *cursor += config.node_width + config.node_sep;
        x
    } else {
        let children = tree.children(idx);
        let xs: Vec<f32> = children
            .iter()
            .map(|&child| place_subtree(tree, child, depth + 1, config, cursor, positions))
            .collect();
        let first = xs.first().copied().unwrap_or(*cursor);
        let last = xs.last().copied().unwrap_or(first);
        (first + last) / 2.0
    };

    positions.insert(tree.graph[idx], Point::new(x, y));
    x
}

// ─── Scene grouping ──────────────────────────────────────────────────────

/// Arrange a scene's button and command nodes around the scene node at
/// `anchor`.
///
/// The scene node itself is never part of the result; its position belongs
/// to whoever placed it. Without command nodes the buttons are returned
/// translated but unscaled. With command nodes, both layers are scaled by
/// `scale` and the buttons sit [`BUTTON_LAYER_OFFSET`] below the commands.
pub fn group_around_scene(scene: &Scene, anchor: Point, scale: f32) -> HashMap<NodeKey, Point> {
    let scene_key = NodeKey::Scene(scene.scene_id);

    let mut buttons = Tree::new(scene_key);
    for slot in 0..scene.buttons.len() {
        buttons.add_child(buttons.root(), NodeKey::Button(scene.scene_id, slot));
    }

    let mut commands = Tree::new(scene_key);
    for slot in scene.command_slots() {
        commands.add_child(commands.root(), NodeKey::Command(scene.scene_id, slot));
    }

    let config = LayeredConfig::default();
    let button_layout = layered_layout(&buttons, &config);
    let command_layout = layered_layout(&commands, &config);

    let button_offset = anchor - button_layout.root;
    let button_positions = button_layout
        .positions
        .iter()
        .filter(|(key, _)| **key != scene_key)
        .map(|(key, pos)| (*key, *pos + button_offset));

    if commands.is_leaf(commands.root()) {
        log::trace!("layout {}: {} buttons, no commands", scene.scene_id, scene.buttons.len());
        return button_positions.collect();
    }

    // Both trees are translated by the button root's offset; the difference
    // between the two roots then carries the buttons into the command tree's
    // space.
    let parent_offset = command_layout.root - button_layout.root;
    let button_shift = parent_offset + Point::new(0.0, BUTTON_LAYER_OFFSET);

    let mut combined: HashMap<NodeKey, Point> = button_positions
        .map(|(key, pos)| (key, (pos + button_shift) * scale))
        .collect();
    combined.extend(
        command_layout
            .positions
            .iter()
            .filter(|(key, _)| **key != scene_key)
            .map(|(key, pos)| (*key, (*pos + button_offset) * scale)),
    );

    log::trace!(
        "layout {}: {} buttons, {} command groups",
        scene.scene_id,
        scene.buttons.len(),
        combined.len() - scene.buttons.len()
    );
    combined
}
