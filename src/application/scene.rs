//! Scene builder: walks tree and layout together and emits drawing primitives.

use std::collections::HashMap;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::{NodeId, TreeArena, TreeLayout};
use crate::infrastructure::traits::{PrimitiveId, Stroke, Surface};

/// Vertical offset of a connecting line's start below the parent's row.
/// Independent of the vertical gap.
pub const LABEL_BASELINE_OFFSET: f64 = 18.0;

/// Vertical offset of a connecting line's end below the parent's row.
/// Independent of the vertical gap.
pub const LINE_END_OFFSET: f64 = 38.0;

/// Collapse/expand state of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    #[default]
    Expanded,
    Collapsed,
}

/// Primitives drawn for one tree node.
#[derive(Debug, Clone)]
pub struct SceneGroup {
    pub node: NodeId,
    /// Group holding everything below
    pub group: PrimitiveId,
    pub label: PrimitiveId,
    /// One line per child, in child order
    pub lines: Vec<PrimitiveId>,
    pub children: Vec<NodeId>,
    /// Group primitives of the children, in child order
    pub child_groups: Vec<PrimitiveId>,
    /// Hidden summary label, present only for nodes with children
    pub summary: Option<PrimitiveId>,
    pub(crate) state: ToggleState,
}

impl SceneGroup {
    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Only nodes with at least one child can collapse.
    pub fn is_toggleable(&self) -> bool {
        self.summary.is_some()
    }
}

/// All scene groups of a drawing, keyed by tree node.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    groups: HashMap<NodeId, SceneGroup>,
    root: Option<NodeId>,
}

impl Scene {
    pub fn get(&self, id: NodeId) -> Option<&SceneGroup> {
        self.groups.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneGroup> {
        self.groups.get_mut(&id)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Node owning a label primitive.
    pub fn node_for_label(&self, label: PrimitiveId) -> Option<NodeId> {
        self.groups
            .values()
            .find(|g| g.label == label)
            .map(|g| g.node)
    }
}

/// Emits primitives for a laid-out tree.
pub struct SceneBuilder<'a> {
    tree: &'a TreeArena,
    layout: &'a TreeLayout,
    vertical_gap: f64,
    stroke: Stroke,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(tree: &'a TreeArena, layout: &'a TreeLayout, vertical_gap: f64) -> Self {
        Self {
            tree,
            layout,
            vertical_gap,
            stroke: Stroke::default(),
        }
    }

    #[instrument(level = "debug", skip_all)]
    pub fn build(&self, surface: &mut dyn Surface) -> Scene {
        let mut scene = Scene {
            groups: HashMap::with_capacity(self.tree.len()),
            root: self.tree.root(),
        };
        if let Some(root) = self.tree.root() {
            self.draw_node(root, surface, &mut scene);
        }
        debug!("scene has {} groups", scene.len());
        scene
    }

    fn draw_node(&self, id: NodeId, surface: &mut dyn Surface, scene: &mut Scene) -> Option<PrimitiveId> {
        let node = self.tree.get_node(id)?;
        let layout = self.layout.get(id)?;

        let group = surface.group();
        surface.tag(group, "node", &id.to_string());

        let label = surface.text(&node.label);
        surface.move_to(label, layout.node_center - layout.head_width / 2.0, layout.y);
        if node.is_internal() {
            surface.set_interactive(label, id);
        }
        surface.add(group, label);

        let mut child_groups = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            if let Some(child_group) = self.draw_node(child, surface, scene) {
                surface.add(group, child_group);
                child_groups.push(child_group);
            }
        }

        let summary = match (layout.child_centers.first(), layout.child_centers.last()) {
            (Some(first), Some(last)) if node.is_internal() => {
                let text = surface.text(&node.summary.iter().join(" "));
                let x = (first + last) / 2.0 - surface.bbox_width(text) / 2.0;
                surface.move_to(text, x, layout.y + self.vertical_gap);
                surface.hide(text);
                surface.tag(text, "summary", &id.to_string());
                surface.add(group, text);
                Some(text)
            }
            _ => None,
        };

        let lines = layout
            .child_centers
            .iter()
            .map(|&center| {
                let line = surface.line(
                    (layout.node_center, layout.y + LABEL_BASELINE_OFFSET),
                    (center, layout.y + LINE_END_OFFSET),
                    &self.stroke,
                );
                surface.add(group, line);
                line
            })
            .collect();

        scene.groups.insert(
            id,
            SceneGroup {
                node: id,
                group,
                label,
                lines,
                children: node.children.clone(),
                child_groups,
                summary,
                state: ToggleState::Expanded,
            },
        );
        Some(group)
    }
}
