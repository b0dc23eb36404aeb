use bench_core::events::{Emitter, SubscriptionId};
use bench_core::logging;

use crate::geometry::{Point, Rect, Vec2};

pub const NODE_WIDTH: f32 = 120.0;
pub const NODE_HEIGHT: f32 = 50.0;
const INSERT_MARGIN: f32 = 50.0;
const POINTER_GROWTH: f32 = 50.0;
const FIT_PADDING: f32 = 20.0;

/// Something on the canvas that reacts to a press and can show it is selected.
pub trait SelectableShape {
    fn contains(&self, point: Point) -> bool;
    /// Toggles selection.
    fn on_press(&mut self);
    fn set_highlighted(&mut self, highlighted: bool);
    fn is_selected(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeFill {
    Normal,
    Highlighted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiagramNode {
    label: String,
    rect: Rect,
    position: Point,
    selected: bool,
}

impl DiagramNode {
    pub fn new(label: impl Into<String>, size: Vec2, position: Point) -> Self {
        Self {
            label: label.into(),
            rect: Rect::from_min_size(Point::ZERO, size),
            position,
            selected: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Rect in the node's own coordinates.
    pub fn local_rect(&self) -> Rect {
        self.rect
    }

    pub fn map_to_scene(&self, local: Point) -> Point {
        self.position + (local - Point::ZERO)
    }

    pub fn scene_rect(&self) -> Rect {
        self.rect.translate(self.position - Point::ZERO)
    }

    pub fn top_center(&self) -> Point {
        self.map_to_scene(self.rect.top_center())
    }

    pub fn bottom_center(&self) -> Point {
        self.map_to_scene(self.rect.bottom_center())
    }

    /// Where the label's center goes.
    pub fn label_anchor(&self) -> Point {
        self.map_to_scene(self.rect.center())
    }

    pub fn fill(&self) -> NodeFill {
        if self.selected {
            NodeFill::Highlighted
        } else {
            NodeFill::Normal
        }
    }
}

impl SelectableShape for DiagramNode {
    fn contains(&self, point: Point) -> bool {
        self.scene_rect().contains(point)
    }

    fn on_press(&mut self) {
        let selected = !self.selected;
        self.set_highlighted(selected);
    }

    fn set_highlighted(&mut self, highlighted: bool) {
        self.selected = highlighted;
    }

    fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Straight connector, fixed at the anchors the nodes had when it was created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiagramEdge {
    pub parent: NodeId,
    pub child: NodeId,
    pub from: Point,
    pub to: Point,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeClicked {
    pub id: NodeId,
    pub label: String,
}

#[derive(Debug)]
pub struct DiagramScene {
    nodes: Vec<DiagramNode>,
    edges: Vec<DiagramEdge>,
    scene_rect: Rect,
    clicks: Emitter<NodeClicked>,
}

impl DiagramScene {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            scene_rect: Rect::NOTHING,
            clicks: Emitter::new(),
        }
    }

    pub fn add_node(&mut self, label: impl Into<String>, position: Point) -> NodeId {
        self.add_node_sized(label, Vec2::new(NODE_WIDTH, NODE_HEIGHT), position)
    }

    pub fn add_node_sized(&mut self, label: impl Into<String>, size: Vec2, position: Point) -> NodeId {
        let node = DiagramNode::new(label, size, position);
        self.scene_rect = self
            .scene_rect
            .union(&node.scene_rect().expand(INSERT_MARGIN));
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Connects parent bottom-center to child top-center. None if either id is unknown.
    pub fn connect(&mut self, parent: NodeId, child: NodeId) -> Option<EdgeId> {
        let from = self.nodes.get(parent.0)?.bottom_center();
        let to = self.nodes.get(child.0)?.top_center();
        self.edges.push(DiagramEdge {
            parent,
            child,
            from,
            to,
        });
        Some(EdgeId(self.edges.len() - 1))
    }

    /// Moves a node. Existing edges keep their original endpoints.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&DiagramNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &DiagramNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn edges(&self) -> &[DiagramEdge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&DiagramEdge> {
        self.edges.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.is_selected())
            .map(NodeId)
    }

    pub fn on_node_clicked(&mut self, handler: impl FnMut(&NodeClicked) + 'static) -> SubscriptionId {
        self.clicks.subscribe(handler)
    }

    /// Deselects every other node, then toggles `id`.
    pub fn press_node(&mut self, id: NodeId) -> bool {
        if id.0 >= self.nodes.len() {
            return false;
        }
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if index != id.0 && node.is_selected() {
                node.set_highlighted(false);
            }
        }
        let node = &mut self.nodes[id.0];
        node.on_press();
        let event = NodeClicked {
            id,
            label: node.label.clone(),
        };
        logging::debug(format!("node clicked: {}", event.label));
        self.clicks.emit(&event);
        true
    }

    /// Press at a scene point. The most recently added node wins overlaps;
    /// a press on empty canvas clears the selection.
    pub fn press_at(&mut self, point: Point) -> Option<NodeId> {
        let hit = self
            .nodes
            .iter()
            .rposition(|node| node.contains(point))
            .map(NodeId);
        match hit {
            Some(id) => {
                self.press_node(id);
                Some(id)
            }
            None => {
                self.clear_selection();
                None
            }
        }
    }

    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.nodes
            .iter()
            .rposition(|node| node.contains(point))
            .map(NodeId)
    }

    pub fn clear_selection(&mut self) {
        for node in &mut self.nodes {
            node.set_highlighted(false);
        }
    }

    /// Grows the scene rect when the pointer leaves it. Returns true if it grew.
    pub fn pointer_moved(&mut self, point: Point) -> bool {
        if self.scene_rect.is_empty() || self.scene_rect.contains(point) {
            return false;
        }
        self.scene_rect = self.scene_rect.expand(POINTER_GROWTH);
        true
    }

    pub fn scene_rect(&self) -> Rect {
        self.scene_rect
    }

    pub fn items_bounding_rect(&self) -> Rect {
        let nodes = self
            .nodes
            .iter()
            .fold(Rect::NOTHING, |acc, node| acc.union(&node.scene_rect()));
        self.edges.iter().fold(nodes, |acc, edge| {
            acc.union(&Rect::from_min_max(
                Point::new(edge.from.x.min(edge.to.x), edge.from.y.min(edge.to.y)),
                Point::new(edge.from.x.max(edge.to.x), edge.from.y.max(edge.to.y)),
            ))
        })
    }

    /// Items rect with a little padding, or None for an empty scene.
    pub fn fit_rect(&self) -> Option<Rect> {
        let items = self.items_bounding_rect();
        if items.is_empty() {
            return None;
        }
        Some(items.expand(FIT_PADDING))
    }
}

impl Default for DiagramScene {
    fn default() -> Self {
        Self::new()
    }
}
