#![forbid(unsafe_code)]

pub mod geometry;
pub mod sample;
pub mod scene;
pub mod view;

pub use geometry::{Point, Rect, Vec2};
pub use sample::sample_tree;
pub use scene::{
    DiagramEdge, DiagramNode, DiagramScene, EdgeId, NodeClicked, NodeFill, NodeId, SelectableShape,
};
pub use view::ViewTransform;
