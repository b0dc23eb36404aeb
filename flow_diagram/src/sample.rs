//! Fixed demonstration tree shown in every new flow window.

use crate::geometry::Point;
use crate::scene::{DiagramScene, NodeId};

const ROOT_POSITION: Point = Point::new(400.0, 0.0);
const LEVEL_Y: f32 = 100.0;
const H_SPACING: f32 = 150.0;

/// Three-level binary tree: Root, then Left1/Right1, then two leaves under each.
pub fn sample_tree() -> DiagramScene {
    let mut scene = DiagramScene::new();
    populate(&mut scene);
    scene
}

fn populate(scene: &mut DiagramScene) {
    let root = scene.add_node("Root", ROOT_POSITION);
    let left1 = child(scene, root, "Left1", -H_SPACING);
    let right1 = child(scene, root, "Right1", H_SPACING);

    let half = H_SPACING / 2.0;
    child(scene, left1, "Left2", -half);
    child(scene, left1, "Right2", half);
    child(scene, right1, "Left3", -half);
    child(scene, right1, "Right3", half);
}

fn child(scene: &mut DiagramScene, parent: NodeId, label: &str, dx: f32) -> NodeId {
    let origin = scene
        .node(parent)
        .map(|node| node.position())
        .unwrap_or(ROOT_POSITION);
    let id = scene.add_node(label, Point::new(origin.x + dx, origin.y + LEVEL_Y));
    scene.connect(parent, id);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_seven_nodes_and_six_edges() {
        let scene = sample_tree();
        let labels: Vec<&str> = scene.nodes().map(|(_, node)| node.label()).collect();
        assert_eq!(
            labels,
            ["Root", "Left1", "Right1", "Left2", "Right2", "Left3", "Right3"]
        );
        assert_eq!(scene.edges().len(), 6);
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn sample_layout_positions() {
        let scene = sample_tree();
        let positions: Vec<Point> = scene.nodes().map(|(_, node)| node.position()).collect();
        assert_eq!(positions[0], Point::new(400.0, 0.0));
        assert_eq!(positions[1], Point::new(250.0, 100.0));
        assert_eq!(positions[2], Point::new(550.0, 100.0));
        assert_eq!(positions[3], Point::new(175.0, 200.0));
        assert_eq!(positions[4], Point::new(325.0, 200.0));
        assert_eq!(positions[5], Point::new(475.0, 200.0));
        assert_eq!(positions[6], Point::new(625.0, 200.0));
    }

    #[test]
    fn sample_edges_join_parent_bottom_to_child_top() {
        let scene = sample_tree();
        let first = scene.edges()[0];
        assert_eq!(first.from, Point::new(460.0, 50.0));
        assert_eq!(first.to, Point::new(310.0, 100.0));
    }
}
