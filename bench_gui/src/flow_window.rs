use bench_core::logging;
use bench_core::test_table::flow_window_title;
use egui::{Color32, Pos2, Sense, Stroke};
use flow_diagram::{sample_tree, DiagramScene, NodeFill, Point, Rect, Vec2, ViewTransform};

const NODE_FILL: Color32 = Color32::WHITE;
const NODE_SELECTED_FILL: Color32 = Color32::YELLOW;
const INK: Color32 = Color32::BLACK;
const PEN_WIDTH: f32 = 2.0;
const LABEL_SIZE: f32 = 14.0;
const PANE_WIDTH: f32 = 220.0;

pub enum FlowRequest {
    NewFlow { title: String },
}

pub struct FlowWindow {
    title: String,
    scene: DiagramScene,
    view: ViewTransform,
    panes: [String; 3],
    centered: bool,
}

impl FlowWindow {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let mut scene = sample_tree();
        scene.on_node_clicked(|event| {
            logging::debug(format!("flow node clicked: {} ({:?})", event.label, event.id));
        });
        logging::info(format!("opened {}", title));
        Self {
            title,
            scene,
            view: ViewTransform::new(),
            panes: [
                "Pane 1".to_string(),
                "Pane 2".to_string(),
                "Pane 4".to_string(),
            ],
            centered: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> Vec<FlowRequest> {
        let mut requests = Vec::new();
        egui::TopBottomPanel::top("flow.menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Window", |ui| {
                    if ui.button("New Compilation Flow").clicked() {
                        requests.push(FlowRequest::NewFlow {
                            title: flow_window_title(None),
                        });
                        ui.close_menu();
                    }
                });
            });
        });

        let [pane1, pane2, pane4] = &mut self.panes;
        text_pane(ctx, egui::SidePanel::left("flow.pane1"), pane1);
        text_pane(ctx, egui::SidePanel::left("flow.pane2"), pane2);
        text_pane(ctx, egui::SidePanel::right("flow.pane4"), pane4);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::WHITE))
            .show(ctx, |ui| self.diagram_ui(ui));
        requests
    }

    fn diagram_ui(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let origin = response.rect.min;
        let to_local = |pos: Pos2| Point::new(pos.x - origin.x, pos.y - origin.y);
        let viewport = Rect::from_min_size(
            Point::ZERO,
            Vec2::new(response.rect.width(), response.rect.height()),
        );

        let drag = if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            Vec2::new(delta.x, delta.y)
        } else {
            Vec2::default()
        };
        let hovered = response.hovered();
        let pointer = response.hover_pos().map(to_local);
        let input = ui.input(|input| DiagramInput {
            pointer,
            moved: input.pointer.delta() != egui::Vec2::ZERO,
            drag,
            wheel_notches: wheel_notches(input),
            pressed: hovered && input.pointer.primary_pressed(),
        });
        let over_node = self.interact(&viewport, &input);
        if response.dragged() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if over_node {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let to_screen = |point: Point| {
            let local = self.view.scene_to_screen(point);
            Pos2::new(origin.x + local.x, origin.y + local.y)
        };
        let scale = self.view.scale();
        let pen = Stroke::new(PEN_WIDTH * scale, INK);

        for edge in self.scene.edges() {
            painter.line_segment([to_screen(edge.from), to_screen(edge.to)], pen);
        }
        for (_, node) in self.scene.nodes() {
            let bounds = node.scene_rect();
            let rect = egui::Rect::from_min_max(to_screen(bounds.min), to_screen(bounds.max));
            let fill = match node.fill() {
                NodeFill::Normal => NODE_FILL,
                NodeFill::Highlighted => NODE_SELECTED_FILL,
            };
            painter.rect(rect, 0.0, fill, pen);
            painter.text(
                to_screen(node.label_anchor()),
                egui::Align2::CENTER_CENTER,
                node.label(),
                egui::FontId::proportional(LABEL_SIZE * scale),
                INK,
            );
        }
    }

    /// Applies one frame of pointer input to the view and scene. The view is
    /// kept inside the scene rect. Returns true while the pointer is over a node.
    fn interact(&mut self, viewport: &Rect, input: &DiagramInput) -> bool {
        if !self.centered {
            if let Some(fit) = self.scene.fit_rect() {
                self.view.center_on(&fit, viewport);
            }
            self.centered = true;
        }
        self.view.pan_by(input.drag);
        if let Some(pointer) = input.pointer {
            for &notches in &input.wheel_notches {
                self.view.zoom_at(pointer, notches);
            }
        }
        self.view.clamp_to(&self.scene.scene_rect(), viewport);

        let Some(pointer) = input.pointer else {
            return false;
        };
        let scene_point = self.view.screen_to_scene(pointer);
        if input.moved {
            self.scene.pointer_moved(scene_point);
        }
        if input.pressed {
            self.scene.press_at(scene_point);
        }
        self.scene.hit_test(scene_point).is_some()
    }
}

/// Pointer state for one frame, in diagram-local screen coordinates.
#[derive(Clone, Debug, Default)]
struct DiagramInput {
    pointer: Option<Point>,
    moved: bool,
    drag: Vec2,
    wheel_notches: Vec<f32>,
    pressed: bool,
}

fn text_pane(ctx: &egui::Context, panel: egui::SidePanel, text: &mut String) {
    panel
        .resizable(true)
        .default_width(PANE_WIDTH)
        .show(ctx, |ui| {
            ui.add_sized(ui.available_size(), egui::TextEdit::multiline(text));
        });
}

/// One zoom step per wheel event, like a notched mouse wheel.
fn wheel_notches(input: &egui::InputState) -> Vec<f32> {
    input
        .events
        .iter()
        .filter_map(|event| match event {
            egui::Event::MouseWheel { delta, .. } if delta.y > 0.0 => Some(1.0),
            egui::Event::MouseWheel { delta, .. } if delta.y < 0.0 => Some(-1.0),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_window_shows_sample_and_placeholder_panes() {
        let window = FlowWindow::new("Compilation Flow (t1)");
        assert_eq!(window.title(), "Compilation Flow (t1)");
        assert_eq!(window.scene.node_count(), 7);
        assert_eq!(window.panes, ["Pane 1", "Pane 2", "Pane 4"]);
        assert!(!window.centered);
    }

    fn viewport() -> Rect {
        Rect::from_min_size(Point::ZERO, Vec2::new(540.0, 600.0))
    }

    fn pointer_at(x: f32, y: f32) -> DiagramInput {
        DiagramInput {
            pointer: Some(Point::new(x, y)),
            ..DiagramInput::default()
        }
    }

    #[test]
    fn resting_pointer_grows_scene_rect_only_once() {
        let mut window = FlowWindow::new("Compilation Flow");
        let initial = window.scene.scene_rect();
        let moved = DiagramInput {
            moved: true,
            ..pointer_at(5.0, 5.0)
        };
        window.interact(&viewport(), &moved);
        let grown = window.scene.scene_rect();
        assert_eq!(grown, initial.expand(50.0));

        for _ in 0..5 {
            window.interact(&viewport(), &pointer_at(5.0, 5.0));
        }
        assert_eq!(window.scene.scene_rect(), grown);
    }

    #[test]
    fn press_toggles_node_under_pointer() {
        let mut window = FlowWindow::new("Compilation Flow");
        window.interact(&viewport(), &DiagramInput::default());
        let (root, center) = window
            .scene
            .nodes()
            .next()
            .map(|(id, node)| (id, node.scene_rect().center()))
            .unwrap();
        let over_root = window.view.scene_to_screen(center);
        let hover = pointer_at(over_root.x, over_root.y);
        let press = DiagramInput {
            pressed: true,
            ..hover.clone()
        };

        assert!(window.interact(&viewport(), &hover));
        assert_eq!(window.scene.selected(), None);
        window.interact(&viewport(), &press);
        assert_eq!(window.scene.selected(), Some(root));
        window.interact(&viewport(), &hover);
        assert_eq!(window.scene.selected(), Some(root));
        window.interact(&viewport(), &press);
        assert_eq!(window.scene.selected(), None);
    }

    #[test]
    fn drag_stops_at_scene_rect_and_reaches_further_after_growth() {
        let mut window = FlowWindow::new("Compilation Flow");
        let drag_left = DiagramInput {
            drag: Vec2::new(-10_000.0, 0.0),
            ..DiagramInput::default()
        };
        window.interact(&viewport(), &drag_left);
        let before = window.scene.scene_rect();
        let right_edge = window.view.scene_to_screen(before.max).x;
        assert!((right_edge - 540.0).abs() < 1e-3);

        let outside = DiagramInput {
            moved: true,
            ..pointer_at(5.0, 5.0)
        };
        window.interact(&viewport(), &outside);
        assert!(window.scene.scene_rect().max.x > before.max.x);

        window.interact(&viewport(), &drag_left);
        let after = window.scene.scene_rect();
        assert!((window.view.scene_to_screen(after.max).x - 540.0).abs() < 1e-3);
        assert!(window.view.scene_to_screen(before.max).x < 539.0);
    }
}
