use std::collections::VecDeque;

use bench_core::csv_table::CsvLoadError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
}

impl Dialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Per-window queue of message boxes. While anything is queued the owning
/// window's content is disabled.
#[derive(Debug, Default)]
pub struct DialogQueue {
    pending: VecDeque<Dialog>,
    /// Frame on which the front dialog was first drawn.
    shown_on_frame: Option<u64>,
}

impl DialogQueue {
    pub fn push(&mut self, dialog: Dialog) {
        self.pending.push_back(dialog);
    }

    /// Queues a "CSV Error" box for load failures that warrant one.
    pub fn push_csv_error(&mut self, err: &CsvLoadError) -> bool {
        if !err.wants_dialog() {
            return false;
        }
        self.push(Dialog::new("CSV Error", err.dialog_message()));
        true
    }

    pub fn current(&self) -> Option<&Dialog> {
        self.pending.front()
    }

    pub fn acknowledge(&mut self) -> Option<Dialog> {
        self.shown_on_frame = None;
        self.pending.pop_front()
    }

    pub fn is_blocking(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Draws the front dialog centered over the window. Enter only confirms
    /// once the dialog has been on screen for a frame, so the keypress that
    /// caused it cannot also dismiss it.
    pub fn show(&mut self, ctx: &egui::Context) {
        if self.pending.is_empty() {
            return;
        }
        let frame = ctx.frame_nr();
        let first_frame = *self.shown_on_frame.get_or_insert(frame);
        let enter = frame > first_frame && ctx.input(|input| input.key_pressed(egui::Key::Enter));
        let Some(dialog) = self.current() else {
            return;
        };
        let mut acknowledged = enter;
        let screen = ctx.screen_rect();
        ctx.layer_painter(egui::LayerId::new(
            egui::Order::Middle,
            egui::Id::new("bench.dialog.shade"),
        ))
        .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(96));
        egui::Window::new(dialog.title.as_str())
            .id(egui::Id::new("bench.dialog"))
            .collapsible(false)
            .resizable(false)
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(dialog.message.as_str());
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        acknowledged = true;
                    }
                });
            });
        if acknowledged {
            self.acknowledge();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialogs_queue_in_order() {
        let mut queue = DialogQueue::default();
        assert!(!queue.is_blocking());
        queue.push(Dialog::new("a", "first"));
        queue.push(Dialog::new("b", "second"));
        assert_eq!(queue.current().map(|d| d.message.as_str()), Some("first"));
        assert_eq!(queue.acknowledge().map(|d| d.title), Some("a".to_string()));
        assert!(queue.is_blocking());
        queue.acknowledge();
        assert!(!queue.is_blocking());
    }

    #[test]
    fn empty_file_gets_no_dialog() {
        let mut queue = DialogQueue::default();
        assert!(!queue.push_csv_error(&CsvLoadError::Empty));
        assert!(!queue.is_blocking());

        let bad_row = CsvLoadError::BadRow {
            line_number: 2,
            line: "a,b".to_string(),
            expected: 3,
            found: 2,
        };
        assert!(queue.push_csv_error(&bad_row));
        let dialog = queue.current().unwrap();
        assert_eq!(dialog.title, "CSV Error");
        assert_eq!(dialog.message, "Malformed row:\na,b\nExpected 3 columns.");
    }

    fn enter_pressed() -> egui::RawInput {
        egui::RawInput {
            events: vec![egui::Event::Key {
                key: egui::Key::Enter,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers: egui::Modifiers::NONE,
            }],
            ..egui::RawInput::default()
        }
    }

    #[test]
    fn enter_that_raised_the_dialog_does_not_dismiss_it() {
        let ctx = egui::Context::default();
        let mut queue = DialogQueue::default();
        let missing = CsvLoadError::Io {
            path: "tests.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };

        let _ = ctx.run(enter_pressed(), |ctx| {
            assert!(queue.push_csv_error(&missing));
            queue.show(ctx);
        });
        assert!(queue.is_blocking());

        let _ = ctx.run(egui::RawInput::default(), |ctx| queue.show(ctx));
        assert!(queue.is_blocking());

        let _ = ctx.run(enter_pressed(), |ctx| queue.show(ctx));
        assert!(!queue.is_blocking());
    }

    #[test]
    fn next_dialog_gets_its_own_first_frame() {
        let ctx = egui::Context::default();
        let mut queue = DialogQueue::default();
        queue.push(Dialog::new("a", "first"));
        queue.push(Dialog::new("b", "second"));

        let _ = ctx.run(egui::RawInput::default(), |ctx| queue.show(ctx));
        let _ = ctx.run(enter_pressed(), |ctx| queue.show(ctx));
        assert_eq!(queue.current().map(|d| d.title.as_str()), Some("b"));

        let _ = ctx.run(enter_pressed(), |ctx| queue.show(ctx));
        assert_eq!(queue.current().map(|d| d.title.as_str()), Some("b"));
        let _ = ctx.run(enter_pressed(), |ctx| queue.show(ctx));
        assert!(!queue.is_blocking());
    }
}
