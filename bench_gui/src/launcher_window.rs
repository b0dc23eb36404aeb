use bench_core::launcher::{LaunchTarget, LauncherKey, LauncherMenu, MenuEntry};
use egui::Color32;

pub const LAUNCHER_TITLE: &str = "Compiler Bench";
pub const LAUNCHER_WIDTH: u32 = 420;
pub const LAUNCHER_HEIGHT: u32 = 560;

const BUTTON_HEIGHT: f32 = 44.0;
const FOCUS_STROKE: Color32 = Color32::from_rgb(40, 110, 220);

#[derive(Default)]
pub struct LauncherWindow {
    menu: LauncherMenu,
}

impl LauncherWindow {
    pub fn ui(&mut self, ctx: &egui::Context) -> Option<LaunchTarget> {
        let mut launched = None;
        for key in launcher_keys(ctx) {
            if let Some(target) = self.menu.handle_key(key) {
                launched = Some(target);
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered_justified(|ui| {
                ui.add_space(8.0);
                let focused = self.menu.focused();
                let mut clicked = None;
                for (index, entry) in self.menu.entries().iter().enumerate() {
                    let button = egui::Button::new(entry_text(entry))
                        .min_size(egui::vec2(0.0, BUTTON_HEIGHT))
                        .stroke(if focused == Some(index) {
                            egui::Stroke::new(2.0, FOCUS_STROKE)
                        } else {
                            egui::Stroke::NONE
                        });
                    if ui.add_enabled(entry.enabled, button).clicked() {
                        clicked = Some(index);
                    }
                    ui.add_space(4.0);
                }
                if let Some(index) = clicked {
                    launched = self.menu.activate(index).or(launched);
                }
            });
        });
        launched
    }
}

/// Label with the accelerator letter underlined.
fn entry_text(entry: &MenuEntry) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    let font = egui::TextFormat {
        font_id: egui::FontId::proportional(18.0),
        ..Default::default()
    };
    match entry.accelerator_span() {
        Some((start, end)) => {
            job.append(&entry.label[..start], 0.0, font.clone());
            job.append(
                &entry.label[start..end],
                0.0,
                egui::TextFormat {
                    underline: egui::Stroke::new(1.0, Color32::GRAY),
                    ..font.clone()
                },
            );
            job.append(&entry.label[end..], 0.0, font);
        }
        None => job.append(entry.label, 0.0, font),
    }
    job
}

fn launcher_keys(ctx: &egui::Context) -> Vec<LauncherKey> {
    ctx.input(|input| {
        let mut keys = Vec::new();
        for event in &input.events {
            match event {
                egui::Event::Key {
                    key, pressed: true, ..
                } => match key {
                    egui::Key::ArrowUp => keys.push(LauncherKey::Up),
                    egui::Key::ArrowDown => keys.push(LauncherKey::Down),
                    egui::Key::Enter => keys.push(LauncherKey::Activate),
                    _ => {}
                },
                egui::Event::Text(text) => keys.extend(text.chars().map(LauncherKey::Char)),
                _ => {}
            }
        }
        keys
    })
}

