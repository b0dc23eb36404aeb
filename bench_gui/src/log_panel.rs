use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bench_core::logging::{self, LogLevel};

pub const LOG_MAX_LINES: usize = 500;

/// Bounded log shared between the logging sink and every window that shows it.
#[derive(Clone)]
pub struct LogRing {
    inner: Arc<Mutex<LogLines>>,
}

struct LogLines {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl LogRing {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogLines {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
            })),
        }
    }

    pub fn push(&self, line: String) {
        let mut guard = self.inner.lock().expect("log ring lock poisoned");
        while guard.lines.len() >= guard.max_lines {
            guard.lines.pop_front();
        }
        guard.lines.push_back(line);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.lock().expect("log ring lock poisoned");
        guard.lines.clear();
    }

    pub fn snapshot(&self) -> Vec<String> {
        let guard = self.inner.lock().expect("log ring lock poisoned");
        guard.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.lock().expect("log ring lock poisoned");
        guard.lines.len()
    }

    /// Routes the process logger to stderr and into this ring.
    pub fn install(&self) {
        let ring = self.clone();
        logging::set_logger(move |level: LogLevel, message: &str| {
            logging::write_stderr(level, message);
            ring.push(format!("[{}] {}", level, message));
        });
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new(LOG_MAX_LINES)
    }
}

pub fn log_panel(ui: &mut egui::Ui, log: &LogRing, open: &mut bool) {
    ui.horizontal(|ui| {
        let arrow = if *open { "v Log" } else { "> Log" };
        if ui.selectable_label(*open, arrow).clicked() {
            *open = !*open;
        }
        if *open && ui.button("Clear log").clicked() {
            log.clear();
        }
    });
    if !*open {
        return;
    }
    egui::ScrollArea::vertical()
        .max_height(160.0)
        .stick_to_bottom(true)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for line in log.snapshot() {
                ui.add(egui::Label::new(egui::RichText::new(line).monospace()).wrap());
            }
        });
}
