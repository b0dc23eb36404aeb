use std::path::{Path, PathBuf};
use std::time::Instant;

use bench_core::csv_table::{CsvLoader, CsvSchema};
use bench_core::file_watch::{CsvWatch, FileWatcher};
use bench_core::logging;
use bench_core::test_table::{flow_window_title, TestTablePresenter, FLOW_COLUMN, STATUS_COLUMN};

use crate::config::BenchConfig;
use crate::dialog::DialogQueue;
use crate::log_panel::{log_panel, LogRing};

pub const TESTS_TITLE: &str = "Compiler Tests";

const PATH_FIELD_WIDTH: f32 = 360.0;
const STATUS_FIELD_WIDTH: f32 = 90.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestsRequest {
    OpenFlow { title: String },
    PathsChanged,
}

pub struct TestsWindow {
    presenter: TestTablePresenter,
    watch: CsvWatch,
    csv_input: String,
    data_dir_input: String,
    dialogs: DialogQueue,
    log: LogRing,
    log_open: bool,
}

impl TestsWindow {
    pub fn new(config: &BenchConfig, log: LogRing) -> Self {
        let loader = CsvLoader::new(CsvSchema::default(), config.csv_dialect());
        let mut window = Self {
            presenter: TestTablePresenter::new(loader),
            watch: CsvWatch::new(FileWatcher::new(config.poll_interval())),
            csv_input: String::new(),
            data_dir_input: config.data_dir.clone().unwrap_or_default(),
            dialogs: DialogQueue::default(),
            log,
            log_open: false,
        };
        if let Some(path) = config.csv_path.as_deref() {
            window.set_csv_path(path);
        }
        window
    }

    pub fn csv_path(&self) -> Option<&Path> {
        self.watch.path()
    }

    pub fn data_dir(&self) -> &str {
        &self.data_dir_input
    }

    /// Points the window at another CSV: the watch moves there and the table reloads.
    pub fn set_csv_path(&mut self, path: &str) {
        path.clone_into(&mut self.csv_input);
        if let Some(path) = self.watch.watch(Path::new(path)) {
            self.load(&path);
        }
    }

    /// Reloads for every change the watcher reported. Returns true if anything reloaded.
    pub fn poll(&mut self, now: Instant) -> bool {
        let reloads = self.watch.poll(now);
        for path in &reloads {
            self.load(path);
        }
        !reloads.is_empty()
    }

    fn load(&mut self, path: &Path) {
        if let Err(err) = self.presenter.reload(path) {
            self.dialogs.push_csv_error(&err);
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> Vec<TestsRequest> {
        let mut requests = Vec::new();
        let enabled = !self.dialogs.is_blocking();

        egui::TopBottomPanel::top("tests.menu").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("Window", |ui| {
                        if ui.button("New Compilation Flow").clicked() {
                            requests.push(TestsRequest::OpenFlow {
                                title: flow_window_title(None),
                            });
                            ui.close_menu();
                        }
                    });
                });
            });
        });

        egui::TopBottomPanel::top("tests.pickers").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    self.csv_picker_ui(ui, &mut requests);
                    ui.separator();
                    self.data_dir_picker_ui(ui, &mut requests);
                });
                ui.add_space(4.0);
            });
        });

        egui::TopBottomPanel::bottom("tests.log")
            .resizable(false)
            .show(ctx, |ui| {
                log_panel(ui, &self.log, &mut self.log_open);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                self.table_ui(ui, &mut requests);
            });
        });

        self.dialogs.show(ctx);
        requests
    }

    fn csv_picker_ui(&mut self, ui: &mut egui::Ui, requests: &mut Vec<TestsRequest>) {
        ui.label("Tests CSV:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.csv_input).desired_width(PATH_FIELD_WIDTH),
        );
        let committed = response.lost_focus() && Some(Path::new(&self.csv_input)) != self.watch.path();
        let mut picked = None;
        if ui.button("Browse…").clicked() {
            picked = pick_file(&self.csv_input);
        }
        if let Some(path) = picked {
            self.set_csv_path(&path.display().to_string());
            requests.push(TestsRequest::PathsChanged);
        } else if committed {
            let path = self.csv_input.clone();
            self.set_csv_path(&path);
            requests.push(TestsRequest::PathsChanged);
        }
    }

    fn data_dir_picker_ui(&mut self, ui: &mut egui::Ui, requests: &mut Vec<TestsRequest>) {
        ui.label("Tests Data:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.data_dir_input).desired_width(PATH_FIELD_WIDTH),
        );
        if response.lost_focus() {
            logging::debug(format!("tests data directory: {}", self.data_dir_input));
            requests.push(TestsRequest::PathsChanged);
        }
        if ui.button("Browse…").clicked() {
            if let Some(dir) = pick_folder(&self.data_dir_input) {
                self.data_dir_input = dir.display().to_string();
                logging::debug(format!("tests data directory: {}", self.data_dir_input));
                requests.push(TestsRequest::PathsChanged);
            }
        }
    }

    fn table_ui(&mut self, ui: &mut egui::Ui, requests: &mut Vec<TestsRequest>) {
        let grid = self.presenter.grid();
        let columns = grid.column_count();
        let mut edits = Vec::new();
        egui::ScrollArea::both()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("tests.table")
                    .num_columns(columns)
                    .striped(true)
                    .min_col_width(80.0)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        for header in grid.headers() {
                            ui.strong(header.as_str());
                        }
                        ui.end_row();
                        for row in 0..grid.row_count() {
                            for column in 0..columns {
                                let text = grid.text(row, column).unwrap_or_default();
                                if column == STATUS_COLUMN {
                                    let mut value = text.to_string();
                                    let edit = egui::TextEdit::singleline(&mut value)
                                        .desired_width(STATUS_FIELD_WIDTH);
                                    if ui.add(edit).changed() {
                                        edits.push((row, value));
                                    }
                                } else if column == FLOW_COLUMN {
                                    if ui.button(text).clicked() {
                                        if let Some(title) = self.presenter.flow_title(row) {
                                            requests.push(TestsRequest::OpenFlow { title });
                                        }
                                    }
                                } else {
                                    ui.label(text);
                                }
                            }
                            ui.end_row();
                        }
                    });
            });
        for (row, value) in edits {
            self.presenter.edit_cell(row, STATUS_COLUMN, &value);
        }
    }
}

fn pick_file(current: &str) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Select File")
        .add_filter("CSV", &["csv"])
        .add_filter("All files", &["*"]);
    if let Some(dir) = Path::new(current).parent().filter(|dir| dir.is_dir()) {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_file()
}

fn pick_folder(current: &str) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new().set_title("Select Directory");
    let current = Path::new(current);
    if current.is_dir() {
        dialog = dialog.set_directory(current);
    }
    dialog.pick_folder()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "bench_gui_tests_{}_{}_{}",
            label,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    const HEADER: &str = "Test Name,Source File,Expected Output File\n";

    #[test]
    fn configured_csv_loads_on_open() {
        let dir = temp_dir("open");
        let csv = dir.join("tests.csv");
        fs::write(&csv, format!("{}t1,src.c,exp.txt\nt2,b.c,b.txt\n", HEADER)).unwrap();
        let config = BenchConfig {
            csv_path: Some(csv.display().to_string()),
            data_dir: Some("data".to_string()),
            ..BenchConfig::default()
        };
        let window = TestsWindow::new(&config, LogRing::default());
        assert_eq!(window.presenter.rows().len(), 2);
        assert_eq!(window.csv_path(), Some(csv.as_path()));
        assert_eq!(window.data_dir(), "data");
        assert!(!window.dialogs.is_blocking());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn bad_csv_queues_dialog_and_keeps_rows() {
        let dir = temp_dir("bad");
        let good = dir.join("good.csv");
        let bad = dir.join("bad.csv");
        fs::write(&good, format!("{}t1,src.c,exp.txt\n", HEADER)).unwrap();
        fs::write(&bad, "Name,Source\nt1,src.c\n").unwrap();

        let mut window = TestsWindow::new(&BenchConfig::default(), LogRing::default());
        window.set_csv_path(&good.display().to_string());
        assert_eq!(window.presenter.rows().len(), 1);

        window.set_csv_path(&bad.display().to_string());
        assert_eq!(window.presenter.rows().len(), 1);
        assert_eq!(window.csv_path(), Some(bad.as_path()));
        let dialog = window.dialogs.current().unwrap();
        assert_eq!(dialog.title, "CSV Error");
        assert!(dialog.message.starts_with("The CSV columns do not match"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn empty_path_is_ignored() {
        let mut window = TestsWindow::new(&BenchConfig::default(), LogRing::default());
        window.set_csv_path("");
        assert_eq!(window.csv_path(), None);
        assert!(!window.dialogs.is_blocking());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = temp_dir("missing");
        let mut window = TestsWindow::new(&BenchConfig::default(), LogRing::default());
        window.set_csv_path(&dir.join("nope.csv").display().to_string());
        assert!(window.dialogs.is_blocking());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn polled_rewrites_reload_and_keep_edited_status() {
        let dir = temp_dir("poll");
        let csv = dir.join("tests.csv");
        fs::write(&csv, format!("{}t1,src.c,exp.txt\n", HEADER)).unwrap();
        let config = BenchConfig {
            csv_path: Some(csv.display().to_string()),
            ..BenchConfig::default()
        };
        let mut window = TestsWindow::new(&config, LogRing::default());
        assert!(window.presenter.edit_cell(0, STATUS_COLUMN, "passed"));
        let start = Instant::now();
        assert!(!window.poll(start));

        fs::write(&csv, format!("{}t1,src.c,exp.txt\nt2,b.c,b.txt\n", HEADER)).unwrap();
        assert!(window.poll(start + Duration::from_secs(60)));
        assert_eq!(window.presenter.rows().len(), 2);
        assert_eq!(window.presenter.grid().text(0, STATUS_COLUMN), Some("passed"));
        assert_eq!(window.presenter.grid().text(1, STATUS_COLUMN), Some(""));
        assert!(!window.dialogs.is_blocking());

        fs::write(&csv, format!("{}t1,src.c\n", HEADER)).unwrap();
        assert!(window.poll(start + Duration::from_secs(120)));
        assert_eq!(window.presenter.rows().len(), 2);
        assert_eq!(window.presenter.grid().text(0, STATUS_COLUMN), Some("passed"));
        assert_eq!(
            window.dialogs.current().map(|dialog| dialog.title.as_str()),
            Some("CSV Error")
        );
        let _ = fs::remove_dir_all(dir);
    }
}
