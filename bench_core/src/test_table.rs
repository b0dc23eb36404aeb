//! Presenter behind the Compiler Tests grid.
//!
//! The presenter owns the last successfully loaded rows and a grid of cell
//! texts. Every grid write produces a change notification which is routed back
//! into the presenter, exactly as a toolkit item-changed signal would be; the
//! `populating` flag keeps the presenter's own rebuild from being read as user
//! edits.

use std::path::Path;

use crate::csv_table::{CsvLoadError, CsvLoader, FieldTuple};
use crate::events::{Emitter, SubscriptionId};
use crate::logging;
use crate::row_state::{reconcile, retained_count, RowState};

pub const STATUS_COLUMN: usize = 0;
pub const FLOW_COLUMN: usize = 1;
pub const FIRST_FIELD_COLUMN: usize = 2;

const STATUS_HEADER: &str = "Status";
const FLOW_HEADER: &str = "Compilation Flow";
pub const FLOW_BUTTON_LABEL: &str = "Open";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellChange {
    pub row: usize,
    pub column: usize,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEdited {
    pub row: usize,
    pub status: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub retained: usize,
}

#[derive(Clone, Debug, Default)]
pub struct TestGrid {
    headers: Vec<String>,
    cells: Vec<Vec<String>>,
}

impl TestGrid {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn text(&self, row: usize, column: usize) -> Option<&str> {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }

    pub fn is_editable(&self, column: usize) -> bool {
        column == STATUS_COLUMN
    }

    fn reset(&mut self, headers: Vec<String>, rows: usize) {
        let width = headers.len();
        self.headers = headers;
        self.cells = vec![vec![String::new(); width]; rows];
    }

    fn set_text(&mut self, row: usize, column: usize, text: &str) -> Option<CellChange> {
        let cell = self.cells.get_mut(row)?.get_mut(column)?;
        if cell.as_str() == text {
            return None;
        }
        text.clone_into(cell);
        Some(CellChange {
            row,
            column,
            value: text.to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct TestTablePresenter {
    loader: CsvLoader,
    rows: Vec<RowState>,
    grid: TestGrid,
    populating: bool,
    status_edits: Emitter<StatusEdited>,
}

impl TestTablePresenter {
    pub fn new(loader: CsvLoader) -> Self {
        let mut presenter = Self {
            loader,
            ..Self::default()
        };
        let headers = presenter.headers();
        presenter.grid.reset(headers, 0);
        presenter
    }

    pub fn loader(&self) -> &CsvLoader {
        &self.loader
    }

    pub fn rows(&self) -> &[RowState] {
        &self.rows
    }

    pub fn grid(&self) -> &TestGrid {
        &self.grid
    }

    pub fn is_populating(&self) -> bool {
        self.populating
    }

    pub fn on_status_edited(
        &mut self,
        handler: impl FnMut(&StatusEdited) + 'static,
    ) -> SubscriptionId {
        self.status_edits.subscribe(handler)
    }

    pub fn reload(&mut self, path: &Path) -> Result<LoadSummary, CsvLoadError> {
        let result = self.loader.load(path);
        self.apply_load(result)
    }

    /// Commits a load result. On error the previous rows and grid stay as they were.
    pub fn apply_load(
        &mut self,
        result: Result<Vec<FieldTuple>, CsvLoadError>,
    ) -> Result<LoadSummary, CsvLoadError> {
        let fields = match result {
            Ok(fields) => fields,
            Err(err) => {
                if err.wants_dialog() {
                    logging::warn(format!("tests table load rejected: {}", err));
                } else {
                    logging::debug(format!("tests table load skipped: {}", err));
                }
                return Err(err);
            }
        };
        let rows = reconcile(&self.rows, fields);
        let summary = LoadSummary {
            rows: rows.len(),
            retained: retained_count(&self.rows, &rows),
        };
        self.rows = rows;
        self.repopulate();
        logging::info(format!(
            "tests table loaded {} rows ({} kept their status slot)",
            summary.rows, summary.retained
        ));
        Ok(summary)
    }

    /// A user edit coming from the view. Returns false for read-only cells.
    pub fn edit_cell(&mut self, row: usize, column: usize, text: &str) -> bool {
        if !self.grid.is_editable(column) || row >= self.grid.row_count() {
            return false;
        }
        if let Some(change) = self.grid.set_text(row, column, text) {
            self.on_cell_changed(change);
        }
        true
    }

    pub fn flow_title(&self, row: usize) -> Option<String> {
        self.rows
            .get(row)
            .map(|state| flow_window_title(Some(state.fields.name())))
    }

    fn headers(&self) -> Vec<String> {
        let mut headers = vec![STATUS_HEADER.to_string(), FLOW_HEADER.to_string()];
        headers.extend(self.loader.schema().columns().iter().cloned());
        headers
    }

    fn repopulate(&mut self) {
        self.populating = true;
        let headers = self.headers();
        self.grid.reset(headers, self.rows.len());
        let mut changes = Vec::new();
        for (row, state) in self.rows.iter().enumerate() {
            changes.extend(self.grid.set_text(row, STATUS_COLUMN, &state.status));
            changes.extend(self.grid.set_text(row, FLOW_COLUMN, FLOW_BUTTON_LABEL));
            for (offset, value) in state.fields.fields().iter().enumerate() {
                changes.extend(self.grid.set_text(row, FIRST_FIELD_COLUMN + offset, value));
            }
        }
        for change in changes {
            self.on_cell_changed(change);
        }
        self.populating = false;
    }

    fn on_cell_changed(&mut self, change: CellChange) {
        if self.populating {
            return;
        }
        logging::debug(format!(
            "cell changed: row {} col {} -> {}",
            change.row, change.column, change.value
        ));
        if change.column != STATUS_COLUMN {
            return;
        }
        let Some(state) = self.rows.get_mut(change.row) else {
            return;
        };
        state.status = change.value;
        let event = StatusEdited {
            row: change.row,
            status: state.status.clone(),
        };
        self.status_edits.emit(&event);
    }
}

/// Title for a Compilation Flow window, optionally naming the test it was opened from.
pub fn flow_window_title(test_name: Option<&str>) -> String {
    match test_name {
        Some(name) => format!("Compilation Flow ({})", name),
        None => "Compilation Flow".to_string(),
    }
}
