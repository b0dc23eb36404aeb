#![forbid(unsafe_code)]

pub mod csv_table;
pub mod events;
pub mod file_watch;
pub mod launcher;
pub mod logging;
pub mod registry;
pub mod row_state;
pub mod test_table;
