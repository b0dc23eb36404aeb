use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use bench_core::csv_table::{CsvDialect, CsvLoadError, CsvLoader, CsvSchema, FieldTuple};
use bench_core::file_watch::{CsvWatch, FileWatcher, DEFAULT_POLL_INTERVAL};
use bench_core::logging::{self, LogLevel};
use bench_core::row_state::{reconcile, retained_count, RowState};
use clap::{Parser, Subcommand};
use flow_diagram::sample_tree;

const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 2;
const EXIT_CSV_IO: i32 = 20;
const EXIT_CSV_INVALID: i32 = 21;

#[derive(Parser)]
#[command(name = "tools", version, about = "Compiler bench tools CLI")]
struct Cli {
    /// error, warn, info or debug
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a tests CSV and print its rows.
    CheckCsv {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// Allow double-quoted fields.
        #[arg(long)]
        quoted: bool,
    },
    /// Reload a tests CSV whenever it changes and report which rows kept their identity.
    WatchCsv {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[arg(long, value_name = "MS", default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
        interval_ms: u64,
        /// Stop after this many reloads.
        #[arg(long, value_name = "N")]
        max_reloads: Option<u32>,
        #[arg(long)]
        quoted: bool,
    },
    /// Print the sample compilation flow tree.
    FlowSample,
}

fn main() {
    let cli = Cli::parse();
    if let Some(value) = cli.log_level.as_deref() {
        match LogLevel::parse(value) {
            Some(level) => logging::set_max_level(level),
            None => {
                eprintln!("unknown log level: {}", value);
                std::process::exit(EXIT_USAGE);
            }
        }
    }
    let exit_code = match cli.command {
        Commands::CheckCsv { path, quoted } => check_csv(&path, quoted),
        Commands::WatchCsv {
            path,
            interval_ms,
            max_reloads,
            quoted,
        } => watch_csv(&path, interval_ms, max_reloads, quoted),
        Commands::FlowSample => flow_sample(),
    };
    std::process::exit(exit_code);
}

fn loader(quoted: bool) -> CsvLoader {
    let dialect = if quoted {
        CsvDialect::quoted()
    } else {
        CsvDialect::naive()
    };
    CsvLoader::new(CsvSchema::default(), dialect)
}

fn exit_code_for(err: &CsvLoadError) -> i32 {
    if err.is_validation() || matches!(err, CsvLoadError::Empty) {
        EXIT_CSV_INVALID
    } else {
        EXIT_CSV_IO
    }
}

fn check_csv(path: &Path, quoted: bool) -> i32 {
    match loader(quoted).load(path) {
        Ok(rows) => {
            for (index, row) in rows.iter().enumerate() {
                println!("{:>4} {}", index + 1, format_row(row));
            }
            println!("{} rows ok", rows.len());
            EXIT_SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            exit_code_for(&err)
        }
    }
}

fn format_row(row: &FieldTuple) -> String {
    row.fields().join(" | ")
}

fn watch_csv(path: &Path, interval_ms: u64, max_reloads: Option<u32>, quoted: bool) -> i32 {
    let interval = Duration::from_millis(interval_ms.max(1));
    let loader = loader(quoted);
    let mut watch = CsvWatch::new(FileWatcher::new(interval));
    let Some(path) = watch.watch(path) else {
        eprintln!("empty path");
        return EXIT_USAGE;
    };

    let mut rows: Vec<RowState> = Vec::new();
    if let Err(err) = reload(&loader, &path, &mut rows) {
        eprintln!("{}", err);
        if !err.is_validation() {
            return exit_code_for(&err);
        }
    }

    let mut reloads = 0u32;
    while max_reloads.map_or(true, |max| reloads < max) {
        thread::sleep(interval);
        for changed in watch.poll(Instant::now()) {
            reloads += 1;
            if let Err(err) = reload(&loader, &changed, &mut rows) {
                eprintln!("reload {} rejected: {}", reloads, err);
            }
        }
    }
    EXIT_SUCCESS
}

fn reload(loader: &CsvLoader, path: &Path, rows: &mut Vec<RowState>) -> Result<(), CsvLoadError> {
    let fields = loader.load(path)?;
    let next = reconcile(rows, fields);
    println!(
        "{}: {} rows, {} kept",
        path.display(),
        next.len(),
        retained_count(rows, &next)
    );
    *rows = next;
    Ok(())
}

fn flow_sample() -> i32 {
    let scene = sample_tree();
    for (id, node) in scene.nodes() {
        let position = node.position();
        println!(
            "node {:>2} {:<8} at ({}, {})",
            id.index(),
            node.label(),
            position.x,
            position.y
        );
    }
    for edge in scene.edges() {
        let parent = scene.node(edge.parent).map(|node| node.label()).unwrap_or("?");
        let child = scene.node(edge.child).map(|node| node.label()).unwrap_or("?");
        println!(
            "edge {} -> {} ({}, {}) -> ({}, {})",
            parent, child, edge.from.x, edge.from.y, edge.to.x, edge.to.y
        );
    }
    EXIT_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_validation_errors_map_to_distinct_exit_codes() {
        let io = CsvLoadError::Io {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(exit_code_for(&io), EXIT_CSV_IO);
        let bad = CsvLoadError::BadHeader {
            found: vec!["Name".to_string()],
            expected: CsvSchema::default().columns().to_vec(),
        };
        assert_eq!(exit_code_for(&bad), EXIT_CSV_INVALID);
        assert_eq!(exit_code_for(&CsvLoadError::Empty), EXIT_CSV_INVALID);
    }

    #[test]
    fn reload_carries_status_forward() {
        let loader = loader(false);
        let rows = vec![RowState::new(
            "PASS",
            FieldTuple::from(vec!["t1", "src.c", "exp.txt"]),
        )];
        let fields = loader
            .parse("Test Name,Source File,Expected Output File\nt2,b.c,b.txt\nt1,src.c,exp.txt\n")
            .unwrap();
        let next = reconcile(&rows, fields);
        assert_eq!(next[0].status, "");
        assert_eq!(next[1].status, "PASS");
        assert_eq!(retained_count(&rows, &next), 1);
    }
}
