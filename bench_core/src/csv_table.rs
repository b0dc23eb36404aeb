use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DELIMITER: char = ',';
pub const REQUIRED_COLUMNS: [&str; 3] = ["Test Name", "Source File", "Expected Output File"];

const UTF8_BOM: char = '\u{feff}';

/// One parsed data row, in schema column order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldTuple(Vec<String>);

impl FieldTuple {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// First column; the test name under the default schema.
    pub fn name(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> From<Vec<S>> for FieldTuple {
    fn from(fields: Vec<S>) -> Self {
        Self(fields.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvSchema {
    columns: Vec<String>,
}

impl CsvSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

impl Default for CsvSchema {
    fn default() -> Self {
        Self::new(REQUIRED_COLUMNS.iter().map(|name| name.to_string()).collect())
    }
}

/// How a line is cut into fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsvDialect {
    /// Split on every delimiter. A delimiter inside a value cannot be expressed.
    Naive { delimiter: char },
    /// Double quotes group a value; `""` inside quotes is a literal quote.
    Quoted { delimiter: char },
}

impl CsvDialect {
    pub fn naive() -> Self {
        CsvDialect::Naive {
            delimiter: DEFAULT_DELIMITER,
        }
    }

    pub fn quoted() -> Self {
        CsvDialect::Quoted {
            delimiter: DEFAULT_DELIMITER,
        }
    }

    pub fn split_line(&self, line: &str) -> Vec<String> {
        match *self {
            CsvDialect::Naive { delimiter } => line.split(delimiter).map(str::to_string).collect(),
            CsvDialect::Quoted { delimiter } => split_quoted(line, delimiter),
        }
    }
}

impl Default for CsvDialect {
    fn default() -> Self {
        CsvDialect::naive()
    }
}

fn split_quoted(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                field.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if ch == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(ch);
        }
    }
    fields.push(field);
    fields
}

#[derive(Debug)]
pub enum CsvLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Empty,
    BadHeader {
        found: Vec<String>,
        expected: Vec<String>,
    },
    BadRow {
        line_number: usize,
        line: String,
        expected: usize,
        found: usize,
    },
}

impl CsvLoadError {
    /// True for failures the user has to fix in the file itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CsvLoadError::BadHeader { .. } | CsvLoadError::BadRow { .. }
        )
    }

    /// An empty file is usually an editor mid-save; the next write retriggers a load.
    pub fn wants_dialog(&self) -> bool {
        !matches!(self, CsvLoadError::Empty)
    }

    /// Text for the blocking error dialog.
    pub fn dialog_message(&self) -> String {
        match self {
            CsvLoadError::Io { path, source } => {
                format!("Could not open the CSV file:\n{}\n{}", path.display(), source)
            }
            CsvLoadError::Empty => "The CSV file is empty.".to_string(),
            CsvLoadError::BadHeader { expected, .. } => format!(
                "The CSV columns do not match the required structure:\n{}",
                expected.join(", ")
            ),
            CsvLoadError::BadRow { line, expected, .. } => {
                format!("Malformed row:\n{}\nExpected {} columns.", line, expected)
            }
        }
    }
}

impl fmt::Display for CsvLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvLoadError::Io { path, source } => {
                write!(f, "csv open failed for {}: {}", path.display(), source)
            }
            CsvLoadError::Empty => write!(f, "csv file has no header line"),
            CsvLoadError::BadHeader { found, expected } => write!(
                f,
                "csv header mismatch: found [{}], expected [{}]",
                found.join(", "),
                expected.join(", ")
            ),
            CsvLoadError::BadRow {
                line_number,
                line,
                expected,
                found,
            } => write!(
                f,
                "csv line {} has {} columns, expected {}: {}",
                line_number, found, expected, line
            ),
        }
    }
}

impl std::error::Error for CsvLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CsvLoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CsvLoader {
    schema: CsvSchema,
    dialect: CsvDialect,
}

impl CsvLoader {
    pub fn new(schema: CsvSchema, dialect: CsvDialect) -> Self {
        Self { schema, dialect }
    }

    pub fn schema(&self) -> &CsvSchema {
        &self.schema
    }

    pub fn load(&self, path: &Path) -> Result<Vec<FieldTuple>, CsvLoadError> {
        let bytes = fs::read(path).map_err(|source| CsvLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        self.parse(&text)
    }

    /// Parses a whole document. Either every row is valid or nothing is returned.
    pub fn parse(&self, text: &str) -> Result<Vec<FieldTuple>, CsvLoadError> {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
        let mut lines = text.lines().enumerate();
        let Some((_, header_line)) = lines.next() else {
            return Err(CsvLoadError::Empty);
        };
        let header = self.dialect.split_line(header_line.trim());
        if header != self.schema.columns() {
            return Err(CsvLoadError::BadHeader {
                found: header,
                expected: self.schema.columns().to_vec(),
            });
        }

        let expected = self.schema.width();
        let mut rows = Vec::new();
        for (index, raw) in lines {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let fields = self.dialect.split_line(line);
            if fields.len() != expected {
                return Err(CsvLoadError::BadRow {
                    line_number: index + 1,
                    line: line.to_string(),
                    expected,
                    found: fields.len(),
                });
            }
            rows.push(FieldTuple::new(fields));
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    const HEADER: &str = "Test Name,Source File,Expected Output File";

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "bench_csv_{}_{}_{}",
            label,
            std::process::id(),
            nanos
        ));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn loads_rows_in_file_order_and_skips_blank_lines() {
        let text = format!("{HEADER}\nt1,src.c,exp.txt\n\n   \nt2,b.c,b.txt\r\nt3,c.c,c.txt\n");
        let rows = CsvLoader::default().parse(&text).unwrap();
        let names: Vec<_> = rows.iter().map(FieldTuple::name).collect();
        assert_eq!(names, vec!["t1", "t2", "t3"]);
        assert_eq!(rows[1].fields(), &["t2", "b.c", "b.txt"]);
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let rows = CsvLoader::default().parse(HEADER).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn header_must_match_exactly() {
        let loader = CsvLoader::default();
        for header in [
            "test name,Source File,Expected Output File",
            "Source File,Test Name,Expected Output File",
            "Test Name,Source File",
            "Test Name,Source File,Expected Output File,Extra",
            "Test Name, Source File, Expected Output File",
        ] {
            let err = loader.parse(&format!("{header}\nt1,a,b\n")).unwrap_err();
            assert!(matches!(err, CsvLoadError::BadHeader { .. }), "{header}");
        }
    }

    #[test]
    fn header_surrounding_whitespace_is_trimmed() {
        let rows = CsvLoader::default()
            .parse(&format!("  {HEADER}  \nt1,a,b\n"))
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn bad_row_aborts_whole_load() {
        let text = format!("{HEADER}\nt1,a,b\nt2,a\nt3,a,b\n");
        let err = CsvLoader::default().parse(&text).unwrap_err();
        match err {
            CsvLoadError::BadRow {
                line_number,
                line,
                expected,
                found,
            } => {
                assert_eq!(line_number, 3);
                assert_eq!(line, "t2,a");
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn naive_dialect_splits_inside_quotes() {
        let text = format!("{HEADER}\n\"t,1\",a,b\n");
        let err = CsvLoader::default().parse(&text).unwrap_err();
        assert!(matches!(err, CsvLoadError::BadRow { found: 4, .. }));
    }

    #[test]
    fn quoted_dialect_keeps_delimiters_and_escaped_quotes() {
        let loader = CsvLoader::new(CsvSchema::default(), CsvDialect::quoted());
        let text = format!("{HEADER}\n\"t,1\",\"say \"\"hi\"\"\",b\n");
        let rows = loader.parse(&text).unwrap();
        assert_eq!(rows[0].fields(), &["t,1", "say \"hi\"", "b"]);
    }

    #[test]
    fn fields_keep_inner_whitespace() {
        let rows = CsvLoader::default()
            .parse(&format!("{HEADER}\n t1 , a,b \n"))
            .unwrap();
        assert_eq!(rows[0].fields(), &["t1 ", " a", "b"]);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let rows = CsvLoader::default()
            .parse(&format!("\u{feff}{HEADER}\nt1,a,b\n"))
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn empty_document_is_reported() {
        assert!(matches!(
            CsvLoader::default().parse(""),
            Err(CsvLoadError::Empty)
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = temp_dir("missing").join("nope.csv");
        let err = CsvLoader::default().load(&path).unwrap_err();
        assert!(matches!(err, CsvLoadError::Io { .. }));
        assert!(!err.is_validation());
    }

    #[test]
    fn load_reads_from_disk() {
        let path = temp_dir("load").join("tests.csv");
        fs::write(&path, format!("{HEADER}\nt1,src.c,exp.txt\n")).unwrap();
        let rows = CsvLoader::default().load(&path).unwrap();
        assert_eq!(rows, vec![FieldTuple::from(vec!["t1", "src.c", "exp.txt"])]);
    }

    #[test]
    fn custom_schema_sets_arity() {
        let schema = CsvSchema::new(vec!["A".to_string(), "B".to_string()]);
        let loader = CsvLoader::new(schema, CsvDialect::naive());
        let rows = loader.parse("A,B\n1,2\n").unwrap();
        assert_eq!(rows[0].len(), 2);
        assert!(loader.parse("A,B\n1,2,3\n").is_err());
    }
}
