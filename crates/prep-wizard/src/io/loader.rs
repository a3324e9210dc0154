//! Dataset loading from CSV files, spreadsheets and SQLite databases.
//!
//! Every format is validated against its file extensions before any parsing
//! happens. Spreadsheet and database cells go through the same column type
//! inference: whole numbers become Int64, other numbers Float64, booleans
//! Boolean, and anything mixed or textual String.

use calamine::{Data, Reader, open_workbook_auto};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, error, info};

use crate::dataset::DatasetHandle;
use crate::error::{Result, ResultExt, WizardError};
use crate::prompt::{ChoiceProvider, Prompt, ask_number, ask_option_until_valid};
use crate::types::LoadFormat;

/// One spreadsheet or database cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => Self::Empty,
            Data::Int(i) => Self::Int(*i),
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Self::Int(*f as i64),
            Data::Float(f) => Self::Float(*f),
            Data::Bool(b) => Self::Bool(*b),
            Data::String(s) if s.is_empty() => Self::Empty,
            Data::String(s) => Self::Text(s.clone()),
            Data::Error(_) => Self::Empty,
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Empty,
            ValueRef::Integer(i) => Self::Int(i),
            ValueRef::Real(f) => Self::Float(f),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Self::Text(format!("<{} bytes>", bytes.len())),
        }
    }
}

/// Build a DataFrame from a header row and row-major cells.
///
/// Short rows are padded with nulls.
pub fn build_frame(headers: &[String], rows: &[Vec<CellValue>]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(headers.len());
    for (index, name) in headers.iter().enumerate() {
        let cells: Vec<&CellValue> = rows
            .iter()
            .map(|row| row.get(index).unwrap_or(&CellValue::Empty))
            .collect();
        let present = || cells.iter().filter(|c| !matches!(c, CellValue::Empty));
        let name: PlSmallStr = name.as_str().into();

        let series = if present().count() == 0 {
            Series::new(name, cells.iter().map(|_| None::<String>).collect::<Vec<_>>())
        } else if present().all(|c| matches!(c, CellValue::Int(_))) {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    CellValue::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        } else if present().all(|c| matches!(c, CellValue::Int(_) | CellValue::Float(_))) {
            let values: Vec<Option<f64>> = cells.iter().map(|c| c.as_f64()).collect();
            Series::new(name, values)
        } else if present().all(|c| matches!(c, CellValue::Bool(_))) {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    CellValue::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        } else {
            let values: Vec<Option<String>> = cells.iter().map(|c| c.as_text()).collect();
            Series::new(name, values)
        };
        columns.push(series.into_column());
    }
    Ok(DataFrame::new(columns)?)
}

/// Check that the path exists and its extension matches the format.
pub fn validate_path(path: &Path, format: LoadFormat) -> Result<()> {
    if !format.matches_path(path) {
        return Err(WizardError::invalid_file(
            path.display().to_string(),
            format!(
                "expected a {} file ({})",
                format,
                format
                    .extensions()
                    .iter()
                    .map(|e| format!(".{}", e))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    }
    if !path.is_file() {
        return Err(WizardError::invalid_file(
            path.display().to_string(),
            "file not found",
        ));
    }
    Ok(())
}

/// Reader options shared by every CSV attempt.
fn csv_options(infer_schema_length: usize, quote: Option<u8>) -> CsvReadOptions {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(infer_schema_length))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(quote))
}

/// Read a CSV file. A quoted parse is tried first, then an unquoted one, and
/// finally a quoted parse of the sanitized text.
pub fn read_csv(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    for quote in [Some(b'"'), None] {
        let attempt = csv_options(infer_schema_length, quote)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish();
        match attempt {
            Ok(df) => return Ok(df),
            Err(e) => debug!(quoted = quote.is_some(), "CSV parse attempt failed: {}", e),
        }
    }

    let content = std::fs::read_to_string(path)
        .inspect_err(|e| error!(path = %path.display(), "Could not read file: {}", e))?;
    csv_options(infer_schema_length, Some(b'"'))
        .into_reader_with_file_handle(Cursor::new(sanitize_csv(&content)))
        .finish()
        .context(format!("Could not parse {}", path.display()))
}

/// Drop blank lines and collapse doubled quotes.
fn sanitize_csv(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for line in content.lines().filter(|line| !line.trim().is_empty()) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line.replace("\"\"\"", "\"").replace("\"\"", "\""));
    }
    out
}

/// Read the first worksheet; its first row is the header.
pub fn read_excel(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(WizardError::invalid_file(
            path.display().to_string(),
            "workbook has no worksheets",
        ));
    };
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("column_{}", i + 1),
                other => other.to_string(),
            })
            .collect(),
        None => Vec::new(),
    };
    let cells: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();

    debug!(sheet = %sheet, rows = cells.len(), "Read worksheet");
    build_frame(&headers, &cells)
}

fn open_database(path: &Path) -> Result<Connection> {
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY,
    )?)
}

/// Names of the user tables in a SQLite database, in creation order.
pub fn list_tables(path: &Path) -> Result<Vec<String>> {
    let connection = open_database(path)?;
    let mut statement = connection.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let names = statement
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Load a whole table from a SQLite database.
pub fn read_sqlite_table(path: &Path, table: &str) -> Result<DataFrame> {
    let connection = open_database(path)?;
    let query = format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""));
    let mut statement = connection.prepare(&query)?;
    let headers: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut cells = Vec::new();
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(headers.len());
        for index in 0..headers.len() {
            values.push(CellValue::from(row.get_ref(index)?));
        }
        cells.push(values);
    }

    debug!(table, rows = cells.len(), "Read table");
    build_frame(&headers, &cells)
}

/// Ask which format to load. `None` means back.
pub fn ask_format(choices: &mut dyn ChoiceProvider) -> Result<Option<LoadFormat>> {
    let prompt = LoadFormat::ALL
        .iter()
        .fold(Prompt::menu("Load data"), |p, f| p.option(f.display_name()))
        .option("Back");
    let option = ask_option_until_valid(choices, "load", &prompt)?;
    Ok(LoadFormat::ALL.get(option - 1).copied())
}

/// Validate, read and wrap a dataset. For SQLite the operator picks the
/// table by its 1-based position.
pub fn load_dataset(
    path: &Path,
    format: LoadFormat,
    infer_schema_length: usize,
    choices: &mut dyn ChoiceProvider,
) -> Result<DatasetHandle> {
    validate_path(path, format)?;
    info!(path = %path.display(), %format, "Loading dataset");

    let handle = match format {
        LoadFormat::Csv => DatasetHandle::new(read_csv(path, infer_schema_length)?, path, format),
        LoadFormat::Excel => DatasetHandle::new(read_excel(path)?, path, format),
        LoadFormat::Sqlite => {
            let tables = list_tables(path)?;
            if tables.is_empty() {
                return Err(WizardError::EmptyTableSet(path.display().to_string()));
            }
            let prompt = Prompt::question("Table number").lines(
                tables
                    .iter()
                    .enumerate()
                    .map(|(i, t)| format!("{}. {}", i + 1, t)),
            );
            let index = ask_number(choices, &prompt)?;
            let Some(table) = index.checked_sub(1).and_then(|i| tables.get(i)) else {
                return Err(WizardError::InvalidSelection(format!(
                    "table {} is out of range 1-{}",
                    index,
                    tables.len()
                )));
            };
            DatasetHandle::new(read_sqlite_table(path, table)?, path, format).with_table(table)
        }
    };

    info!(shape = ?handle.df().shape(), "Dataset loaded successfully");
    Ok(handle)
}
