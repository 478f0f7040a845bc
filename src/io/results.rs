//! Results table written by the grid scanner.
//!
//! Whitespace-delimited text: one header line, then one row per grid point.
//! Inputs use `%.4f`, relic abundances use C-style `%.4e` (`1.2000e-01`).
//! Every row is flushed as soon as it is written so a running scan can be
//! inspected and an interrupted one resumed. A row cut short by an
//! interruption (no trailing newline) is dropped when the file is reopened.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::domain::{GridPoint, ResultRow, ScanLayout};
use crate::error::ScanError;

const OMEGA_COLUMNS: &str = "omega omega(sommerfeld) omega(bsf) omega(sommerfeld + bsf)";

/// Number of fields in a data row.
const ROW_FIELDS: usize = 7;

pub fn header(layout: ScanLayout) -> String {
    match layout {
        ScanLayout::Mass => format!("mass_dm mass_x delta {OMEGA_COLUMNS}"),
        ScanLayout::MassDelta => format!("delta mass_dm mass_x {OMEGA_COLUMNS}"),
    }
}

pub fn format_row(layout: ScanLayout, row: &ResultRow) -> String {
    let p = &row.point;
    let coords = match layout {
        ScanLayout::Mass => format!("{:.4} {:.4} {:.4}", p.mass_dm, p.mass_x, p.delta),
        ScanLayout::MassDelta => format!("{:.4} {:.4} {:.4}", p.delta, p.mass_dm, p.mass_x),
    };
    let omegas: Vec<String> = row.omega.iter().map(|v| fmt_exp(*v, 4)).collect();
    format!("{coords} {}", omegas.join(" "))
}

/// Format like C's `%.{precision}e`: signed, at least two exponent digits.
pub fn fmt_exp(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }
    let s = format!("{value:.precision$e}");
    let Some((mantissa, exp)) = s.split_once('e') else {
        return s;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.abs())
}

/// Identity of a grid point as it appears in the results file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointKey {
    mass_dm: String,
    delta: String,
}

impl PointKey {
    pub fn of(point: &GridPoint) -> Self {
        Self {
            mass_dm: format!("{:.4}", point.mass_dm),
            delta: format!("{:.4}", point.delta),
        }
    }
}

/// Append-only writer for the results table.
pub struct ResultsWriter {
    path: PathBuf,
    layout: ScanLayout,
    out: BufWriter<File>,
}

impl ResultsWriter {
    /// Truncate `path` and write the header.
    pub fn create(path: &Path, layout: ScanLayout) -> Result<Self, ScanError> {
        let file = File::create(path).map_err(|source| results_error(path, source))?;
        let mut writer = Self::wrap(path, layout, file);
        writer.write_line(&header(layout))?;
        Ok(writer)
    }

    /// Open `path` for appending, writing the header only if the file is new or empty.
    ///
    /// An incomplete trailing row is truncated away. An existing header must
    /// match `layout`.
    pub fn append(path: &Path, layout: ScanLayout) -> Result<Self, ScanError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| results_error(path, source))?;
        let mut text = String::new();
        file.read_to_string(&mut text)
            .map_err(|source| results_error(path, source))?;

        let keep = complete_prefix(&text);
        check_header(path, layout, keep)?;
        if keep.len() < text.len() {
            tracing::warn!(
                path = %path.display(),
                dropped = %text[keep.len()..].trim_end(),
                "discarding incomplete trailing row"
            );
            file.set_len(keep.len() as u64)
                .map_err(|source| results_error(path, source))?;
        }
        file.seek(SeekFrom::End(0))
            .map_err(|source| results_error(path, source))?;

        let mut writer = Self::wrap(path, layout, file);
        if keep.is_empty() {
            writer.write_line(&header(layout))?;
        }
        Ok(writer)
    }

    fn wrap(path: &Path, layout: ScanLayout, file: File) -> Self {
        Self {
            path: path.to_path_buf(),
            layout,
            out: BufWriter::new(file),
        }
    }

    pub fn write_row(&mut self, row: &ResultRow) -> Result<(), ScanError> {
        let line = format_row(self.layout, row);
        self.write_line(&line)
    }

    fn write_line(&mut self, line: &str) -> Result<(), ScanError> {
        writeln!(self.out, "{line}")
            .and_then(|_| self.out.flush())
            .map_err(|source| results_error(&self.path, source))
    }
}

/// Grid points that already have a complete row in an existing results file.
///
/// A missing file yields an empty set. Short (truncated) rows are ignored, and
/// the header must match `layout`.
pub fn completed_points(path: &Path, layout: ScanLayout) -> Result<HashSet<PointKey>, ScanError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(resume_error(path, e.to_string())),
    };
    let complete = complete_prefix(&text);
    if complete.is_empty() {
        return Ok(HashSet::new());
    }
    check_header(path, layout, complete)?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(true)
        .flexible(true)
        .from_reader(complete.as_bytes());

    let (mass_col, delta_col) = match layout {
        ScanLayout::Mass => (0, 2),
        ScanLayout::MassDelta => (1, 0),
    };

    let mut done = HashSet::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| resume_error(path, e.to_string()))?;
        if record.len() < ROW_FIELDS {
            tracing::warn!(line = idx + 2, "ignoring incomplete results row");
            continue;
        }
        let mass_dm = parse_field(path, &record, mass_col)?;
        let delta = parse_field(path, &record, delta_col)?;
        done.insert(PointKey::of(&GridPoint::new(mass_dm, delta)));
    }
    Ok(done)
}

/// Text up to and including the last newline.
fn complete_prefix(text: &str) -> &str {
    text.rfind('\n').map_or("", |end| &text[..=end])
}

/// The first line of a non-empty `text` must be the header of `layout`.
fn check_header(path: &Path, layout: ScanLayout, text: &str) -> Result<(), ScanError> {
    let Some(first) = text.lines().next() else {
        return Ok(());
    };
    let expected = header(layout);
    if first.trim_end() != expected {
        return Err(resume_error(
            path,
            format!("header '{}' does not match a {layout:?} scan ('{expected}')", first.trim_end()),
        ));
    }
    Ok(())
}

fn parse_field(path: &Path, record: &csv::StringRecord, col: usize) -> Result<f64, ScanError> {
    let raw = record.get(col).unwrap_or_default();
    raw.parse::<f64>()
        .map_err(|_| resume_error(path, format!("invalid number '{raw}' in column {}", col + 1)))
}

fn results_error(path: &Path, source: std::io::Error) -> ScanError {
    ScanError::Results {
        path: path.to_path_buf(),
        source,
    }
}

fn resume_error(path: &Path, reason: String) -> ScanError {
    ScanError::Resume {
        path: path.to_path_buf(),
        reason,
    }
}
