use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::model::region::LocationError;
use crate::types::Direction;

/// One input adjacency fact: `exon` is `direction` of `junction`.
///
/// E.g. ("exon:chr1:100-200:+", "junction:chr1:201-299:+", Upstream) reads
/// "this exon is upstream of this junction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyRow {
    pub exon: String,
    pub junction: String,
    pub direction: Direction,
}

/// Parsing errors for adjacency tables.
#[derive(Debug)]
pub enum ParseError {
    IoPath {
        path: String,
        source: std::io::Error,
    },
    MalformedLine {
        line_no: usize,
        line: String,
    },
    BadDirection {
        line_no: usize,
        value: String,
    },
    Location(LocationError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IoPath { path, source } => {
                write!(f, "I/O error while reading '{}': {}", path, source)
            }
            ParseError::MalformedLine { line_no, line } => write!(
                f,
                "malformed adjacency line {} (expected exon<TAB>junction<TAB>direction): {}",
                line_no, line
            ),
            ParseError::BadDirection { line_no, value } => write!(
                f,
                "bad direction '{}' on line {} (expected 'upstream' or 'downstream')",
                value, line_no
            ),
            ParseError::Location(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::IoPath { source, .. } => Some(source),
            ParseError::Location(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LocationError> for ParseError {
    fn from(e: LocationError) -> Self {
        ParseError::Location(e)
    }
}

/// Streaming parser for 3-column adjacency TSV.
///
/// - Skips blank lines and comment lines starting with '#'
/// - Skips an optional `exon junction direction` header line
pub struct AdjacencyReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> AdjacencyReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Returns an iterator over parsed rows.
    pub fn rows(mut self) -> impl Iterator<Item = Result<AdjacencyRow, ParseError>> {
        let mut at_first_data_line = true;
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    return Some(Err(ParseError::IoPath {
                        path: "<reader>".to_string(),
                        source: e,
                    }))
                }
            }
            self.line_no += 1;

            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if at_first_data_line {
                at_first_data_line = false;
                if is_header_line(line) {
                    continue;
                }
            }

            return Some(parse_row_line(line, self.line_no));
        })
    }
}

fn is_header_line(line: &str) -> bool {
    let cols: Vec<&str> = line.split('\t').collect();
    cols.len() == 3 && cols[2].trim().eq_ignore_ascii_case("direction")
}

/// Parse a single non-comment line into an `AdjacencyRow`.
pub fn parse_row_line(line: &str, line_no: usize) -> Result<AdjacencyRow, ParseError> {
    let malformed = || ParseError::MalformedLine {
        line_no,
        line: line.to_string(),
    };

    let mut it = line.split('\t');
    let exon = it.next().ok_or_else(malformed)?.trim();
    let junction = it.next().ok_or_else(malformed)?.trim();
    let direction_s = it.next().ok_or_else(malformed)?.trim();

    // no extra columns
    if it.next().is_some() {
        return Err(malformed());
    }
    if exon.is_empty() || junction.is_empty() {
        return Err(malformed());
    }

    let direction = Direction::from_label(direction_s).ok_or_else(|| ParseError::BadDirection {
        line_no,
        value: direction_s.to_string(),
    })?;

    Ok(AdjacencyRow {
        exon: exon.to_string(),
        junction: junction.to_string(),
        direction,
    })
}

/// Read a whole adjacency table from a file path.
///
/// If the path ends with `.gz`, reads through a gzip decoder; otherwise as
/// plain text.
pub fn read_adjacencies_path<P: AsRef<Path>>(path: P) -> Result<Vec<AdjacencyRow>, ParseError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ParseError::IoPath {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_gz = path.extension().map(|e| e == "gz").unwrap_or(false);

    if is_gz {
        let reader = BufReader::new(GzDecoder::new(file));
        AdjacencyReader::new(reader).rows().collect()
    } else {
        let reader = BufReader::new(file);
        AdjacencyReader::new(reader).rows().collect()
    }
}
