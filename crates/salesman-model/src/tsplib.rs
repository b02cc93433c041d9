// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! TSPLIB instance loader.
//!
//! Reads the subset of the TSPLIB format the solver understands and turns it
//! into a validated `Graph`. The header is scanned line by line for
//! `DIMENSION: n` and `EDGE_WEIGHT_TYPE: EUC_2D | GEO`; other keys (`NAME`,
//! `COMMENT`, `TYPE`, ...) are ignored. The edge weight type must be exactly
//! one of the two keywords (surrounding whitespace aside); a value that only
//! starts with one, such as `EUC_2D_EXT`, is rejected rather than read as its
//! prefix. `NODE_COORD_SECTION` ends the header and is followed by exactly `n`
//! lines of `index x y` with 1-based, sequential indices and finite
//! coordinates. Anything after the coordinates, such as a trailing
//! `EOF`, is not read.
//!
//! Every error carries the 1-based line number it was detected on, so a caller
//! that knows the file name can point straight at the offending line.
//!
//! ```rust
//! use salesman_model::tsplib::TspFileLoader;
//!
//! let instance = "\
//! NAME: triangle
//! DIMENSION: 3
//! EDGE_WEIGHT_TYPE: EUC_2D
//! NODE_COORD_SECTION
//! 1 0 0
//! 2 3 4
//! 3 6 8
//! EOF
//! ";
//! let graph = TspFileLoader::new().from_str(instance).unwrap();
//! assert_eq!(graph.size(), 3);
//! ```

use crate::graph::{Graph, GraphError, Metric};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

/// The default upper bound on `DIMENSION`.
pub const DEFAULT_MAX_DIMENSION: usize = 100;

/// The error type for loading TSPLIB instances.
#[derive(Debug, thiserror::Error)]
pub enum TspFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: missing colon after header key")]
    MissingColon { line: usize },
    #[error("line {line}: wrong size in input: '{value}'")]
    InvalidDimension { line: usize, value: String },
    #[error("line {line}: too many points in input: {dimension} exceeds the limit of {max}")]
    TooManyNodes {
        line: usize,
        dimension: usize,
        max: usize,
    },
    #[error("line {line}: unknown EDGE_WEIGHT_TYPE '{value}', expected EUC_2D or GEO")]
    UnknownEdgeWeightType { line: usize, value: String },
    #[error("no DIMENSION given before NODE_COORD_SECTION")]
    MissingDimension,
    #[error("input ended before NODE_COORD_SECTION")]
    MissingNodeCoordSection,
    #[error("line {line}: missing data in node coordinate line")]
    MissingData { line: usize },
    #[error("line {line}: node coordinates must be finite numbers")]
    InvalidCoordinate { line: usize },
    #[error("line {line}: wrong node index, expected {expected} but found {found}")]
    WrongNodeIndex {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("input ended after {found} of {expected} node coordinates")]
    UnexpectedEof { expected: usize, found: usize },
    #[error("invalid graph: {0}")]
    Graph(#[from] GraphError),
}

/// A configurable loader for TSPLIB instances.
///
/// # Configuration
/// * `max_dimension`: instances declaring more nodes are rejected
///   (default `DEFAULT_MAX_DIMENSION`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TspFileLoader {
    max_dimension: usize,
}

impl Default for TspFileLoader {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl TspFileLoader {
    /// Creates a loader with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest accepted `DIMENSION`.
    #[inline]
    pub fn max_dimension(mut self, max: usize) -> Self {
        self.max_dimension = max;
        self
    }

    /// Loads an instance from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<Graph, TspFileError> {
        let mut lines = NumberedLines::new(rdr);

        let mut dimension = None;
        let mut metric = Metric::Euclidean2d;

        // Header
        loop {
            let Some((line_no, line)) = lines.next_line()? else {
                return Err(TspFileError::MissingNodeCoordSection);
            };
            let line = line.trim();

            if line.starts_with("NODE_COORD_SECTION") {
                break;
            } else if line.starts_with("DIMENSION") {
                let value = header_value(line, line_no)?;
                dimension = Some(self.parse_dimension(value, line_no)?);
            } else if line.starts_with("EDGE_WEIGHT_TYPE") {
                let value = header_value(line, line_no)?;
                metric = value
                    .parse()
                    .map_err(|value| TspFileError::UnknownEdgeWeightType {
                        line: line_no,
                        value,
                    })?;
            }
        }

        let dimension = dimension.ok_or(TspFileError::MissingDimension)?;
        tracing::debug!(dimension, metric = %metric, "parsed TSPLIB header");

        // Coordinates
        let mut coordinates = Vec::with_capacity(dimension);
        while coordinates.len() < dimension {
            let Some((line_no, line)) = lines.next_line()? else {
                return Err(TspFileError::UnexpectedEof {
                    expected: dimension,
                    found: coordinates.len(),
                });
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            coordinates.push(parse_coordinate(line, line_no, coordinates.len() + 1)?);
        }

        Ok(Graph::from_coordinates(coordinates, metric)?)
    }

    /// Loads an instance from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Graph, TspFileError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads an instance from a generic reader.
    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Graph, TspFileError> {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads an instance from a string slice.
    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Graph, TspFileError> {
        self.from_reader(s.as_bytes())
    }

    fn parse_dimension(&self, value: &str, line: usize) -> Result<usize, TspFileError> {
        let dimension: usize = value
            .parse()
            .ok()
            .filter(|d| *d >= 1)
            .ok_or_else(|| TspFileError::InvalidDimension {
                line,
                value: value.to_owned(),
            })?;
        if dimension > self.max_dimension {
            return Err(TspFileError::TooManyNodes {
                line,
                dimension,
                max: self.max_dimension,
            });
        }
        Ok(dimension)
    }
}

/// Returns the trimmed text after the first colon of a header line.
fn header_value(line: &str, line_no: usize) -> Result<&str, TspFileError> {
    line.split_once(':')
        .map(|(_, value)| value.trim())
        .ok_or(TspFileError::MissingColon { line: line_no })
}

/// Parses `index x y`, checking that `index` equals `expected`.
fn parse_coordinate(
    line: &str,
    line_no: usize,
    expected: usize,
) -> Result<(f64, f64), TspFileError> {
    let mut tokens = line.split_whitespace();
    let missing = || TspFileError::MissingData { line: line_no };

    let index: usize = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(missing)?;
    let x: f64 = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(missing)?;
    let y: f64 = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(missing)?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(TspFileError::InvalidCoordinate { line: line_no });
    }

    if index != expected {
        return Err(TspFileError::WrongNodeIndex {
            line: line_no,
            expected,
            found: index,
        });
    }
    Ok((x, y))
}

/// Reads lines while counting them.
struct NumberedLines<R> {
    rdr: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> NumberedLines<R> {
    #[inline]
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Returns the next line with its 1-based number, or `None` on EOF.
    fn next_line(&mut self) -> Result<Option<(usize, &str)>, TspFileError> {
        self.buf.clear();
        if self.rdr.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some((self.line_no, self.buf.as_str())))
    }
}
