//! Point samples and the delimited-text point source
//!
//! A point source is a header row naming the fields followed by one record
//! per line. Three fields are resolved by name once, from the header, into
//! column positions; every record is then read positionally into a
//! [`SamplePoint`]. All other fields are ignored.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A sample point with x, y coordinates and a measured value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Squared Euclidean distance to another point
    #[inline]
    pub fn dist_sq(&self, other_x: f64, other_y: f64) -> f64 {
        let dx = self.x - other_x;
        let dy = self.y - other_y;
        dx * dx + dy * dy
    }
}

/// Names of the three fields that make up a sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            x: "Longitude".to_string(),
            y: "Latitude".to_string(),
            z: "SurfaceEle".to_string(),
        }
    }
}

/// Options for reading a delimited point source
#[derive(Debug, Clone)]
pub struct PointSourceOptions {
    pub fields: FieldNames,
    /// Field separator (default `,`)
    pub delimiter: char,
}

impl Default for PointSourceOptions {
    fn default() -> Self {
        Self {
            fields: FieldNames::default(),
            delimiter: ',',
        }
    }
}

/// Column positions of the x, y and z fields, resolved once per source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    names: FieldNames,
    /// Number of header columns every record must match
    width: usize,
    x: usize,
    y: usize,
    z: usize,
}

impl FieldSchema {
    /// Resolve field names against a header.
    ///
    /// Names match exactly; when a name appears more than once the first
    /// column wins.
    pub fn resolve<S: AsRef<str>>(header: &[S], names: &FieldNames) -> Result<Self> {
        let position = |name: &str| {
            header
                .iter()
                .position(|h| h.as_ref() == name)
                .ok_or_else(|| Error::MissingField {
                    name: name.to_string(),
                })
        };

        Ok(Self {
            x: position(&names.x)?,
            y: position(&names.y)?,
            z: position(&names.z)?,
            names: names.clone(),
            width: header.len(),
        })
    }

    /// Build a sample from one record's fields.
    ///
    /// `record` is the 1-based record position reported on failure. A
    /// record with more or fewer fields than the header is rejected, since
    /// its columns cannot be trusted to line up.
    pub fn sample<S: AsRef<str>>(&self, fields: &[S], record: usize) -> Result<SamplePoint> {
        if fields.len() != self.width {
            return Err(Error::MalformedField {
                record,
                field: "field count".to_string(),
                value: format!("{} (header has {})", fields.len(), self.width),
            });
        }

        let parse = |column: usize, name: &str| -> Result<f64> {
            let raw = fields.get(column).map(|f| f.as_ref()).unwrap_or("");
            parse_number(raw).ok_or_else(|| Error::MalformedField {
                record,
                field: name.to_string(),
                value: raw.to_string(),
            })
        };

        Ok(SamplePoint {
            x: parse(self.x, &self.names.x)?,
            y: parse(self.y, &self.names.y)?,
            value: parse(self.z, &self.names.z)?,
        })
    }
}

/// NaN and infinities are rejected along with unparsable text.
fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Split one line into trimmed fields.
///
/// A field whose first non-blank character is `"` is quoted: delimiters
/// inside it are literal and `""` stands for one quote. `None` when a quote
/// is left open.
fn split_fields(line: &str, delimiter: char) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c != '"' {
                field.push(c);
            } else if chars.peek() == Some(&'"') {
                field.push('"');
                chars.next();
            } else {
                in_quotes = false;
            }
        } else if c == delimiter {
            fields.push(field.trim().to_string());
            field.clear();
        } else if c == '"' && field.trim().is_empty() {
            field.clear();
            in_quotes = true;
        } else {
            field.push(c);
        }
    }

    if in_quotes {
        return None;
    }
    fields.push(field.trim().to_string());
    Some(fields)
}

fn unbalanced_quote(record: usize, line: &str) -> Error {
    Error::MalformedField {
        record,
        field: "quoting".to_string(),
        value: line.to_string(),
    }
}

/// Read all samples from a delimited-text file
pub fn read_points<P: AsRef<Path>>(path: P, options: &PointSourceOptions) -> Result<Vec<SamplePoint>> {
    let file = File::open(path.as_ref())?;
    read_points_from(BufReader::new(file), options)
}

/// Read all samples from any buffered reader.
///
/// Blank lines are skipped and do not count as records. The first malformed
/// record aborts the read; an unbalanced quote in the header is reported as
/// record 0.
pub fn read_points_from<R: BufRead>(reader: R, options: &PointSourceOptions) -> Result<Vec<SamplePoint>> {
    let mut lines = reader
        .lines()
        .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()));

    let header = match lines.next() {
        Some(line) => line?,
        None => return Ok(Vec::new()),
    };
    let header_line = header.trim_start_matches('\u{feff}');
    let header = split_fields(header_line, options.delimiter)
        .ok_or_else(|| unbalanced_quote(0, header_line))?;
    let schema = FieldSchema::resolve(&header, &options.fields)?;

    let mut samples = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        let record = i + 1;
        let fields = split_fields(&line, options.delimiter)
            .ok_or_else(|| unbalanced_quote(record, &line))?;
        samples.push(schema.sample(&fields, record)?);
    }

    Ok(samples)
}
