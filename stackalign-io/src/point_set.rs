//! Point-set file reading
//!
//! A point-set file carries one feature point per line, with features
//! separated by commas or whitespace. The delimiter is detected from the
//! first data line and every line must have the same dimensionality.

use stackalign_core::{Error, FeaturePoint, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Feature field delimiters supported in point-set files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Comma,
    Whitespace,
}

impl Delimiter {
    fn detect(line: &str) -> Self {
        if line.contains(',') {
            Delimiter::Comma
        } else {
            Delimiter::Whitespace
        }
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Comma => line.split(',').map(str::trim).collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

/// Read a point set from a file.
///
/// # Arguments
/// * `path` - Path to the point-set file
///
/// # Returns
/// * `Result<Vec<FeaturePoint>>` - The parsed points, in file order
pub fn read_point_set<P: AsRef<Path>>(path: P) -> Result<Vec<FeaturePoint>> {
    let file = File::open(path.as_ref())?;
    let points = parse_point_set(BufReader::new(file))?;
    log::debug!(
        "read {} points from {}",
        points.len(),
        path.as_ref().display()
    );
    Ok(points)
}

/// Parse a point set from any buffered reader. Blank lines are skipped;
/// malformed values and ragged dimensionality are rejected with the
/// offending line number.
pub fn parse_point_set<R: BufRead>(reader: R) -> Result<Vec<FeaturePoint>> {
    let mut points: Vec<FeaturePoint> = Vec::new();
    let mut delimiter = None;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let delimiter = *delimiter.get_or_insert_with(|| Delimiter::detect(line));
        let features = delimiter
            .split(line)
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|_| {
                    Error::InvalidData(format!(
                        "line {}: invalid feature value [{}]",
                        number + 1,
                        field
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if let Some(previous) = points.last() {
            if previous.dimension() != features.len() {
                return Err(Error::InvalidData(format!(
                    "line {}: expected {} features, found {}",
                    number + 1,
                    previous.dimension(),
                    features.len()
                )));
            }
        }

        points.push(FeaturePoint::new(features));
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_whitespace_separated() {
        let data = "1.0 2.0 3.0\n4.0 5.0 6.0\n";
        let points = parse_point_set(Cursor::new(data)).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].features(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_comma_separated() {
        let data = "1.5,2.5\n-3.0, 4.0\n";
        let points = parse_point_set(Cursor::new(data)).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].features(), &[-3.0, 4.0]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let data = "1.0 2.0\n\n3.0 4.0\n\n";
        let points = parse_point_set(Cursor::new(data)).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_ragged_dimensions_rejected() {
        let data = "1.0 2.0\n3.0 4.0 5.0\n";
        assert!(parse_point_set(Cursor::new(data)).is_err());
    }

    #[test]
    fn test_garbage_rejected_with_line_number() {
        let data = "1.0 2.0\nnot a number\n";
        let err = parse_point_set(Cursor::new(data)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1.0 2.0").unwrap();
        writeln!(file, "3.0 4.0").unwrap();

        let points = read_point_set(file.path()).unwrap();
        assert_eq!(points.len(), 2);
    }
}
