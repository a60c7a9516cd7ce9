//! Correspondence record emission and parsing
//!
//! Each record is one line of the form
//! `src1,src2,...#tgt1,tgt2,...`: the source and target feature blocks
//! comma-separated and joined by `#`. Feature values are written with
//! shortest round-trip float formatting, so parsing an emitted line
//! reconstructs the original values exactly.

use stackalign_core::{Correspondence, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Write correspondence records, one per line
pub fn write_correspondences<W: Write>(
    writer: &mut W,
    correspondences: &[Correspondence],
) -> Result<()> {
    for correspondence in correspondences {
        writeln!(writer, "{}", correspondence)?;
    }
    Ok(())
}

/// Write correspondence records to a file
pub fn write_correspondence_file<P: AsRef<Path>>(
    path: P,
    correspondences: &[Correspondence],
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_correspondences(&mut writer, correspondences)?;
    writer.flush()?;
    Ok(())
}

/// Parse correspondence records, one per line; blank lines are skipped
pub fn read_correspondences<R: BufRead>(reader: R) -> Result<Vec<Correspondence>> {
    let mut correspondences = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        correspondences.push(line.parse()?);
    }
    Ok(correspondences)
}

/// Read correspondence records from a file
pub fn read_correspondence_file<P: AsRef<Path>>(path: P) -> Result<Vec<Correspondence>> {
    read_correspondences(BufReader::new(File::open(path)?))
}
