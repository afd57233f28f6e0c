use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::correspondence::{CorrespondenceError, CorrespondenceSet};
use crate::segment::LineSegment;

/// Error types for the line list text format.
#[derive(Debug, thiserror::Error)]
pub enum LinesIoError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    IoError(#[from] std::io::Error),

    /// A record could not be parsed.
    #[error("Parse error at line {line}: {message}")]
    ParseError {
        /// 1-based line number of the offending record.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// The two files do not pair up.
    #[error(transparent)]
    Correspondence(#[from] CorrespondenceError),
}

/// One record of a line file.
///
/// Line editors keep a drawing flag next to each segment, set while the
/// segment is still being drawn. The warp only uses the segment, the flag is
/// carried so a file can be read and written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineRecord {
    /// The segment of the record.
    pub segment: LineSegment,
    /// Whether the segment was still being drawn when the file was saved.
    pub drawing: bool,
}

impl From<LineSegment> for LineRecord {
    fn from(segment: LineSegment) -> Self {
        Self {
            segment,
            drawing: false,
        }
    }
}

/// Parse one `head.x head.y tail.x tail.y [flag]` record.
///
/// A missing flag reads as `0`.
fn parse_record(line_number: usize, record: &str) -> Result<LineRecord, LinesIoError> {
    let parts = record.split_whitespace().collect::<Vec<_>>();
    if parts.len() != 4 && parts.len() != 5 {
        return Err(LinesIoError::ParseError {
            line: line_number,
            message: format!("expected 4 or 5 fields, got {}", parts.len()),
        });
    }

    let mut coords = [0.0f32; 4];
    for (coord, part) in coords.iter_mut().zip(parts.iter()) {
        *coord = part.parse::<f32>().map_err(|e| LinesIoError::ParseError {
            line: line_number,
            message: format!("{}: {}", part, e),
        })?;
    }

    let drawing = match parts.get(4) {
        None | Some(&"0") => false,
        Some(&"1") => true,
        Some(flag) => {
            return Err(LinesIoError::ParseError {
                line: line_number,
                message: format!("drawing flag must be 0 or 1, got {}", flag),
            })
        }
    };

    Ok(LineRecord {
        segment: LineSegment::from(coords),
        drawing,
    })
}

/// Parse the records of a line file from any buffered reader.
///
/// One record per text line; blank lines are skipped.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<LineRecord>, LinesIoError> {
    let mut records = Vec::new();
    for (i, text) in reader.lines().enumerate() {
        let text = text?;
        if text.trim().is_empty() {
            continue;
        }
        records.push(parse_record(i + 1, &text)?);
    }
    Ok(records)
}

/// Parse a line list from any buffered reader, dropping the drawing flags.
///
/// # Examples
///
/// ```
/// use linemorph_lines::io::parse_lines;
///
/// let text = "0 0 10 0 0\n5 5 5 15 0\n";
/// let lines = parse_lines(text.as_bytes()).unwrap();
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[1].tail.y, 15.0);
/// ```
pub fn parse_lines<R: BufRead>(reader: R) -> Result<Vec<LineSegment>, LinesIoError> {
    Ok(parse_records(reader)?
        .into_iter()
        .map(|record| record.segment)
        .collect())
}

/// Read the records of a line file, drawing flags included.
pub fn read_records_txt(path: impl AsRef<Path>) -> Result<Vec<LineRecord>, LinesIoError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = parse_records(BufReader::new(file))?;
    log::debug!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Read a line list from a text file.
///
/// # Arguments
///
/// * `path` - The path to the line list file.
///
/// # Returns
///
/// The segments in file order.
pub fn read_lines_txt(path: impl AsRef<Path>) -> Result<Vec<LineSegment>, LinesIoError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let lines = parse_lines(BufReader::new(file))?;
    log::debug!("read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Write line file records to any writer, one per text line.
pub fn write_records<W: Write>(mut writer: W, records: &[LineRecord]) -> Result<(), LinesIoError> {
    for record in records {
        writeln!(writer, "{} {}", record.segment, u8::from(record.drawing))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write line file records to a text file.
pub fn write_records_txt(
    path: impl AsRef<Path>,
    records: &[LineRecord],
) -> Result<(), LinesIoError> {
    let file = File::create(path)?;
    write_records(BufWriter::new(file), records)
}

/// Write a line list to any writer, one record per segment.
///
/// Every segment is written as completed, i.e. with a `0` drawing flag. Use
/// [`write_records`] to keep the flags of a file read with [`parse_records`].
pub fn write_lines<W: Write>(writer: W, lines: &[LineSegment]) -> Result<(), LinesIoError> {
    let records = lines
        .iter()
        .map(|line| LineRecord::from(*line))
        .collect::<Vec<_>>();
    write_records(writer, &records)
}

/// Write a line list to a text file.
pub fn write_lines_txt(path: impl AsRef<Path>, lines: &[LineSegment]) -> Result<(), LinesIoError> {
    let file = File::create(path)?;
    write_lines(BufWriter::new(file), lines)
}

/// Read the source and destination line files and pair them by line order.
///
/// # Errors
///
/// Besides read and parse errors, fails with
/// [`CorrespondenceError::CorrespondenceCountMismatch`] when the files hold a
/// different number of records.
pub fn read_correspondences_txt(
    source_path: impl AsRef<Path>,
    dest_path: impl AsRef<Path>,
) -> Result<CorrespondenceSet, LinesIoError> {
    let source_lines = read_lines_txt(source_path)?;
    let dest_lines = read_lines_txt(dest_path)?;
    Ok(CorrespondenceSet::new(&source_lines, &dest_lines)?)
}

/// Write both sides of a correspondence set to their own files.
pub fn write_correspondences_txt(
    source_path: impl AsRef<Path>,
    dest_path: impl AsRef<Path>,
    set: &CorrespondenceSet,
) -> Result<(), LinesIoError> {
    write_lines_txt(source_path, &set.source_lines())?;
    write_lines_txt(dest_path, &set.dest_lines())?;
    Ok(())
}
