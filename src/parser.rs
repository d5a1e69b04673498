//! CSV parser for raw enrollment rows.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{GradeError, GradeResult};
use crate::model::RawEnrollment;
use crate::table::EnrollmentTable;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes raw enrollment rows from CSV bytes with a header line.
///
/// Identifiers stay strings, so ids such as `0042` keep their leading zeros.
///
/// # Errors
///
/// Returns [`GradeError::MalformedInput`] naming the 1-based data row of the
/// first missing, empty-numeric or mistyped field.
pub fn parse_rows(bytes: &[u8]) -> GradeResult<Vec<RawEnrollment>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let row: RawEnrollment = result.map_err(|e| GradeError::malformed(i + 1, e.to_string()))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Reads a CSV file (gzip-compressed if the name ends in `.gz`) into raw rows.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_rows(path: &Path) -> Result<Vec<RawEnrollment>> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let mut bytes = Vec::new();
    if is_gzip(path) {
        GzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        file.read_to_end(&mut bytes)?;
    }
    debug!(bytes = bytes.len(), "Read enrollment file");

    let rows = parse_rows(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    Ok(rows)
}

/// Reads a CSV file and loads it into an [`EnrollmentTable`].
pub fn load_table(path: &Path) -> Result<EnrollmentTable> {
    let rows = read_rows(path)?;
    let table =
        EnrollmentTable::load(rows).with_context(|| format!("loading {}", path.display()))?;
    Ok(table)
}

pub(crate) fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}
