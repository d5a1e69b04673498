//! Output formatting and persistence for enrollment tables.
//!
//! Supports pretty-printing, JSON serialization, and full-batch CSV save.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::model::RawEnrollment;
use crate::parser::is_gzip;
use crate::table::EnrollmentTable;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Renders a value as pretty-printed JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes a value as pretty-printed JSON to `path`.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    fs::write(path, to_json(value)?).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "JSON written");
    Ok(())
}

/// Encodes raw rows as CSV with a header line.
pub fn write_rows<W: Write>(writer: W, rows: &[RawEnrollment]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Saves the raw columns of `table` to `path`, replacing the whole file.
///
/// Derived columns are never written. The batch goes to a sibling temp file
/// first and is renamed over `path`, so readers never see a partial save.
/// Paths ending in `.gz` are gzip-compressed.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn save_table(path: &Path, table: &EnrollmentTable) -> Result<()> {
    let rows = table.serialize();
    let tmp = temp_path(path);

    let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_rows(&mut encoder, &rows)?;
        encoder.finish()?;
    } else {
        write_rows(file, &rows)?;
    }

    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    info!(rows = rows.len(), "Enrollment table saved");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
