//! Delimited file writing with digests.

use std::fs;
use std::path::{Path, PathBuf};

use acb_common::sha256_hex;
use polars::prelude::{AnyValue, CsvWriter, DataFrame, SerWriter};
use tracing::debug;

use crate::error::{OutputError, Result};
use crate::frame::ID_COLUMN;

/// A file written by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: usize,
    /// Distinct subject ids, or `None` for tables without an `id` column.
    pub subjects: Option<usize>,
    /// SHA-256 of the written bytes.
    pub sha256: String,
}

/// Serialize `df` with a header row and `separator` between fields.
pub fn encode_frame(df: &mut DataFrame, separator: char, path: &Path) -> Result<Vec<u8>> {
    let separator = u8::try_from(separator)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(OutputError::InvalidSeparator(separator))?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(separator)
        .finish(df)
        .map_err(|source| OutputError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(buffer)
}

fn count_subjects(df: &DataFrame) -> Option<usize> {
    let column = df.column(ID_COLUMN).ok()?;
    let mut previous: Option<String> = None;
    let mut count = 0;
    for idx in 0..column.len() {
        let value = match column.get(idx).ok()? {
            AnyValue::Null => continue,
            other => acb_common::any_to_string(other),
        };
        if previous.as_deref() != Some(value.as_str()) {
            count += 1;
            previous = Some(value);
        }
    }
    Some(count)
}

/// A table serialized in memory and not yet on disk.
#[derive(Debug, Clone)]
pub struct EncodedTable {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub rows: usize,
    pub subjects: Option<usize>,
}

/// Serialize `df` for `path` without touching the filesystem.
pub fn encode_table(df: &mut DataFrame, path: &Path, separator: char) -> Result<EncodedTable> {
    let bytes = encode_frame(df, separator, path)?;
    Ok(EncodedTable {
        path: path.to_path_buf(),
        bytes,
        rows: df.height(),
        subjects: count_subjects(df),
    })
}

fn staging_path(path: &Path) -> PathBuf {
    path.with_extension("partial")
}

fn stage(table: &EncodedTable) -> Result<PathBuf> {
    if let Some(parent) = table.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let staging = staging_path(&table.path);
    fs::write(&staging, &table.bytes).map_err(|source| OutputError::Io {
        path: staging.clone(),
        source,
    })?;
    Ok(staging)
}

/// Write every table, or none of them.
///
/// All tables are first written to sibling `.partial` files; only when every
/// one of them is on disk are they renamed into place. A failure while
/// staging removes the staged files again.
pub fn commit_tables(tables: Vec<EncodedTable>) -> Result<Vec<WrittenFile>> {
    let mut staged = Vec::with_capacity(tables.len());
    for table in &tables {
        match stage(table) {
            Ok(staging) => staged.push(staging),
            Err(error) => {
                for path in &staged {
                    let _ = fs::remove_file(path);
                }
                return Err(error);
            }
        }
    }

    let mut written = Vec::with_capacity(tables.len());
    for (table, staging) in tables.into_iter().zip(staged) {
        fs::rename(&staging, &table.path).map_err(|source| OutputError::Io {
            path: table.path.clone(),
            source,
        })?;
        debug!(
            path = %table.path.display(),
            rows = table.rows,
            bytes = table.bytes.len(),
            "table written"
        );
        written.push(WrittenFile {
            sha256: sha256_hex(&table.bytes),
            path: table.path,
            rows: table.rows,
            subjects: table.subjects,
        });
    }
    Ok(written)
}

/// Write `df` to `path`, creating parent directories.
///
/// The bytes go to a sibling temporary file that is renamed into place, so
/// a failed run never leaves a truncated table behind.
pub fn write_frame(df: &mut DataFrame, path: &Path, separator: char) -> Result<WrittenFile> {
    let table = encode_table(df, path, separator)?;
    commit_tables(vec![table])?
        .pop()
        .ok_or_else(|| OutputError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other("no table written"),
        })
}
