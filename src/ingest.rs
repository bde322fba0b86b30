//! File discovery and per-day CSV ingestion.
//!
//! Day files are produced by a meter logger, one file per calendar day,
//! named `yyyy-mm-dd` under a per-year directory. The first record is a
//! comment-style header (`#date,time,...,IMP,EXP,GEN-T,...`) that names the
//! columns; rows may carry more fields than the engine uses.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::warn;

use crate::sim::engine::Engine;
use crate::sim::types::Sample;

/// Layout of the combined `date` + `time` columns.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Required header column names, as written by the meter logger.
const COL_DATE: &str = "#date";
const COL_TIME: &str = "time";
const COL_IMPORT: &str = "IMP";
const COL_EXPORT: &str = "EXP";
const COL_GENERATION: &str = "GEN-T";

/// Collects every regular file under `base/<year>` for each configured
/// year, sorted lexically across the whole set. Day files are named
/// `yyyy-mm-dd`, so lexical order is chronological.
///
/// # Errors
///
/// An unreadable year directory is fatal for the run.
pub fn discover_files(base: &Path, years: &[i32]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for year in years {
        let dir = base.join(year.to_string());
        collect_files(&dir, &mut files)
            .with_context(|| format!("cannot scan {}", dir.display()))?;
    }
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            collect_files(&entry.path(), files)?;
        } else {
            files.push(entry.path());
        }
    }
    Ok(())
}

/// Header column indices for the fields the engine consumes.
struct Columns {
    date: usize,
    time: usize,
    import: usize,
    export: usize,
    generation: usize,
}

fn find_columns(header: &csv::StringRecord) -> Option<Columns> {
    let mut date = None;
    let mut time = None;
    let mut import = None;
    let mut export = None;
    let mut generation = None;
    for (i, name) in header.iter().enumerate() {
        match name {
            COL_DATE => date = Some(i),
            COL_TIME => time = Some(i),
            COL_IMPORT => import = Some(i),
            COL_EXPORT => export = Some(i),
            COL_GENERATION => generation = Some(i),
            _ => {}
        }
    }
    Some(Columns {
        date: date?,
        time: time?,
        import: import?,
        export: export?,
        generation: generation?,
    })
}

/// Reads one day file and feeds its samples to the engine, then closes the
/// day (daily supply charge, day counter).
///
/// A file missing required header columns, or containing fewer than two
/// records, is skipped with a warning and contributes no day. A data row
/// with fewer fields than the header, or with an unparsable timestamp, is
/// skipped individually; running state is untouched either way.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or the CSV cannot be
/// read; the caller logs it and moves on to the next file.
pub fn read_day_file(path: &Path, engine: &mut Engine) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let records = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("cannot read {}", path.display()))?;

    // A usable file has at least the header line and one line of data.
    if records.len() < 2 {
        warn!(file = %path.display(), "empty file");
        return Ok(());
    }
    let header = &records[0];
    let Some(columns) = find_columns(header) else {
        warn!(file = %path.display(), "not all required columns are present");
        return Ok(());
    };

    for (line, record) in records.iter().enumerate().skip(1) {
        if record.len() < header.len() {
            warn!(file = %path.display(), line = line + 1, "mismatch in column count");
            continue;
        }
        let raw_timestamp = format!(
            "{} {}",
            record.get(columns.date).unwrap_or_default(),
            record.get(columns.time).unwrap_or_default()
        );
        let Ok(timestamp) = NaiveDateTime::parse_from_str(&raw_timestamp, TIMESTAMP_FORMAT) else {
            warn!(
                file = %path.display(),
                line = line + 1,
                raw = %raw_timestamp,
                "cannot parse timestamp"
            );
            continue;
        };
        engine.observe(&Sample {
            timestamp,
            import: record.get(columns.import).unwrap_or_default().to_string(),
            export: record.get(columns.export).unwrap_or_default().to_string(),
            generation: record
                .get(columns.generation)
                .unwrap_or_default()
                .to_string(),
        });
    }

    engine.end_day();
    Ok(())
}

/// Runs every discovered file through the engine in order. A failing file
/// is logged and skipped; all running state carries over to the next file.
pub fn ingest_all(files: &[PathBuf], engine: &mut Engine) {
    for file in files {
        if let Err(e) = read_day_file(file, engine) {
            warn!(file = %file.display(), error = %e, "skipping file");
        }
    }
}
