// file_utils.rs

use crate::error::{Error, Result};
use crate::record::{normalize, Record, RecordKind, RecordSet};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// `*.json` files directly inside `dir`, sorted by file name.
pub fn get_sorted_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::Io(io::Error::new(
            ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if path.is_file() && is_json {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Records loaded from a directory, with the files that did not make it in.
#[derive(Debug)]
pub struct RecordDir {
    pub records: RecordSet,
    /// Files that parsed as JSON but were not usable records.
    pub skipped: Vec<PathBuf>,
    /// `(earlier, later)` pairs where the later file replaced the earlier one.
    pub replaced: Vec<(PathBuf, PathBuf)>,
}

/// Loads one record per file. Files are read in sorted name order so that on
/// a key collision the later file wins deterministically.
///
/// Invalid JSON aborts the load; a file that parses but is not a usable
/// record is skipped with a warning.
pub fn read_record_dir(kind: RecordKind, dir: &Path) -> Result<RecordDir> {
    let mut loaded = RecordDir {
        records: RecordSet::new(kind),
        skipped: Vec::new(),
        replaced: Vec::new(),
    };
    let mut origins: HashMap<String, PathBuf> = HashMap::new();

    for path in get_sorted_json_files(dir)? {
        let content = fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| Error::parse(path.display().to_string(), e))?;

        let record = match Record::from_value(kind, value).and_then(normalize) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                loaded.skipped.push(path);
                continue;
            }
        };

        let key = record.key().to_string();
        loaded.records.insert(record);
        if let Some(earlier) = origins.insert(key.clone(), path.clone()) {
            warn!(
                "{} \"{}\" in {} replaces the one from {}",
                kind,
                key,
                path.display(),
                earlier.display()
            );
            loaded.replaced.push((earlier, path));
        }
    }
    Ok(loaded)
}

/// File name for a record: spaces become underscores, slashes become hyphens.
pub fn record_file_name(key: &str) -> String {
    format!("{}.json", sanitize(key))
}

fn sanitize(name: &str) -> String {
    name.replace(' ', "_").replace('/', "-")
}

/// Writes a record as 2-space pretty JSON into `dir`.
pub fn write_record(dir: &Path, record: &Record) -> Result<PathBuf> {
    let path = dir.join(record_file_name(record.key()));
    let json = serde_json::to_string_pretty(record.fields())
        .map_err(|e| Error::parse(record.key(), e))?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Saves a document fetched from `url` into `dir`, named after the URL.
pub fn save_download(dir: &Path, url: &str, value: &Value) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut name = sanitize(url);
    if !name.to_ascii_lowercase().ends_with(".json") {
        name.push_str(".json");
    }
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value).map_err(|e| Error::parse(url, e))?;
    fs::write(&path, json)?;
    info!("Saved {} to {}", url, path.display());
    Ok(path)
}

/// Rewrites every `*.json` file in `dir` with 4-space indentation.
pub fn prettify_json_files(dir: &Path) -> Result<usize> {
    let files = get_sorted_json_files(dir)?;
    for path in &files {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| Error::parse(path.display().to_string(), e))?;
        fs::write(path, to_string_indented(&value, b"    ", path)?)?;
    }
    Ok(files.len())
}

fn to_string_indented(value: &Value, indent: &[u8], path: &Path) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent));
    value
        .serialize(&mut serializer)
        .map_err(|e| Error::parse(path.display().to_string(), e))?;
    String::from_utf8(buf).map_err(|e| Error::Io(io::Error::new(ErrorKind::InvalidData, e)))
}
