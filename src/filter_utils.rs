// filter_utils.rs

use crate::api_utils::{fetch_record_set, Remote};
use crate::config::Config;
use crate::confirm::{confirm_import, Prompt};
use crate::error::{Error, Result};
use crate::file_utils::{prettify_json_files, read_record_dir, save_download, write_record};
use crate::reconcile::reconcile;
use crate::record::{RecordKind, RecordSet};
use crate::upload::{progress_bar, upload, Upload};
use serde_json::Value;
use std::fs;
use tracing::info;

/// Writes every filter on the account to `filters_export`, one file each.
pub async fn export_filters(config: &Config, remote: &dyn Remote) -> Result<usize> {
    let dir = config
        .filters_export
        .as_deref()
        .ok_or_else(|| Error::Config("missing filters_export".to_string()))?;
    fs::create_dir_all(dir)?;

    let filters = fetch_record_set(remote, RecordKind::Filter).await?;

    let bar = progress_bar(filters.len() as u64);
    for filter in &filters {
        bar.suspend(|| println!("Filter name: {}", filter.key()));
        let path = write_record(dir, filter)?;
        bar.suspend(|| info!("Wrote {}", path.display()));
        bar.inc(1);
    }
    bar.finish_and_clear();

    if config.settings.prettify {
        prettify_json_files(dir)?;
    }
    Ok(filters.len())
}

/// Uploads filters from `filters_import_url` or `filters_import` that are not
/// on the account yet, as one batch after confirmation.
///
/// Returns how many filters were uploaded.
pub async fn import_filters(
    config: &Config,
    remote: &dyn Remote,
    prompt: &mut dyn Prompt,
) -> Result<usize> {
    if config.filters_import_url.is_none() && config.filters_import.is_none() {
        return Err(Error::Config(
            "missing filters_import or filters_import_url".to_string(),
        ));
    }

    let current = fetch_record_set(remote, RecordKind::Filter).await?;
    let candidate = load_candidates(config, remote).await?;

    let result = reconcile(&current, &candidate);
    for filter in &result.duplicate {
        println!("Filter already exists: {}", filter.key());
    }
    if result.new.is_empty() {
        println!("No new filters to import.");
        return Ok(0);
    }

    confirm_import(prompt, &current, &candidate)?;
    upload(remote, Upload::FilterBatch(&result.new)).await?;
    Ok(result.new.len())
}

async fn load_candidates(config: &Config, remote: &dyn Remote) -> Result<RecordSet> {
    if let Some(url) = config.filters_import_url.as_deref() {
        let document = remote.fetch_url(url).await?;
        if let Some(dir) = config.filters_download.as_deref() {
            save_download(dir, url, &document)?;
        }
        let values = match document {
            Value::Array(values) => values,
            single => vec![single],
        };
        return Ok(RecordSet::from_values(RecordKind::Filter, values, url));
    }

    match config.filters_import.as_deref() {
        Some(dir) => Ok(read_record_dir(RecordKind::Filter, dir)?.records),
        None => Ok(RecordSet::new(RecordKind::Filter)),
    }
}
