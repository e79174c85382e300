use crate::api_utils::{Endpoint, Remote};
use crate::error::Result;
use crate::record::{Record, RecordKind, RecordSet};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::info;

pub enum Upload<'a> {
    /// All filters in one request body.
    FilterBatch(&'a RecordSet),
    /// One followed tag.
    Tag(&'a Record),
}

/// Sends accepted records to the instance. No retries; a rejected request
/// surfaces as `RemoteRejected`.
pub async fn upload(remote: &dyn Remote, payload: Upload<'_>) -> Result<()> {
    match payload {
        Upload::FilterBatch(filters) => {
            if filters.is_empty() {
                return Ok(());
            }
            let body = Value::Array(filters.iter().map(Record::to_value).collect());
            remote.post(Endpoint::Filters, &body).await?;
            info!("Uploaded {} filter(s)", filters.len());
        }
        Upload::Tag(tag) => {
            post_tag(remote, tag).await?;
            info!("Now following #{}", tag.key());
        }
    }
    Ok(())
}

/// Uploads tags one request each, in key order. Stops at the first failure;
/// tags sent before it stay followed.
pub async fn upload_each_tag(remote: &dyn Remote, tags: &RecordSet) -> Result<usize> {
    debug_assert_eq!(tags.kind(), RecordKind::Tag);

    let bar = progress_bar(tags.len() as u64);
    for tag in tags {
        bar.set_message(format!("#{}", tag.key()));
        if let Err(e) = post_tag(remote, tag).await {
            bar.abandon_with_message(format!("failed at #{}", tag.key()));
            return Err(e);
        }
        bar.suspend(|| info!("Now following #{}", tag.key()));
        bar.inc(1);
    }
    bar.finish_with_message("done");
    Ok(tags.len())
}

async fn post_tag(remote: &dyn Remote, tag: &Record) -> Result<()> {
    remote.post(Endpoint::TagFollowing, &tag.to_value()).await
}

pub fn progress_bar(len: u64) -> ProgressBar {
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len).with_style(style)
}
