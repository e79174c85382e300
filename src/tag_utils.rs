use crate::api_utils::{fetch_record_set, Remote};
use crate::config::Config;
use crate::confirm::{confirm_import, Prompt};
use crate::error::{Error, Result};
use crate::file_utils::{prettify_json_files, read_record_dir, save_download, write_record};
use crate::reconcile::reconcile;
use crate::record::{normalize, Record, RecordKind, RecordSet};
use crate::upload::{progress_bar, upload, upload_each_tag, Upload};
use serde_json::json;
use std::fs;
use tracing::info;

/// Writes every followed tag to `tags_export`, one file each, without usage
/// history.
pub async fn export_tags(config: &Config, remote: &dyn Remote) -> Result<usize> {
    let dir = config
        .tags_export
        .as_deref()
        .ok_or_else(|| Error::Config("missing tags_export".to_string()))?;
    fs::create_dir_all(dir)?;

    let tags = fetch_record_set(remote, RecordKind::Tag).await?;

    let bar = progress_bar(tags.len() as u64);
    for tag in &tags {
        bar.suspend(|| println!("Tag name: {}", tag.key()));
        let path = write_record(dir, tag)?;
        bar.suspend(|| info!("Wrote {}", path.display()));
        bar.inc(1);
    }
    bar.finish_and_clear();

    if config.settings.prettify {
        prettify_json_files(dir)?;
    }
    Ok(tags.len())
}

/// Follows tags from `tags_import_url` (a single tag) or from the files in
/// `tags_import`. Returns how many tags were followed.
pub async fn import_tags(
    config: &Config,
    remote: &dyn Remote,
    prompt: &mut dyn Prompt,
) -> Result<usize> {
    if let Some(url) = config.tags_import_url.as_deref() {
        return import_tag_from_url(config, remote, prompt, url).await;
    }
    let dir = config
        .tags_import
        .as_deref()
        .ok_or_else(|| Error::Config("missing tags_import or tags_import_url".to_string()))?;

    let current = fetch_record_set(remote, RecordKind::Tag).await?;
    let candidate = read_record_dir(RecordKind::Tag, dir)?.records;

    let result = reconcile(&current, &candidate);
    for tag in &result.duplicate {
        println!("Already following #{}", tag.key());
    }
    if result.new.is_empty() {
        println!("No new tags to import.");
        return Ok(0);
    }

    confirm_import(prompt, &current, &candidate)?;
    upload_each_tag(remote, &result.new).await
}

async fn import_tag_from_url(
    config: &Config,
    remote: &dyn Remote,
    prompt: &mut dyn Prompt,
    url: &str,
) -> Result<usize> {
    let document = remote.fetch_url(url).await?;
    let tag = normalize(Record::from_value(RecordKind::Tag, document.clone())?)?;
    if let Some(dir) = config.tags_download.as_deref() {
        save_download(dir, url, &document)?;
    }

    let mut candidate = RecordSet::new(RecordKind::Tag);
    candidate.insert(tag);
    follow_new(remote, prompt, &candidate).await
}

/// Asks for a tag name and follows it.
pub async fn follow_tag(remote: &dyn Remote, prompt: &mut dyn Prompt) -> Result<usize> {
    let answer = prompt.ask("Enter the tag name: ").unwrap_or_default();
    let name = answer.trim().trim_start_matches('#');
    if name.is_empty() {
        return Err(Error::malformed(RecordKind::Tag, "empty tag name"));
    }

    let mut candidate = RecordSet::new(RecordKind::Tag);
    candidate.insert(Record::from_value(RecordKind::Tag, json!({ "name": name }))?);
    follow_new(remote, prompt, &candidate).await
}

/// Shared tail of single-tag imports: skip if already followed, otherwise
/// show, confirm and upload.
async fn follow_new(
    remote: &dyn Remote,
    prompt: &mut dyn Prompt,
    candidate: &RecordSet,
) -> Result<usize> {
    let current = fetch_record_set(remote, RecordKind::Tag).await?;
    let result = reconcile(&current, candidate);

    for tag in &result.duplicate {
        println!("Already following #{}", tag.key());
    }
    let Some(tag) = result.new.iter().next() else {
        return Ok(0);
    };

    println!("The following tag will be imported:");
    println!("{}", serde_json::to_string_pretty(tag.fields()).unwrap_or_default());
    confirm_import(prompt, &current, candidate)?;
    upload(remote, Upload::Tag(tag)).await?;
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_utils::Endpoint;
    use crate::test_support::{config_with, MockRemote, ScriptedPrompt};
    use reqwest::StatusCode;
    use serde_json::Value;
    use tempfile::TempDir;

    const LIST_URL: &str = "https://lists.example/tags/opensource.json";

    #[tokio::test]
    async fn test_url_tag_new_is_confirmed_and_uploaded_once() {
        let config = config_with(&format!("tags_import_url = \"{}\"", LIST_URL));
        let remote = MockRemote::new().with_url(LIST_URL, json!({"name": "opensource"}));
        let mut prompt = ScriptedPrompt::new(["y"]);

        let followed = import_tags(&config, &remote, &mut prompt).await.unwrap();

        assert_eq!(followed, 1);
        assert_eq!(prompt.questions.len(), 1);
        assert_eq!(
            remote.posted(),
            vec![(Endpoint::TagFollowing, json!({"name": "opensource"}))]
        );
    }

    #[tokio::test]
    async fn test_url_tag_already_followed_skips_prompt() {
        let config = config_with(&format!("tags_import_url = \"{}\"", LIST_URL));
        let remote = MockRemote::new()
            .with_list(Endpoint::FollowedTags, json!([{"name": "opensource", "following": true}]))
            .with_url(LIST_URL, json!({"name": "opensource"}));
        let mut prompt = ScriptedPrompt::new(["y"]);

        let followed = import_tags(&config, &remote, &mut prompt).await.unwrap();

        assert_eq!(followed, 0);
        assert!(prompt.questions.is_empty());
        assert!(remote.posted().is_empty());
    }

    #[tokio::test]
    async fn test_url_tag_without_name_is_malformed() {
        let config = config_with(&format!("tags_import_url = \"{}\"", LIST_URL));
        let remote = MockRemote::new().with_url(LIST_URL, json!({"following": true}));
        let mut prompt = ScriptedPrompt::new(["y"]);

        let err = import_tags(&config, &remote, &mut prompt).await.unwrap_err();

        assert!(matches!(err, Error::MalformedRecord { .. }));
        assert!(remote.posted().is_empty());
    }

    #[tokio::test]
    async fn test_url_tag_is_saved_to_downloads() {
        let dir = TempDir::new().unwrap();
        let config = config_with(&format!(
            "tags_import_url = \"{}\"\ntags_download = \"{}\"",
            LIST_URL,
            dir.path().display()
        ));
        let remote = MockRemote::new().with_url(LIST_URL, json!({"name": "opensource"}));
        let mut prompt = ScriptedPrompt::new(["n"]);

        let err = import_tags(&config, &remote, &mut prompt).await.unwrap_err();

        assert!(matches!(err, Error::ImportCancelled));
        assert!(dir
            .path()
            .join("https:--lists.example-tags-opensource.json")
            .exists());
        assert!(remote.posted().is_empty());
    }

    #[tokio::test]
    async fn test_directory_import_posts_each_new_tag() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("rust.json"), r#"{"name":"rust","following":true}"#).unwrap();
        fs::write(dir.path().join("cats.json"), r#"{"name":"cats","following":true}"#).unwrap();
        fs::write(dir.path().join("news.json"), r#"{"name":"news","following":true}"#).unwrap();
        let config = config_with(&format!("tags_import = \"{}\"", dir.path().display()));
        let remote = MockRemote::new().with_list(Endpoint::FollowedTags, json!([{"name": "news"}]));
        let mut prompt = ScriptedPrompt::new(["y"]);

        let followed = import_tags(&config, &remote, &mut prompt).await.unwrap();

        assert_eq!(followed, 2);
        assert_eq!(prompt.questions.len(), 1);
        let names: Vec<Value> = remote.posted().into_iter().map(|(_, body)| body["name"].clone()).collect();
        assert_eq!(names, vec![json!("cats"), json!("rust")]);
    }

    #[tokio::test]
    async fn test_directory_import_stops_at_first_rejection() {
        let dir = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            fs::write(dir.path().join(format!("{name}.json")), format!(r#"{{"name":"{name}"}}"#)).unwrap();
        }
        let config = config_with(&format!("tags_import = \"{}\"", dir.path().display()));
        let remote = MockRemote::new().rejecting_post(1, StatusCode::TOO_MANY_REQUESTS);
        let mut prompt = ScriptedPrompt::new(["y"]);

        let err = import_tags(&config, &remote, &mut prompt).await.unwrap_err();

        assert!(matches!(err, Error::RemoteRejected { .. }));
        assert_eq!(remote.posted(), vec![(Endpoint::TagFollowing, json!({"name": "a"}))]);
    }

    #[tokio::test]
    async fn test_export_drops_history_and_ids() {
        let dir = TempDir::new().unwrap();
        let config = config_with(&format!("tags_export = \"{}\"", dir.path().display()));
        let remote = MockRemote::new().with_list(
            Endpoint::FollowedTags,
            json!([{
                "id": "55",
                "name": "rust",
                "url": "https://example.social/tags/rust",
                "following": true,
                "history": [{"day": "1700000000", "uses": "12", "accounts": "9"}]
            }]),
        );

        assert_eq!(export_tags(&config, &remote).await.unwrap(), 1);

        let written: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("rust.json")).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({"name": "rust", "url": "https://example.social/tags/rust", "following": true})
        );
    }

    #[tokio::test]
    async fn test_follow_tag_strips_hash_and_uploads() {
        let remote = MockRemote::new();
        let mut prompt = ScriptedPrompt::new(["#rustlang\n", "y\n"]);

        assert_eq!(follow_tag(&remote, &mut prompt).await.unwrap(), 1);
        assert_eq!(
            remote.posted(),
            vec![(Endpoint::TagFollowing, json!({"name": "rustlang"}))]
        );
    }

    #[tokio::test]
    async fn test_follow_tag_rejects_empty_name() {
        let remote = MockRemote::new();
        let mut prompt = ScriptedPrompt::new(["  \n"]);

        let err = follow_tag(&remote, &mut prompt).await.unwrap_err();

        assert!(matches!(err, Error::MalformedRecord { .. }));
    }
}
