use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{RecordKind, RecordSet};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Filters,
    FollowedTags,
    TagFollowing,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Filters => "/api/v2/filters",
            Endpoint::FollowedTags => "/api/v1/followed_tags",
            Endpoint::TagFollowing => "/api/v1/tag_following",
        }
    }
}

/// The instance API plus unauthenticated fetches of shared lists.
#[async_trait]
pub trait Remote: Send + Sync {
    async fn get(&self, endpoint: Endpoint) -> Result<Value>;

    async fn post(&self, endpoint: Endpoint, body: &Value) -> Result<()>;

    /// Fetches a public JSON document, no credentials attached.
    async fn fetch_url(&self, url: &str) -> Result<Value>;
}

/// Downloads the account's current filters or followed tags, normalized.
pub async fn fetch_record_set(remote: &dyn Remote, kind: RecordKind) -> Result<RecordSet> {
    let endpoint = match kind {
        RecordKind::Filter => Endpoint::Filters,
        RecordKind::Tag => Endpoint::FollowedTags,
    };
    match remote.get(endpoint).await? {
        Value::Array(values) => Ok(RecordSet::from_values(kind, values, endpoint.path())),
        _ => Err(Error::malformed(
            kind,
            format!("{} did not return a list", endpoint.path()),
        )),
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    instance_url: String,
    auth_header: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.settings.timeout))
            .build()?;
        Ok(ApiClient {
            instance_url: config.instance_url.trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {}", config.access_token),
            client,
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.instance_url, endpoint.path())
    }
}

#[async_trait]
impl Remote for ApiClient {
    async fn get(&self, endpoint: Endpoint) -> Result<Value> {
        let url = self.url(endpoint);
        debug!("GET {}", url);
        let request = self.client.get(&url).header("Authorization", &self.auth_header);
        send_for_json(request, &url).await
    }

    async fn post(&self, endpoint: Endpoint, body: &Value) -> Result<()> {
        let url = self.url(endpoint);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.auth_header)
            .json(body)
            .send()
            .await?;
        check_status(&url, response.status())
    }

    async fn fetch_url(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);
        send_for_json(self.client.get(url), url).await
    }
}

async fn send_for_json(request: RequestBuilder, url: &str) -> Result<Value> {
    let response = request.send().await?;
    check_status(url, response.status())?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::parse(url, e))
}

fn check_status(url: &str, status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::RemoteRejected {
            url: url.to_string(),
            status,
        })
    }
}
