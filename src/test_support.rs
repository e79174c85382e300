//! In-memory doubles for the remote instance and the interactive prompt.

use crate::api_utils::{Endpoint, Remote};
use crate::confirm::Prompt;
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Replays canned answers and records every question asked.
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompt {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> Option<String> {
        self.questions.push(question.to_string());
        self.answers.pop_front()
    }
}

#[derive(Default)]
pub struct MockRemote {
    lists: HashMap<&'static str, Value>,
    urls: HashMap<String, Value>,
    /// Reject the n-th POST (0-based) with this status.
    reject_post: Option<(usize, StatusCode)>,
    pub posts: Mutex<Vec<(Endpoint, Value)>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, endpoint: Endpoint, body: Value) -> Self {
        self.lists.insert(endpoint.path(), body);
        self
    }

    pub fn with_url(mut self, url: &str, body: Value) -> Self {
        self.urls.insert(url.to_string(), body);
        self
    }

    pub fn rejecting_post(mut self, index: usize, status: StatusCode) -> Self {
        self.reject_post = Some((index, status));
        self
    }

    pub fn posted(&self) -> Vec<(Endpoint, Value)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Remote for MockRemote {
    async fn get(&self, endpoint: Endpoint) -> Result<Value> {
        Ok(self
            .lists
            .get(endpoint.path())
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    async fn post(&self, endpoint: Endpoint, body: &Value) -> Result<()> {
        let mut posts = self.posts.lock().unwrap();
        if let Some((index, status)) = self.reject_post {
            if posts.len() == index {
                return Err(Error::RemoteRejected {
                    url: endpoint.path().to_string(),
                    status,
                });
            }
        }
        posts.push((endpoint, body.clone()));
        Ok(())
    }

    async fn fetch_url(&self, url: &str) -> Result<Value> {
        self.urls.get(url).cloned().ok_or_else(|| Error::RemoteRejected {
            url: url.to_string(),
            status: StatusCode::NOT_FOUND,
        })
    }
}

/// Minimal valid config, extended with extra TOML lines.
pub fn config_with(extra: &str) -> Config {
    let text = format!(
        "instance_url = \"https://example.social\"\naccess_token = \"token\"\n{}",
        extra
    );
    Config::from_toml(&text).unwrap()
}
