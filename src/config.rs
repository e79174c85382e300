use crate::confirm::Prompt;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"instance_url = "https://mastodon.social"
access_token = "REPLACEME"

filters_export = "export/filters/"
filters_import = "import/filters/"
filters_import_url = ""
filters_download = "downloads/filters/"

tags_export = "export/tags/"
tags_import = "import/tags/"
tags_import_url = ""
tags_download = "downloads/tags/"

[settings]
timeout = 30
log_level = "info"
prettify = false
"#;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub instance_url: String,
    #[serde(default)]
    pub access_token: String,
    pub filters_export: Option<PathBuf>,
    pub filters_import: Option<PathBuf>,
    pub filters_import_url: Option<String>,
    pub filters_download: Option<PathBuf>,
    pub tags_export: Option<PathBuf>,
    pub tags_import: Option<PathBuf>,
    pub tags_import_url: Option<String>,
    pub tags_download: Option<PathBuf>,
    #[serde(default)]
    pub settings: SettingsConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SettingsConfig {
    /// Per-request timeout in seconds
    pub timeout: u64,
    pub log_level: String,
    /// Rewrite exported files with 4-space indentation
    pub prettify: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        SettingsConfig {
            timeout: 30,
            log_level: "info".to_string(),
            prettify: false,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config> {
        let mut config: Config =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.discard_blank();
        config.validate()?;
        Ok(config)
    }

    /// Empty strings in the file mean "not configured".
    fn discard_blank(&mut self) {
        for path in [
            &mut self.filters_export,
            &mut self.filters_import,
            &mut self.filters_download,
            &mut self.tags_export,
            &mut self.tags_import,
            &mut self.tags_download,
        ] {
            if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                *path = None;
            }
        }
        for url in [&mut self.filters_import_url, &mut self.tags_import_url] {
            if url.as_ref().is_some_and(|u| u.trim().is_empty()) {
                *url = None;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.instance_url.trim().is_empty() {
            return Err(Error::Config("missing instance_url".to_string()));
        }
        if self.access_token.trim().is_empty() {
            return Err(Error::Config("missing access_token".to_string()));
        }
        Ok(())
    }
}

/// Loads the config file, offering to write a template when it is missing.
///
/// `Ok(None)` means a template was just written and the user has to fill it
/// in before anything can run.
pub fn load_or_create_config(path: &Path, prompt: &mut dyn Prompt) -> Result<Option<Config>> {
    if !path.exists() {
        let question = format!(
            "The configuration file '{}' does not exist. Would you like to create one? (yes/y/no) ",
            path.display()
        );
        let answer = prompt.ask(&question).unwrap_or_default();
        let answer = answer.trim();

        if answer.eq_ignore_ascii_case("yes") || answer.eq_ignore_ascii_case("y") {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG)?;
            println!("Default '{}' file has been created.", path.display());
            println!("Please edit the config file and then run the program again.");
            return Ok(None);
        }
        return Err(Error::Config(format!(
            "{} does not exist and was not created",
            path.display()
        )));
    }

    let config_data = fs::read_to_string(path)?;
    Config::from_toml(&config_data).map(Some)
}
