use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Public base URL, used to build avatar URLs and to recognize local avatars.
    pub base_url: String,
    pub port: u16,
    pub database: Database,
    pub storage: Storage,
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub avatars_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    pub max_upload_size: usize,
}

impl Config {
    /// Read and parse a TOML config file.
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&source)
    }

    pub fn parse(source: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(source).context("failed to parse config")?;
        // avatar URLs are joined with '/'
        config.base_url = config.base_url.trim_end_matches('/').to_owned();
        Ok(config)
    }

    /// URL under which an avatar file is publicly served.
    pub fn avatar_url(&self, file_name: &str) -> String {
        format!("{}/assets/avatars/{file_name}", self.base_url)
    }

    /// Whether a URL points at an avatar served by this service.
    pub fn is_local_url(&self, url: &str) -> bool {
        url.starts_with(&self.avatar_url(""))
    }
}
