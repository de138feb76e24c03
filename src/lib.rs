//! A pastebin service: pastes made of pasties, session-authenticated users and
//! locally stored avatars.

use axum::extract::FromRef;

pub mod auth;
pub mod commands;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod id;
pub mod models;
pub mod storage;
pub mod types;
pub mod validation;

pub use error::{ApiError, ApiResult};

use config::Config;
use db::Database;
use storage::FileStorage;

/// Everything a request or command needs.
#[derive(Clone, FromRef)]
pub struct App {
    pub config: Config,
    pub database: Database,
    pub storage: FileStorage,
}

impl App {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let database = Database::connect(&config.database.url).await?;
        let storage = FileStorage::new(&config.storage.avatars_dir).await?;
        Ok(App {
            config,
            database,
            storage,
        })
    }
}
