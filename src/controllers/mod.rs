pub mod avatar;
pub mod paste;

#[cfg(all(test, feature = "sqlite"))]
pub(crate) mod tests {
    use tempfile::TempDir;

    use crate::config::{self, Config};
    use crate::App;

    /// App over a scratch sqlite database and avatar directory.
    pub(crate) async fn scratch_app() -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let avatars_dir = dir.path().join("avatars");
        std::fs::create_dir(&avatars_dir).unwrap();

        let config = Config {
            base_url: "http://localhost:5000".into(),
            port: 0,
            database: config::Database {
                url: format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display()),
            },
            storage: config::Storage { avatars_dir },
            limits: config::Limits {
                max_upload_size: 1024 * 1024,
            },
        };

        let app = App::new(config).await.unwrap();
        app.database.migrate().await.unwrap();
        (app, dir)
    }
}
