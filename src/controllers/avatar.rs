use bytes::Bytes;
use tracing::{error, info, warn};

use crate::id::random_id_while;
use crate::models::User;
use crate::storage::Storage;
use crate::validation::{file_extension, is_valid_image};
use crate::{ApiError, App};

/// Replace a user's avatar with an uploaded image, returning the new URL.
pub async fn update(
    app: &mut App,
    user: &User,
    file_name: Option<&str>,
    data: Bytes,
) -> crate::ApiResult<String> {
    if !is_valid_image(&data) {
        return Err(ApiError::InvalidImage);
    }

    let taken = app.storage.list_stems().await.map_err(|source| {
        error!("failed to list avatars: {source}");
        ApiError::IO { source }
    })?;
    let avatar_id = random_id_while(|id| taken.contains(id));
    let key = format!(
        "{avatar_id}{ext}",
        ext = file_extension(file_name.unwrap_or_default())
    );

    info!(
        "new avatar: user='{user}', key='{key}', size={size}",
        user = user.id,
        size = data.len()
    );

    app.storage.put_object(&key, data).await.map_err(|source| {
        error!("failed to store avatar '{key}': {source}");
        ApiError::IO { source }
    })?;

    let url = app.config.avatar_url(&key);
    if let Err(err) = app.database.set_user_avatar(&user.id, &url).await {
        discard(app, &key).await;
        // the session user row vanished mid-request
        return Err(match err {
            ApiError::NotFound => ApiError::Database {
                source: sqlx::Error::RowNotFound,
            },
            err => err,
        });
    }

    if let Some(old_key) = local_avatar_key(app, &user.avatar_url) {
        if old_key != key {
            discard(app, old_key).await;
        }
    }

    Ok(url)
}

/// File name of an avatar hosted by this service, `None` for external URLs.
fn local_avatar_key<'a>(app: &App, avatar_url: &'a str) -> Option<&'a str> {
    if !app.config.is_local_url(avatar_url) {
        return None;
    }
    avatar_url.rsplit('/').next().filter(|key| !key.is_empty())
}

async fn discard(app: &App, key: &str) {
    if let Err(err) = app.storage.delete_object(key).await {
        warn!("failed to delete avatar '{key}': {err}");
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use chrono::Utc;

    use super::*;
    use crate::controllers::tests::scratch_app;
    use crate::validation::tests::{GIF, PNG};

    async fn test_user(app: &mut App, avatar_url: &str) -> User {
        app.database
            .create_user("u1", Utc::now(), "someone", avatar_url, "github", "1")
            .await
            .unwrap()
    }

    async fn current_avatar(app: &mut App) -> String {
        app.database
            .get_user_by_provider("github", "1")
            .await
            .unwrap()
            .avatar_url
    }

    #[tokio::test]
    async fn stores_image_and_updates_user() {
        let (mut app, _dir) = scratch_app().await;
        let user = test_user(&mut app, "").await;

        let url = update(&mut app, &user, Some("me.png"), Bytes::from_static(PNG))
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:5000/assets/avatars/"));
        assert!(url.ends_with(".png"));
        assert_eq!(current_avatar(&mut app).await, url);

        let key = url.rsplit('/').next().unwrap();
        assert_eq!(&app.storage.get_object(key).await.unwrap()[..], PNG);
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let (mut app, _dir) = scratch_app().await;
        let user = test_user(&mut app, "https://example.com/old.png").await;

        let result = update(
            &mut app,
            &user,
            Some("notes.txt"),
            Bytes::from_static(b"hello there"),
        )
        .await;

        assert!(matches!(result, Err(ApiError::InvalidImage)));
        assert_eq!(current_avatar(&mut app).await, "https://example.com/old.png");
        assert!(app.storage.list_stems().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn evicts_previous_local_avatar() {
        let (mut app, _dir) = scratch_app().await;
        let user = test_user(&mut app, "").await;

        let first = update(&mut app, &user, Some("a.png"), Bytes::from_static(PNG))
            .await
            .unwrap();
        let user = app
            .database
            .get_user_by_provider("github", "1")
            .await
            .unwrap();
        let second = update(&mut app, &user, Some("b.gif"), Bytes::from_static(GIF))
            .await
            .unwrap();

        let first_key = first.rsplit('/').next().unwrap();
        let second_key = second.rsplit('/').next().unwrap();
        assert!(app.storage.get_object(first_key).await.is_err());
        assert!(app.storage.get_object(second_key).await.is_ok());
        assert_eq!(app.storage.list_stems().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn keeps_external_avatar_files_alone() {
        let (mut app, _dir) = scratch_app().await;
        // same file name as an external URL, must survive
        app.storage
            .put_object("keep.png", Bytes::from_static(PNG))
            .await
            .unwrap();
        let user = test_user(&mut app, "https://cdn.example.com/keep.png").await;

        update(&mut app, &user, Some("new.png"), Bytes::from_static(PNG))
            .await
            .unwrap();

        assert!(app.storage.get_object("keep.png").await.is_ok());
    }

    #[tokio::test]
    async fn failed_user_update_discards_file() {
        let (mut app, _dir) = scratch_app().await;
        let ghost = User {
            id: "ghost".into(),
            created_at: Utc::now(),
            username: "ghost".into(),
            avatar_url: String::new(),
            provider_name: "github".into(),
            provider_id: "0".into(),
        };

        let result = update(&mut app, &ghost, Some("x.png"), Bytes::from_static(PNG)).await;

        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Database { .. }));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(app.storage.list_stems().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_avatar_directory_is_a_server_error() {
        let (mut app, dir) = scratch_app().await;
        let user = test_user(&mut app, "https://example.com/old.png").await;
        let avatars_dir = dir.path().join("avatars");
        std::fs::remove_dir_all(&avatars_dir).unwrap();

        let err = update(&mut app, &user, Some("x.png"), Bytes::from_static(PNG))
            .await
            .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(current_avatar(&mut app).await, "https://example.com/old.png");
        assert!(!avatars_dir.exists());
    }
}
