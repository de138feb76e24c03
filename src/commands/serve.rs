use std::net::SocketAddr;

use axum::body::{self, Bytes};
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{AuthUser, MaybeUser};
use crate::controllers;
use crate::error::ApiError;
use crate::models::User;
use crate::storage::{FileStorage, Storage};
use crate::types::api::{CreatePaste, Stats};
use crate::validation::mime_type;
use crate::App;

/// Name of the multipart field carrying the avatar image.
const AVATAR_FIELD: &str = "file";

pub async fn run(app: App) -> anyhow::Result<()> {
    app.database.migrate().await?;

    let addr = SocketAddr::from(([127, 0, 0, 1], app.config.port));
    info!("listening on {addr}");

    axum::Server::bind(&addr)
        .serve(router(app).into_make_service())
        .await?;

    Ok(())
}

pub fn router(app: App) -> Router {
    let max_upload_size = app.config.limits.max_upload_size;

    Router::new()
        .route("/api/v3/pastes", post(create_paste))
        .route("/api/v3/pastes/:id", get(get_paste))
        .route("/api/v3/meta/stats", get(get_stats))
        .route("/api/v3/auth/self", get(get_self))
        .route("/api/v3/settings/avatar", patch(update_avatar))
        .route("/assets/avatars/:file_name", get(get_avatar))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn create_paste(
    State(mut app): State<App>,
    MaybeUser(user): MaybeUser,
    Json(request): Json<CreatePaste>,
) -> crate::ApiResult<impl IntoResponse> {
    let paste = controllers::paste::create(&mut app, user.as_ref(), request).await?;
    let path = format!("/api/v3/pastes/{id}", id = paste.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, path)], Json(paste)))
}

async fn get_paste(
    State(mut app): State<App>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> crate::ApiResult<impl IntoResponse> {
    Ok(Json(
        controllers::paste::fetch(&mut app, user.as_ref(), &id).await?,
    ))
}

async fn get_stats(State(mut app): State<App>) -> crate::ApiResult<Json<Stats>> {
    let pastes = controllers::paste::count(&mut app).await?;
    Ok(Json(Stats { pastes }))
}

async fn get_self(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

async fn update_avatar(
    State(mut app): State<App>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> crate::ApiResult<StatusCode> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let data = field.bytes().await?;

        controllers::avatar::update(&mut app, &user, file_name.as_deref(), data).await?;
        return Ok(StatusCode::NO_CONTENT);
    }

    Err(ApiError::MissingFile)
}

async fn get_avatar(
    State(storage): State<FileStorage>,
    Path(file_name): Path<String>,
) -> crate::ApiResult<Response<body::Full<Bytes>>> {
    let data = storage.get_object(&file_name).await?;
    let response = Response::builder()
        .header(header::CONTENT_TYPE, mime_type(&data))
        .body(body::Full::new(data))?;
    Ok(response)
}
