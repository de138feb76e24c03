use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::headers::authorization::Bearer;
use axum::headers::{Authorization, Cookie, HeaderMapExt};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::models::User;
use crate::ApiError;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "pastemyst";

/// The user a request is authenticated as.
///
/// Rejects with [`ApiError::Unauthorized`] when the request carries no valid
/// session token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Database: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let mut db = Database::from_ref(state);
        match db.get_session_user(&token).await {
            Ok(user) => Ok(AuthUser(user)),
            Err(ApiError::NotFound) => Err(ApiError::Unauthorized),
            Err(err) => Err(err),
        }
    }
}

/// The user a request is authenticated as, if any.
///
/// Missing or unknown session tokens resolve to `None`. Database failures
/// still reject the request.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    Database: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(AuthUser(user)) => Ok(MaybeUser(Some(user))),
            Err(ApiError::Unauthorized) => Ok(MaybeUser(None)),
            Err(err) => Err(err),
        }
    }
}

/// Session token from the session cookie, or else from a bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(SESSION_COOKIE).map(str::to_owned));
    let token = from_cookie.or_else(|| {
        headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_owned())
    })?;
    (!token.is_empty()).then_some(token)
}

/// Start a new session for a user and return its token.
pub async fn issue_session(db: &mut Database, user_id: &str) -> crate::ApiResult<String> {
    let token = Uuid::new_v4().simple().to_string();
    db.create_session(&token, user_id, Utc::now()).await?;
    Ok(token)
}
