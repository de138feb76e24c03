use chrono::Utc;
use tracing::info;

use crate::id::random_id;
use crate::models::User;
use crate::types::api::{CreatePaste, FullPaste};
use crate::{ApiError, App};

/// Language given to pasties that don't name one.
pub const DEFAULT_LANGUAGE: &str = "Text";

pub async fn create(
    app: &mut App,
    user: Option<&User>,
    request: CreatePaste,
) -> crate::ApiResult<FullPaste> {
    if request.pasties.is_empty() {
        return Err(ApiError::EmptyPaste);
    }

    if request.private {
        if request.anonymous {
            return Err(ApiError::PrivateAnonymous);
        }
        if user.is_none() {
            return Err(ApiError::Unauthorized);
        }
    }

    let owner_id = match user {
        Some(user) if !request.anonymous => Some(user.id.as_str()),
        _ => None,
    };

    let id = loop {
        let id = random_id();
        if !app.database.exists_paste(&id).await? {
            break id;
        }
    };

    info!(
        "new paste: id='{id}', title='{title}', pasties={count}, expires_in={expires_in}",
        title = request.title,
        count = request.pasties.len(),
        expires_in = request.expires_in.as_str()
    );

    let created_at = Utc::now();
    let paste = app
        .database
        .create_paste(
            &id,
            created_at,
            &request.title,
            request.expires_in,
            request.expires_in.deletes_at(created_at),
            owner_id,
            request.private,
        )
        .await?;

    let mut pasties = Vec::with_capacity(request.pasties.len());
    for pasty in request.pasties {
        let pasty_id = loop {
            let pasty_id = random_id();
            if !app.database.exists_pasty(&pasty_id).await? {
                break pasty_id;
            }
        };
        let language = pasty
            .language
            .as_deref()
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE);
        pasties.push(
            app.database
                .create_pasty(&pasty_id, &paste.id, &pasty.title, &pasty.content, language)
                .await?,
        );
    }

    Ok(FullPaste::new(paste, pasties))
}

/// Fetch a paste as seen by `viewer`.
///
/// Expired pastes and private pastes of other users are reported as missing.
pub async fn fetch(
    app: &mut App,
    viewer: Option<&User>,
    id: &str,
) -> crate::ApiResult<FullPaste> {
    let paste = app.database.get_paste(id).await?;
    if paste.is_expired(&Utc::now()) || !paste.is_visible_to(viewer) {
        return Err(ApiError::NotFound);
    }
    let pasties = app.database.get_paste_pasties(&paste.id).await?;
    Ok(FullPaste::new(paste, pasties))
}

pub async fn count(app: &mut App) -> crate::ApiResult<i64> {
    app.database.get_paste_count().await
}

/// Delete every paste whose deletion time has passed, returning how many went.
pub async fn purge_expired(app: &mut App) -> crate::ApiResult<usize> {
    let pastes = app.database.get_expiring_pastes().await?;

    let now = Utc::now();

    let mut count = 0;
    for paste in pastes {
        if paste.is_expired(&now) {
            app.database.delete_paste(&paste.id).await?;
            count += 1;
        }
    }

    if count > 0 {
        info!("deleted {count} expired pastes");
    }

    Ok(count)
}
