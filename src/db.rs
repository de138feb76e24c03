use anyhow::bail;
use chrono::{DateTime, Utc};
use sqlx::any::AnyKind;
use sqlx::AnyPool;

use crate::models::{ExpiresIn, Paste, Pasty, User};
use crate::ApiError;

const PASTE_COLUMNS: &str =
    "id, created_at, title, expires_in, deletes_at, owner_id, private";
const PASTY_COLUMNS: &str = "id, paste_id, title, content, language";
const USER_COLUMNS: &str = "id, created_at, username, avatar_url, provider_name, provider_id";

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
    kind: AnyKind,
}

impl Database {
    /// Connect to a database by URL.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            kind: url.parse()?,
            pool: AnyPool::connect(url).await?,
        })
    }

    /// Apply the schema migrations for the connected backend.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        match self.kind {
            #[cfg(feature = "sqlite")]
            AnyKind::Sqlite => sqlx::migrate!("migrations/sqlite").run(&self.pool).await?,
            #[cfg(feature = "postgres")]
            AnyKind::Postgres => sqlx::migrate!("migrations/postgres").run(&self.pool).await?,
            #[allow(unreachable_patterns)]
            kind => bail!("unsupported database backend: {kind:?}"),
        }
        Ok(())
    }

    /// Insert a paste.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_paste(
        &mut self,
        id: &str,
        created_at: DateTime<Utc>,
        title: &str,
        expires_in: ExpiresIn,
        deletes_at: Option<DateTime<Utc>>,
        owner_id: Option<&str>,
        private: bool,
    ) -> crate::ApiResult<Paste> {
        let mut conn = self.pool.acquire().await?;
        let paste = sqlx::query_as::<_, Paste>(&format!(
            "INSERT INTO pastes ({PASTE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING \
             {PASTE_COLUMNS}"
        ))
        .bind(id)
        .bind(created_at)
        .bind(title)
        .bind(expires_in.as_str())
        .bind(deletes_at)
        .bind(owner_id)
        .bind(private)
        .fetch_one(&mut conn)
        .await?;
        Ok(paste)
    }

    /// Insert a pasty belonging to an existing paste.
    pub async fn create_pasty(
        &mut self,
        id: &str,
        paste_id: &str,
        title: &str,
        content: &str,
        language: &str,
    ) -> crate::ApiResult<Pasty> {
        let mut conn = self.pool.acquire().await?;
        let pasty = sqlx::query_as::<_, Pasty>(&format!(
            "INSERT INTO pasties ({PASTY_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING \
             {PASTY_COLUMNS}"
        ))
        .bind(id)
        .bind(paste_id)
        .bind(title)
        .bind(content)
        .bind(language)
        .fetch_one(&mut conn)
        .await?;
        Ok(pasty)
    }

    /// Check whether a paste id is taken.
    pub async fn exists_paste(&mut self, id: &str) -> crate::ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM pastes WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut conn)
                .await?;
        Ok(exists)
    }

    /// Check whether a pasty id is taken.
    pub async fn exists_pasty(&mut self, id: &str) -> crate::ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM pasties WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut conn)
                .await?;
        Ok(exists)
    }

    /// Check whether a user id is taken.
    pub async fn exists_user(&mut self, id: &str) -> crate::ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut conn)
                .await?;
        Ok(exists)
    }

    /// Check whether a user exists for a provider identity.
    pub async fn exists_user_by_provider(
        &mut self,
        provider_name: &str,
        provider_id: &str,
    ) -> crate::ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE provider_name = $1 AND provider_id = $2)",
        )
        .bind(provider_name)
        .bind(provider_id)
        .fetch_one(&mut conn)
        .await?;
        Ok(exists)
    }

    /// Get a paste by id.
    pub async fn get_paste(&mut self, id: &str) -> crate::ApiResult<Paste> {
        let mut conn = self.pool.acquire().await?;
        let paste = sqlx::query_as::<_, Paste>(&format!(
            "SELECT {PASTE_COLUMNS} FROM pastes WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_one(&mut conn)
        .await?;
        Ok(paste)
    }

    /// Count all pastes.
    pub async fn get_paste_count(&mut self) -> crate::ApiResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pastes")
            .fetch_one(&mut conn)
            .await?;
        Ok(count)
    }

    /// Get all pasties of a paste, in no particular order.
    pub async fn get_paste_pasties(&mut self, paste_id: &str) -> crate::ApiResult<Vec<Pasty>> {
        let mut conn = self.pool.acquire().await?;
        Ok(sqlx::query_as::<_, Pasty>(&format!(
            "SELECT {PASTY_COLUMNS} FROM pasties WHERE paste_id = $1"
        ))
        .bind(paste_id)
        .fetch_all(&mut conn)
        .await?)
    }

    /// Get all pastes that have a deletion time.
    pub async fn get_expiring_pastes(&mut self) -> crate::ApiResult<Vec<Paste>> {
        let mut conn = self.pool.acquire().await?;
        Ok(sqlx::query_as::<_, Paste>(&format!(
            "SELECT {PASTE_COLUMNS} FROM pastes WHERE deletes_at IS NOT NULL"
        ))
        .fetch_all(&mut conn)
        .await?)
    }

    /// Delete a paste and its pasties.
    pub async fn delete_paste(&mut self, id: &str) -> crate::ApiResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("DELETE FROM pasties WHERE paste_id = $1")
            .bind(id)
            .execute(&mut conn)
            .await?;
        sqlx::query("DELETE FROM pastes WHERE id = $1")
            .bind(id)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Insert a user.
    pub async fn create_user(
        &mut self,
        id: &str,
        created_at: DateTime<Utc>,
        username: &str,
        avatar_url: &str,
        provider_name: &str,
        provider_id: &str,
    ) -> crate::ApiResult<User> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING \
             {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(created_at)
        .bind(username)
        .bind(avatar_url)
        .bind(provider_name)
        .bind(provider_id)
        .fetch_one(&mut conn)
        .await?;
        Ok(user)
    }

    /// Get a user by its provider identity.
    pub async fn get_user_by_provider(
        &mut self,
        provider_name: &str,
        provider_id: &str,
    ) -> crate::ApiResult<User> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE provider_name = $1 AND provider_id = $2 \
             LIMIT 1"
        ))
        .bind(provider_name)
        .bind(provider_id)
        .fetch_one(&mut conn)
        .await?;
        Ok(user)
    }

    /// Point a user's avatar at a new URL.
    pub async fn set_user_avatar(&mut self, id: &str, avatar_url: &str) -> crate::ApiResult<()> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("UPDATE users SET avatar_url = $1 WHERE id = $2")
            .bind(avatar_url)
            .bind(id)
            .execute(&mut conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    /// Store a session token for a user.
    pub async fn create_session(
        &mut self,
        token: &str,
        user_id: &str,
        created_at: DateTime<Utc>,
    ) -> crate::ApiResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(created_at)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Get the user a session token belongs to.
    pub async fn get_session_user(&mut self, token: &str) -> crate::ApiResult<User> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.created_at, u.username, u.avatar_url, u.provider_name, \
             u.provider_id FROM sessions s JOIN users u ON u.id = s.user_id WHERE s.token = $1 \
             LIMIT 1",
        )
        .bind(token)
        .fetch_one(&mut conn)
        .await?;
        Ok(user)
    }
}
