use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ExpiresIn, Paste, Pasty};

#[derive(Debug, Deserialize)]
pub struct CreatePaste {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub expires_in: ExpiresIn,
    /// Only visible to its owner. Requires a signed in user.
    #[serde(default)]
    pub private: bool,
    /// Don't record the signed in user as the owner.
    #[serde(default)]
    pub anonymous: bool,
    pub pasties: Vec<CreatePasty>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePasty {
    #[serde(default)]
    pub title: String,
    pub content: String,
    /// Defaults to "Text" when missing or blank.
    #[serde(default)]
    pub language: Option<String>,
}

/// A paste together with its pasties.
#[derive(Debug, Serialize)]
pub struct FullPaste {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub expires_in: String,
    pub deletes_at: Option<DateTime<Utc>>,
    pub owner_id: Option<String>,
    pub private: bool,
    pub pasties: Vec<Pasty>,
}

impl FullPaste {
    pub fn new(paste: Paste, pasties: Vec<Pasty>) -> Self {
        FullPaste {
            id: paste.id,
            created_at: paste.created_at,
            title: paste.title,
            expires_in: paste.expires_in,
            deletes_at: paste.deletes_at,
            owner_id: paste.owner_id,
            private: paste.private,
            pasties,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub pastes: i64,
}
