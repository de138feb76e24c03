use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Paste {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    /// One of the [`ExpiresIn`] names.
    pub expires_in: String,
    pub deletes_at: Option<DateTime<Utc>>,
    pub owner_id: Option<String>,
    pub private: bool,
}

impl Paste {
    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        self.deletes_at.map_or(false, |deletes_at| deletes_at <= *now)
    }

    /// Whether `viewer` may see this paste.
    pub fn is_visible_to(&self, viewer: Option<&User>) -> bool {
        if !self.private {
            return true;
        }
        match (&self.owner_id, viewer) {
            (Some(owner_id), Some(viewer)) => *owner_id == viewer.id,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Pasty {
    pub id: String,
    pub paste_id: String,
    pub title: String,
    pub content: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
    /// Empty when the user has no avatar.
    pub avatar_url: String,
    pub provider_name: String,
    pub provider_id: String,
}

/// How long a paste lives before it is purged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ExpiresIn {
    #[default]
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "10h")]
    TenHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "2d")]
    TwoDays,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "1y")]
    OneYear,
}

impl ExpiresIn {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpiresIn::Never => "never",
            ExpiresIn::OneHour => "1h",
            ExpiresIn::TwoHours => "2h",
            ExpiresIn::TenHours => "10h",
            ExpiresIn::OneDay => "1d",
            ExpiresIn::TwoDays => "2d",
            ExpiresIn::OneWeek => "1w",
            ExpiresIn::OneMonth => "1m",
            ExpiresIn::OneYear => "1y",
        }
    }

    /// Deletion time of something created at `created_at`, `None` for never.
    pub fn deletes_at(self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ExpiresIn::Never => None,
            ExpiresIn::OneHour => Some(created_at + Duration::hours(1)),
            ExpiresIn::TwoHours => Some(created_at + Duration::hours(2)),
            ExpiresIn::TenHours => Some(created_at + Duration::hours(10)),
            ExpiresIn::OneDay => Some(created_at + Duration::days(1)),
            ExpiresIn::TwoDays => Some(created_at + Duration::days(2)),
            ExpiresIn::OneWeek => Some(created_at + Duration::weeks(1)),
            ExpiresIn::OneMonth => created_at.checked_add_months(Months::new(1)),
            ExpiresIn::OneYear => created_at.checked_add_months(Months::new(12)),
        }
    }
}

impl FromStr for ExpiresIn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expires_in = match s {
            "never" => ExpiresIn::Never,
            "1h" => ExpiresIn::OneHour,
            "2h" => ExpiresIn::TwoHours,
            "10h" => ExpiresIn::TenHours,
            "1d" => ExpiresIn::OneDay,
            "2d" => ExpiresIn::TwoDays,
            "1w" => ExpiresIn::OneWeek,
            "1m" => ExpiresIn::OneMonth,
            "1y" => ExpiresIn::OneYear,
            _ => return Err(format!("unknown expiration '{s}'")),
        };
        Ok(expires_in)
    }
}
