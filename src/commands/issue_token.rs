use anyhow::anyhow;
use chrono::Utc;
use clap::Args;
use tracing::info;

use crate::auth::issue_session;
use crate::id::random_id;
use crate::App;

/// Start a session for a provider identity, creating the user if needed.
#[derive(Debug, Args)]
pub struct IssueTokenArgs {
    /// Name of the identity provider, e.g. `github`.
    #[arg(long)]
    pub provider_name: String,
    /// Id assigned to the user by the provider.
    #[arg(long)]
    pub provider_id: String,
    /// Username for a user that does not exist yet.
    #[arg(long)]
    pub username: Option<String>,
    /// Initial avatar URL for a user that does not exist yet.
    #[arg(long)]
    pub avatar_url: Option<String>,
}

pub async fn run(mut app: App, args: IssueTokenArgs) -> anyhow::Result<()> {
    let token = issue(&mut app, args).await?;
    println!("{token}");
    Ok(())
}

async fn issue(app: &mut App, args: IssueTokenArgs) -> anyhow::Result<String> {
    let db = &mut app.database;

    let user = if db
        .exists_user_by_provider(&args.provider_name, &args.provider_id)
        .await?
    {
        db.get_user_by_provider(&args.provider_name, &args.provider_id)
            .await?
    } else {
        let username = args.username.filter(|name| !name.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "no user for {}:{}, pass --username to create one",
                args.provider_name,
                args.provider_id
            )
        })?;

        let id = loop {
            let id = random_id();
            if !db.exists_user(&id).await? {
                break id;
            }
        };

        info!(
            "new user: id='{id}', username='{username}', provider='{}:{}'",
            args.provider_name, args.provider_id
        );

        db.create_user(
            &id,
            Utc::now(),
            &username,
            args.avatar_url.as_deref().unwrap_or_default(),
            &args.provider_name,
            &args.provider_id,
        )
        .await?
    };

    Ok(issue_session(db, &user.id).await?)
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::controllers::tests::scratch_app;

    fn args(username: Option<&str>) -> IssueTokenArgs {
        IssueTokenArgs {
            provider_name: "github".into(),
            provider_id: "99".into(),
            username: username.map(Into::into),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn creates_user_once() {
        let (mut app, _dir) = scratch_app().await;

        let first = issue(&mut app, args(Some("octocat"))).await.unwrap();
        let second = issue(&mut app, args(None)).await.unwrap();
        assert_ne!(first, second);

        let a = app.database.get_session_user(&first).await.unwrap();
        let b = app.database.get_session_user(&second).await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.username, "octocat");
    }

    #[tokio::test]
    async fn unknown_user_needs_username() {
        let (mut app, _dir) = scratch_app().await;
        assert!(issue(&mut app, args(None)).await.is_err());
        assert!(!app
            .database
            .exists_user_by_provider("github", "99")
            .await
            .unwrap());
    }
}
