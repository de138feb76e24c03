use tracing::info;

use crate::controllers;
use crate::App;

pub async fn run(mut app: App) -> anyhow::Result<()> {
    let count = controllers::paste::purge_expired(&mut app).await?;
    if count == 0 {
        info!("no expired pastes");
    }
    Ok(())
}
