use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pastemyst::commands::{self, issue_token::IssueTokenArgs};
use pastemyst::config::Config;
use pastemyst::App;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Apply pending database migrations.
    Migrate,
    /// Delete pastes whose expiration time has passed.
    PurgeExpired,
    /// Print a new session token for a provider identity.
    IssueToken(IssueTokenArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for command output
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config).await?;
    let app = App::new(config).await?;

    match cli.command {
        Command::Serve => commands::serve::run(app).await,
        Command::Migrate => commands::migrate::run(app).await,
        Command::PurgeExpired => commands::purge_expired::run(app).await,
        Command::IssueToken(args) => commands::issue_token::run(app, args).await,
    }
}
