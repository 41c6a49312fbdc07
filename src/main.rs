mod dataset;
mod entities;
mod errors;
mod naming;
mod registration;
mod resolvers;
mod schedule;
mod settings;
mod storage;
mod web;

use clap::Parser;
use migration::MigratorTrait;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "backhaul",
    version,
    about = "Control plane for managed backup jobs"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage (database) and bring the schema up to date
    let db = storage::init(&settings.database).await.into_diagnostic()?;
    migration::Migrator::up(&db, None).await.into_diagnostic()?;

    // optionally seed demo reference data for development
    if settings.server.seed_demo_data {
        storage::ensure_demo_fixtures(&db).await.into_diagnostic()?;
    }

    // start web server
    web::serve(settings, db).await?;
    Ok(())
}
