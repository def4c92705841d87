use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gym_db::{connection, schema};

#[derive(Parser, Debug)]
#[clap(name = "gym-setup")]
struct Cli {
    #[clap(long, env = "GYM_DB", default_value = "gym.sqlite3")]
    pub db: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and install the schema
    Init,
}

/// Initialize the database
async fn db_init(filename: &str) -> Result<()> {
    let conn = connection::create(filename).await?;
    schema::install(&conn).await?;
    tracing::info!(filename, "database ready");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "gym=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Init => db_init(&cli.db).await?,
    }
    Ok(())
}
