use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gym_cli::cli::{Cli, Command};
use gym_db::connection;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout is for the user
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "gym=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::init();
    let today = cli.today();

    let conn = connection::open(&cli.db).await?;
    match cli.command {
        Command::Members(cmd) => cmd.run(&conn, today).await,
        Command::Trainers(cmd) => cmd.run(&conn, today).await,
        Command::Payments(cmd) => cmd.run(&conn, today).await,
        Command::Attendance(cmd) => cmd.run(&conn, today).await,
        Command::Reports(cmd) => cmd.run(&conn, today).await,
    }?;

    Ok(())
}
