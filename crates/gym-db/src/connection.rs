use std::fs;
use std::ops::Deref;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection as SqlConnection,
};
use tokio::sync::Mutex;

use crate::schema;

/// A thread safe connection to the database
#[derive(Clone)]
pub struct Connection(Arc<Mutex<SqliteConnection>>);

impl Connection {
    fn new(conn: SqliteConnection) -> Self {
        Connection(Arc::new(Mutex::new(conn)))
    }
}

impl Deref for Connection {
    type Target = Mutex<SqliteConnection>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Open a connection to an existing database
pub async fn open(filename: &str) -> Result<Connection> {
    let opts = SqliteConnectOptions::from_str(filename)?;
    let conn = SqliteConnection::connect_with(&opts).await?;
    tracing::debug!(filename, "opened database");
    Ok(Connection::new(conn))
}

/// Open a connection, creating the database file if
/// it does not exist yet.
pub async fn create(filename: &str) -> Result<Connection> {
    let opts = SqliteConnectOptions::from_str(filename)?
        .create_if_missing(true);
    let conn = SqliteConnection::connect_with(&opts).await?;
    tracing::debug!(filename, "opened or created database");
    Ok(Connection::new(conn))
}

pub struct TestHandle {
    path: PathBuf,
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), %err, "could not remove test database");
        }
    }
}

/// Open a new test database connection.
/// The database will be created on each open.
pub async fn open_test() -> (TestHandle, Connection) {
    let path = std::env::temp_dir()
        .join(format!("gym_test_{}.sqlite3", rand::random::<u64>()));
    let handle = TestHandle { path: path.clone() };

    let opts = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let conn = SqliteConnection::connect_with(&opts).await.unwrap();
    let conn = Connection::new(conn);

    // Install the schema
    schema::install(&conn).await.unwrap();

    (handle, conn)
}
