//! SQLite persistence
//!
//! One connection behind an async mutex. Repositories borrow the connection
//! for the duration of a single statement, so callers never hold it across a
//! provider call.

pub mod locations;
pub mod settings;
pub mod weather_records;

use std::path::Path;
use std::str::FromStr;

use sqlx::{ConnectOptions, SqliteConnection, migrate::Migrator, sqlite::SqliteConnectOptions};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};

use crate::{Result, WeatherError};

pub use locations::Locations;
pub use settings::Settings;
pub use weather_records::WeatherRecords;

static MIGRATOR: Migrator = sqlx::migrate!();

#[must_use]
pub struct Db(Mutex<SqliteConnection>);

impl Db {
    /// Open (creating if needed) and migrate the database at `path`; `:memory:` works too
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn try_new(path: &Path) -> Result<Self> {
        let options = if path == Path::new(":memory:") {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .context("failed to configure an in-memory database")?
        } else {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            SqliteConnectOptions::new().filename(path).create_if_missing(true)
        };

        let mut connection = options
            .connect()
            .await
            .context(&format!("failed to open database `{}`", path.display()))?;
        MIGRATOR.run(&mut connection).await?;
        debug!("database ready");

        Ok(Self(Mutex::new(connection)))
    }

    pub async fn connection(&self) -> MutexGuard<'_, SqliteConnection> {
        self.0.lock().await
    }
}

/// Attach a description to a database error, the way `anyhow::Context` does
pub(crate) trait DbContext<T> {
    fn context(self, what: &str) -> Result<T>;
}

impl<T> DbContext<T> for std::result::Result<T, sqlx::Error> {
    fn context(self, what: &str) -> Result<T> {
        self.map_err(|error| WeatherError::persistence(format!("{what}: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_in_memory() -> Result<()> {
        let db = Db::try_new(Path::new(":memory:")).await?;
        let mut connection = db.connection().await;
        assert_eq!(Locations(&mut connection).count().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn creates_file_and_parent_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("weather.db");

        let _db = Db::try_new(&path).await?;
        assert!(path.exists());

        // Reopening runs the migrator against an already migrated file.
        let _reopened = Db::try_new(&path).await?;
        Ok(())
    }
}
