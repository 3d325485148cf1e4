use async_duckdb::ClientBuilder;
use async_duckdb::duckdb::OptionalExt;
use async_duckdb::duckdb::params;
use log::debug;
use std::path::PathBuf;

use crate::clients::{entities::Track, errors::Error};

enum Table {
    Users,
    Recommendations,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Recommendations => "recommendations",
        }
    }
}

/// Saved recommendation lists, one per user
pub struct LocalStorage {
    client: async_duckdb::Client,
}

impl LocalStorage {
    pub async fn init_db(&self) -> Result<(), Error> {
        let table_query = format!(
            "
            CREATE SEQUENCE IF NOT EXISTS {users_seq} START 1;
            CREATE SEQUENCE IF NOT EXISTS {recs_seq} START 1;
            CREATE TABLE IF NOT EXISTS {users_table} (
                id BIGINT PRIMARY KEY DEFAULT nextval('{users_seq}'),
                username TEXT UNIQUE NOT NULL
            );
            CREATE TABLE IF NOT EXISTS {recs_table} (
                id BIGINT PRIMARY KEY DEFAULT nextval('{recs_seq}'),
                user_id BIGINT NOT NULL REFERENCES {users_table}(id),
                title TEXT NOT NULL,
                artist TEXT NOT NULL
            );
        ",
            users_seq = "user_id_sequence",
            recs_seq = "recommendation_id_sequence",
            users_table = Table::Users.as_str(),
            recs_table = Table::Recommendations.as_str()
        );
        self.client
            .conn(move |conn| conn.execute_batch(&table_query))
            .await?;

        debug!("Successfully initialized local storage database");
        Ok(())
    }

    pub async fn try_default() -> Result<Self, Error> {
        let db_path = match std::env::var_os("RSIMILAR_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
                .join(".rsimilar_db.duckdb"),
        };
        let client: async_duckdb::Client = ClientBuilder::new().path(&db_path).open().await?;
        debug!("Opened local storage database at {db_path:?}");
        Ok(LocalStorage { client })
    }

    /// Throwaway database, used by tests
    pub async fn in_memory() -> Result<Self, Error> {
        let client = ClientBuilder::new().path(":memory:").open().await?;
        let storage = LocalStorage { client };
        storage.init_db().await?;
        Ok(storage)
    }

    // Returns the id of an existing user or registers a new one
    pub async fn add_or_get_user(&self, username: &str) -> Result<i64, Error> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(Error::InvalidUsername);
        }
        let select = format!(
            "SELECT id FROM {} WHERE username = ?1;",
            Table::Users.as_str()
        );
        let insert = format!("INSERT INTO {} (username) VALUES (?1);", Table::Users.as_str());

        let user_id = self
            .client
            .conn(move |conn| {
                let existing: Option<i64> = conn
                    .query_row(&select, params![username], |row| row.get(0))
                    .optional()?;
                if let Some(id) = existing {
                    return Ok(id);
                }
                conn.execute(&insert, params![username])?;
                conn.query_row(&select, params![username], |row| row.get::<_, i64>(0))
            })
            .await?;

        debug!("Resolved user id {user_id}");
        Ok(user_id)
    }

    // Replaces the user's saved list with `tracks`, keeping their order
    pub async fn save_recommendations(&self, user_id: i64, tracks: &[Track]) -> Result<(), Error> {
        let delete = format!(
            "DELETE FROM {} WHERE user_id = ?1;",
            Table::Recommendations.as_str()
        );
        let insert = format!(
            "INSERT INTO {} (user_id, title, artist) VALUES (?1, ?2, ?3);",
            Table::Recommendations.as_str()
        );
        let tracks = tracks.to_vec();
        let count = tracks.len();

        self.client
            .conn(move |conn| {
                conn.execute_batch("BEGIN TRANSACTION;")?;
                let written = (|| -> async_duckdb::duckdb::Result<()> {
                    conn.execute(&delete, params![user_id])?;
                    let mut stmt = conn.prepare(&insert)?;
                    for track in &tracks {
                        stmt.execute(params![user_id, track.title, track.artist])?;
                    }
                    Ok(())
                })();
                match written {
                    Ok(()) => conn.execute_batch("COMMIT;"),
                    Err(e) => {
                        if let Err(rollback) = conn.execute_batch("ROLLBACK;") {
                            debug!("Failed to roll back recommendations write: {rollback}");
                        }
                        Err(e)
                    }
                }
            })
            .await?;

        debug!("Saved {count} recommendations for user {user_id}");
        Ok(())
    }

    pub async fn load_recommendations(&self, user_id: i64) -> Result<Vec<Track>, Error> {
        let query = format!(
            "SELECT title, artist FROM {} WHERE user_id = ?1 ORDER BY id;",
            Table::Recommendations.as_str()
        );

        let tracks = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare(&query)?;
                let mut rows = stmt.query(params![user_id])?;
                let mut tracks = vec![];
                while let Some(row) = rows.next()? {
                    let title: String = row.get(0)?;
                    let artist: String = row.get(1)?;
                    tracks.push(Track::new(title, artist));
                }
                Ok(tracks)
            })
            .await?;

        debug!("Loaded {} recommendations for user {user_id}", tracks.len());
        Ok(tracks)
    }
}
