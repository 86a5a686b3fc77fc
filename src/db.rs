use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Key used by installs that kept a single token.
pub const LEGACY_TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("credential store directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store lock poisoned")]
    Poisoned,
}

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let conn = Connection::open(path)?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Database {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute_batch(
            "
            -- Persisted session credentials, one row per key
            CREATE TABLE IF NOT EXISTS credentials (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            ",
        )?;

        // Pass the held connection to avoid deadlock
        Self::migrate_conn(&conn)?;

        Ok(())
    }

    fn migrate_conn(conn: &Connection) -> Result<(), StoreError> {
        // Single-token installs become an access token without a refresh token
        let legacy: Option<String> = conn
            .query_row(
                "SELECT value FROM credentials WHERE key = ?1",
                [LEGACY_TOKEN_KEY],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(token) = legacy {
            conn.execute(
                "INSERT OR IGNORE INTO credentials (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)",
                params![ACCESS_TOKEN_KEY, token],
            )?;
            conn.execute(
                "DELETE FROM credentials WHERE key = ?1",
                [LEGACY_TOKEN_KEY],
            )?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Access/refresh credential pair persisted between runs.
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    /// Expects an initialized database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn load(&self) -> Result<Option<StoredCredentials>, StoreError> {
        let conn = self.db.lock()?;

        let read = |key: &str| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT value FROM credentials WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
        };

        let Some(access_token) = read(ACCESS_TOKEN_KEY)? else {
            return Ok(None);
        };
        let refresh_token = read(REFRESH_TOKEN_KEY)?;

        Ok(Some(StoredCredentials {
            access_token,
            refresh_token,
        }))
    }

    pub fn save(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), StoreError> {
        let mut conn = self.db.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO credentials (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![ACCESS_TOKEN_KEY, access_token],
        )?;

        match refresh_token {
            Some(token) => {
                tx.execute(
                    "INSERT INTO credentials (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                    params![REFRESH_TOKEN_KEY, token],
                )?;
            }
            None => {
                tx.execute(
                    "DELETE FROM credentials WHERE key = ?1",
                    [REFRESH_TOKEN_KEY],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let conn = self.db.lock()?;
        conn.execute(
            "DELETE FROM credentials WHERE key IN (?1, ?2, ?3)",
            params![ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, LEGACY_TOKEN_KEY],
        )?;
        Ok(())
    }
}
