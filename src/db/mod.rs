//! Persistent credential storage: `localStorage` in the browser, a small SQLite
//! key/value table on native targets.

use crate::session::{SessionStore, StoreError, StoredCredential, TOKEN_KEY, USER_KEY};

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

/// Browser store. Values are raw strings so they stay readable by anything
/// else on the page that expects `token` / `user`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSessionStore;

#[cfg(target_arch = "wasm32")]
impl LocalSessionStore {
    pub fn open() -> Self {
        Self
    }

    fn raw_get(key: &str) -> Option<String> {
        let storage = LocalStorage::raw();
        storage.get_item(key).ok().flatten()
    }

    fn raw_set(key: &str, value: &str) -> Result<(), StoreError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StoreError::new(format!("{e:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionStore for LocalSessionStore {
    fn get(&self) -> Option<StoredCredential> {
        let token = Self::raw_get(TOKEN_KEY).filter(|token| !token.trim().is_empty())?;
        Some(StoredCredential {
            token,
            user: Self::raw_get(USER_KEY),
        })
    }

    fn set(&self, credential: &StoredCredential) -> Result<(), StoreError> {
        Self::raw_set(TOKEN_KEY, &credential.token)?;
        match credential.user.as_deref() {
            Some(user) => Self::raw_set(USER_KEY, user),
            None => {
                LocalStorage::delete(USER_KEY);
                Ok(())
            }
        }
    }

    fn clear(&self) {
        LocalStorage::delete(TOKEN_KEY);
        LocalStorage::delete(USER_KEY);
    }
}

/// Native store backed by `musicstream.db` in the platform data directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct LocalSessionStore {
    db_path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for LocalSessionStore {
    fn default() -> Self {
        Self::open()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl LocalSessionStore {
    pub fn open() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("musicstream"))
            .unwrap_or_else(|| PathBuf::from(".musicstream"));
        if let Err(err) = std::fs::create_dir_all(&data_dir) {
            tracing::warn!("could not create data directory {}: {err}", data_dir.display());
        }
        Self::at(data_dir.join("musicstream.db"))
    }

    pub fn at(db_path: PathBuf) -> Self {
        let store = Self { db_path };
        if let Err(err) = store.initialize() {
            tracing::warn!("credential store unavailable: {err}");
        }
        store
    }

    fn connection(&self) -> Result<rusqlite::Connection, StoreError> {
        rusqlite::Connection::open(&self.db_path)
            .map_err(|e| StoreError::new(format!("Failed to open database: {}", e)))
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.connection()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS credentials (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StoreError::new(e.to_string()))?;
        Ok(())
    }

    fn read(conn: &rusqlite::Connection, key: &str) -> Option<String> {
        conn.query_row(
            "SELECT value FROM credentials WHERE key = ?1",
            [key],
            |row: &rusqlite::Row| row.get(0),
        )
        .ok()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SessionStore for LocalSessionStore {
    fn get(&self) -> Option<StoredCredential> {
        let conn = match self.connection() {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!("{err}");
                return None;
            }
        };
        let token = Self::read(&conn, TOKEN_KEY).filter(|token| !token.trim().is_empty())?;
        Some(StoredCredential {
            token,
            user: Self::read(&conn, USER_KEY),
        })
    }

    fn set(&self, credential: &StoredCredential) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::new(e.to_string()))?;

        tx.execute(
            "INSERT OR REPLACE INTO credentials (key, value) VALUES (?1, ?2)",
            [TOKEN_KEY, credential.token.as_str()],
        )
        .map_err(|e| StoreError::new(e.to_string()))?;
        let user_write = match credential.user.as_deref() {
            Some(user) => tx.execute(
                "INSERT OR REPLACE INTO credentials (key, value) VALUES (?1, ?2)",
                [USER_KEY, user],
            ),
            None => tx.execute("DELETE FROM credentials WHERE key = ?1", [USER_KEY]),
        };
        user_write.map_err(|e| StoreError::new(e.to_string()))?;

        tx.commit().map_err(|e| StoreError::new(e.to_string()))
    }

    fn clear(&self) {
        let result = self.connection().and_then(|conn| {
            conn.execute(
                "DELETE FROM credentials WHERE key IN (?1, ?2)",
                [TOKEN_KEY, USER_KEY],
            )
            .map(|_| ())
            .map_err(|e| StoreError::new(e.to_string()))
        });
        if let Err(err) = result {
            tracing::warn!("failed to clear stored credential: {err}");
        }
    }
}
