//! LMDB-backed slot storage.
//!
//! One environment directory (`<db_path>.lmdb`) holds a single named database
//! whose keys are slot names and whose values are the JSON documents written by
//! the stores. Every write is its own committed transaction.

use std::path::{Path, PathBuf};

use lmdb::{Database, DatabaseFlags, Environment, Error as LmdbError, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::slot_storage::SlotStorage;

const SLOTS_DB: &str = "slots";

pub struct AppDbState {
    env: Option<Environment>,
    db: Database,
    dir: PathBuf,
    map_size: usize,
}

impl AppDbState {
    pub fn init(config: &StoreConfig) -> Result<Self, AppResponse> {
        Self::open_at(config.lmdb_dir(), config.map_size)
    }

    fn open_at(dir: PathBuf, map_size: usize) -> Result<Self, AppResponse> {
        std::fs::create_dir_all(&dir)?;

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(&dir)?;
        let db = env.create_db(Some(SLOTS_DB), DatabaseFlags::empty())?;

        info!("Opened slot environment at {}", dir.display());
        Ok(Self { env: Some(env), db, dir, map_size })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn is_open(&self) -> bool {
        self.env.is_some()
    }

    fn env(&self) -> Result<&Environment, AppResponse> {
        self.env
            .as_ref()
            .ok_or_else(|| AppResponse::DatabaseError("Database connection is closed".to_string()))
    }

    /// Drops the environment. Further slot access fails until `reset_database`.
    pub fn close_database(&mut self) -> Result<(), AppResponse> {
        if let Some(env) = self.env.take() {
            env.sync(true)?;
            info!("Closed slot environment at {}", self.dir.display());
        }
        Ok(())
    }

    /// Closes the environment, deletes its directory and opens a fresh one at `name`.
    pub fn reset_database(&mut self, name: impl AsRef<Path>) -> Result<(), AppResponse> {
        self.close_database()?;

        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir)?;
            info!("Removed slot environment at {}", self.dir.display());
        }

        let mut dir = name.as_ref().as_os_str().to_owned();
        dir.push(".lmdb");
        *self = Self::open_at(PathBuf::from(dir), self.map_size)?;
        Ok(())
    }
}

impl SlotStorage for AppDbState {
    fn read_slot(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let env = self.env()?;
        let txn = env.begin_ro_txn()?;

        let value = match txn.get(self.db, &key) {
            Ok(bytes) => Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                AppResponse::SerializationError(format!("Slot '{key}' is not valid UTF-8: {e}"))
            })?),
            Err(LmdbError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        txn.abort();
        Ok(value)
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;

        debug!("Wrote {} bytes to slot '{}'", value.len(), key);
        Ok(())
    }

    fn remove_slot(&self, key: &str) -> Result<(), AppResponse> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;

        match txn.del(self.db, &key, None) {
            Ok(()) => debug!("Removed slot '{}'", key),
            Err(LmdbError::NotFound) => debug!("Slot '{}' already absent", key),
            Err(e) => {
                warn!("Failed to remove slot '{}': {}", key, e);
                return Err(e.into());
            }
        }

        txn.commit()?;
        Ok(())
    }
}
