//! Store configuration.
//!
//! Every field has a default matching the deployed site, so an empty JSON
//! object (or no config at all) opens the same slots the pages have always
//! used.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::research_model::SchemaVariant;

pub const DEFAULT_DB_PATH: &str = "melodies_research";
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;
pub const BLOG_SLOT: &str = "melodiesBlogPosts";
pub const RESEARCH_SLOT: &str = "melodiesData";
pub const EXPORT_PREFIX: &str = "melodies-research-data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Environment path without the `.lmdb` suffix.
    pub db_path: PathBuf,
    pub map_size: usize,
    pub blog_slot: String,
    pub research_slot: String,
    pub schema: SchemaVariant,
    pub export_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            map_size: DEFAULT_MAP_SIZE,
            blog_slot: BLOG_SLOT.to_string(),
            research_slot: RESEARCH_SLOT.to_string(),
            schema: SchemaVariant::default(),
            export_prefix: EXPORT_PREFIX.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppResponse> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_schema(mut self, schema: SchemaVariant) -> Self {
        self.schema = schema;
        self
    }

    /// Directory LMDB opens, i.e. `db_path` with `.lmdb` appended.
    pub fn lmdb_dir(&self) -> PathBuf {
        let mut dir = self.db_path.clone().into_os_string();
        dir.push(".lmdb");
        PathBuf::from(dir)
    }
}
