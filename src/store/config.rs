use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Volatile store, mostly useful for demos and tests.
    Memory,
    /// One directory per collection, one JSON file per document.
    JsonDir(JsonDirConfig),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonDirConfig {
    pub directory: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::JsonDir(JsonDirConfig {
            directory: PathBuf::from("data"),
        })
    }
}
