use std::path::PathBuf;

use crate::constants::{DEFAULT_DB, NUTRISLICE_BASE, OFFER_CHUNK_SIZE};

/// Where menus are fetched from.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// log the raw upstream JSON before normalizing
    pub dump_json: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: NUTRISLICE_BASE.to_string(),
            dump_json: false,
        }
    }
}

/// Where scraped offers and ratings are stored.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub chunk_size: usize,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            db_path: db_path.into(),
            chunk_size: OFFER_CHUNK_SIZE,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::new(DEFAULT_DB)
    }
}
