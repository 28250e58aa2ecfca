// Application state module
// Everything a request handler needs, built once from the loaded config

use crate::document::CachedDocument;
use crate::routing::RouteTable;
use crate::store::FileStore;

use super::types::{Config, ServiceMode};

/// Application state
pub struct AppState {
    pub config: Config,
    pub mode: ServiceMode,

    // Cached config values for fast access
    pub access_log: bool,

    /// Upload directory (files mode)
    pub store: FileStore,
    /// Explicit routes plus fallback (files mode)
    pub routes: RouteTable,
    /// Load-once response document (static mode)
    pub document: CachedDocument,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            mode: config.server.mode,
            access_log: config.logging.access_log,
            store: FileStore::new(&config.storage.upload_dir),
            routes: RouteTable::file_api(config.http.header_lookup),
            document: CachedDocument::new(&config.document.path),
        }
    }
}
