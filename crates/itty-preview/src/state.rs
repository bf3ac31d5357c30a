//! Application state shared across all request handlers.

use std::sync::Arc;

use tower_http::services::{ServeDir, ServeFile};

use crate::config::Config;

/// Static file service with the SPA entry document as fallback.
pub type StaticFiles = ServeDir<ServeFile>;

/// Shared application state available to all request handlers.
///
/// Read-only after startup; nothing here changes per request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Client app assets, falling back to `index.html` for unknown paths.
    pub static_files: StaticFiles,
}

impl AppState {
    /// Create a new application state from configuration.
    pub fn new(config: Config) -> Self {
        let index = config.docs_dir.join("index.html");
        let static_files = ServeDir::new(&config.docs_dir).fallback(ServeFile::new(&index));

        tracing::info!(
            docs_dir = %config.docs_dir.display(),
            index = %index.display(),
            "application state initialized"
        );

        Self {
            config: Arc::new(config),
            static_files,
        }
    }
}
