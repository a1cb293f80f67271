//! Shared application state for axum handlers.

use std::path::Path;
use std::sync::Arc;

use tower_http::services::ServeDir;

use smarthub_app::gateway::ApiGateway;

/// Application state shared across all axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The hub's interface dispatcher.
    pub gateway: Arc<ApiGateway>,
    /// Static file service for paths matching no interface, when configured.
    pub static_files: Option<ServeDir>,
}

impl AppState {
    /// State serving only gateway interfaces.
    #[must_use]
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self {
            gateway,
            static_files: None,
        }
    }

    /// Also serve files from `dir` for paths that match no interface.
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.static_files = Some(ServeDir::new(dir));
        self
    }
}
