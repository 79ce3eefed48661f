use std::sync::Arc;

use bookshelf_db::store::BookStoreArc;

use crate::config::ServerConfig;
use crate::templates::Templates;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Book persistence, Postgres or in-memory.
    pub books: BookStoreArc,
    /// Compiled page templates.
    pub templates: Arc<Templates>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Assemble state around `books`, compiling the embedded templates.
    pub fn new(
        books: BookStoreArc,
        config: ServerConfig,
    ) -> Result<Self, handlebars::TemplateError> {
        Ok(Self {
            books,
            templates: Arc::new(Templates::new()?),
            config: Arc::new(config),
        })
    }
}
