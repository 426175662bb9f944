use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while opening or bootstrapping the database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to create data directory {}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open SQLite database at {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to enable foreign keys")]
    ForeignKeys(#[source] rusqlite::Error),

    /// The whole bootstrap transaction was rolled back.
    #[error("database bootstrap failed while trying to {step}")]
    Bootstrap {
        step: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error(transparent)]
    Query(#[from] rusqlite::Error),
}

impl DbError {
    /// Adapter for `map_err` inside the bootstrap transaction.
    pub(crate) fn at(step: &'static str) -> impl FnOnce(rusqlite::Error) -> DbError {
        move |source| DbError::Bootstrap { step, source }
    }
}
