#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("migration to schema version {version} failed: {source}")]
    Migration {
        version: u32,
        source: rusqlite::Error,
    },

    #[error("store schema version {db} is newer than this build supports ({code})")]
    SchemaTooNew { db: u32, code: u32 },

    #[error("remote host error: {0}")]
    Remote(String),

    #[error("invalid remote configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
