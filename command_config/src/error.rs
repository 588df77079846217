use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigStoreError {
    /// The file exists but does not hold a valid command configuration.
    #[error("command configuration at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file could not be read or written.
    #[error("failed to access command configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Caller supplied data that breaks a precondition of the store.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("backup file not found at {0}")]
    BackupNotFound(PathBuf),
}

/// Why a backup snapshot was refused by a restore.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot is not a valid command configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing 'guilds' object")]
    MissingGuilds,

    #[error("'guilds' is not an object")]
    GuildsNotObject,
}

impl ConfigStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.into(),
            source,
        }
    }
}
