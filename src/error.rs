use std::path::PathBuf;

/// Error type for placesync
///
/// Every variant is fatal to an extraction run; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum PlacesyncError {
    /// The source store cannot be opened or copied
    #[error("Bookmark store unavailable at {path:?}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// Expected folder/link record shape is absent
    #[error("Unexpected bookmark store schema: {0}")]
    SourceSchemaMismatch(String),

    /// The destination file cannot be created or written
    #[error("Failed to write {path:?}: {source}")]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A folder appears as its own ancestor
    #[error("Folder {0} is its own ancestor")]
    CycleDetected(i64),

    /// The same identifier was reached through two different parents
    #[error("Identifier {0} appears more than once in the tree")]
    DuplicateIdentifier(i64),

    /// Database-related errors (SQLite)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTML parsing errors
    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    /// YAML parsing/serialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(String),
}

/// Result type alias using PlacesyncError
pub type Result<T> = std::result::Result<T, PlacesyncError>;

impl PlacesyncError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PlacesyncError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlacesyncError::OutputWriteFailure {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_yaml::Error> for PlacesyncError {
    fn from(err: serde_yaml::Error) -> Self {
        PlacesyncError::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for PlacesyncError {
    fn from(err: serde_json::Error) -> Self {
        PlacesyncError::Json(err.to_string())
    }
}
