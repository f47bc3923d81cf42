pub mod browser;
pub mod config;
pub mod error;
pub mod import_export;
pub mod models;
pub mod places;
pub mod sync;
pub mod tree;
pub mod utils;

// Re-export error types for convenience
pub use error::{PlacesyncError, Result};
pub use models::{BookmarkEntry, BookmarkTree, EntryKind, FolderNode};
pub use sync::{RunSummary, Synchronizer};
