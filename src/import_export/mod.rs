pub mod export;
pub mod import;

use crate::error::Result;
use crate::models::BookmarkTree;

/// Anything a bookmark tree can be read from: a browser profile, an
/// interchange file, or eventually a remote sync endpoint
pub trait BookmarkSource {
    fn load(&self) -> Result<BookmarkTree>;
}

/// Anything a bookmark tree can be written to
pub trait BookmarkSink {
    fn store(&self, tree: &BookmarkTree) -> Result<()>;
}

// Re-export main types for convenience
pub use export::{
    escape_html, render_html, write_atomic, BookmarkExporter, FileSink, HtmlExporter,
    JsonExporter, TimestampFormat,
};
pub use import::{parse_netscape, unescape_html, HtmlFileSource, NetscapeParser};
