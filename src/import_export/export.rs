use super::BookmarkSink;
use crate::error::{PlacesyncError, Result};
use crate::models::{BookmarkTree, FolderNode};
use log::info;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const INDENT: &str = "    ";

/// How stored timestamps are written to ADD_DATE / LAST_MODIFIED
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    /// The stored integer as is
    #[default]
    Raw,
    /// Places microseconds truncated to Unix seconds
    Seconds,
}

impl TimestampFormat {
    pub fn apply(self, value: i64) -> i64 {
        match self {
            TimestampFormat::Raw => value,
            TimestampFormat::Seconds => value / 1_000_000,
        }
    }
}

/// Trait for rendering a bookmark tree in some file format
pub trait BookmarkExporter {
    fn render(&self, tree: &BookmarkTree, out: &mut dyn Write) -> io::Result<()>;
}

/// HTML/Netscape Bookmark File exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExporter {
    pub timestamps: TimestampFormat,
}

impl HtmlExporter {
    pub fn new(timestamps: TimestampFormat) -> Self {
        Self { timestamps }
    }

    fn render_folder(&self, folder: &FolderNode, depth: usize, out: &mut dyn Write) -> io::Result<()> {
        let indent = INDENT.repeat(depth);
        writeln!(
            out,
            "{}<DT><H3 ADD_DATE=\"{}\" LAST_MODIFIED=\"{}\">{}</H3>",
            indent,
            self.timestamps.apply(folder.created),
            self.timestamps.apply(folder.modified),
            escape_html(&folder.title)
        )?;
        writeln!(out, "{}<DL><p>", indent)?;

        // Subfolders come before links; only links are ordered by position here.
        for sub in &folder.folders {
            self.render_folder(sub, depth + 1, out)?;
        }

        let inner = INDENT.repeat(depth + 1);
        for bookmark in folder.sorted_bookmarks() {
            writeln!(
                out,
                "{}<DT><A HREF=\"{}\" ADD_DATE=\"{}\">{}</A>",
                inner,
                escape_html(&bookmark.url),
                self.timestamps.apply(bookmark.created),
                escape_html(&bookmark.title)
            )?;
        }

        writeln!(out, "{}</DL><p>", indent)
    }
}

impl BookmarkExporter for HtmlExporter {
    fn render(&self, tree: &BookmarkTree, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "<!DOCTYPE NETSCAPE-Bookmark-file-1>")?;
        writeln!(out, "<!-- This is an automatically generated file.")?;
        writeln!(out, "     It will be read and overwritten.")?;
        writeln!(out, "     DO NOT EDIT! -->")?;
        writeln!(
            out,
            "<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">"
        )?;
        writeln!(out, "<TITLE>Bookmarks</TITLE>")?;
        writeln!(out, "<H1>Bookmarks Menu</H1>")?;
        writeln!(out, "<DL><p>")?;

        for folder in &tree.folders {
            self.render_folder(folder, 1, out)?;
        }

        writeln!(out, "</DL><p>")
    }
}

/// JSON dump of the tree
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl BookmarkExporter for JsonExporter {
    fn render(&self, tree: &BookmarkTree, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, tree)?;
        writeln!(out)
    }
}

/// Render a tree to a Netscape bookmark document in memory
pub fn render_html(tree: &BookmarkTree, timestamps: TimestampFormat) -> String {
    let mut buf = Vec::new();
    HtmlExporter::new(timestamps)
        .render(tree, &mut buf)
        .expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

/// Escape the characters that would end an attribute, start a tag or break
/// the one-entry-per-line layout
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\n', '\r']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Write a rendered tree to `path` without ever leaving a partial file there.
///
/// The document goes to a temporary file in the destination directory which is
/// renamed over `path` once fully written.
pub fn write_atomic(path: &Path, exporter: &dyn BookmarkExporter, tree: &BookmarkTree) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PlacesyncError::write_failure(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        exporter
            .render(tree, &mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| PlacesyncError::write_failure(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| PlacesyncError::write_failure(path, e))?;
    tmp.persist(path)
        .map_err(|e| PlacesyncError::write_failure(path, e.error))?;

    Ok(())
}

/// Sink writing the tree to a file with the given exporter
pub struct FileSink {
    path: PathBuf,
    exporter: Box<dyn BookmarkExporter>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, exporter: Box<dyn BookmarkExporter>) -> Self {
        Self {
            path: path.into(),
            exporter,
        }
    }

    pub fn html(path: impl Into<PathBuf>, timestamps: TimestampFormat) -> Self {
        Self::new(path, Box::new(HtmlExporter::new(timestamps)))
    }

    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Box::new(JsonExporter))
    }

    /// Pick the exporter from the file extension
    pub fn for_path(path: impl Into<PathBuf>, timestamps: TimestampFormat) -> Result<Self> {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "html" | "htm" => Ok(Self::html(path, timestamps)),
            "json" => Ok(Self::json(path)),
            _ => Err(PlacesyncError::InvalidInput(format!(
                "Unsupported export format: {}",
                extension
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BookmarkSink for FileSink {
    fn store(&self, tree: &BookmarkTree) -> Result<()> {
        write_atomic(&self.path, self.exporter.as_ref(), tree)?;
        info!(
            "Wrote {} folders and {} bookmarks to {:?}",
            tree.folder_count(),
            tree.bookmark_count(),
            self.path
        );
        Ok(())
    }
}
